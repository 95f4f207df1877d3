use std::sync::Arc;

use chrono::{TimeDelta, TimeZone, Utc};

use ayi_market::chat::{ConversationStore, default_conversations};
use ayi_market::common::{AuthState, ChatMessage, MessageSender, Token, User};
use ayi_market::navigation::{NavigationGuard, Route, RouteGroup};
use ayi_market::session::{ManualClock, MockCredentialService, SessionManager};
use ayi_market::storage::{ConversationDatabase, KeyValueStore, SqliteKeyValueStore};

#[test]
fn login_restore_logout_restore() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
    ));
    let open = || {
        SessionManager::new(
            SqliteKeyValueStore::with_path(&path).unwrap(),
            MockCredentialService::new(),
            clock.clone(),
        )
    };

    let mut first = open();
    first.login(Token::new("t1"), User::new("u1", "Ann")).unwrap();
    drop(first);

    clock.advance(TimeDelta::minutes(5));
    let mut second = open();
    assert_eq!(second.restore_session().unwrap(), AuthState::Authenticated);
    assert_eq!(second.current_user().map(|u| u.name.as_str()), Some("Ann"));
    second.logout().unwrap();
    drop(second);

    let mut third = open();
    assert_eq!(third.restore_session().unwrap(), AuthState::Anonymous);
    assert!(third.current_user().is_none());
    assert!(third.token().is_none());
    assert_eq!(third.store().get("user").unwrap(), None);
    assert_eq!(third.store().get("token").unwrap(), None);
    assert_eq!(third.store().get("sessionTimestamp").unwrap(), None);
}

#[test]
fn expired_session_purges_persisted_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
    ));

    let mut manager = SessionManager::new(
        SqliteKeyValueStore::with_path(&path).unwrap(),
        MockCredentialService::new(),
        clock.clone(),
    );
    manager.login(Token::new("t1"), User::new("u1", "Ann")).unwrap();
    drop(manager);

    clock.advance(TimeDelta::hours(13));
    let mut manager = SessionManager::new(
        SqliteKeyValueStore::with_path(&path).unwrap(),
        MockCredentialService::new(),
        clock.clone(),
    );
    assert_eq!(manager.restore_session().unwrap(), AuthState::Anonymous);
    assert_eq!(manager.store().get("token").unwrap(), None);
}

#[tokio::test]
async fn guard_follows_the_session_manager() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let mut manager = SessionManager::new(
        SqliteKeyValueStore::in_memory().unwrap(),
        MockCredentialService::new(),
        clock,
    );
    let mut guard = NavigationGuard::new(manager.subscribe(), RouteGroup::Auth);
    assert_eq!(guard.check(), None);

    manager.login_with_wechat().unwrap();
    assert_eq!(guard.next_redirect().await, Some(Route::Home));

    manager.logout().unwrap();
    assert_eq!(guard.next_redirect().await, Some(Route::Login));

    drop(manager);
    assert_eq!(guard.next_redirect().await, None);
}

#[test]
fn persisted_inbox_shares_the_session_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();

    let _kv = SqliteKeyValueStore::with_path(&path).unwrap();
    let mut store = ConversationStore::with_archive(
        default_conversations(now),
        ConversationDatabase::with_path(&path).unwrap(),
    )
    .unwrap();
    let reply = ChatMessage {
        id: "m1".into(),
        text: "Saturday works".into(),
        timestamp: now,
        sender: MessageSender::User,
    };
    store.append_message("1", reply.clone()).unwrap();
    drop(store);

    let reopened = ConversationStore::with_archive(
        default_conversations(now),
        ConversationDatabase::with_path(&path).unwrap(),
    )
    .unwrap();
    assert_eq!(reopened.get_history("1").last(), Some(&reply));
    assert_eq!(reopened.get("1").unwrap().last_message_text(), "Saturday works");
}
