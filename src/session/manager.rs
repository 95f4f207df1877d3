use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::watch;

use super::clock::Clock;
use super::credentials::CredentialService;
use crate::common::{AuthState, LoginError, PersistenceError, RegistrationError, Token, User};
use crate::forms::{PhoneLoginForm, RegistrationForm};
use crate::storage::KeyValueStore;

pub const SESSION_DURATION: TimeDelta = TimeDelta::hours(12);

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "token";
pub const SESSION_TIMESTAMP_KEY: &str = "sessionTimestamp";

const SESSION_KEYS: [&str; 3] = [USER_KEY, TOKEN_KEY, SESSION_TIMESTAMP_KEY];

/// User and token only ever exist together.
#[derive(Debug, Clone)]
struct ActiveSession {
    user: User,
    token: Token,
    stamped_at: DateTime<Utc>,
}

/// Owns the "who is logged in" state and its persisted copy.
///
/// Every write to the store happens before the in-memory state changes, so a
/// failed write leaves the manager exactly as it was.
pub struct SessionManager<S, C> {
    store: S,
    credentials: C,
    clock: Arc<dyn Clock>,
    session_duration: TimeDelta,
    active: Option<ActiveSession>,
    state_tx: watch::Sender<AuthState>,
}

impl<S, C> SessionManager<S, C>
where
    S: KeyValueStore,
    C: CredentialService,
{
    pub fn new(store: S, credentials: C, clock: Arc<dyn Clock>) -> Self {
        let (state_tx, _) = watch::channel(AuthState::Anonymous);
        Self {
            store,
            credentials,
            clock,
            session_duration: SESSION_DURATION,
            active: None,
            state_tx,
        }
    }

    pub fn with_session_duration(mut self, duration: TimeDelta) -> Self {
        self.session_duration = duration;
        self
    }

    pub fn state(&self) -> AuthState {
        if self.active.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.active.is_some()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.active.as_ref().map(|session| &session.user)
    }

    pub fn token(&self) -> Option<&Token> {
        self.active.as_ref().map(|session| &session.token)
    }

    pub fn session_timestamp(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|session| session.stamped_at)
    }

    /// Receiver that observes every Anonymous/Authenticated transition.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Stores an already verified token/user pair and starts the session.
    pub fn login(&mut self, token: Token, user: User) -> Result<(), PersistenceError> {
        let now = self.clock.now();
        let user_json = serde_json::to_string(&user)?;

        if let Err(err) = self.store.multi_set(&[
            (USER_KEY, user_json),
            (TOKEN_KEY, token.as_str().to_string()),
            (SESSION_TIMESTAMP_KEY, now.timestamp_millis().to_string()),
        ]) {
            log::error!("Failed to persist session for user {}: {err}", user.id);
            return Err(err);
        }

        log::info!("User {} logged in", user.id);
        self.active = Some(ActiveSession {
            user,
            token,
            stamped_at: now,
        });
        self.publish();
        Ok(())
    }

    pub fn login_with_code(&mut self, form: &PhoneLoginForm) -> Result<(), LoginError> {
        if let Err(errors) = form.validate() {
            return Err(if errors.phone.is_some() {
                LoginError::InvalidPhone
            } else {
                LoginError::InvalidCode
            });
        }
        let creds = self.credentials.verify_code(&form.phone, &form.code)?;
        self.login(creds.token, creds.user)?;
        Ok(())
    }

    pub fn send_verification_code(&mut self, phone: &str) -> Result<(), LoginError> {
        self.credentials.send_verification_code(phone)
    }

    pub fn login_with_wechat(&mut self) -> Result<(), LoginError> {
        let creds = self.credentials.login_with_wechat()?;
        self.login(creds.token, creds.user)?;
        Ok(())
    }

    pub fn login_with_password(&mut self, email: &str, password: &str) -> Result<(), LoginError> {
        let creds = self.credentials.verify_password(email, password)?;
        self.login(creds.token, creds.user)?;
        Ok(())
    }

    /// Creates an account through the credential service, then logs it in.
    /// Rejections are returned as-is; nothing is retried.
    pub fn register(&mut self, form: &RegistrationForm) -> Result<(), RegistrationError> {
        form.validate().map_err(RegistrationError::Invalid)?;
        let creds = self.credentials.register(form)?;
        self.login(creds.token, creds.user)?;
        Ok(())
    }

    /// Clears the session from memory and storage. Logging out while
    /// anonymous still clears storage and succeeds.
    pub fn logout(&mut self) -> Result<(), PersistenceError> {
        if let Err(err) = self.store.remove(&SESSION_KEYS) {
            log::error!("Failed to clear persisted session: {err}");
            return Err(err);
        }

        if let Some(session) = self.active.take() {
            log::info!("User {} logged out", session.user.id);
        }
        self.publish();
        Ok(())
    }

    /// Reloads the persisted session at process start.
    ///
    /// A session younger than the session duration is restored and
    /// re-stamped; anything else (expired, partial, unreadable) is purged.
    pub fn restore_session(&mut self) -> Result<AuthState, PersistenceError> {
        let user = self.store.get(USER_KEY)?;
        let token = self.store.get(TOKEN_KEY)?;
        let stamp = self.store.get(SESSION_TIMESTAMP_KEY)?;

        let (user, token, stamp) = match (user, token, stamp) {
            (None, None, None) => {
                log::debug!("No persisted session");
                self.active = None;
                self.publish();
                return Ok(AuthState::Anonymous);
            }
            (Some(user), Some(token), Some(stamp)) => (user, token, stamp),
            _ => {
                log::warn!("Persisted session is incomplete; purging");
                return self.purge();
            }
        };

        let stamped_at = stamp
            .parse::<i64>()
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis);
        let stamped_at = match stamped_at {
            Some(stamped_at) => stamped_at,
            None => {
                log::warn!("Persisted session timestamp `{stamp}` is unreadable; purging");
                return self.purge();
            }
        };

        let now = self.clock.now();
        if now - stamped_at >= self.session_duration {
            log::info!("Persisted session from {stamped_at} has expired");
            return self.purge();
        }

        let user: User = match serde_json::from_str(&user) {
            Ok(user) => user,
            Err(err) => {
                log::warn!("Persisted user record is unreadable ({err}); purging");
                return self.purge();
            }
        };

        self.store
            .set(SESSION_TIMESTAMP_KEY, &now.timestamp_millis().to_string())?;

        log::info!("Restored session for user {}", user.id);
        self.active = Some(ActiveSession {
            user,
            token: Token::new(token),
            stamped_at: now,
        });
        self.publish();
        Ok(AuthState::Authenticated)
    }

    fn purge(&mut self) -> Result<AuthState, PersistenceError> {
        self.store.remove(&SESSION_KEYS)?;
        self.active = None;
        self.publish();
        Ok(AuthState::Anonymous)
    }

    fn publish(&self) {
        let state = self.state();
        self.state_tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                log::debug!("Auth state {:?} -> {:?}", current, state);
                *current = state;
                true
            }
        });
    }
}
