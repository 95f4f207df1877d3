use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the marketplace an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[serde(alias = "parent", alias = "carereceiver")]
    Employer,
    Caregiver,
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "employer" | "parent" | "carereceiver" => Ok(Self::Employer),
            "caregiver" => Ok(Self::Caregiver),
            other => Err(format!("unknown user type `{other}`")),
        }
    }
}

/// Authenticated account as persisted under the user key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: None,
            email: None,
            profile_image: None,
            user_type: None,
        }
    }
}

/// Opaque credential handed out by the credential service.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keeps credentials out of log lines and panics.
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Result of a successful credential check.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: Token,
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    User,
    Other,
}

impl MessageSender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for MessageSender {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown sender `{other}`")),
        }
    }
}

/// One entry of a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub sender: MessageSender,
}

/// A counterpart plus its message history.
///
/// Fields are private: `last_message_*` mirror the tail of `history` and
/// `read` only moves from false to true, so every mutation goes through the
/// conversation store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    id: String,
    counterpart_name: String,
    avatar_url: String,
    last_message_text: String,
    last_message_timestamp: DateTime<Utc>,
    read: bool,
    online: bool,
    history: Vec<ChatMessage>,
}

impl Conversation {
    /// Builds a conversation whose history is exactly `history`.
    ///
    /// Returns `None` for an empty history since the summary fields would
    /// have nothing to mirror.
    pub fn from_history(
        id: impl Into<String>,
        counterpart_name: impl Into<String>,
        avatar_url: impl Into<String>,
        read: bool,
        online: bool,
        history: Vec<ChatMessage>,
    ) -> Option<Self> {
        let last = history.last()?;
        Some(Self {
            id: id.into(),
            counterpart_name: counterpart_name.into(),
            avatar_url: avatar_url.into(),
            last_message_text: last.text.clone(),
            last_message_timestamp: last.timestamp,
            read,
            online,
            history,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn counterpart_name(&self) -> &str {
        &self.counterpart_name
    }

    pub fn avatar_url(&self) -> &str {
        &self.avatar_url
    }

    pub fn last_message_text(&self) -> &str {
        &self.last_message_text
    }

    pub fn last_message_timestamp(&self) -> DateTime<Utc> {
        self.last_message_timestamp
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.last_message_text = message.text.clone();
        self.last_message_timestamp = message.timestamp;
        self.history.push(message);
    }

    pub(crate) fn mark_read(&mut self) {
        self.read = true;
    }

    pub(crate) fn replace_history(&mut self, history: Vec<ChatMessage>) {
        if let Some(last) = history.last() {
            self.last_message_text = last.text.clone();
            self.last_message_timestamp = last.timestamp;
            self.history = history;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_record_uses_camel_case_keys() {
        let mut user = User::new("u1", "Ann");
        user.profile_image = Some("https://example.com/a.jpg".into());
        user.user_type = Some(UserType::Caregiver);

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"profileImage\""));
        assert!(json.contains("\"userType\":\"caregiver\""));
        assert!(!json.contains("phone"));
    }

    #[test]
    fn legacy_parent_user_type_reads_as_employer() {
        let user: User =
            serde_json::from_str(r#"{"id":"1","name":"Sarah","userType":"parent"}"#).unwrap();
        assert_eq!(user.user_type, Some(UserType::Employer));
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = Token::new("secret");
        assert_eq!(format!("{token:?}"), "Token(***)");
    }

    #[test]
    fn conversation_needs_history() {
        assert!(Conversation::from_history("1", "Emma", "", false, true, Vec::new()).is_none());
    }
}
