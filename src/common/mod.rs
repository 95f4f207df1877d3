pub mod error;
pub mod events;
pub mod types;

pub use error::{LoginError, PersistenceError, RegistrationError, SessionError};
pub use events::AuthState;
pub use types::{ChatMessage, Conversation, Credentials, MessageSender, Token, User, UserType};
