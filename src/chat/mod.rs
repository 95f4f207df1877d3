pub mod seed;
pub mod store;

pub use seed::default_conversations;
pub use store::ConversationStore;
