use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::common::{ChatMessage, Conversation, MessageSender, PersistenceError};
use crate::storage::ConversationDatabase;

/// Conversations of the current session and their histories.
///
/// Operations on an id that is not in the store are no-ops: the only
/// callers work from ids they just listed.
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    archive: Option<ConversationDatabase>,
    sort_by_recency: bool,
}

impl ConversationStore {
    /// In-memory store; appended messages are gone at the next start.
    pub fn new(seed: Vec<Conversation>) -> Self {
        Self {
            conversations: seed,
            archive: None,
            sort_by_recency: false,
        }
    }

    /// Store that writes appended messages and read marks through to
    /// `archive`, replaying what it already holds on top of the seed.
    pub fn with_archive(
        seed: Vec<Conversation>,
        archive: ConversationDatabase,
    ) -> Result<Self, PersistenceError> {
        let mut conversations = seed;
        let read_ids = archive.read_conversation_ids()?;

        for conversation in &mut conversations {
            let archived = archive.history(conversation.id())?;
            if !archived.is_empty() {
                let mut history = conversation.history().to_vec();
                history.extend(archived);
                conversation.replace_history(history);
            }
            if read_ids.iter().any(|id| id == conversation.id()) {
                conversation.mark_read();
            }
        }

        log::info!(
            "Loaded {} conversations with {} archived messages",
            conversations.len(),
            archive.message_count()?
        );

        Ok(Self {
            conversations,
            archive: Some(archive),
            sort_by_recency: false,
        })
    }

    /// List by latest message first instead of seed order.
    pub fn sort_by_recency(mut self, enabled: bool) -> Self {
        self.sort_by_recency = enabled;
        self
    }

    pub fn is_persistent(&self) -> bool {
        self.archive.is_some()
    }

    pub fn list_conversations(&self) -> Vec<&Conversation> {
        let mut listed: Vec<&Conversation> = self.conversations.iter().collect();
        if self.sort_by_recency {
            // stable: ties keep seed order
            listed.sort_by(|a, b| b.last_message_timestamp().cmp(&a.last_message_timestamp()));
        }
        listed
    }

    pub fn list_unread(&self) -> Vec<&Conversation> {
        self.list_conversations()
            .into_iter()
            .filter(|conversation| !conversation.is_read())
            .collect()
    }

    pub fn unread_count(&self) -> usize {
        self.conversations.iter().filter(|c| !c.is_read()).count()
    }

    pub fn get(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id() == conversation_id)
    }

    /// Messages of one conversation in insertion order; empty if unknown.
    pub fn get_history(&self, conversation_id: &str) -> &[ChatMessage] {
        self.get(conversation_id)
            .map(Conversation::history)
            .unwrap_or_default()
    }

    /// Appends `message` and updates the conversation summary.
    ///
    /// With an archive the write happens first; if it fails nothing changes.
    pub fn append_message(
        &mut self,
        conversation_id: &str,
        message: ChatMessage,
    ) -> Result<(), PersistenceError> {
        let Some(index) = self.position(conversation_id) else {
            log::debug!("Ignoring message for unknown conversation {conversation_id}");
            return Ok(());
        };

        if let Some(archive) = &self.archive {
            archive.append_message(conversation_id, &message)?;
        }
        self.conversations[index].push(message);
        Ok(())
    }

    /// Sends `text` as the user. Blank input is ignored.
    pub fn compose(
        &mut self,
        conversation_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ChatMessage>, PersistenceError> {
        let text = text.trim();
        if text.is_empty() || self.position(conversation_id).is_none() {
            return Ok(None);
        }

        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            timestamp: now,
            sender: MessageSender::User,
        };
        self.append_message(conversation_id, message.clone())?;
        Ok(Some(message))
    }

    /// Marks a conversation as opened at `at`. Read never goes back to
    /// unread, and only the first read mark is recorded.
    pub fn mark_read(
        &mut self,
        conversation_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        let Some(index) = self.position(conversation_id) else {
            log::debug!("Ignoring read mark for unknown conversation {conversation_id}");
            return Ok(());
        };
        if self.conversations[index].is_read() {
            return Ok(());
        }

        if let Some(archive) = &self.archive {
            archive.mark_read(conversation_id, at)?;
        }
        self.conversations[index].mark_read();
        Ok(())
    }

    fn position(&self, conversation_id: &str) -> Option<usize> {
        self.conversations.iter().position(|c| c.id() == conversation_id)
    }
}
