use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Result as SqlResult, params};
use std::path::Path;

use super::database::Database;
use crate::common::{ChatMessage, MessageSender, PersistenceError};

/// Archive of messages appended to conversations, plus which
/// conversations have been opened. Seed data is not stored here.
pub struct ConversationDatabase {
    db: Database,
}

impl ConversationDatabase {
    pub fn with_path<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let archive = Self {
            db: Database::open(path)?,
        };
        archive.init_schema()?;
        Ok(archive)
    }

    pub fn in_memory() -> Result<Self, PersistenceError> {
        let archive = Self {
            db: Database::in_memory()?,
        };
        archive.init_schema()?;
        Ok(archive)
    }

    fn init_schema(&self) -> SqlResult<()> {
        let conn = self.db.connection();

        // `seq` keeps insertion order independent of timestamps
        conn.execute(
            "CREATE TABLE IF NOT EXISTS chat_messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                conversation_id TEXT NOT NULL,
                id TEXT NOT NULL,
                text TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                sender TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversation_reads (
                conversation_id TEXT PRIMARY KEY,
                read_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_conversation
             ON chat_messages(conversation_id, seq)",
            [],
        )?;

        Ok(())
    }

    pub fn append_message(
        &self,
        conversation_id: &str,
        message: &ChatMessage,
    ) -> Result<(), PersistenceError> {
        self.db.connection().execute(
            "INSERT INTO chat_messages (conversation_id, id, text, timestamp, sender)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                conversation_id,
                message.id,
                message.text,
                message.timestamp,
                message.sender.as_str()
            ],
        )?;
        Ok(())
    }

    /// Archived messages of one conversation in insertion order.
    pub fn history(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, PersistenceError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(
            "SELECT id, text, timestamp, sender
             FROM chat_messages
             WHERE conversation_id = ?1
             ORDER BY seq ASC",
        )?;

        let rows = stmt
            .query_map(params![conversation_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, DateTime<Utc>>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<SqlResult<Vec<_>>>()?;

        let mut messages = Vec::with_capacity(rows.len());
        for (id, text, timestamp, sender) in rows {
            match sender.parse::<MessageSender>() {
                Ok(sender) => messages.push(ChatMessage {
                    id,
                    text,
                    timestamp,
                    sender,
                }),
                Err(err) => log::warn!("Skipping archived message {id}: {err}"),
            }
        }
        Ok(messages)
    }

    pub fn mark_read(&self, conversation_id: &str, at: DateTime<Utc>) -> Result<(), PersistenceError> {
        self.db.connection().execute(
            "INSERT OR IGNORE INTO conversation_reads (conversation_id, read_at) VALUES (?1, ?2)",
            params![conversation_id, at],
        )?;
        Ok(())
    }

    pub fn read_at(&self, conversation_id: &str) -> Result<Option<DateTime<Utc>>, PersistenceError> {
        let read_at = self
            .db
            .connection()
            .query_row(
                "SELECT read_at FROM conversation_reads WHERE conversation_id = ?1",
                params![conversation_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(read_at)
    }

    pub fn read_conversation_ids(&self) -> Result<Vec<String>, PersistenceError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare("SELECT conversation_id FROM conversation_reads")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<SqlResult<Vec<String>>>()?;
        Ok(ids)
    }

    pub fn message_count(&self) -> Result<usize, PersistenceError> {
        let count: i64 =
            self.db
                .connection()
                .query_row("SELECT COUNT(*) FROM chat_messages", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
