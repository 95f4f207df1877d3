pub mod conversation_db;
pub mod database;
pub mod kv_store;

pub use conversation_db::ConversationDatabase;
pub use kv_store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};

use std::fs;
use std::path::Path;

/// Ensure the parent directory of a database file exists
pub fn ensure_parent_dir<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
