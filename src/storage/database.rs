use rusqlite::{Connection, Result as SqlResult};
use std::path::Path;
use std::time::Duration;

/// Two stores may hold connections to the same file.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Shared SQLite connection wrapper used by the key-value store and the
/// conversation archive.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        let path = path.as_ref();
        if let Err(err) = super::ensure_parent_dir(path) {
            log::warn!("Unable to create directory for {}: {err}", path.display());
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        log::debug!("Opened database {}", path.display());
        Ok(Self { conn })
    }

    pub fn in_memory() -> SqlResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
