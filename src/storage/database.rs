use crate::error::Result;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

/// SQLite-backed key-value store for delivery credentials and the
/// persisted debug-log buffer.
///
/// Shared as `Arc<Store>` between the delivery pipeline and the log sink;
/// the connection is guarded by a mutex since rusqlite connections are not
/// `Sync`.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the store at the given path and run migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Opening store at {:?}", path.as_ref());
        let conn = Connection::open(path)?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests and the replay binary.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn migrate(conn: &Connection) -> Result<()> {
        conn.execute_batch(include_str!("../../migrations/001_init.sql"))?;
        Ok(())
    }

    /// Run a closure against the underlying connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }
}
