//! SQLite key-value ticket store implementation.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::store::decode_tickets;
use super::{StoreError, Ticket, TicketStore};

/// SQLite-backed key-value store.
///
/// The whole collection is kept as one JSON value under a fixed key in a
/// `kv` table, mirroring a remote key-value service with a single slot.
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
    key: String,
}

impl SqliteKvStore {
    /// Create a new SQLite store, creating the database file and table if needed.
    pub fn new(path: &Path, key: impl Into<String>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            key: key.into(),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory(key: impl Into<String>) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            key: key.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl TicketStore for SqliteKvStore {
    fn read_all(&self) -> Result<Vec<Ticket>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(json) => decode_tickets(json.as_bytes()),
            None => Ok(Vec::new()),
        }
    }

    fn write_all(&self, tickets: &[Ticket]) -> Result<(), StoreError> {
        let json = serde_json::to_string(tickets)?;
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![self.key, json],
        )?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::{Priority, Status};
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_store() -> SqliteKvStore {
        SqliteKvStore::in_memory("allTickets").unwrap()
    }

    fn ticket(id: &str) -> Ticket {
        let now = Utc::now();
        Ticket {
            id: id.to_string(),
            subject: "Subject".to_string(),
            description: "Description".to_string(),
            priority: Priority::Low,
            status: Status::InProgress,
            agent: Some("agent".to_string()),
            created_at: now,
            updated_at: now,
            comments: vec![],
        }
    }

    #[test]
    fn test_missing_key_reads_empty() {
        let store = create_test_store();
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let store = create_test_store();
        store.write_all(&[ticket("a"), ticket("b")]).unwrap();

        let tickets = store.read_all().unwrap();
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[1].id, "b");
        assert_eq!(tickets[0].status, Status::InProgress);
    }

    #[test]
    fn test_write_overwrites_previous_value() {
        let store = create_test_store();
        store.write_all(&[ticket("a"), ticket("b")]).unwrap();
        store.write_all(&[]).unwrap();

        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_keys_are_isolated() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("test.db");

        let first = SqliteKvStore::new(&db_path, "first").unwrap();
        let second = SqliteKvStore::new(&db_path, "second").unwrap();

        first.write_all(&[ticket("a")]).unwrap();

        assert_eq!(first.read_all().unwrap().len(), 1);
        assert!(second.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_file_based_store() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("test.db");

        {
            let store = SqliteKvStore::new(&db_path, "allTickets").unwrap();
            store.write_all(&[ticket("persisted")]).unwrap();
        }

        let store = SqliteKvStore::new(&db_path, "allTickets").unwrap();
        let tickets = store.read_all().unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, "persisted");
    }

    #[test]
    fn test_corrupt_value_is_an_error() {
        let store = create_test_store();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?, ?)",
                params!["allTickets", "not json"],
            )
            .unwrap();
        }

        assert!(matches!(
            store.read_all(),
            Err(StoreError::Serialization(_))
        ));
    }
}
