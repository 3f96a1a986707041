//! Helpdesk tickets: data model, storage backends and the CRUD service.

mod file_store;
mod memory_store;
mod service;
mod sqlite_store;
mod store;
mod types;

pub use file_store::JsonFileStore;
pub use memory_store::MemoryTicketStore;
pub use service::{TicketError, TicketService, WritePolicy};
pub use sqlite_store::SqliteKvStore;
pub use store::{StoreError, TicketStore};
pub use types::{
    Comment, NewComment, NewTicket, Priority, Status, Ticket, TicketUpdate,
    DEFAULT_COMMENT_AUTHOR,
};

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};

/// Factory function to create the ticket store from config
pub fn create_ticket_store(config: &StorageConfig) -> Result<Arc<dyn TicketStore>, StoreError> {
    let store: Arc<dyn TicketStore> = match config.backend {
        StorageBackend::File => Arc::new(JsonFileStore::new(config.resolved_path())?),
        StorageBackend::Sqlite => Arc::new(SqliteKvStore::new(
            &config.resolved_path(),
            config.key.clone(),
        )?),
        StorageBackend::Memory => Arc::new(MemoryTicketStore::new()),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_file_store() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::File,
            path: Some(dir.path().join("tickets.json")),
            ..StorageConfig::default()
        };
        let store = create_ticket_store(&config).unwrap();
        assert_eq!(store.backend_name(), "file");
    }

    #[test]
    fn test_create_sqlite_store() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::Sqlite,
            path: Some(dir.path().join("helpdesk.db")),
            ..StorageConfig::default()
        };
        let store = create_ticket_store(&config).unwrap();
        assert_eq!(store.backend_name(), "sqlite");
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_create_memory_store() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..StorageConfig::default()
        };
        let store = create_ticket_store(&config).unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_sqlite_store_in_missing_directory_fails() {
        let config = StorageConfig {
            backend: StorageBackend::Sqlite,
            path: Some("/nonexistent/dir/helpdesk.db".into()),
            ..StorageConfig::default()
        };
        assert!(matches!(
            create_ticket_store(&config),
            Err(StoreError::Database(_))
        ));
    }
}
