pub mod config;
pub mod export;
pub mod metrics;
pub mod ticket;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, LogFormat, LoggingConfig, ServerConfig, StorageBackend, StorageConfig,
};
pub use export::tickets_to_csv;
pub use ticket::{
    create_ticket_store, Comment, JsonFileStore, MemoryTicketStore, NewComment, NewTicket,
    Priority, SqliteKvStore, Status, StoreError, Ticket, TicketError, TicketService,
    TicketStore, TicketUpdate, WritePolicy,
};
