//! Ticket storage trait and error type.
//!
//! The whole collection is the unit of persistence: backends read it in full
//! and replace it in full. There is no indexing and no partial write.

use thiserror::Error;
use tracing::warn;

use super::Ticket;

/// Error type for storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database failure.
    #[error("Database error: {0}")]
    Database(String),

    /// A thread panicked while holding the backend lock.
    #[error("Store lock poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Trait for ticket storage backends.
pub trait TicketStore: Send + Sync {
    /// Read the persisted collection.
    ///
    /// Returns an empty vector when nothing has been persisted yet.
    fn read_all(&self) -> Result<Vec<Ticket>, StoreError>;

    /// Replace the persisted collection with `tickets`.
    fn write_all(&self, tickets: &[Ticket]) -> Result<(), StoreError>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}

/// Decode a stored JSON array of tickets.
///
/// A value that is not an array is an error. Individual records that still
/// fail to decode are skipped with a warning so one bad record cannot hide
/// the rest of the collection.
pub(crate) fn decode_tickets(json: &[u8]) -> Result<Vec<Ticket>, StoreError> {
    let records: Vec<serde_json::Value> = serde_json::from_slice(json)?;

    let tickets = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                warn!(index, error = %e, "Skipping unreadable ticket record");
                None
            }
        })
        .collect();

    Ok(tickets)
}
