//! In-memory ticket store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{StoreError, Ticket, TicketStore};

/// Ticket store that keeps the collection in process memory.
///
/// Failures can be injected to exercise degraded-store paths.
#[derive(Default)]
pub struct MemoryTicketStore {
    tickets: Mutex<Vec<Ticket>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `tickets`.
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        Self {
            tickets: Mutex::new(tickets),
            ..Self::default()
        }
    }

    /// Make subsequent reads fail until reset.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `write_all` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored collection, bypassing failure injection.
    pub fn snapshot(&self) -> Vec<Ticket> {
        self.tickets
            .lock()
            .map(|tickets| tickets.clone())
            .unwrap_or_default()
    }
}

impl TicketStore for MemoryTicketStore {
    fn read_all(&self) -> Result<Vec<Ticket>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Database("simulated read failure".to_string()));
        }
        let tickets = self.tickets.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(tickets.clone())
    }

    fn write_all(&self, tickets: &[Ticket]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database("simulated write failure".to_string()));
        }
        let mut stored = self.tickets.lock().map_err(|_| StoreError::Poisoned)?;
        *stored = tickets.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
