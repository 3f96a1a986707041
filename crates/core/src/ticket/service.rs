//! Ticket CRUD and comment logic over a [`TicketStore`].
//!
//! Every operation reads the full collection, mutates it in memory and writes
//! it back. Cycles are serialized by a lock so concurrent requests in one
//! process cannot lose each other's updates. Separate processes sharing the
//! same store still race, last write wins.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::types::normalize_agent;
use super::{
    Comment, NewComment, NewTicket, Status, StoreError, Ticket, TicketStore, TicketUpdate,
    DEFAULT_COMMENT_AUTHOR,
};
use crate::export::tickets_to_csv;
use crate::metrics::{STORE_FAILURES, TICKET_OPERATIONS};

/// Error type for ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    NotFound(String),

    /// The store failed and the write policy does not allow hiding it.
    #[error("Ticket store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// What to do when the store fails during a mutation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Log the failure and return the in-memory result anyway.
    #[default]
    BestEffort,
    /// Surface the failure to the caller and refuse to mutate on a failed read.
    Strict,
}

/// Ticket operations over a pluggable store.
pub struct TicketService {
    store: Arc<dyn TicketStore>,
    write_policy: WritePolicy,
    cycle: Mutex<()>,
}

impl TicketService {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self {
            store,
            write_policy: WritePolicy::default(),
            cycle: Mutex::new(()),
        }
    }

    pub fn with_write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// All tickets in stored order.
    pub fn list(&self) -> Vec<Ticket> {
        let _guard = self.begin_cycle();
        let tickets = self.load();
        record("list", "ok");
        tickets
    }

    /// Ticket with the given id.
    pub fn get(&self, id: &str) -> Result<Ticket, TicketError> {
        let _guard = self.begin_cycle();
        let result = self
            .load()
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| TicketError::NotFound(id.to_string()));
        record_result("get", &result);
        result
    }

    /// Create a ticket with status `New` and no comments.
    pub fn create(&self, request: NewTicket) -> Result<Ticket, TicketError> {
        let _guard = self.begin_cycle();
        let result = self.create_locked(request);
        record_result("create", &result);
        result
    }

    fn create_locked(&self, request: NewTicket) -> Result<Ticket, TicketError> {
        let mut tickets = self.load_for_write()?;

        let now = Utc::now();
        let ticket = Ticket {
            id: new_id(),
            subject: request.subject,
            description: request.description,
            priority: request.priority.unwrap_or_default(),
            status: Status::New,
            agent: normalize_agent(request.agent),
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
        };

        tickets.push(ticket.clone());
        self.persist(&tickets, "create")?;

        info!(ticket_id = %ticket.id, priority = %ticket.priority, "Ticket created");
        Ok(ticket)
    }

    /// Apply a partial update to the mutable fields of a ticket.
    pub fn update(&self, id: &str, update: TicketUpdate) -> Result<Ticket, TicketError> {
        let _guard = self.begin_cycle();
        let result = self.update_locked(id, update);
        record_result("update", &result);
        result
    }

    fn update_locked(&self, id: &str, update: TicketUpdate) -> Result<Ticket, TicketError> {
        let mut tickets = self.load_for_write()?;

        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        update.apply_to(ticket);
        ticket.touch(Utc::now());
        let updated = ticket.clone();

        self.persist(&tickets, "update")?;

        debug!(ticket_id = %id, status = %updated.status, "Ticket updated");
        Ok(updated)
    }

    /// Append a comment to a ticket and return it.
    pub fn add_comment(&self, id: &str, request: NewComment) -> Result<Comment, TicketError> {
        let _guard = self.begin_cycle();
        let result = self.add_comment_locked(id, request);
        record_result("add_comment", &result);
        result
    }

    fn add_comment_locked(&self, id: &str, request: NewComment) -> Result<Comment, TicketError> {
        let mut tickets = self.load_for_write()?;

        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        let now = Utc::now();
        let comment = Comment {
            id: new_id(),
            text: request.text,
            author: request
                .author
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COMMENT_AUTHOR.to_string()),
            created_at: now,
        };

        ticket.comments.push(comment.clone());
        ticket.touch(now);

        self.persist(&tickets, "add_comment")?;

        debug!(ticket_id = %id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    /// Remove a ticket. The store is only written when something was removed.
    pub fn delete(&self, id: &str) -> Result<(), TicketError> {
        let _guard = self.begin_cycle();
        let result = self.delete_locked(id);
        record_result("delete", &result);
        result
    }

    fn delete_locked(&self, id: &str) -> Result<(), TicketError> {
        let mut tickets = self.load_for_write()?;
        let initial_len = tickets.len();

        tickets.retain(|t| t.id != id);
        if tickets.len() == initial_len {
            return Err(TicketError::NotFound(id.to_string()));
        }

        self.persist(&tickets, "delete")?;

        info!(ticket_id = %id, "Ticket deleted");
        Ok(())
    }

    /// CSV rendering of the whole collection, `None` when there are no tickets.
    pub fn export_csv(&self) -> Option<String> {
        let _guard = self.begin_cycle();
        let tickets = self.load();
        record("export", "ok");
        tickets_to_csv(&tickets)
    }

    /// Number of tickets in each status, for gauges.
    ///
    /// Not counted as a ticket operation and does not take the cycle lock.
    pub fn count_by_status(&self) -> Vec<(Status, usize)> {
        let tickets = self.load();
        Status::ALL
            .iter()
            .map(|&status| (status, tickets.iter().filter(|t| t.status == status).count()))
            .collect()
    }

    fn begin_cycle(&self) -> MutexGuard<'_, ()> {
        // The guard protects no data, so a poisoned lock is still usable.
        self.cycle.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read for display. Failures degrade to an empty collection.
    fn load(&self) -> Vec<Ticket> {
        match self.store.read_all() {
            Ok(tickets) => tickets,
            Err(e) => {
                STORE_FAILURES.with_label_values(&["read"]).inc();
                error!(
                    backend = self.store.backend_name(),
                    error = %e,
                    "Failed to read tickets, continuing with an empty collection"
                );
                Vec::new()
            }
        }
    }

    /// Read before a mutation. Under `Strict` a failed read aborts instead of
    /// letting the write replace the stored collection.
    fn load_for_write(&self) -> Result<Vec<Ticket>, TicketError> {
        match self.write_policy {
            WritePolicy::BestEffort => Ok(self.load()),
            WritePolicy::Strict => self.store.read_all().map_err(|e| {
                STORE_FAILURES.with_label_values(&["read"]).inc();
                error!(
                    backend = self.store.backend_name(),
                    error = %e,
                    "Failed to read tickets before write"
                );
                TicketError::StoreUnavailable(e)
            }),
        }
    }

    fn persist(&self, tickets: &[Ticket], operation: &str) -> Result<(), TicketError> {
        match self.store.write_all(tickets) {
            Ok(()) => Ok(()),
            Err(e) => {
                STORE_FAILURES.with_label_values(&["write"]).inc();
                error!(
                    backend = self.store.backend_name(),
                    operation,
                    error = %e,
                    "Failed to write tickets"
                );
                match self.write_policy {
                    WritePolicy::BestEffort => Ok(()),
                    WritePolicy::Strict => Err(TicketError::StoreUnavailable(e)),
                }
            }
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn record(operation: &str, result: &str) {
    TICKET_OPERATIONS
        .with_label_values(&[operation, result])
        .inc();
}

fn record_result<T>(operation: &str, result: &Result<T, TicketError>) {
    let label = match result {
        Ok(_) => "ok",
        Err(TicketError::NotFound(_)) => "not_found",
        Err(TicketError::StoreUnavailable(_)) => "store_error",
    };
    record(operation, label);
}
