//! Ticket API handlers.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use helpdesk_core::{
    Comment, NewComment, NewTicket, Priority, Status, Ticket, TicketError, TicketUpdate,
};

use super::extract::JsonBody;
use crate::state::AppState;

/// File name offered to browsers for the CSV export.
const EXPORT_FILE_NAME: &str = "tickets_export.csv";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket
///
/// Nothing is required; missing fields fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTicketBody {
    pub subject: Option<String>,
    pub description: Option<String>,
    /// `Low`, `Medium` or `High`; anything else means `Medium`
    pub priority: Option<String>,
    /// Assignee; empty means unassigned
    pub agent: Option<String>,
}

impl CreateTicketBody {
    fn into_request(self) -> NewTicket {
        let priority = self.priority.as_deref().and_then(|raw| {
            let parsed = Priority::parse(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                tracing::warn!(priority = raw, "Unknown priority, using Medium");
            }
            parsed
        });

        NewTicket {
            subject: self.subject.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            priority,
            agent: self.agent,
        }
    }
}

/// Request body for updating a ticket
///
/// Only these fields are mutable. Other keys (`id`, `createdAt`, ...) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTicketBody {
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Absent leaves the agent alone, `null` unassigns
    #[serde(default, deserialize_with = "present")]
    pub agent: Option<Option<String>>,
}

impl UpdateTicketBody {
    fn into_update(self) -> TicketUpdate {
        let status = self.status.as_deref().and_then(|raw| {
            let parsed = Status::parse(raw);
            if parsed.is_none() {
                tracing::warn!(status = raw, "Ignoring unknown status in update");
            }
            parsed
        });

        let priority = self.priority.as_deref().and_then(|raw| {
            let parsed = Priority::parse(raw);
            if parsed.is_none() {
                tracing::warn!(priority = raw, "Ignoring unknown priority in update");
            }
            parsed
        });

        TicketUpdate {
            status,
            agent: self.agent,
            priority,
        }
    }
}

/// Marks a field as present even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Request body for adding a comment
#[derive(Debug, Default, Deserialize)]
pub struct AddCommentBody {
    pub text: Option<String>,
    /// Defaults to "User"
    pub author: Option<String>,
}

impl AddCommentBody {
    fn into_request(self) -> NewComment {
        NewComment {
            text: self.text.unwrap_or_default(),
            author: self.author,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(error: TicketError) -> ApiError {
    match error {
        TicketError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                message: "Ticket not found".to_string(),
            }),
        ),
        TicketError::StoreUnavailable(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                message: format!("Ticket store unavailable: {}", e),
            }),
        ),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List all tickets
pub async fn list_tickets(State(state): State<Arc<AppState>>) -> Json<Vec<Ticket>> {
    Json(state.tickets().list())
}

/// Get a ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    state
        .tickets()
        .get(&id)
        .map(Json)
        .map_err(error_response)
}

/// Create a new ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<CreateTicketBody>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    state
        .tickets()
        .create(body.into_request())
        .map(|ticket| (StatusCode::CREATED, Json(ticket)))
        .map_err(error_response)
}

/// Update status, agent or priority of a ticket
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateTicketBody>,
) -> Result<Json<Ticket>, ApiError> {
    state
        .tickets()
        .update(&id, body.into_update())
        .map(Json)
        .map_err(error_response)
}

/// Add a comment to a ticket
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<AddCommentBody>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    state
        .tickets()
        .add_comment(&id, body.into_request())
        .map(|comment| (StatusCode::CREATED, Json(comment)))
        .map_err(error_response)
}

/// Delete a ticket
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .tickets()
        .delete(&id)
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(error_response)
}

/// Export all tickets as a CSV attachment, 204 when there are none
pub async fn export_csv(State(state): State<Arc<AppState>>) -> Response {
    match state.tickets().export_csv() {
        Some(csv) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
                ),
            ],
            csv,
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
