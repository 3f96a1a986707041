//! CSV export of the ticket collection.

use crate::ticket::Ticket;

/// Column headers, in output order.
pub const CSV_HEADERS: [&str; 9] = [
    "ID",
    "Subject",
    "Description",
    "Priority",
    "Status",
    "Agent",
    "CreatedAt",
    "UpdatedAt",
    "CommentCount",
];

/// Placeholder written for tickets without an agent.
pub const UNASSIGNED_AGENT: &str = "Unassigned";

/// Render `tickets` as CSV: a header line followed by one line per ticket.
///
/// Returns `None` for an empty collection so callers can answer "no content"
/// instead of sending a header-only file. Lines are separated by `\n` with no
/// trailing newline.
pub fn tickets_to_csv(tickets: &[Ticket]) -> Option<String> {
    if tickets.is_empty() {
        return None;
    }

    let mut lines = Vec::with_capacity(tickets.len() + 1);
    lines.push(CSV_HEADERS.join(","));

    for ticket in tickets {
        let created_at = ticket.created_at.to_rfc3339();
        let updated_at = ticket.updated_at.to_rfc3339();
        let comment_count = ticket.comments.len().to_string();

        let fields = [
            ticket.id.as_str(),
            ticket.subject.as_str(),
            ticket.description.as_str(),
            ticket.priority.as_str(),
            ticket.status.as_str(),
            ticket.agent.as_deref().unwrap_or(UNASSIGNED_AGENT),
            created_at.as_str(),
            updated_at.as_str(),
            comment_count.as_str(),
        ];

        let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
        lines.push(row.join(","));
    }

    Some(lines.join("\n"))
}

/// Quote a field if it contains a delimiter, quote or line break, doubling
/// embedded quotes.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
