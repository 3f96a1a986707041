//! Export of the ticket collection to flat formats.

mod csv;

pub use csv::{escape_field, tickets_to_csv, CSV_HEADERS, UNASSIGNED_AGENT};
