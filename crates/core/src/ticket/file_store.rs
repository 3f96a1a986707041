//! Flat-file ticket store: one JSON array on disk.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::store::decode_tickets;
use super::{StoreError, Ticket, TicketStore};

/// Ticket store backed by a single JSON file.
///
/// Each write goes to its own uniquely named temporary file in the same
/// directory, which is then renamed over the target. A reader sees either
/// the old or the new collection, even with concurrent writers.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for `path`, creating parent directories if needed.
    ///
    /// The file itself is created on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl TicketStore for JsonFileStore {
    fn read_all(&self) -> Result<Vec<Ticket>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        decode_tickets(&bytes)
    }

    fn write_all(&self, tickets: &[Ticket]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(tickets)?;

        let mut temp = NamedTempFile::new_in(self.dir())?;
        temp.write_all(&json)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
