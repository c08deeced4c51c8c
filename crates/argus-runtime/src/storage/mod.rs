mod jsonl;

pub use jsonl::JsonlEventStore;

use argus_types::Event;
use std::fmt;
use std::path::PathBuf;

use crate::Result;

/// Persistence for a flat event sequence.
///
/// `load(save(events))` must return the same events field for field,
/// absent optional fields included.
pub trait EventStore {
    /// Replace the stored trace with `events`.
    fn save(&self, events: &[Event]) -> Result<()>;

    fn load(&self) -> std::result::Result<Vec<Event>, LoadError>;

    /// Remove the stored trace. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

/// Stored trace could not be turned back into events.
#[derive(Debug)]
pub enum LoadError {
    /// Nothing stored at this location
    NotFound(PathBuf),

    Io(std::io::Error),

    /// Malformed record (1-based line number)
    Parse { line: usize, message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotFound(path) => write!(f, "trace file not found: {}", path.display()),
            LoadError::Io(err) => write!(f, "failed to read trace: {}", err),
            LoadError::Parse { line, message } => {
                write!(f, "malformed event on line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(err) => Some(err),
            LoadError::NotFound(_) | LoadError::Parse { .. } => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err)
    }
}
