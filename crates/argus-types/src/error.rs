use std::fmt;

use crate::event::{EventId, EventStatus};

/// Rejected event construction.
///
/// Raised at logging time so a corrupt record never reaches analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An error message was supplied for a non-failure status
    ErrorWithoutFailure { status: EventStatus },

    /// Failure status without an error message
    FailureWithoutError,

    /// parent_id does not name an event this logger has assigned
    UnknownParent(EventId),

    /// A `started` event cannot carry a span duration
    DurationOnOpenSpan,

    /// NaN or infinity in a payload; JSON cannot represent it
    NonFiniteNumber { field: &'static str },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ErrorWithoutFailure { status } => {
                write!(f, "error message set on an event with status '{}'", status)
            }
            ValidationError::FailureWithoutError => {
                write!(f, "failure status requires an error message")
            }
            ValidationError::UnknownParent(id) => {
                write!(f, "parent event {} has not been logged", id)
            }
            ValidationError::DurationOnOpenSpan => {
                write!(f, "duration set on a started event")
            }
            ValidationError::NonFiniteNumber { field } => {
                write!(f, "non-finite number in {}", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
