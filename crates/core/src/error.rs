//! Error types for the gymbot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; validation and
//! empty-collection errors double as the user-facing message text.

use crate::schedule::Weekday;
use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for session handling.
#[derive(Debug, Error)]
pub enum Error {
    // Validation and empty-collection outcomes are replies, not failures
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Rejected user input. The conversation stays in the same state and the
/// message is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("\"{0}\" is not a day of the week. Pick one from Monday to Sunday.")]
    UnknownDay(String),

    #[error("There is no {0} in your schedule. Pick a day from the list.")]
    DayNotInSchedule(Weekday),

    #[error("{0} has no exercises yet. Pick another day.")]
    EmptyDay(Weekday),

    #[error("Input must be a number, got \"{0}\".")]
    NotANumber(String),

    #[error("Invalid number {choice}. Enter a number from 1 to {max}.")]
    OutOfRange { choice: i64, max: usize },

    #[error("Weight must be a number, got \"{0}\".")]
    InvalidWeight(String),

    #[error("Weight must be greater than zero.")]
    NonPositiveWeight,

    #[error("Exercise name cannot be empty.")]
    EmptyName,
}

/// There is nothing to operate on. The conversation returns to idle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmptyCollectionError {
    #[error("Your schedule is empty. Nothing to edit yet.")]
    NoDays,

    #[error("{0} has no exercises.")]
    NoExercises(Weekday),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O failure at {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    #[error("Unreadable schedule at {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("Failed to serialize schedule: {0}")]
    Serialize(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Message delivery failed to {channel}: {reason}")]
    DeliveryFailed { channel: String, reason: String },

    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_displays_path() {
        let err = Error::Store(StoreError::Io {
            path: PathBuf::from("/data/42.json"),
            reason: "permission denied".into(),
        });
        assert!(err.to_string().contains("/data/42.json"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn store_error_converts_with_question_mark() {
        fn failing() -> Result<()> {
            Err(StoreError::Serialize("bad".into()))?
        }
        assert!(matches!(failing(), Err(Error::Store(StoreError::Serialize(_)))));
    }

    #[test]
    fn validation_messages_are_user_facing() {
        let err = ValidationError::OutOfRange { choice: 0, max: 3 };
        assert_eq!(err.to_string(), "Invalid number 0. Enter a number from 1 to 3.");

        let err = ValidationError::NotANumber("abc".into());
        assert!(err.to_string().contains("must be a number"));
    }

    #[test]
    fn empty_collection_names_the_day() {
        let err = EmptyCollectionError::NoExercises(Weekday::Friday);
        assert_eq!(err.to_string(), "Friday has no exercises.");
    }
}
