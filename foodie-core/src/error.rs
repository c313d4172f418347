//! Error types for the meet-up engine.
//!
//! Every failure is returned as a value up to the controller, which is the
//! only place that turns them into user-facing text.

use thiserror::Error;

/// Malformed date or time-of-day text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid time '{0}'. Expected hh:mm AM/PM")]
    Time(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    Date(String),
}

/// A draft that cannot be saved as-is. Checked in declaration order.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Restaurant cannot be empty.")]
    MissingRestaurant,

    #[error("Time cannot be empty.")]
    MissingTime,

    #[error("Date cannot be empty.")]
    MissingDate,

    #[error("The selected date and time cannot be in the past.")]
    PastDateTime,
}

/// Failure reported by the remote document collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Failure talking to the store, or data in the store that cannot be decoded.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error("Could not encode meet-up: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Could not decode meet-up '{id}': {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure reported by the notification delivery mechanism.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifierError {
    #[error("Notification rejected: {0}")]
    Rejected(String),

    #[error("Notification backend unavailable: {0}")]
    Unavailable(String),
}

/// A reminder could not be scheduled. Never undoes a completed save.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("Reminder time {0} is not in the future")]
    NotInFuture(chrono::NaiveDateTime),

    #[error(transparent)]
    Notifier(#[from] NotifierError),
}

/// Terminal failure of `MeetUpController::save`.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;
