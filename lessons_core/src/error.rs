//! Error types for the lessons_core library.

use crate::types::LessonKind;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lessons_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Store snapshot error
    #[error("State error: {0}")]
    State(String),

    /// Referenced row does not exist
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// The class cannot enter the scheduled state
    #[error("class cannot be scheduled: {0}")]
    CannotBeScheduled(String),

    /// The class is not scheduled, so there is nothing to unschedule
    #[error("class is not scheduled, nothing to unschedule")]
    CannotBeUnscheduled,

    /// The timeline entry has no free slots left
    #[error("timeline entry has no free slots left")]
    CapacityExceeded,

    /// The lesson host does not match the entry's teacher
    #[error("lesson host does not match the entry teacher")]
    TeacherMismatch,

    /// The class's lesson type differs from the entry binding
    #[error("lesson type does not match the timeline entry binding")]
    LessonTypeMismatch,

    /// The entry would overlap another entry in the teacher's timeline
    #[error("entry overlaps an existing entry in the teacher's timeline")]
    Overlap,

    /// The entry does not fit the teacher's working hours
    #[error("entry does not fit the teacher's working hours")]
    OutsideWorkingHours,

    /// The lesson kind has no generic purchasable instance
    #[error("{0:?} lessons cannot be bought directly")]
    NotPurchasableDirectly(LessonKind),

    /// The assigned host does not accept this lesson kind
    #[error("invalid host assignment: {0}")]
    InvalidHostAssignment(String),

    /// The class is inactive and cannot be scheduled
    #[error("class is inactive and cannot be scheduled")]
    InactiveClass,
}
