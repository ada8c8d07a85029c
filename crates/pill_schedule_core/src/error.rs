//! crates/pill_schedule_core/src/error.rs
//!
//! Data-integrity errors raised by the schedule logic. Each variant carries
//! the raw value that failed to parse so callers can report it.

/// Errors produced while filtering, classifying or rendering a schedule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid time '{0}', expected a 24-hour HH:MM value")]
    InvalidTime(String),
    #[error("Unknown time bucket '{0}'")]
    UnknownBucket(String),
}

/// A convenience type alias for `Result<T, ScheduleError>`.
pub type ScheduleResult<T> = Result<T, ScheduleError>;
