//! crates/pill_schedule_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use std::fmt;

use chrono::NaiveDate;

use crate::error::{ScheduleError, ScheduleResult};
use crate::schedule::parse_date;
use crate::time_format::parse_clock;

pub type UserId = i64;
pub type MedicationId = i64;

/// The coarse time-of-day grouping a medication is taken in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBucket {
    Morning,
    Afternoon,
    Night,
}

impl TimeBucket {
    /// All buckets in display order.
    pub const ALL: [TimeBucket; 3] = [
        TimeBucket::Morning,
        TimeBucket::Afternoon,
        TimeBucket::Night,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Night => "Night",
        }
    }

    /// Matches the exact stored literal. Anything else is not a bucket.
    pub fn from_literal(raw: &str) -> Option<Self> {
        match raw {
            "Morning" => Some(Self::Morning),
            "Afternoon" => Some(Self::Afternoon),
            "Night" => Some(Self::Night),
            _ => None,
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored medication with its dosing schedule.
///
/// Bucket, time and dates are kept exactly as the store returned them so
/// that corrupt rows surface as `ScheduleError`s instead of being guessed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationRecord {
    pub id: MedicationId,
    pub owner_id: UserId,
    pub name: String,
    pub dosage: String,
    pub time_bucket: String,
    pub exact_time: String,
    pub start_date: String,
    pub end_date: String,
}

impl MedicationRecord {
    pub fn bucket(&self) -> Option<TimeBucket> {
        TimeBucket::from_literal(&self.time_bucket)
    }

    /// True when `start_date <= reference_date <= end_date`.
    pub fn is_active_on(&self, reference_date: NaiveDate) -> ScheduleResult<bool> {
        let start = parse_date(&self.start_date)?;
        let end = parse_date(&self.end_date)?;
        Ok(start <= reference_date && reference_date <= end)
    }
}

/// The fields a user submits when recording a new medication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub time_bucket: String,
    pub exact_time: String,
    pub start_date: String,
    pub end_date: String,
}

impl NewMedication {
    /// Rejects values that would later fail schedule computation.
    /// An inverted date range is accepted; such a record is simply never active.
    pub fn validate(&self) -> ScheduleResult<()> {
        validate_bucket(&self.time_bucket)?;
        parse_clock(&self.exact_time)?;
        parse_date(&self.start_date)?;
        parse_date(&self.end_date)?;
        Ok(())
    }
}

/// An in-place edit. Date fields are deliberately absent: the active range
/// is fixed once a record is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationUpdate {
    pub name: String,
    pub dosage: String,
    pub time_bucket: String,
    pub exact_time: String,
}

impl MedicationUpdate {
    pub fn validate(&self) -> ScheduleResult<()> {
        validate_bucket(&self.time_bucket)?;
        parse_clock(&self.exact_time)?;
        Ok(())
    }
}

fn validate_bucket(raw: &str) -> ScheduleResult<TimeBucket> {
    TimeBucket::from_literal(raw).ok_or_else(|| ScheduleError::UnknownBucket(raw.to_string()))
}

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub is_admin: bool,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub hashed_password: String,
}

/// The authenticated identity a request runs on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            is_admin: user.is_admin,
        }
    }
}
