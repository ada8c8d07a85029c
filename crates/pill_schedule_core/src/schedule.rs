//! crates/pill_schedule_core/src/schedule.rs
//!
//! Selects the records active on a reference date and groups them into the
//! three time-of-day buckets. Everything here is pure: the caller hands in a
//! snapshot of records and gets a fresh view back.

use chrono::NaiveDate;
use tracing::warn;

use crate::domain::{MedicationRecord, TimeBucket};
use crate::error::{ScheduleError, ScheduleResult};

/// Parses a canonical `YYYY-MM-DD` calendar date.
///
/// Only the zero-padded form is accepted, so comparing parsed dates agrees
/// with comparing the stored strings lexicographically.
pub fn parse_date(raw: &str) -> ScheduleResult<NaiveDate> {
    let invalid = || ScheduleError::InvalidDate(raw.to_string());

    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { *b == b'-' } else { b.is_ascii_digit() });
    if !well_formed {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())
}

/// Keeps the records whose inclusive date range covers `reference_date`,
/// preserving input order. Fails on the first malformed stored date.
pub fn active_on(
    records: Vec<MedicationRecord>,
    reference_date: NaiveDate,
) -> ScheduleResult<Vec<MedicationRecord>> {
    let mut active = Vec::with_capacity(records.len());
    for record in records {
        if record.is_active_on(reference_date)? {
            active.push(record);
        }
    }
    Ok(active)
}

/// What the classifier does with a record whose bucket is not one of the
/// three known literals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownBucketPolicy {
    /// Leave the record out of every bucket and log it.
    #[default]
    Drop,
    /// Fail with `ScheduleError::UnknownBucket`.
    Reject,
}

/// Active records grouped by time of day, each bucket in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleView {
    pub morning: Vec<MedicationRecord>,
    pub afternoon: Vec<MedicationRecord>,
    pub night: Vec<MedicationRecord>,
}

impl ScheduleView {
    pub fn bucket(&self, bucket: TimeBucket) -> &[MedicationRecord] {
        match bucket {
            TimeBucket::Morning => &self.morning,
            TimeBucket::Afternoon => &self.afternoon,
            TimeBucket::Night => &self.night,
        }
    }

    fn bucket_mut(&mut self, bucket: TimeBucket) -> &mut Vec<MedicationRecord> {
        match bucket {
            TimeBucket::Morning => &mut self.morning,
            TimeBucket::Afternoon => &mut self.afternoon,
            TimeBucket::Night => &mut self.night,
        }
    }

    /// Buckets in the fixed display order Morning, Afternoon, Night.
    pub fn buckets(&self) -> impl Iterator<Item = (TimeBucket, &[MedicationRecord])> + '_ {
        TimeBucket::ALL.into_iter().map(move |b| (b, self.bucket(b)))
    }

    pub fn len(&self) -> usize {
        self.morning.len() + self.afternoon.len() + self.night.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partitions records by their bucket literal. No secondary sort is applied.
pub fn classify(
    records: Vec<MedicationRecord>,
    policy: UnknownBucketPolicy,
) -> ScheduleResult<ScheduleView> {
    let mut view = ScheduleView::default();
    for record in records {
        match record.bucket() {
            Some(bucket) => view.bucket_mut(bucket).push(record),
            None => match policy {
                UnknownBucketPolicy::Drop => {
                    warn!(
                        record_id = record.id,
                        time_bucket = %record.time_bucket,
                        "Dropping medication with unknown time bucket"
                    );
                }
                UnknownBucketPolicy::Reject => {
                    return Err(ScheduleError::UnknownBucket(record.time_bucket));
                }
            },
        }
    }
    Ok(view)
}

/// Filters to `reference_date` and classifies in one step.
pub fn todays_schedule(
    records: Vec<MedicationRecord>,
    reference_date: NaiveDate,
    policy: UnknownBucketPolicy,
) -> ScheduleResult<ScheduleView> {
    classify(active_on(records, reference_date)?, policy)
}
