pub mod admin;
pub mod domain;
pub mod error;
pub mod ports;
pub mod report;
pub mod schedule;
pub mod time_format;

pub use admin::{search, AdminOverview};
pub use domain::{
    Caller, MedicationId, MedicationRecord, MedicationUpdate, NewMedication, TimeBucket, User,
    UserCredentials, UserId,
};
pub use error::{ScheduleError, ScheduleResult};
pub use ports::{DatabaseService, DocumentRenderer, PortError, PortResult};
pub use report::{build, Block, ScheduleDocument, NO_MEDICINES, REPORT_TITLE};
pub use schedule::{active_on, classify, todays_schedule, ScheduleView, UnknownBucketPolicy};
pub use time_format::to_12_hour;
