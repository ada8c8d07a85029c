//! services/api/src/web/rest.rs
//!
//! Contains the shared request/response payloads, the error mapping used by
//! every handler, and the master definition for the OpenAPI specification.

use axum::http::StatusCode;
use pill_schedule_core::domain::{MedicationRecord, MedicationUpdate, NewMedication, User};
use pill_schedule_core::ports::PortError;
use pill_schedule_core::report::Block;
use pill_schedule_core::time_format::to_12_hour;
use pill_schedule_core::ScheduleError;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

use crate::web::{admin, auth, medications, schedule};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        schedule::schedule_handler,
        schedule::schedule_pdf_handler,
        medications::list_medications_handler,
        medications::create_medication_handler,
        medications::update_medication_handler,
        medications::delete_medication_handler,
        admin::admin_overview_handler,
        admin::delete_user_handler,
        admin::delete_medication_handler,
    ),
    components(
        schemas(
            auth::CredentialsRequest,
            auth::AuthResponse,
            MedicationRequest,
            UpdateMedicationRequest,
            MedicationResponse,
            UserResponse,
            BlockKind,
            BlockResponse,
            ScheduleResponse,
            AdminOverviewResponse,
        )
    ),
    tags(
        (
            name = "Pill Schedule API",
            description = "Medication schedules, printable reports and administration."
        )
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The payload for recording a new medication.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MedicationRequest {
    pub name: String,
    pub dosage: String,
    /// One of `Morning`, `Afternoon`, `Night`.
    pub time_bucket: String,
    /// 24-hour `HH:MM`.
    pub exact_time: String,
    /// `YYYY-MM-DD`, inclusive.
    pub start_date: String,
    /// `YYYY-MM-DD`, inclusive.
    pub end_date: String,
}

impl From<MedicationRequest> for NewMedication {
    fn from(req: MedicationRequest) -> Self {
        Self {
            name: req.name,
            dosage: req.dosage,
            time_bucket: req.time_bucket,
            exact_time: req.exact_time,
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

/// The payload for editing a medication. The active date range cannot change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMedicationRequest {
    pub name: String,
    pub dosage: String,
    pub time_bucket: String,
    pub exact_time: String,
}

impl From<UpdateMedicationRequest> for MedicationUpdate {
    fn from(req: UpdateMedicationRequest) -> Self {
        Self {
            name: req.name,
            dosage: req.dosage,
            time_bucket: req.time_bucket,
            exact_time: req.exact_time,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MedicationResponse {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub dosage: String,
    pub time_bucket: String,
    pub exact_time: String,
    /// `exact_time` in 12-hour form, absent when the stored value is malformed.
    pub display_time: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

impl From<MedicationRecord> for MedicationResponse {
    fn from(record: MedicationRecord) -> Self {
        Self {
            display_time: to_12_hour(&record.exact_time).ok(),
            id: record.id,
            owner_id: record.owner_id,
            name: record.name,
            dosage: record.dosage,
            time_bucket: record.time_bucket,
            exact_time: record.exact_time,
            start_date: record.start_date,
            end_date: record.end_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Title,
    SectionHeading,
    Line,
    Placeholder,
}

/// One block of the schedule document, as shown on screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct BlockResponse {
    pub kind: BlockKind,
    pub text: String,
}

impl From<Block> for BlockResponse {
    fn from(block: Block) -> Self {
        let (kind, text) = match block {
            Block::Title(text) => (BlockKind::Title, text),
            Block::SectionHeading(text) => (BlockKind::SectionHeading, text),
            Block::Line(text) => (BlockKind::Line, text),
            Block::Placeholder(text) => (BlockKind::Placeholder, text),
        };
        Self { kind, text }
    }
}

/// The caller's schedule for one day: grouped records plus the document blocks.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub date: String,
    pub morning: Vec<MedicationResponse>,
    pub afternoon: Vec<MedicationResponse>,
    pub night: Vec<MedicationResponse>,
    pub document: Vec<BlockResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOverviewResponse {
    pub users: Vec<UserResponse>,
    pub medicines: Vec<MedicationResponse>,
    pub total_users: usize,
    pub total_medicines: usize,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

pub type HandlerError = (StatusCode, String);

/// Maps a port failure to a status code, logging it with `context`.
pub fn port_error(context: &str, e: PortError) -> HandlerError {
    match e {
        PortError::NotFound(msg) => {
            warn!("{}: {}", context, msg);
            (StatusCode::NOT_FOUND, msg)
        }
        PortError::Conflict(msg) => {
            warn!("{}: {}", context, msg);
            (StatusCode::CONFLICT, msg)
        }
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(msg) => {
            error!("{}: {}", context, msg);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }
}

/// Invalid values submitted by the client.
pub fn invalid_input(e: ScheduleError) -> HandlerError {
    (StatusCode::BAD_REQUEST, e.to_string())
}

/// Invalid values found in stored records.
pub fn corrupt_data(context: &str, e: ScheduleError) -> HandlerError {
    error!("{}: stored data failed validation: {}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{}: {}", context, e))
}
