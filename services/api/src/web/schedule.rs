//! services/api/src/web/schedule.rs
//!
//! The caller's schedule for a day, as JSON for the screen and as a PDF
//! download. Both are produced from the same `ScheduleDocument`.

use axum::{
    extract::{Extension, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Local, NaiveDate};
use pill_schedule_core::domain::{Caller, MedicationRecord};
use pill_schedule_core::report::{build, ScheduleDocument};
use pill_schedule_core::schedule::{parse_date, todays_schedule, ScheduleView};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::IntoParams;

use crate::web::rest::{
    corrupt_data, invalid_input, port_error, HandlerError, MedicationResponse, ScheduleResponse,
};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScheduleQuery {
    /// Reference date as `YYYY-MM-DD`. Defaults to today.
    pub date: Option<String>,
}

impl ScheduleQuery {
    fn reference_date(&self) -> Result<NaiveDate, HandlerError> {
        match &self.date {
            Some(raw) => parse_date(raw).map_err(invalid_input),
            None => Ok(Local::now().date_naive()),
        }
    }
}

/// Loads the caller's records and computes the view and document for `date`.
async fn load_schedule(
    state: &AppState,
    caller: Caller,
    date: NaiveDate,
) -> Result<(ScheduleView, ScheduleDocument), HandlerError> {
    let records = state
        .db
        .list_medications_for_user(caller.user_id)
        .await
        .map_err(|e| port_error("Failed to load medications", e))?;

    let view = todays_schedule(records, date, state.config.unknown_bucket_policy)
        .map_err(|e| corrupt_data("Failed to compute schedule", e))?;
    let document = build(&view).map_err(|e| corrupt_data("Failed to build schedule", e))?;

    debug!(
        "Schedule for user {} on {}: {} active medications",
        caller.user_id,
        date,
        view.len()
    );
    Ok((view, document))
}

fn to_responses(records: Vec<MedicationRecord>) -> Vec<MedicationResponse> {
    records.into_iter().map(MedicationResponse::from).collect()
}

/// GET /schedule - The caller's active medications grouped by time of day
#[utoipa::path(
    get,
    path = "/schedule",
    params(ScheduleQuery),
    responses(
        (status = 200, description = "Schedule for the reference date", body = ScheduleResponse),
        (status = 400, description = "Malformed date parameter"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Stored medication data is corrupt")
    )
)]
pub async fn schedule_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleResponse>, HandlerError> {
    let date = query.reference_date()?;
    let (view, document) = load_schedule(&state, caller, date).await?;

    Ok(Json(ScheduleResponse {
        date: date.format("%Y-%m-%d").to_string(),
        morning: to_responses(view.morning),
        afternoon: to_responses(view.afternoon),
        night: to_responses(view.night),
        document: document.into_blocks().into_iter().map(Into::into).collect(),
    }))
}

/// GET /schedule/pdf - Printable version of the same schedule
#[utoipa::path(
    get,
    path = "/schedule/pdf",
    params(ScheduleQuery),
    responses(
        (status = 200, description = "PDF document (application/pdf attachment)"),
        (status = 400, description = "Malformed date parameter"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Stored data is corrupt or rendering failed")
    )
)]
pub async fn schedule_pdf_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ScheduleQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let date = query.reference_date()?;
    let (_, document) = load_schedule(&state, caller, date).await?;

    let renderer = state.renderer.clone();
    let content_type = renderer.content_type();
    let bytes = tokio::task::spawn_blocking(move || renderer.render(&document))
        .await
        .map_err(|e| {
            error!("Schedule rendering task failed: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render schedule".to_string())
        })?
        .map_err(|e| port_error("Failed to render schedule", e))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"pill_schedule.pdf\"".to_string(),
            ),
        ],
        bytes,
    ))
}
