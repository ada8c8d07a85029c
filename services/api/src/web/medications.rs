//! services/api/src/web/medications.rs
//!
//! CRUD for the caller's own medication records. Records owned by someone
//! else are reported as not found.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pill_schedule_core::domain::{Caller, MedicationRecord, MedicationUpdate, NewMedication};
use std::sync::Arc;
use tracing::info;

use crate::web::rest::{
    invalid_input, port_error, HandlerError, MedicationRequest, MedicationResponse,
    UpdateMedicationRequest,
};
use crate::web::state::AppState;

/// Fetches a record only if `caller` owns it.
async fn owned_medication(
    state: &AppState,
    caller: Caller,
    medication_id: i64,
) -> Result<MedicationRecord, HandlerError> {
    let record = state
        .db
        .get_medication(medication_id)
        .await
        .map_err(|e| port_error("Failed to load medication", e))?;
    if record.owner_id != caller.user_id {
        return Err((
            StatusCode::NOT_FOUND,
            format!("Medication {} not found", medication_id),
        ));
    }
    Ok(record)
}

/// GET /medications - All of the caller's medications
#[utoipa::path(
    get,
    path = "/medications",
    responses(
        (
            status = 200,
            description = "The caller's medications in insertion order",
            body = Vec<MedicationResponse>
        ),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_medications_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<MedicationResponse>>, HandlerError> {
    let records = state
        .db
        .list_medications_for_user(caller.user_id)
        .await
        .map_err(|e| port_error("Failed to load medications", e))?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// POST /medications - Record a new medication
#[utoipa::path(
    post,
    path = "/medications",
    request_body = MedicationRequest,
    responses(
        (status = 201, description = "Medication recorded", body = MedicationResponse),
        (status = 400, description = "Unknown bucket, malformed time or date"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn create_medication_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<MedicationRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let medication = NewMedication::from(req);
    medication.validate().map_err(invalid_input)?;

    let record = state
        .db
        .create_medication(caller.user_id, &medication)
        .await
        .map_err(|e| port_error("Failed to create medication", e))?;
    info!("User {} recorded medication {}", caller.user_id, record.id);

    Ok((StatusCode::CREATED, Json(MedicationResponse::from(record))))
}

/// PUT /medications/{id} - Edit name, dosage, bucket and time
#[utoipa::path(
    put,
    path = "/medications/{id}",
    request_body = UpdateMedicationRequest,
    params(("id" = i64, Path, description = "Medication id")),
    responses(
        (status = 200, description = "Medication updated", body = MedicationResponse),
        (status = 400, description = "Unknown bucket or malformed time"),
        (status = 404, description = "No such medication for this user")
    )
)]
pub async fn update_medication_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(medication_id): Path<i64>,
    Json(req): Json<UpdateMedicationRequest>,
) -> Result<Json<MedicationResponse>, HandlerError> {
    let update = MedicationUpdate::from(req);
    update.validate().map_err(invalid_input)?;
    owned_medication(&state, caller, medication_id).await?;

    let record = state
        .db
        .update_medication(medication_id, &update)
        .await
        .map_err(|e| port_error("Failed to update medication", e))?;
    Ok(Json(record.into()))
}

/// DELETE /medications/{id} - Remove one of the caller's medications
#[utoipa::path(
    delete,
    path = "/medications/{id}",
    params(("id" = i64, Path, description = "Medication id")),
    responses(
        (status = 204, description = "Medication deleted"),
        (status = 404, description = "No such medication for this user")
    )
)]
pub async fn delete_medication_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(medication_id): Path<i64>,
) -> Result<StatusCode, HandlerError> {
    owned_medication(&state, caller, medication_id).await?;
    state
        .db
        .delete_medication(medication_id)
        .await
        .map_err(|e| port_error("Failed to delete medication", e))?;
    info!("User {} deleted medication {}", caller.user_id, medication_id);
    Ok(StatusCode::NO_CONTENT)
}
