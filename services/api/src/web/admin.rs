//! services/api/src/web/admin.rs
//!
//! Administrator dashboard: user search, totals, and removal of users and
//! medications. Routes here sit behind `require_auth` and `require_admin`.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use pill_schedule_core::admin::AdminOverview;
use pill_schedule_core::domain::Caller;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::IntoParams;

use crate::web::rest::{port_error, AdminOverviewResponse, HandlerError};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminQuery {
    /// Case-insensitive substring of the username.
    pub search: Option<String>,
}

/// GET /admin - Users (optionally filtered), all medicines, and totals
#[utoipa::path(
    get,
    path = "/admin",
    params(AdminQuery),
    responses(
        (status = 200, description = "Admin dashboard data", body = AdminOverviewResponse),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn admin_overview_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminQuery>,
) -> Result<Json<AdminOverviewResponse>, HandlerError> {
    let users = state
        .db
        .list_users()
        .await
        .map_err(|e| port_error("Failed to load users", e))?;
    let medicines = state
        .db
        .list_all_medications()
        .await
        .map_err(|e| port_error("Failed to load medications", e))?;

    let overview = AdminOverview::build(users, medicines, query.search.as_deref());

    Ok(Json(AdminOverviewResponse {
        total_users: overview.total_users,
        total_medicines: overview.total_medicines,
        users: overview.users.into_iter().map(Into::into).collect(),
        medicines: overview.medicines.into_iter().map(Into::into).collect(),
    }))
}

/// DELETE /admin/users/{id} - Remove a user and all of their medications
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Administrators cannot delete their own account"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, HandlerError> {
    if user_id == caller.user_id {
        return Err((
            StatusCode::BAD_REQUEST,
            "You cannot delete your own admin account".to_string(),
        ));
    }

    state
        .db
        .delete_user(user_id)
        .await
        .map_err(|e| port_error("Failed to delete user", e))?;
    info!("Admin {} deleted user {}", caller.user_id, user_id);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /admin/medications/{id} - Remove any user's medication
#[utoipa::path(
    delete,
    path = "/admin/medications/{id}",
    params(("id" = i64, Path, description = "Medication id")),
    responses(
        (status = 204, description = "Medication deleted"),
        (status = 404, description = "No such medication")
    )
)]
pub async fn delete_medication_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(medication_id): Path<i64>,
) -> Result<StatusCode, HandlerError> {
    state
        .db
        .delete_medication(medication_id)
        .await
        .map_err(|e| port_error("Failed to delete medication", e))?;
    info!("Admin {} deleted medication {}", caller.user_id, medication_id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{memory_state, new_medication, MemoryDb};

    fn search(term: Option<&str>) -> Query<AdminQuery> {
        Query(AdminQuery {
            search: term.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_overview_filters_users_but_not_medicines() {
        let db = Arc::new(MemoryDb::default());
        let admin = db.add_user("admin");
        let alice = db.add_user("alice01");
        db.add_user("bob");
        db.insert_raw(
            admin.user_id,
            new_medication("A", "Morning", "08:00", "2024-01-01", "2024-01-31"),
        );
        db.insert_raw(
            alice.user_id,
            new_medication("B", "Night", "21:00", "2024-01-01", "2024-01-31"),
        );
        let state = memory_state(db);

        let Json(all) = admin_overview_handler(State(state.clone()), search(None)).await.unwrap();
        assert_eq!(all.total_users, 3);
        assert_eq!(all.total_medicines, 2);

        let Json(found) = admin_overview_handler(State(state), search(Some("ALICE")))
            .await
            .unwrap();
        assert_eq!(found.total_users, 1);
        assert_eq!(found.users[0].username, "alice01");
        assert_eq!(found.total_medicines, 2);
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let db = Arc::new(MemoryDb::default());
        let admin = db.add_user("admin");
        let err = delete_user_handler(
            State(memory_state(db.clone())),
            Extension(admin),
            Path(admin.user_id),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(db.users().len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_user_removes_their_medicines() {
        let db = Arc::new(MemoryDb::default());
        let admin = db.add_user("admin");
        let alice = db.add_user("alice");
        db.insert_raw(
            alice.user_id,
            new_medication("B", "Night", "21:00", "2024-01-01", "2024-01-31"),
        );
        db.insert_raw(
            admin.user_id,
            new_medication("A", "Morning", "08:00", "2024-01-01", "2024-01-31"),
        );

        let status = delete_user_handler(
            State(memory_state(db.clone())),
            Extension(admin),
            Path(alice.user_id),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(db.users().len(), 1);
        assert_eq!(db.medications().len(), 1);
        assert_eq!(db.medications()[0].owner_id, admin.user_id);
    }

    #[tokio::test]
    async fn test_admin_deletes_any_medication() {
        let db = Arc::new(MemoryDb::default());
        let admin = db.add_user("admin");
        let alice = db.add_user("alice");
        let record = db.insert_raw(
            alice.user_id,
            new_medication("B", "Night", "21:00", "2024-01-01", "2024-01-31"),
        );
        let state = memory_state(db.clone());

        delete_medication_handler(State(state.clone()), Extension(admin), Path(record.id))
            .await
            .unwrap();
        assert!(db.medications().is_empty());

        let err = delete_medication_handler(State(state), Extension(admin), Path(record.id))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }
}
