//! services/api/src/web/routes.rs
//!
//! Assembles the API router and its authentication layers.

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::web::{
    admin, auth, medications,
    middleware::{require_admin, require_auth},
    schedule,
    state::AppState,
};

/// Builds every API route. `require_auth` wraps both the protected and the
/// admin routes, so `require_admin` always finds a `Caller` to check.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Admin routes (auth + admin flag required)
    let admin_routes = Router::new()
        .route("/admin", get(admin::admin_overview_handler))
        .route("/admin/users/{id}", delete(admin::delete_user_handler))
        .route(
            "/admin/medications/{id}",
            delete(admin::delete_medication_handler),
        )
        .layer(axum_middleware::from_fn(require_admin));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/schedule", get(schedule::schedule_handler))
        .route("/schedule/pdf", get(schedule::schedule_pdf_handler))
        .route(
            "/medications",
            get(medications::list_medications_handler)
                .post(medications::create_medication_handler),
        )
        .route(
            "/medications/{id}",
            put(medications::update_medication_handler)
                .delete(medications::delete_medication_handler),
        )
        .merge(admin_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{memory_state, MemoryDb};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use pill_schedule_core::ports::DatabaseService;
    use tower::ServiceExt;

    fn get_with_session(uri: &str, session_id: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(id) = session_id {
            builder = builder.header(header::COOKIE, format!("session={id}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn status_of(db: Arc<MemoryDb>, request: Request<Body>) -> StatusCode {
        api_router(memory_state(db))
            .oneshot(request)
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_missing_cookie_is_unauthorized() {
        let db = Arc::new(MemoryDb::default());
        assert_eq!(
            status_of(db.clone(), get_with_session("/schedule", None)).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(db, get_with_session("/admin", None)).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_expired_session_is_unauthorized() {
        let db = Arc::new(MemoryDb::default());
        let alice = db.add_user("alice");
        db.create_auth_session("stale", alice.user_id, Utc::now() - Duration::minutes(1))
            .await
            .unwrap();

        assert_eq!(
            status_of(db, get_with_session("/medications", Some("stale"))).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_admin_routes_forbid_regular_users() {
        let db = Arc::new(MemoryDb::default());
        let admin = db.add_user("admin");
        let alice = db.add_user("alice");
        let expires = Utc::now() + Duration::days(1);
        db.create_auth_session("admin-session", admin.user_id, expires)
            .await
            .unwrap();
        db.create_auth_session("alice-session", alice.user_id, expires)
            .await
            .unwrap();

        assert_eq!(
            status_of(db.clone(), get_with_session("/admin", Some("alice-session"))).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(db.clone(), get_with_session("/medications", Some("alice-session"))).await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(db, get_with_session("/admin", Some("admin-session"))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_admin_delete_requires_admin() {
        let db = Arc::new(MemoryDb::default());
        let admin = db.add_user("admin");
        let alice = db.add_user("alice");
        db.create_auth_session("alice-session", alice.user_id, Utc::now() + Duration::days(1))
            .await
            .unwrap();

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/admin/users/{}", admin.user_id))
            .header(header::COOKIE, "session=alice-session")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(db.clone(), request).await, StatusCode::FORBIDDEN);
        assert_eq!(db.users().len(), 2);
    }
}
