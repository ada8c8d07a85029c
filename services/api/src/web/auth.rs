//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, and logout.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use pill_schedule_core::domain::User;
use pill_schedule_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::middleware::session_cookie;
use crate::web::rest::{port_error, HandlerError};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl From<User> for AuthResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            is_admin: user.is_admin,
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Opens an auth session for `user_id` and returns the `Set-Cookie` value.
async fn open_session(state: &AppState, user_id: i64) -> Result<String, HandlerError> {
    let ttl = Duration::days(state.config.session_ttl_days);
    let auth_session_id = Uuid::new_v4().to_string();

    state
        .db
        .create_auth_session(&auth_session_id, user_id, Utc::now() + ttl)
        .await
        .map_err(|e| port_error("Failed to create session", e))?;

    Ok(format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        auth_session_id,
        ttl.num_seconds()
    ))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new user account
///
/// The first account ever registered is made an administrator.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Empty username or password"),
        (status = 409, description = "Username already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Username and password are required".to_string(),
        ));
    }

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password".to_string())
        })?
        .to_string();

    // 2. Create user in database
    let user = state
        .db
        .create_user(username, &password_hash)
        .await
        .map_err(|e| port_error("Failed to create user", e))?;
    if user.is_admin {
        info!("User {} registered as administrator", user.id);
    }

    // 3. Log the new user straight in
    let cookie = open_session(&state, user.id).await?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse::from(user)),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let invalid = || (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string());

    // 1. Get user by username
    let creds = state
        .db
        .get_credentials_by_username(req.username.trim())
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => invalid(),
            other => port_error("Failed to get user", other),
        })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid {
        return Err(invalid());
    }

    // 3. Create auth session and cookie
    let cookie = open_session(&state, creds.user.id).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse::from(creds.user)),
    ))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HandlerError> {
    // 1. Extract session cookie
    let auth_session_id = session_cookie(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    // 2. Delete auth session from database
    state
        .db
        .delete_auth_session(auth_session_id)
        .await
        .map_err(|e| port_error("Failed to logout", e))?;

    // 3. Clear cookie
    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{memory_state, MemoryDb};
    use axum::http::HeaderValue;
    use axum::response::Response;

    fn credentials(username: &str, password: &str) -> Json<CredentialsRequest> {
        Json(CredentialsRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn cookie_of(response: &Response) -> String {
        let value = response.headers()[header::SET_COOKIE].to_str().unwrap();
        value.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_first_user_becomes_admin() {
        let db = Arc::new(MemoryDb::default());
        let state = memory_state(db.clone());

        register_handler(State(state.clone()), credentials("root", "pw1"))
            .await
            .unwrap();
        register_handler(State(state.clone()), credentials("alice", "pw2"))
            .await
            .unwrap();

        let users = db.users();
        assert!(users[0].is_admin);
        assert!(!users[1].is_admin);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let state = memory_state(Arc::new(MemoryDb::default()));
        register_handler(State(state.clone()), credentials("alice", "pw"))
            .await
            .unwrap();
        let err = register_handler(State(state), credentials("alice", "other"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_blank_credentials_rejected() {
        let state = memory_state(Arc::new(MemoryDb::default()));
        let err = register_handler(State(state), credentials("  ", "pw"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_checks_password_and_sets_cookie() {
        let db = Arc::new(MemoryDb::default());
        let state = memory_state(db.clone());
        register_handler(State(state.clone()), credentials("alice", "secret"))
            .await
            .unwrap();

        let err = login_handler(State(state.clone()), credentials("alice", "wrong"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);

        let err = login_handler(State(state.clone()), credentials("nobody", "secret"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);

        let response = login_handler(State(state.clone()), credentials("alice", "secret"))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = cookie_of(&response);
        let session_id = cookie.strip_prefix("session=").unwrap();
        let user = state.db.validate_auth_session(session_id).await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let state = memory_state(Arc::new(MemoryDb::default()));
        let response = register_handler(State(state.clone()), credentials("alice", "secret"))
            .await
            .unwrap()
            .into_response();
        let cookie = cookie_of(&response);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());
        logout_handler(State(state.clone()), headers).await.unwrap();

        let session_id = cookie.strip_prefix("session=").unwrap();
        assert!(state.db.validate_auth_session(session_id).await.is_err());
    }
}
