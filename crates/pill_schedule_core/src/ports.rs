//! crates/pill_schedule_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the relational store and of the document format.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    MedicationId, MedicationRecord, MedicationUpdate, NewMedication, User, UserCredentials, UserId,
};
use crate::report::ScheduleDocument;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, renderer).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The record store. Listings come back in insertion (id ascending) order.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    /// Creates a user. The very first user ever created is made an admin.
    async fn create_user(&self, username: &str, hashed_password: &str) -> PortResult<User>;

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<UserCredentials>;

    async fn list_users(&self) -> PortResult<Vec<User>>;

    /// Removes the user together with all of their medications.
    async fn delete_user(&self, user_id: UserId) -> PortResult<()>;

    // --- Auth Methods ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a live session to its user, failing with `Unauthorized` once expired.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<User>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Medication Management ---
    async fn create_medication(
        &self,
        owner_id: UserId,
        medication: &NewMedication,
    ) -> PortResult<MedicationRecord>;

    async fn get_medication(&self, medication_id: MedicationId) -> PortResult<MedicationRecord>;

    async fn list_medications_for_user(&self, owner_id: UserId)
        -> PortResult<Vec<MedicationRecord>>;

    async fn list_all_medications(&self) -> PortResult<Vec<MedicationRecord>>;

    async fn update_medication(
        &self,
        medication_id: MedicationId,
        update: &MedicationUpdate,
    ) -> PortResult<MedicationRecord>;

    async fn delete_medication(&self, medication_id: MedicationId) -> PortResult<()>;
}

/// Serializes a schedule document into a downloadable format.
pub trait DocumentRenderer: Send + Sync {
    /// The MIME type of the rendered bytes.
    fn content_type(&self) -> &'static str;

    fn render(&self, document: &ScheduleDocument) -> PortResult<Vec<u8>>;
}
