//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pill_schedule_core::domain::{
    MedicationId, MedicationRecord, MedicationUpdate, NewMedication, User, UserCredentials, UserId,
};
use pill_schedule_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    is_admin: bool,
}
impl UserRow {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
            is_admin: self.is_admin,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRow {
    id: i64,
    username: String,
    is_admin: bool,
    password_hash: String,
}
impl CredentialsRow {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user: User {
                id: self.id,
                username: self.username,
                is_admin: self.is_admin,
            },
            hashed_password: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct MedicineRow {
    id: i64,
    user_id: i64,
    name: String,
    dosage: String,
    time_bucket: String,
    exact_time: String,
    start_date: String,
    end_date: String,
}
impl MedicineRow {
    fn to_domain(self) -> MedicationRecord {
        MedicationRecord {
            id: self.id,
            owner_id: self.user_id,
            name: self.name,
            dosage: self.dosage,
            time_bucket: self.time_bucket,
            exact_time: self.exact_time,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

const MEDICINE_COLUMNS: &str =
    "id, user_id, name, dosage, time_bucket, exact_time, start_date, end_date";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, username: &str, hashed_password: &str) -> PortResult<User> {
        // The first account ever registered becomes the administrator.
        let record = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (username, password_hash, is_admin) \
             VALUES ($1, $2, NOT EXISTS (SELECT 1 FROM users)) \
             RETURNING id, username, is_admin",
        )
        .bind(username)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::Conflict(format!("Username {} already exists", username))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRow>(
            "SELECT id, username, is_admin, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", username)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, is_admin FROM users ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_user(&self, user_id: UserId) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("DELETE FROM medicines WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?
            .rows_affected();

        if deleted == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        tx.commit().await.map_err(unexpected)
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.username, u.is_admin \
             FROM auth_sessions s JOIN users u ON u.id = s.user_id \
             WHERE s.id = $1 AND s.expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)?;
        Ok(record.to_domain())
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_medication(
        &self,
        owner_id: UserId,
        medication: &NewMedication,
    ) -> PortResult<MedicationRecord> {
        let sql = format!(
            "INSERT INTO medicines \
             (user_id, name, dosage, time_bucket, exact_time, start_date, end_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            MEDICINE_COLUMNS
        );
        let record = sqlx::query_as::<_, MedicineRow>(&sql)
            .bind(owner_id)
            .bind(&medication.name)
            .bind(&medication.dosage)
            .bind(&medication.time_bucket)
            .bind(&medication.exact_time)
            .bind(&medication.start_date)
            .bind(&medication.end_date)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_medication(&self, medication_id: MedicationId) -> PortResult<MedicationRecord> {
        let sql = format!("SELECT {} FROM medicines WHERE id = $1", MEDICINE_COLUMNS);
        let record = sqlx::query_as::<_, MedicineRow>(&sql)
            .bind(medication_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Medication {} not found", medication_id))
                }
                _ => unexpected(e),
            })?;
        Ok(record.to_domain())
    }

    async fn list_medications_for_user(
        &self,
        owner_id: UserId,
    ) -> PortResult<Vec<MedicationRecord>> {
        let sql = format!(
            "SELECT {} FROM medicines WHERE user_id = $1 ORDER BY id ASC",
            MEDICINE_COLUMNS
        );
        let records = sqlx::query_as::<_, MedicineRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_all_medications(&self) -> PortResult<Vec<MedicationRecord>> {
        let sql = format!("SELECT {} FROM medicines ORDER BY id ASC", MEDICINE_COLUMNS);
        let records = sqlx::query_as::<_, MedicineRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn update_medication(
        &self,
        medication_id: MedicationId,
        update: &MedicationUpdate,
    ) -> PortResult<MedicationRecord> {
        let sql = format!(
            "UPDATE medicines SET name = $1, dosage = $2, time_bucket = $3, exact_time = $4 \
             WHERE id = $5 RETURNING {}",
            MEDICINE_COLUMNS
        );
        let record = sqlx::query_as::<_, MedicineRow>(&sql)
            .bind(&update.name)
            .bind(&update.dosage)
            .bind(&update.time_bucket)
            .bind(&update.exact_time)
            .bind(medication_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("Medication {} not found", medication_id)))?;
        Ok(record.to_domain())
    }

    async fn delete_medication(&self, medication_id: MedicationId) -> PortResult<()> {
        let deleted = sqlx::query("DELETE FROM medicines WHERE id = $1")
            .bind(medication_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?
            .rows_affected();
        if deleted == 0 {
            return Err(PortError::NotFound(format!("Medication {} not found", medication_id)));
        }
        Ok(())
    }
}
