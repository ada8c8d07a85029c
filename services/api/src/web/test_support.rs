//! In-memory `DatabaseService` used by the handler tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pill_schedule_core::domain::{
    Caller, MedicationId, MedicationRecord, MedicationUpdate, NewMedication, User, UserCredentials,
    UserId,
};
use pill_schedule_core::ports::{DatabaseService, PortError, PortResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::adapters::PdfRenderer;
use crate::config::Config;
use crate::web::state::AppState;

#[derive(Default)]
struct Inner {
    next_user_id: i64,
    next_medication_id: i64,
    users: Vec<(User, String)>,
    medications: Vec<MedicationRecord>,
    sessions: HashMap<String, (UserId, DateTime<Utc>)>,
}

#[derive(Default)]
pub struct MemoryDb {
    inner: Mutex<Inner>,
}

impl MemoryDb {
    pub fn users(&self) -> Vec<User> {
        let inner = self.inner.lock().unwrap();
        inner.users.iter().map(|(u, _)| u.clone()).collect()
    }

    pub fn medications(&self) -> Vec<MedicationRecord> {
        self.inner.lock().unwrap().medications.clone()
    }

    /// Stores a record verbatim, bypassing validation.
    pub fn insert_raw(&self, owner_id: UserId, medication: NewMedication) -> MedicationRecord {
        let mut inner = self.inner.lock().unwrap();
        inner.next_medication_id += 1;
        let record = MedicationRecord {
            id: inner.next_medication_id,
            owner_id,
            name: medication.name,
            dosage: medication.dosage,
            time_bucket: medication.time_bucket,
            exact_time: medication.exact_time,
            start_date: medication.start_date,
            end_date: medication.end_date,
        };
        inner.medications.push(record.clone());
        record
    }

    pub fn add_user(&self, username: &str) -> Caller {
        let mut inner = self.inner.lock().unwrap();
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.to_string(),
            is_admin: inner.users.is_empty(),
        };
        let caller = Caller::from(&user);
        inner.users.push((user, String::new()));
        caller
    }
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn create_user(&self, username: &str, hashed_password: &str) -> PortResult<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|(u, _)| u.username == username) {
            return Err(PortError::Conflict(format!("Username {} already exists", username)));
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.to_string(),
            is_admin: inner.users.is_empty(),
        };
        inner.users.push((user.clone(), hashed_password.to_string()));
        Ok(user)
    }

    async fn get_credentials_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|(u, _)| u.username == username)
            .map(|(u, hash)| UserCredentials {
                user: u.clone(),
                hashed_password: hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", username)))
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        Ok(self.users())
    }

    async fn delete_user(&self, user_id: UserId) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.users.len();
        inner.users.retain(|(u, _)| u.id != user_id);
        if inner.users.len() == before {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        inner.medications.retain(|m| m.owner_id != user_id);
        inner.sessions.retain(|_, (owner, _)| *owner != user_id);
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<User> {
        let inner = self.inner.lock().unwrap();
        let (user_id, expires_at) = inner.sessions.get(session_id).ok_or(PortError::Unauthorized)?;
        if *expires_at <= Utc::now() {
            return Err(PortError::Unauthorized);
        }
        inner
            .users
            .iter()
            .find(|(u, _)| u.id == *user_id)
            .map(|(u, _)| u.clone())
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.inner.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }

    async fn create_medication(
        &self,
        owner_id: UserId,
        medication: &NewMedication,
    ) -> PortResult<MedicationRecord> {
        Ok(self.insert_raw(owner_id, medication.clone()))
    }

    async fn get_medication(&self, medication_id: MedicationId) -> PortResult<MedicationRecord> {
        let inner = self.inner.lock().unwrap();
        inner
            .medications
            .iter()
            .find(|m| m.id == medication_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Medication {} not found", medication_id)))
    }

    async fn list_medications_for_user(
        &self,
        owner_id: UserId,
    ) -> PortResult<Vec<MedicationRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .medications
            .iter()
            .filter(|m| m.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_all_medications(&self) -> PortResult<Vec<MedicationRecord>> {
        Ok(self.medications())
    }

    async fn update_medication(
        &self,
        medication_id: MedicationId,
        update: &MedicationUpdate,
    ) -> PortResult<MedicationRecord> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .medications
            .iter_mut()
            .find(|m| m.id == medication_id)
            .ok_or_else(|| PortError::NotFound(format!("Medication {} not found", medication_id)))?;
        record.name = update.name.clone();
        record.dosage = update.dosage.clone();
        record.time_bucket = update.time_bucket.clone();
        record.exact_time = update.exact_time.clone();
        Ok(record.clone())
    }

    async fn delete_medication(&self, medication_id: MedicationId) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.medications.len();
        inner.medications.retain(|m| m.id != medication_id);
        if inner.medications.len() == before {
            return Err(PortError::NotFound(format!("Medication {} not found", medication_id)));
        }
        Ok(())
    }
}

pub fn memory_state(db: Arc<MemoryDb>) -> Arc<AppState> {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/test".to_string()),
        _ => None,
    })
    .unwrap();
    Arc::new(AppState {
        db,
        config: Arc::new(config),
        renderer: Arc::new(PdfRenderer::new()),
    })
}

pub fn new_medication(
    name: &str,
    bucket: &str,
    time: &str,
    start: &str,
    end: &str,
) -> NewMedication {
    NewMedication {
        name: name.to_string(),
        dosage: "1 tablet".to_string(),
        time_bucket: bucket.to_string(),
        exact_time: time.to_string(),
        start_date: start.to_string(),
        end_date: end.to_string(),
    }
}
