//! crates/pill_schedule_core/src/admin.rs
//!
//! Username search and the admin dashboard summary.

use crate::domain::{MedicationRecord, User};

/// Keeps users whose username contains `query`, ignoring case.
///
/// `None` returns the input unchanged; an empty query matches everyone.
/// The input order is kept, sorting is the store's job.
pub fn search(users: Vec<User>, query: Option<&str>) -> Vec<User> {
    let Some(query) = query else {
        return users;
    };
    let needle = query.to_lowercase();
    users
        .into_iter()
        .filter(|user| user.username.to_lowercase().contains(&needle))
        .collect()
}

/// Everything the admin dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminOverview {
    pub users: Vec<User>,
    pub medicines: Vec<MedicationRecord>,
    pub total_users: usize,
    pub total_medicines: usize,
}

impl AdminOverview {
    /// `total_users` counts the users left after the search; medicines are
    /// never filtered.
    pub fn build(users: Vec<User>, medicines: Vec<MedicationRecord>, query: Option<&str>) -> Self {
        let users = search(users, query);
        Self {
            total_users: users.len(),
            total_medicines: medicines.len(),
            users,
            medicines,
        }
    }
}
