//! Doctor profile model.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::AccountId;

/// Profile of a doctor account. `id` is always the owning account's id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct DoctorProfile {
    pub id: AccountId,
    pub name: String,
    pub speciality: String,
}

impl std::fmt::Display for DoctorProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.speciality)
    }
}

/// All doctors in registration order
pub async fn list_doctors(db: &SqlitePool) -> Result<Vec<DoctorProfile>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, speciality FROM doctors ORDER BY id")
        .fetch_all(db)
        .await
}

/// Look up a doctor by display name
pub async fn find_doctor_by_name(
    db: &SqlitePool,
    name: &str,
) -> Result<Option<DoctorProfile>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, speciality FROM doctors WHERE name = ? ORDER BY id LIMIT 1")
        .bind(name)
        .fetch_optional(db)
        .await
}
