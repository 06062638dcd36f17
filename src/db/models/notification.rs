//! Cancellation notifications shown to doctors.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::{AccountId, TIME_FORMAT};

pub type NotificationId = i64;

/// Notification stored in database. Rows are written once and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub doctor_id: AccountId,
    pub message: String,
    /// Date of the cancelled appointment
    pub date: NaiveDate,
    /// Time of the cancelled appointment
    pub time: NaiveTime,
    pub created_at: String,
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} {}] {}",
            self.date,
            self.time.format(TIME_FORMAT),
            self.message
        )
    }
}

/// Notifications for a doctor, oldest first
pub async fn list_notifications_for_doctor(
    db: &SqlitePool,
    doctor_id: AccountId,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM notifications WHERE doctor_id = ? ORDER BY id")
        .bind(doctor_id)
        .fetch_all(db)
        .await
}
