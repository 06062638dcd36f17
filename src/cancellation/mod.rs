//! Cancellation engine.
//!
//! Removing an appointment and leaving its doctor a notification happen in a single
//! transaction: either both are committed or neither is.

use chrono::{NaiveDate, NaiveTime};
use sqlx::FromRow;
use tracing::info;

use crate::db::{self, AccountId, Appointment, AppointmentId, Notification, TIME_FORMAT};
use crate::error::{storage, ClinicError};
use crate::DbPool;

/// Appointment joined with the names that go into the notification text
#[derive(Debug, FromRow)]
struct CancelTarget {
    doctor_id: AccountId,
    doctor_name: String,
    patient_username: String,
    date: NaiveDate,
    time: NaiveTime,
}

/// Text of the notification left for the doctor
pub fn cancellation_message(
    patient_username: &str,
    date: NaiveDate,
    time: NaiveTime,
    reason: &str,
) -> String {
    format!(
        "Appointment with {} on {} at {} was cancelled. Reason: {}",
        patient_username,
        date,
        time.format(TIME_FORMAT),
        reason
    )
}

#[derive(Debug, Clone)]
pub struct CancellationEngine {
    db: DbPool,
}

impl CancellationEngine {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Fetch an appointment by id
    pub async fn get_appointment(&self, id: AppointmentId) -> Result<Appointment, ClinicError> {
        db::find_appointment(&self.db, id)
            .await
            .map_err(storage)?
            .ok_or(ClinicError::AppointmentNotFound(id))
    }

    /// Cancel an appointment and return the notification written for its doctor
    pub async fn cancel_appointment(
        &self,
        appointment_id: AppointmentId,
        reason: &str,
    ) -> Result<Notification, ClinicError> {
        let mut tx = self.db.begin().await.map_err(storage)?;

        let target: Option<CancelTarget> = sqlx::query_as(
            r#"
            SELECT a.doctor_id, d.name AS doctor_name, u.username AS patient_username, a.date, a.time
            FROM appointments a
            JOIN doctors d ON a.doctor_id = d.id
            JOIN accounts u ON a.patient_id = u.id
            WHERE a.id = ?
            "#,
        )
        .bind(appointment_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;

        let target = target.ok_or(ClinicError::AppointmentNotFound(appointment_id))?;

        if reason.trim().is_empty() {
            return Err(ClinicError::MissingReason);
        }

        sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(appointment_id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        let message = cancellation_message(&target.patient_username, target.date, target.time, reason);

        let notification: Notification = sqlx::query_as(
            r#"
            INSERT INTO notifications (doctor_id, message, date, time)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(target.doctor_id)
        .bind(&message)
        .bind(target.date)
        .bind(target.time)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage)?;

        tx.commit().await.map_err(storage)?;

        info!(
            appointment_id = appointment_id,
            doctor = %target.doctor_name,
            patient = %target.patient_username,
            notification_id = notification.id,
            "Appointment cancelled"
        );
        Ok(notification)
    }
}
