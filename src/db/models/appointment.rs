//! Appointment models and the per-patient / per-doctor listings.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use super::{AccountId, TIME_FORMAT};

pub type AppointmentId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: AccountId,
    pub doctor_id: AccountId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub created_at: String,
}

/// A patient's view of one of their appointments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PatientAppointment {
    pub id: AppointmentId,
    pub doctor_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl std::fmt::Display for PatientAppointment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} at {} with Dr. {}",
            self.id,
            self.date,
            self.time.format(TIME_FORMAT),
            self.doctor_name
        )
    }
}

/// A doctor's view of an appointment booked with them
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DoctorAppointment {
    pub id: AppointmentId,
    pub patient_username: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl std::fmt::Display for DoctorAppointment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} at {} with {}",
            self.id,
            self.date,
            self.time.format(TIME_FORMAT),
            self.patient_username
        )
    }
}

pub async fn find_appointment(
    db: &SqlitePool,
    id: AppointmentId,
) -> Result<Option<Appointment>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM appointments WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list_appointments_for_patient(
    db: &SqlitePool,
    patient_id: AccountId,
) -> Result<Vec<PatientAppointment>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT a.id, d.name AS doctor_name, a.date, a.time
        FROM appointments a
        JOIN doctors d ON a.doctor_id = d.id
        WHERE a.patient_id = ?
        ORDER BY a.date, a.time, a.id
        "#,
    )
    .bind(patient_id)
    .fetch_all(db)
    .await
}

pub async fn list_appointments_for_doctor(
    db: &SqlitePool,
    doctor_id: AccountId,
) -> Result<Vec<DoctorAppointment>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT a.id, u.username AS patient_username, a.date, a.time
        FROM appointments a
        JOIN accounts u ON a.patient_id = u.id
        WHERE a.doctor_id = ?
        ORDER BY a.date, a.time, a.id
        "#,
    )
    .bind(doctor_id)
    .fetch_all(db)
    .await
}
