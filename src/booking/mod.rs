//! Booking engine.
//!
//! Creates appointments while keeping every doctor slot (doctor, date, time) to at most
//! one appointment. All validation happens before anything is written, and the
//! conflict check and insert share one transaction backed by a unique index.

use chrono::{NaiveDate, NaiveTime};
use tracing::{info, warn};

use crate::db::{self, AccountId, AppointmentId, DATE_FORMAT, TIME_FORMAT};
use crate::error::{is_unique_violation, storage, ClinicError};
use crate::DbPool;

/// Parse a `YYYY-MM-DD` date. No range checks: past dates are accepted.
pub fn parse_date(input: &str) -> Result<NaiveDate, ClinicError> {
    if input.is_empty() {
        return Err(ClinicError::MissingField("date"));
    }
    // chrono's %Y also takes short or signed years; only a four-digit year is accepted
    let year = input.split('-').next().unwrap_or_default();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClinicError::InvalidDate(input.to_string()));
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|_| ClinicError::InvalidDate(input.to_string()))
}

/// Parse a 12-hour `HH:MM AM/PM` time
pub fn parse_time(input: &str) -> Result<NaiveTime, ClinicError> {
    if input.is_empty() {
        return Err(ClinicError::MissingField("time"));
    }
    // The meridiem must be separated from the clock by whitespace
    match input.rsplit_once(char::is_whitespace) {
        Some((clock, _)) if !clock.trim().is_empty() => {}
        _ => return Err(ClinicError::InvalidTime(input.to_string())),
    }
    NaiveTime::parse_from_str(input, TIME_FORMAT)
        .map_err(|_| ClinicError::InvalidTime(input.to_string()))
}

#[derive(Debug, Clone)]
pub struct BookingEngine {
    db: DbPool,
}

impl BookingEngine {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Book `patient_id` with the doctor called `doctor_name` at the given date and time
    pub async fn book_appointment(
        &self,
        patient_id: AccountId,
        doctor_name: &str,
        date: &str,
        time: &str,
    ) -> Result<AppointmentId, ClinicError> {
        let doctor = db::find_doctor_by_name(&self.db, doctor_name)
            .await
            .map_err(storage)?
            .ok_or_else(|| ClinicError::DoctorNotFound(doctor_name.to_string()))?;

        let date = parse_date(date)?;
        let time = parse_time(time)?;

        let mut tx = self.db.begin().await.map_err(storage)?;

        let existing: Option<(AppointmentId,)> = sqlx::query_as(
            "SELECT id FROM appointments WHERE doctor_id = ? AND date = ? AND time = ?",
        )
        .bind(doctor.id)
        .bind(date)
        .bind(time)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;

        if existing.is_some() {
            warn!(doctor = %doctor.name, %date, %time, "Appointment conflict detected");
            return Err(ClinicError::SlotConflict);
        }

        let result = sqlx::query(
            "INSERT INTO appointments (patient_id, doctor_id, date, time) VALUES (?, ?, ?, ?)",
        )
        .bind(patient_id)
        .bind(doctor.id)
        .bind(date)
        .bind(time)
        .execute(&mut *tx)
        .await;

        let id = match result {
            Ok(done) => done.last_insert_rowid(),
            Err(e) if is_unique_violation(&e) => {
                warn!(doctor = %doctor.name, %date, %time, "Appointment conflict detected on insert");
                return Err(ClinicError::SlotConflict);
            }
            Err(e) => return Err(storage(e)),
        };

        tx.commit().await.map_err(storage)?;

        info!(
            appointment_id = id,
            patient_id = patient_id,
            doctor = %doctor.name,
            %date,
            time = %time.format(TIME_FORMAT),
            "Appointment booked"
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialStore;
    use crate::db::Role;

    struct Fixture {
        db: DbPool,
        engine: BookingEngine,
        patient: AccountId,
    }

    async fn fixture() -> Fixture {
        let db = db::init_memory().await.unwrap();
        let credentials = CredentialStore::new(db.clone());
        credentials
            .register("drA", "pw", Role::Doctor, Some("Cardiology"))
            .await
            .unwrap();
        let patient = credentials
            .register("ann", "pw", Role::Patient, None)
            .await
            .unwrap();
        Fixture {
            engine: BookingEngine::new(db.clone()),
            db,
            patient,
        }
    }

    async fn appointment_count(db: &DbPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM appointments")
            .fetch_one(db)
            .await
            .unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-03-10").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
        assert!(matches!(parse_date("2025-13-40"), Err(ClinicError::InvalidDate(_))));
        assert!(matches!(parse_date("10/03/2025"), Err(ClinicError::InvalidDate(_))));
        assert!(matches!(parse_date(""), Err(ClinicError::MissingField("date"))));
    }

    #[test]
    fn test_parse_date_requires_four_digit_year() {
        assert_eq!(
            parse_date("2025-3-1").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        for input in ["25-03-10", "0-01-01", "+12025-03-10", "02025-03-10", "-2025-03-10", "２０２５-03-10"] {
            assert!(
                matches!(parse_date(input), Err(ClinicError::InvalidDate(_))),
                "{} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("10:00 AM").unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time("02:30 PM").unwrap(),
            NaiveTime::from_hms_opt(14, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("12:00 AM").unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap()
        );
        assert!(matches!(parse_time("14:00"), Err(ClinicError::InvalidTime(_))));
        assert!(matches!(parse_time("13:00 PM"), Err(ClinicError::InvalidTime(_))));
        assert!(matches!(parse_time("10:00AM"), Err(ClinicError::InvalidTime(_))));
        assert!(matches!(parse_time("AM"), Err(ClinicError::InvalidTime(_))));
        assert!(matches!(parse_time(""), Err(ClinicError::MissingField("time"))));
    }

    #[tokio::test]
    async fn test_double_booking_is_rejected() {
        let f = fixture().await;

        f.engine
            .book_appointment(f.patient, "drA", "2025-03-10", "10:00 AM")
            .await
            .unwrap();
        let err = f
            .engine
            .book_appointment(f.patient, "drA", "2025-03-10", "10:00 AM")
            .await
            .unwrap_err();

        assert!(matches!(err, ClinicError::SlotConflict));
        assert_eq!(appointment_count(&f.db).await, 1);
    }

    #[tokio::test]
    async fn test_equivalent_time_spellings_share_a_slot() {
        let f = fixture().await;

        f.engine
            .book_appointment(f.patient, "drA", "2025-03-10", "9:00 AM")
            .await
            .unwrap();
        let err = f
            .engine
            .book_appointment(f.patient, "drA", "2025-03-10", "09:00 AM")
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::SlotConflict));
    }

    #[tokio::test]
    async fn test_different_slots_are_independent() {
        let f = fixture().await;

        f.engine
            .book_appointment(f.patient, "drA", "2025-03-10", "10:00 AM")
            .await
            .unwrap();
        f.engine
            .book_appointment(f.patient, "drA", "2025-03-10", "10:00 PM")
            .await
            .unwrap();
        f.engine
            .book_appointment(f.patient, "drA", "2025-03-11", "10:00 AM")
            .await
            .unwrap();
        assert_eq!(appointment_count(&f.db).await, 3);
    }

    #[tokio::test]
    async fn test_invalid_date_creates_nothing() {
        let f = fixture().await;

        let err = f
            .engine
            .book_appointment(f.patient, "drA", "2025-13-40", "10:00 AM")
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::InvalidDate(_)));
        assert_eq!(appointment_count(&f.db).await, 0);
    }

    #[tokio::test]
    async fn test_two_digit_year_creates_nothing() {
        let f = fixture().await;

        let err = f
            .engine
            .book_appointment(f.patient, "drA", "25-03-10", "10:00 AM")
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::InvalidDate(_)));
        assert_eq!(appointment_count(&f.db).await, 0);
    }

    #[tokio::test]
    async fn test_invalid_time_creates_nothing() {
        let f = fixture().await;

        let err = f
            .engine
            .book_appointment(f.patient, "drA", "2025-03-10", "25:00")
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::InvalidTime(_)));
        assert_eq!(appointment_count(&f.db).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_doctor() {
        let f = fixture().await;

        let err = f
            .engine
            .book_appointment(f.patient, "drZ", "2025-03-10", "10:00 AM")
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::DoctorNotFound(name) if name == "drZ"));
    }

    #[tokio::test]
    async fn test_past_dates_are_accepted() {
        let f = fixture().await;

        f.engine
            .book_appointment(f.patient, "drA", "1999-01-01", "08:15 AM")
            .await
            .unwrap();
        assert_eq!(appointment_count(&f.db).await, 1);
    }

    #[tokio::test]
    async fn test_unknown_patient_is_a_storage_failure() {
        let f = fixture().await;

        let err = f
            .engine
            .book_appointment(9999, "drA", "2025-03-10", "10:00 AM")
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicError::StorageFailure(_)));
        assert_eq!(appointment_count(&f.db).await, 0);
    }

    #[tokio::test]
    async fn test_stored_slot_is_listed_back() {
        let f = fixture().await;

        let id = f
            .engine
            .book_appointment(f.patient, "drA", "2025-03-10", "02:30 PM")
            .await
            .unwrap();

        let listed = db::list_appointments_for_patient(&f.db, f.patient).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].doctor_name, "drA");
        assert_eq!(listed[0].time.format(TIME_FORMAT).to_string(), "02:30 PM");
    }
}
