pub mod auth;
pub mod booking;
pub mod cancellation;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod session;
pub mod utils;

pub use db::DbPool;
pub use error::ClinicError;
pub use session::Session;

use anyhow::Result;
use auth::CredentialStore;
use booking::BookingEngine;
use cancellation::CancellationEngine;
use config::Config;
use db::{
    Account, AccountId, Appointment, AppointmentId, DoctorAppointment, DoctorProfile,
    Notification, PatientAppointment, Role,
};
use error::storage;

/// Entry point for the presentation layer. Each component holds its own handle to the
/// store; the pool itself is shared.
#[derive(Debug, Clone)]
pub struct Clinic {
    db: DbPool,
    credentials: CredentialStore,
    booking: BookingEngine,
    cancellation: CancellationEngine,
}

impl Clinic {
    pub fn new(db: DbPool) -> Self {
        Self {
            credentials: CredentialStore::new(db.clone()),
            booking: BookingEngine::new(db.clone()),
            cancellation: CancellationEngine::new(db.clone()),
            db,
        }
    }

    /// Open the database named by the configuration, creating it if needed
    pub async fn open(config: &Config) -> Result<Self> {
        let path = config.store.database_path();
        if let Some(parent) = path.parent() {
            utils::ensure_dir(parent)?;
        }
        let db = db::init(&path).await?;
        Ok(Self::new(db))
    }

    pub fn db(&self) -> &DbPool {
        &self.db
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
        speciality: Option<&str>,
    ) -> Result<AccountId, ClinicError> {
        self.credentials
            .register(username, password, role, speciality)
            .await
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Account, ClinicError> {
        self.credentials.authenticate(username, password).await
    }

    /// Authenticate and wrap the account in a role-specific session
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ClinicError> {
        let account = self.authenticate(username, password).await?;
        Ok(Session::new(account))
    }

    pub async fn book_appointment(
        &self,
        patient_id: AccountId,
        doctor_name: &str,
        date: &str,
        time: &str,
    ) -> Result<AppointmentId, ClinicError> {
        self.booking
            .book_appointment(patient_id, doctor_name, date, time)
            .await
    }

    pub async fn cancel_appointment(
        &self,
        appointment_id: AppointmentId,
        reason: &str,
    ) -> Result<Notification, ClinicError> {
        self.cancellation
            .cancel_appointment(appointment_id, reason)
            .await
    }

    pub async fn get_appointment(&self, id: AppointmentId) -> Result<Appointment, ClinicError> {
        self.cancellation.get_appointment(id).await
    }

    pub async fn list_doctors(&self) -> Result<Vec<DoctorProfile>, ClinicError> {
        db::list_doctors(&self.db).await.map_err(storage)
    }

    pub async fn list_appointments_for_patient(
        &self,
        patient_id: AccountId,
    ) -> Result<Vec<PatientAppointment>, ClinicError> {
        db::list_appointments_for_patient(&self.db, patient_id)
            .await
            .map_err(storage)
    }

    pub async fn list_appointments_for_doctor(
        &self,
        doctor_id: AccountId,
    ) -> Result<Vec<DoctorAppointment>, ClinicError> {
        db::list_appointments_for_doctor(&self.db, doctor_id)
            .await
            .map_err(storage)
    }

    pub async fn list_notifications_for_doctor(
        &self,
        doctor_id: AccountId,
    ) -> Result<Vec<Notification>, ClinicError> {
        db::list_notifications_for_doctor(&self.db, doctor_id)
            .await
            .map_err(storage)
    }
}
