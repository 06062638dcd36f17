//! Signed-in sessions, one variant per role.
//!
//! The engines below this layer take plain ids and do not look at roles. A session
//! only exposes the operations its role is allowed to perform, so the presentation
//! layer cannot book as a doctor or read notifications as a patient.

use crate::db::{
    Account, AccountId, AppointmentId, DoctorAppointment, DoctorProfile, Notification,
    PatientAppointment, Role,
};
use crate::error::ClinicError;
use crate::Clinic;

#[derive(Debug, Clone)]
pub enum Session {
    Patient(PatientSession),
    Doctor(DoctorSession),
}

impl Session {
    pub fn new(account: Account) -> Self {
        match account.role {
            Role::Patient => Self::Patient(PatientSession { account }),
            Role::Doctor => Self::Doctor(DoctorSession { account }),
        }
    }

    pub fn account(&self) -> &Account {
        match self {
            Self::Patient(s) => &s.account,
            Self::Doctor(s) => &s.account,
        }
    }

    pub fn role(&self) -> Role {
        self.account().role
    }

    /// Patient capabilities, or `WrongRole` for a doctor
    pub fn patient(&self) -> Result<&PatientSession, ClinicError> {
        match self {
            Self::Patient(s) => Ok(s),
            Self::Doctor(_) => Err(ClinicError::WrongRole {
                expected: Role::Patient,
                actual: Role::Doctor,
            }),
        }
    }

    /// Doctor capabilities, or `WrongRole` for a patient
    pub fn doctor(&self) -> Result<&DoctorSession, ClinicError> {
        match self {
            Self::Doctor(s) => Ok(s),
            Self::Patient(_) => Err(ClinicError::WrongRole {
                expected: Role::Doctor,
                actual: Role::Patient,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatientSession {
    account: Account,
}

impl PatientSession {
    pub fn id(&self) -> AccountId {
        self.account.id
    }

    pub async fn doctors(&self, clinic: &Clinic) -> Result<Vec<DoctorProfile>, ClinicError> {
        clinic.list_doctors().await
    }

    pub async fn book(
        &self,
        clinic: &Clinic,
        doctor_name: &str,
        date: &str,
        time: &str,
    ) -> Result<AppointmentId, ClinicError> {
        clinic
            .book_appointment(self.account.id, doctor_name, date, time)
            .await
    }

    pub async fn cancel(
        &self,
        clinic: &Clinic,
        appointment_id: AppointmentId,
        reason: &str,
    ) -> Result<Notification, ClinicError> {
        clinic.cancel_appointment(appointment_id, reason).await
    }

    pub async fn appointments(&self, clinic: &Clinic) -> Result<Vec<PatientAppointment>, ClinicError> {
        clinic.list_appointments_for_patient(self.account.id).await
    }
}

#[derive(Debug, Clone)]
pub struct DoctorSession {
    account: Account,
}

impl DoctorSession {
    /// Doctor profile id; equal to the account id
    pub fn id(&self) -> AccountId {
        self.account.id
    }

    pub async fn appointments(&self, clinic: &Clinic) -> Result<Vec<DoctorAppointment>, ClinicError> {
        clinic.list_appointments_for_doctor(self.account.id).await
    }

    pub async fn notifications(&self, clinic: &Clinic) -> Result<Vec<Notification>, ClinicError> {
        clinic.list_notifications_for_doctor(self.account.id).await
    }
}
