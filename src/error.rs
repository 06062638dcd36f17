//! Error type shared by every clinic operation.
//!
//! All variants except [`ClinicError::StorageFailure`] describe bad input or a state
//! conflict; the caller is expected to re-prompt. Storage failures abort the operation
//! with no partial effect.

use thiserror::Error;

use crate::db::{AppointmentId, Role};

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("No doctor named '{0}'")]
    DoctorNotFound(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}': expected HH:MM AM/PM")]
    InvalidTime(String),

    #[error("The doctor already has an appointment at the selected time")]
    SlotConflict,

    #[error("Appointment {0} not found")]
    AppointmentNotFound(AppointmentId),

    #[error("A cancellation reason is required")]
    MissingReason,

    #[error("This action requires a {expected} account, but you are signed in as a {actual}")]
    WrongRole { expected: Role, actual: Role },

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] sqlx::Error),
}

impl ClinicError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateUsername => "duplicate_username",
            Self::MissingField(_) => "missing_field",
            Self::InvalidCredentials => "invalid_credentials",
            Self::DoctorNotFound(_) => "doctor_not_found",
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidTime(_) => "invalid_time",
            Self::SlotConflict => "slot_conflict",
            Self::AppointmentNotFound(_) => "appointment_not_found",
            Self::MissingReason => "missing_reason",
            Self::WrongRole { .. } => "wrong_role",
            Self::StorageFailure(_) => "storage_failure",
        }
    }

    /// Whether the caller can recover by asking the user for different input
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::StorageFailure(_))
    }
}

/// True when a statement was rejected by a UNIQUE constraint or index
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().contains("UNIQUE constraint failed"),
        _ => false,
    }
}

/// Log a storage error and wrap it
pub(crate) fn storage(err: sqlx::Error) -> ClinicError {
    tracing::error!("Database error: {}", err);
    ClinicError::StorageFailure(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ClinicError::DuplicateUsername.code(), "duplicate_username");
        assert_eq!(ClinicError::SlotConflict.code(), "slot_conflict");
        assert_eq!(ClinicError::AppointmentNotFound(7).code(), "appointment_not_found");
        assert_eq!(
            ClinicError::StorageFailure(sqlx::Error::RowNotFound).code(),
            "storage_failure"
        );
    }

    #[test]
    fn test_only_storage_failures_are_fatal() {
        assert!(ClinicError::MissingReason.is_recoverable());
        assert!(ClinicError::InvalidDate("2025-13-40".into()).is_recoverable());
        assert!(!ClinicError::StorageFailure(sqlx::Error::PoolClosed).is_recoverable());
    }

    #[test]
    fn test_messages() {
        let err = ClinicError::WrongRole {
            expected: Role::Patient,
            actual: Role::Doctor,
        };
        assert_eq!(
            err.to_string(),
            "This action requires a patient account, but you are signed in as a doctor"
        );
        assert_eq!(
            ClinicError::MissingField("speciality").to_string(),
            "Missing required field: speciality"
        );
    }

    #[test]
    fn test_row_not_found_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
