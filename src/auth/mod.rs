//! Credential store: account registration and password authentication.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, info};

use crate::db::{Account, AccountId, Role};
use crate::error::{is_unique_violation, storage, ClinicError};
use crate::DbPool;

/// Digest a password for storage. SHA-256, hex encoded; the same password always
/// yields the same digest.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a password against a stored digest in constant time
pub fn verify_password(password: &str, digest: &str) -> bool {
    let computed = hash_password(password);
    let computed = computed.as_bytes();
    let stored = digest.as_bytes();

    computed.len() == stored.len() && computed.ct_eq(stored).into()
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    db: DbPool,
}

impl CredentialStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Create an account. Doctors also get a profile with the same id, named after the
    /// username; both rows commit together or not at all.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
        speciality: Option<&str>,
    ) -> Result<AccountId, ClinicError> {
        if username.is_empty() {
            return Err(ClinicError::MissingField("username"));
        }
        if password.is_empty() {
            return Err(ClinicError::MissingField("password"));
        }
        let speciality = match role {
            Role::Doctor => match speciality {
                Some(s) if !s.is_empty() => Some(s),
                _ => return Err(ClinicError::MissingField("speciality")),
            },
            Role::Patient => None,
        };

        let mut tx = self.db.begin().await.map_err(storage)?;

        let existing: Option<(AccountId,)> =
            sqlx::query_as("SELECT id FROM accounts WHERE username = ?")
                .bind(username)
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage)?;
        if existing.is_some() {
            debug!(username = username, "Registration rejected: username taken");
            return Err(ClinicError::DuplicateUsername);
        }

        let result = sqlx::query("INSERT INTO accounts (username, password_hash, role) VALUES (?, ?, ?)")
            .bind(username)
            .bind(hash_password(password))
            .bind(role.as_str())
            .execute(&mut *tx)
            .await;
        let id = match result {
            Ok(done) => done.last_insert_rowid(),
            Err(e) if is_unique_violation(&e) => return Err(ClinicError::DuplicateUsername),
            Err(e) => return Err(storage(e)),
        };

        if let Some(speciality) = speciality {
            sqlx::query("INSERT INTO doctors (id, name, speciality) VALUES (?, ?, ?)")
                .bind(id)
                .bind(username)
                .bind(speciality)
                .execute(&mut *tx)
                .await
                .map_err(storage)?;
        }

        tx.commit().await.map_err(storage)?;

        info!(account_id = id, username = username, role = %role, "Registered account");
        Ok(id)
    }

    /// Find the account matching both username and password digest
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Account, ClinicError> {
        if username.is_empty() {
            return Err(ClinicError::MissingField("username"));
        }
        if password.is_empty() {
            return Err(ClinicError::MissingField("password"));
        }

        let account: Option<Account> = sqlx::query_as("SELECT * FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.db)
            .await
            .map_err(storage)?;

        match account {
            Some(account) if verify_password(password, &account.password_hash) => {
                debug!(account_id = account.id, "Authenticated");
                Ok(account)
            }
            _ => {
                debug!(username = username, "Authentication failed");
                Err(ClinicError::InvalidCredentials)
            }
        }
    }
}
