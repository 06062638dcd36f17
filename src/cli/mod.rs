//! Command-line front end for the clinic.
//!
//! Provides subcommands that call into the core:
//! - `register` - Create a patient or doctor account
//! - `login` - Check credentials (doctors also see their notifications)
//! - `doctors` - List doctors available for booking
//! - `book` / `cancel` - Manage a patient's appointments
//! - `appointments` - List the signed-in account's appointments
//! - `notifications` - List a doctor's cancellation notifications

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fmt::Display;
use std::path::PathBuf;

use crate::db::{AppointmentId, Role};
use crate::{Clinic, Session};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "clinic")]
#[command(author, version, about = "Appointment booking for a single clinic", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "clinic.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Database file (overrides the configured location)
    #[arg(long, env = "CLINIC_DATABASE")]
    pub database: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Username and password of the account running the command
#[derive(Args, Debug, Clone)]
pub struct Credentials {
    #[arg(short, long, env = "CLINIC_USERNAME")]
    pub username: String,

    #[arg(short, long, env = "CLINIC_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new account
    Register {
        #[command(flatten)]
        credentials: Credentials,
        /// Account role (patient or doctor)
        #[arg(short, long, default_value = "patient")]
        role: Role,
        /// Speciality, required for doctors
        #[arg(short, long)]
        speciality: Option<String>,
    },

    /// Check credentials and show a welcome
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// List doctors
    Doctors,

    /// Book an appointment (patients only)
    Book {
        #[command(flatten)]
        credentials: Credentials,
        /// Doctor name
        #[arg(long)]
        doctor: String,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Time (HH:MM AM/PM)
        #[arg(long)]
        time: String,
    },

    /// Cancel an appointment (patients only)
    Cancel {
        #[command(flatten)]
        credentials: Credentials,
        /// Appointment ID
        #[arg(long)]
        appointment: AppointmentId,
        /// Reason passed on to the doctor
        #[arg(long)]
        reason: String,
    },

    /// List your appointments
    Appointments {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// List cancellation notifications (doctors only)
    Notifications {
        #[command(flatten)]
        credentials: Credentials,
    },
}

/// Print a list either as JSON or one item per line
fn print_list<T: Serialize + Display>(json: bool, items: &[T], empty: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else if items.is_empty() {
        println!("{}", empty);
    } else {
        for item in items {
            println!("{}", item);
        }
    }
    Ok(())
}

fn print_value<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

async fn login(clinic: &Clinic, credentials: &Credentials) -> Result<Session> {
    Ok(clinic
        .login(credentials.username.trim(), &credentials.password)
        .await?)
}

/// Run a parsed command against an opened clinic
pub async fn run(clinic: &Clinic, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Register {
            credentials,
            role,
            speciality,
        } => {
            let username = credentials.username.trim();
            let speciality = speciality.as_deref().map(str::trim);
            let id = clinic
                .register(username, &credentials.password, role, speciality)
                .await?;
            print_value(json, &serde_json::json!({ "id": id, "role": role }), || {
                format!("Registered {} {} (id {}). You can now log in.", role, username, id)
            })?;
        }

        Commands::Login { credentials } => {
            let session = login(clinic, &credentials).await?;
            let account = session.account();
            match &session {
                Session::Patient(_) => {
                    print_value(json, account, || format!("Welcome, {}!", account.username))?;
                }
                Session::Doctor(doctor) => {
                    let notifications = doctor.notifications(clinic).await?;
                    if json {
                        let payload = serde_json::json!({
                            "account": account,
                            "notifications": notifications,
                        });
                        println!("{}", serde_json::to_string_pretty(&payload)?);
                    } else {
                        println!("Welcome, Dr. {}!", account.username);
                        print_list(false, &notifications, "No notifications.")?;
                    }
                }
            }
        }

        Commands::Doctors => {
            let doctors = clinic.list_doctors().await?;
            print_list(json, &doctors, "There are no doctors available at the moment.")?;
        }

        Commands::Book {
            credentials,
            doctor,
            date,
            time,
        } => {
            let session = login(clinic, &credentials).await?;
            let patient = session.patient()?;
            let (doctor, date, time) = (doctor.trim(), date.trim(), time.trim());
            let id = patient.book(clinic, doctor, date, time).await?;
            print_value(json, &serde_json::json!({ "id": id }), || {
                format!(
                    "Appointment #{} with {} on {} at {} confirmed.",
                    id, doctor, date, time
                )
            })?;
        }

        Commands::Cancel {
            credentials,
            appointment,
            reason,
        } => {
            let session = login(clinic, &credentials).await?;
            let patient = session.patient()?;
            let notification = patient.cancel(clinic, appointment, reason.trim()).await?;
            print_value(json, &notification, || {
                format!("Appointment #{} cancelled. The doctor has been notified.", appointment)
            })?;
        }

        Commands::Appointments { credentials } => {
            let session = login(clinic, &credentials).await?;
            match &session {
                Session::Patient(patient) => {
                    let appointments = patient.appointments(clinic).await?;
                    print_list(json, &appointments, "No Appointments Found")?;
                }
                Session::Doctor(doctor) => {
                    let appointments = doctor.appointments(clinic).await?;
                    print_list(json, &appointments, "No Appointments Found")?;
                }
            }
        }

        Commands::Notifications { credentials } => {
            let session = login(clinic, &credentials).await?;
            let doctor = session.doctor()?;
            let notifications = doctor.notifications(clinic).await?;
            print_list(json, &notifications, "No notifications.")?;
        }
    }

    Ok(())
}
