//! Row models and read-only projections, one module per table.

pub mod account;
pub mod appointment;
pub mod doctor;
pub mod notification;

pub use account::*;
pub use appointment::*;
pub use doctor::*;
pub use notification::*;

/// Storage format of appointment and notification dates (also the accepted input format)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 12-hour clock with meridiem, as entered by patients and shown back to them
pub const TIME_FORMAT: &str = "%I:%M %p";
