//! Clinic domain records: clinics, appointments and treatment cases.
//!
//! Plain data with small, deterministic helpers (no IO, no HTTP, no storage).

pub mod appointment;
pub mod case;
pub mod clinic;

pub use appointment::{Appointment, AppointmentStatus, parse_schedule};
pub use case::{Case, CaseStatus};
pub use clinic::Clinic;
