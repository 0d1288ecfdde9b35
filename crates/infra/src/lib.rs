//! Infrastructure layer: storage, snapshots, scheduled runs, booking chain, config.

pub mod booking;
pub mod config;
pub mod read_model;
pub mod reports;
pub mod runner;

#[cfg(test)]
mod integration_tests;

pub use booking::{BookingChain, BookingOutcome, BookingRequest};
pub use config::{AppConfig, ConfigError};
pub use read_model::{InMemoryClinicStore, Restock};
pub use reports::{ClinicDashboard, MonthlyReport, dashboard, monthly_report};
