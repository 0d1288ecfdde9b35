//! Process configuration loaded from the environment (and `.env` when present).

use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use clinicops_agents::AgentConfig;

pub const BIND_ADDR: &str = "CLINICOPS_BIND_ADDR";
pub const WEEKLY_SLOT_CAPACITY: &str = "CLINICOPS_WEEKLY_SLOT_CAPACITY";
pub const LOW_STOCK_THRESHOLD: &str = "CLINICOPS_LOW_STOCK_THRESHOLD";
pub const REORDER_QUANTITY: &str = "CLINICOPS_REORDER_QUANTITY";
pub const SCHEDULER_ENABLED: &str = "CLINICOPS_SCHEDULER_ENABLED";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub agents: AgentConfig,
    pub scheduler_enabled: bool,
}

impl AppConfig {
    /// Load from process environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = AgentConfig::default();

        let bind_addr = parse_or(&lookup, BIND_ADDR, || {
            SocketAddr::from_str(DEFAULT_BIND_ADDR).map_err(|e| e.to_string())
        })?;

        let agents = AgentConfig {
            weekly_slot_capacity: parse_or(&lookup, WEEKLY_SLOT_CAPACITY, || {
                Ok(defaults.weekly_slot_capacity)
            })?,
            low_stock_threshold: parse_or(&lookup, LOW_STOCK_THRESHOLD, || {
                Ok(defaults.low_stock_threshold)
            })?,
            reorder_quantity: parse_or(&lookup, REORDER_QUANTITY, || {
                Ok(defaults.reorder_quantity)
            })?,
            ..defaults
        };

        let scheduler_enabled = match lookup(SCHEDULER_ENABLED) {
            None => true,
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                key: SCHEDULER_ENABLED,
                value: raw.clone(),
                reason: "expected true/false".into(),
            })?,
        };

        Ok(Self {
            bind_addr,
            agents,
            scheduler_enabled,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: impl FnOnce() -> Result<T, String>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => default().map_err(|reason| ConfigError::Invalid {
            key,
            value: String::new(),
            reason,
        }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
