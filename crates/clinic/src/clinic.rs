use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clinicops_core::ClinicId;

/// A clinic (the isolation boundary). Every other record is scoped by its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: ClinicId,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    /// WhatsApp number used for patient reminders, if configured.
    #[serde(default, rename = "whatsapp")]
    pub whatsapp_number: Option<String>,
    /// Opaque working-hours document as stored by the settings endpoint.
    #[serde(default)]
    pub working_hours: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl Clinic {
    pub fn new(id: ClinicId) -> Self {
        Self {
            id,
            owner_name: None,
            email: None,
            active: true,
            whatsapp_number: None,
            working_hours: None,
            created_at: None,
        }
    }

    pub fn with_whatsapp(mut self, number: impl Into<String>) -> Self {
        self.whatsapp_number = Some(number.into());
        self
    }

    /// The WhatsApp number, ignoring blank values.
    pub fn whatsapp(&self) -> Option<&str> {
        self.whatsapp_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}
