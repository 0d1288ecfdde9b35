//! Strongly-typed identifiers used across the clinic domain.
//!
//! Identifiers are opaque strings: rows created by the booking/intake endpoints
//! carry ids such as `appt-1718000000000`, while ids minted by agents come from
//! an id generator (UUIDv7 by default).

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a clinic (isolation boundary for all records).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClinicId(String);

/// Identifier of an appointment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(String);

/// Identifier of a treatment case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

/// Identifier of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(String);

/// Identifier of a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseOrderId(String);

/// Stock keeping unit; unique per clinic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap a raw identifier without validation.
            ///
            /// Prefer `parse` for values coming from outside the process.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: empty", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

impl_string_newtype!(ClinicId, "ClinicId");
impl_string_newtype!(AppointmentId, "AppointmentId");
impl_string_newtype!(CaseId, "CaseId");
impl_string_newtype!(InvoiceId, "InvoiceId");
impl_string_newtype!(PurchaseOrderId, "PurchaseOrderId");
impl_string_newtype!(Sku, "Sku");

impl CaseId {
    /// Case id derived from a UUID (`case-<uuid>`).
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(format!("case-{uuid}"))
    }
}

impl PurchaseOrderId {
    /// Purchase order id derived from a UUID (`po-<uuid>`).
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(format!("po-{uuid}"))
    }
}

impl AppointmentId {
    /// Appointment id derived from a UUID (`appt-<uuid>`).
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(format!("appt-{uuid}"))
    }
}

impl InvoiceId {
    /// Invoice id derived from a UUID (`inv-<uuid>`).
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(format!("inv-{uuid}"))
    }
}
