use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use clinicops_core::{AppointmentId, ClinicId, InvoiceId, Sku};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------
//
// Fields are optional so that a missing value becomes a 400 naming the field
// rather than a generic extraction failure.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicRequest {
    pub clinic_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub clinic_id: Option<String>,
    pub command: Option<String>,
}

/// A patient given either as a plain name or as a record with a name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PatientRef {
    Name(String),
    Record { name: String },
}

impl PatientRef {
    pub fn name(&self) -> &str {
        match self {
            PatientRef::Name(n) | PatientRef::Record { name: n } => n,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub clinic_id: Option<String>,
    pub patient: Option<PatientRef>,
    pub scheduled_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemBody {
    pub sku: Option<String>,
    #[serde(alias = "quantity")]
    pub qty: Option<u64>,
    pub name: Option<String>,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddInventoryRequest {
    pub clinic_id: Option<String>,
    pub item: Option<InventoryItemBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecrementInventoryRequest {
    pub clinic_id: Option<String>,
    pub sku: Option<String>,
    pub amount: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub clinic_id: Option<String>,
    pub case_id: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequest {
    pub invoice_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetWhatsappRequest {
    pub clinic_id: Option<String>,
    pub number: Option<String>,
}

/// Working hours are stored as the JSON document the client sent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetHoursRequest {
    pub clinic_id: Option<String>,
    pub hours: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentForm {
    pub patient_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub clinic_id: Option<String>,
    pub appointment: Option<AppointmentForm>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelAppointmentRequest {
    pub clinic_id: Option<String>,
    pub appointment_id: Option<String>,
}

// -------------------------
// Body extractor
// -------------------------

/// `Json` whose rejections use the API's `{error, message}` shape.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = axum::response::Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(errors::json_rejection_to_response(rejection)),
        }
    }
}

// -------------------------
// Field extraction
// -------------------------

/// A present, non-blank string field.
pub fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, axum::response::Response> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(errors::missing_field(field)),
    }
}

pub fn clinic_id(value: &Option<String>) -> Result<ClinicId, axum::response::Response> {
    parse_id(value, "clinicId")
}

pub fn sku(value: &Option<String>) -> Result<Sku, axum::response::Response> {
    parse_id(value, "sku")
}

pub fn invoice_id(value: &Option<String>) -> Result<InvoiceId, axum::response::Response> {
    parse_id(value, "invoiceId")
}

pub fn appointment_id(value: &Option<String>) -> Result<AppointmentId, axum::response::Response> {
    parse_id(value, "appointmentId")
}

/// A clinic id taken from the URL path.
pub fn path_clinic_id(raw: String) -> Result<ClinicId, axum::response::Response> {
    parse_id(&Some(raw), "clinicId")
}

fn parse_id<T>(value: &Option<String>, field: &'static str) -> Result<T, axum::response::Response>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    required(value, field)?.parse().map_err(|e: T::Err| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string())
    })
}
