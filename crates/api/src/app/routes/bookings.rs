use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde_json::json;

use clinicops_infra::BookingRequest;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/book", post(book))
}

/// Store a booked appointment, then run the booking chain.
pub async fn book(
    Extension(services): Extension<Arc<AppServices>>,
    dto::ApiJson(body): dto::ApiJson<dto::BookRequest>,
) -> axum::response::Response {
    let clinic_id = match dto::clinic_id(&body.clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let patient = match body.patient.as_ref().map(dto::PatientRef::name).map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return errors::missing_field("patient"),
    };

    let request = BookingRequest {
        clinic_id,
        patient,
        scheduled_at: body.scheduled_at,
    };

    match services.booking().book(request) {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "appt": { "id": outcome.appointment_id },
                "agents": outcome,
            })),
        )
            .into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
