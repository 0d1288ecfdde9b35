use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use clinicops_agents::{ClinicRepository, RepositoryError};
use clinicops_clinic::Appointment;
use clinicops_core::{AppointmentId, ClinicId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/book-appointment", post(book_appointment))
        .route("/cancel-appointment", post(cancel_appointment))
        .route("/appointments/:clinic_id", get(list_appointments))
}

/// Store an appointment from the detailed booking form; no agents run.
pub async fn book_appointment(
    Extension(services): Extension<Arc<AppServices>>,
    dto::ApiJson(body): dto::ApiJson<dto::BookAppointmentRequest>,
) -> axum::response::Response {
    let clinic_id = match dto::clinic_id(&body.clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(form) = body.appointment else {
        return errors::missing_field("appointment");
    };
    let patient_name = match dto::required(&form.patient_name, "patientName") {
        Ok(v) => v.to_string(),
        Err(resp) => return resp,
    };
    let phone = match dto::required(&form.phone, "phone") {
        Ok(v) => v.to_string(),
        Err(resp) => return resp,
    };
    let date = match dto::required(&form.date, "date") {
        Ok(v) => v.to_string(),
        Err(resp) => return resp,
    };

    let id = AppointmentId::from_uuid(Uuid::now_v7());
    let appointment = Appointment::booked(id.clone(), clinic_id.clone(), patient_name.clone())
        .with_contact(patient_name, phone, form.email.filter(|e| !e.trim().is_empty()))
        .scheduled_for(date)
        .at_time(form.time)
        .created(services.now());

    if let Err(e) = services.store().add_appointment(appointment) {
        return errors::repository_error_to_response(e);
    }
    info!(clinic = %clinic_id, appointment = %id, "appointment booked from form");

    appointments_response(&services, &clinic_id)
}

pub async fn cancel_appointment(
    Extension(services): Extension<Arc<AppServices>>,
    dto::ApiJson(body): dto::ApiJson<dto::CancelAppointmentRequest>,
) -> axum::response::Response {
    let clinic_id = match dto::clinic_id(&body.clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let appointment_id = match dto::appointment_id(&body.appointment_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.store().cancel_appointment(&clinic_id, &appointment_id) {
        Ok(appointment) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "appointment": appointment })),
        )
            .into_response(),
        Err(RepositoryError::NotFound(_)) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "appointment not found")
        }
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn list_appointments(
    Extension(services): Extension<Arc<AppServices>>,
    Path(clinic_id): Path<String>,
) -> axum::response::Response {
    match dto::path_clinic_id(clinic_id) {
        Ok(clinic_id) => appointments_response(&services, &clinic_id),
        Err(resp) => resp,
    }
}

fn appointments_response(
    services: &AppServices,
    clinic_id: &ClinicId,
) -> axum::response::Response {
    match services.store().appointments_by_clinic(clinic_id) {
        Ok(appointments) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "appointments": appointments })),
        )
            .into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
