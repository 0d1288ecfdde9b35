use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use clinicops_infra::{dashboard, monthly_report};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/set-whatsapp", post(set_whatsapp))
        .route("/set-hours", post(set_hours))
        .route("/dashboard/:clinic_id", get(clinic_dashboard))
        .route("/reports/monthly/:clinic_id", get(clinic_monthly_report))
}

pub async fn set_whatsapp(
    Extension(services): Extension<Arc<AppServices>>,
    dto::ApiJson(body): dto::ApiJson<dto::SetWhatsappRequest>,
) -> axum::response::Response {
    let clinic_id = match dto::clinic_id(&body.clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let number = match dto::required(&body.number, "number") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.store().set_whatsapp(&clinic_id, number) {
        Ok(clinic) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "whatsapp": clinic.whatsapp_number })),
        )
            .into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn set_hours(
    Extension(services): Extension<Arc<AppServices>>,
    dto::ApiJson(body): dto::ApiJson<dto::SetHoursRequest>,
) -> axum::response::Response {
    let clinic_id = match dto::clinic_id(&body.clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let hours = match body.hours {
        Some(h) if !h.is_null() => h,
        _ => return errors::missing_field("hours"),
    };

    match services.store().set_working_hours(&clinic_id, hours.to_string()) {
        Ok(_) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn clinic_dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    Path(clinic_id): Path<String>,
) -> axum::response::Response {
    let clinic_id = match dto::path_clinic_id(clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match dashboard(services.store(), &clinic_id) {
        Ok(board) => (StatusCode::OK, Json(board)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn clinic_monthly_report(
    Extension(services): Extension<Arc<AppServices>>,
    Path(clinic_id): Path<String>,
) -> axum::response::Response {
    let clinic_id = match dto::path_clinic_id(clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match monthly_report(services.store(), &clinic_id, services.now()) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
