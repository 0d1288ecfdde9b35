use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde_json::json;
use tracing::info;

use clinicops_agents::AgentKind;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/run-appointment", post(run_appointment))
        .route("/run-revenue", post(run_revenue))
        .route("/run-case", post(run_case))
        .route("/run-inventory", post(run_inventory))
        .route("/run-all", post(run_all))
        .route("/run", post(run_all))
        .route("/command", post(command))
}

async fn run_appointment(
    services: Extension<Arc<AppServices>>,
    body: dto::ApiJson<dto::ClinicRequest>,
) -> axum::response::Response {
    run_one(services, body, AgentKind::Appointment)
}

async fn run_revenue(
    services: Extension<Arc<AppServices>>,
    body: dto::ApiJson<dto::ClinicRequest>,
) -> axum::response::Response {
    run_one(services, body, AgentKind::Revenue)
}

async fn run_case(
    services: Extension<Arc<AppServices>>,
    body: dto::ApiJson<dto::ClinicRequest>,
) -> axum::response::Response {
    run_one(services, body, AgentKind::Case)
}

async fn run_inventory(
    services: Extension<Arc<AppServices>>,
    body: dto::ApiJson<dto::ClinicRequest>,
) -> axum::response::Response {
    run_one(services, body, AgentKind::Inventory)
}

/// Agent failures come back as `{agent, status: "error", error}` inside `data`.
fn run_one(
    Extension(services): Extension<Arc<AppServices>>,
    dto::ApiJson(body): dto::ApiJson<dto::ClinicRequest>,
    kind: AgentKind,
) -> axum::response::Response {
    let clinic_id = match dto::clinic_id(&body.clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    info!(agent = kind.type_name(), clinic = %clinic_id, "agent run requested");
    let outcome = services.agents().run_outcome(kind, &clinic_id);
    (StatusCode::OK, Json(json!({ "ok": true, "data": outcome }))).into_response()
}

pub async fn run_all(
    Extension(services): Extension<Arc<AppServices>>,
    dto::ApiJson(body): dto::ApiJson<dto::ClinicRequest>,
) -> axum::response::Response {
    let clinic_id = match dto::clinic_id(&body.clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let outcome = services.agents().run_all(&clinic_id);
    (StatusCode::OK, Json(json!({ "ok": true, "data": outcome }))).into_response()
}

pub async fn command(
    Extension(services): Extension<Arc<AppServices>>,
    dto::ApiJson(body): dto::ApiJson<dto::CommandRequest>,
) -> axum::response::Response {
    let clinic_id = match dto::clinic_id(&body.clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(resp) = dto::required(&body.command, "command") {
        return resp;
    }
    let command = body.command.as_deref().unwrap_or_default();

    match services.agents().command_center().execute(&clinic_id, command) {
        Ok(result) => (StatusCode::OK, Json(json!({ "ok": true, "data": result }))).into_response(),
        Err(e) => errors::agent_error_to_response(e),
    }
}
