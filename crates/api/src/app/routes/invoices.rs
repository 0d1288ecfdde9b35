use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde_json::json;
use uuid::Uuid;

use clinicops_agents::RepositoryError;
use clinicops_core::{CaseId, InvoiceId};
use clinicops_invoicing::Invoice;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/invoice", post(issue_invoice))
        .route("/pay", post(pay_invoice))
}

pub async fn issue_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    dto::ApiJson(body): dto::ApiJson<dto::InvoiceRequest>,
) -> axum::response::Response {
    let clinic_id = match dto::clinic_id(&body.clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let case_id = match dto::required(&body.case_id, "caseId") {
        Ok(v) => CaseId::new(v),
        Err(resp) => return resp,
    };
    let Some(amount) = body.amount else {
        return errors::missing_field("amount");
    };

    let invoice = match Invoice::issue(
        InvoiceId::from_uuid(Uuid::now_v7()),
        clinic_id,
        case_id,
        amount,
        services.now(),
    ) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store().add_invoice(invoice.clone()) {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true, "invoice": invoice }))).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn pay_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    dto::ApiJson(body): dto::ApiJson<dto::PayRequest>,
) -> axum::response::Response {
    let invoice_id = match dto::invoice_id(&body.invoice_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.store().mark_invoice_paid(&invoice_id) {
        Ok(invoice) => {
            (StatusCode::OK, Json(json!({ "ok": true, "invoice": invoice }))).into_response()
        }
        Err(RepositoryError::NotFound(_)) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found")
        }
        Err(e) => errors::repository_error_to_response(e),
    }
}
