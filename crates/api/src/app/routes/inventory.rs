use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde_json::json;

use clinicops_agents::RepositoryError;
use clinicops_infra::Restock;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/add-inventory", post(add_inventory))
        .route("/decrement-inventory", post(decrement_inventory))
}

/// Add stock for a SKU (upsert; quantity accumulates).
pub async fn add_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    dto::ApiJson(body): dto::ApiJson<dto::AddInventoryRequest>,
) -> axum::response::Response {
    let clinic_id = match dto::clinic_id(&body.clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(item) = body.item else {
        return errors::missing_field("item");
    };
    let sku = match dto::sku(&item.sku) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if item.unit_price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "unitPrice must be a non-negative number",
        );
    }

    let restock = Restock {
        sku,
        quantity: item.qty.unwrap_or(0),
        name: item.name,
        unit_price: item.unit_price,
    };

    match services.store().add_inventory(&clinic_id, restock) {
        Ok(item) => (StatusCode::OK, Json(json!({ "ok": true, "item": item }))).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

/// Remove stock (default 1); never drops below zero.
pub async fn decrement_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    dto::ApiJson(body): dto::ApiJson<dto::DecrementInventoryRequest>,
) -> axum::response::Response {
    let clinic_id = match dto::clinic_id(&body.clinic_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let sku = match dto::sku(&body.sku) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .store()
        .decrement_inventory(&clinic_id, &sku, body.amount.unwrap_or(1))
    {
        Ok(item) => (StatusCode::OK, Json(json!({ "ok": true, "item": item }))).into_response(),
        Err(RepositoryError::NotFound(_)) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "item not found")
        }
        Err(e) => errors::repository_error_to_response(e),
    }
}
