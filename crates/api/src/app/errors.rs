use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use clinicops_agents::{AgentError, RepositoryError};
use clinicops_core::DomainError;

pub fn repository_error_to_response(err: RepositoryError) -> axum::response::Response {
    match err {
        RepositoryError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        RepositoryError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        RepositoryError::Unavailable(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn agent_error_to_response(err: AgentError) -> axum::response::Response {
    match err {
        AgentError::Repository(e) => repository_error_to_response(e),
        AgentError::ScopeViolation(clinic) => json_error(
            StatusCode::FORBIDDEN,
            "scope_violation",
            format!("clinic {clinic} is out of scope"),
        ),
        AgentError::InvalidInput(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        other => json_error(StatusCode::BAD_REQUEST, "validation_error", other.to_string()),
    }
}

/// Body extraction failures keep axum's status but use the JSON error shape.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    let code = match rejection {
        JsonRejection::MissingJsonContentType(_) => "unsupported_media_type",
        JsonRejection::JsonDataError(_) => "invalid_body",
        _ => "invalid_json",
    };
    json_error(rejection.status(), code, rejection.body_text())
}

pub fn missing_field(field: &'static str) -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        "missing_field",
        format!("{field} required"),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
