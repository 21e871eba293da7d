use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_infra::LedgerError;

/// Map a ledger failure to a response. `action` names the attempted
/// operation (e.g. "create product") and is only surfaced for store failures.
pub fn ledger_error_to_response(err: LedgerError, action: &str) -> axum::response::Response {
    match err {
        LedgerError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        LedgerError::NotFound(entity) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{} not found", capitalize(entity)))
        }
        LedgerError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        LedgerError::Store(e) => {
            tracing::error!(action, error = %e, "store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({
                    "error": "store_error",
                    "message": format!("Failed to {action}"),
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
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

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
