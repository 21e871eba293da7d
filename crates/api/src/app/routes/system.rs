use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use stockroom_infra::Ledger;

use crate::app::errors;
use crate::context::UserContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match ledger.user(user.user_id()).await {
        Ok(u) => Json(serde_json::json!({
            "id": u.id.to_string(),
            "name": u.name,
            "email": u.email,
        }))
        .into_response(),
        Err(e) => errors::ledger_error_to_response(e, "fetch user"),
    }
}
