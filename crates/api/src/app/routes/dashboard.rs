use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use stockroom_infra::Ledger;

use crate::app::{dto, errors};
use crate::context::UserContext;

pub async fn summary(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match ledger.dashboard_summary(user.user_id()).await {
        Ok(summary) => Json(dto::dashboard_to_json(summary)).into_response(),
        Err(e) => errors::ledger_error_to_response(e, "compute dashboard"),
    }
}
