use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroom_core::SaleId;
use stockroom_infra::Ledger;
use stockroom_sales::SaleInput;

use crate::app::{dto, errors};
use crate::context::UserContext;

/// Sales are immutable once recorded: there is no PUT.
pub fn router() -> Router {
    Router::new().route("/", get(list_sales).post(create_sale).delete(delete_sale))
}

pub async fn list_sales(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match ledger.list_sales(user.user_id()).await {
        Ok(sales) => Json(sales.into_iter().map(dto::sale_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::ledger_error_to_response(e, "fetch sales"),
    }
}

pub async fn create_sale(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<SaleInput>, JsonRejection>,
) -> axum::response::Response {
    let input = match dto::body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match ledger.create_sale(user.user_id(), input).await {
        Ok(listing) => (StatusCode::CREATED, Json(dto::sale_to_json(listing))).into_response(),
        Err(e) => errors::ledger_error_to_response(e, "create sale"),
    }
}

pub async fn delete_sale(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<dto::DeleteRequest>, JsonRejection>,
) -> axum::response::Response {
    let req = match dto::body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let id: SaleId = match dto::require_id(req.id.as_deref(), "Sale") {
        Ok(id) => id,
        Err(res) => return res,
    };

    match ledger.delete_sale(user.user_id(), id).await {
        Ok(()) => Json(serde_json::json!({ "message": "Sale deleted successfully" })).into_response(),
        Err(e) => errors::ledger_error_to_response(e, "delete sale"),
    }
}
