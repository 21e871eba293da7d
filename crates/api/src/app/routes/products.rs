use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroom_core::ProductId;
use stockroom_infra::Ledger;
use stockroom_products::ProductInput;

use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new().route(
        "/",
        get(list_products)
            .post(create_product)
            .put(update_product)
            .delete(delete_product),
    )
}

pub async fn list_products(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match ledger.list_products(user.user_id()).await {
        Ok(products) => Json(products.into_iter().map(dto::product_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::ledger_error_to_response(e, "fetch products"),
    }
}

pub async fn create_product(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> axum::response::Response {
    let input = match dto::body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match ledger.create_product(user.user_id(), input).await {
        Ok(product) => (StatusCode::CREATED, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::ledger_error_to_response(e, "create product"),
    }
}

pub async fn update_product(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<dto::UpdateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    let req = match dto::body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let id: ProductId = match dto::require_id(req.id.as_deref(), "Product") {
        Ok(id) => id,
        Err(res) => return res,
    };

    match ledger.update_product(user.user_id(), id, req.fields).await {
        Ok(product) => Json(dto::product_to_json(product)).into_response(),
        Err(e) => errors::ledger_error_to_response(e, "update product"),
    }
}

pub async fn delete_product(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<dto::DeleteRequest>, JsonRejection>,
) -> axum::response::Response {
    let req = match dto::body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let id: ProductId = match dto::require_id(req.id.as_deref(), "Product") {
        Ok(id) => id,
        Err(res) => return res,
    };

    match ledger.delete_product(user.user_id(), id).await {
        Ok(()) => Json(serde_json::json!({ "message": "Product deleted successfully" })).into_response(),
        Err(e) => errors::ledger_error_to_response(e, "delete product"),
    }
}
