use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use stockroom_core::DomainError;
use stockroom_parties::{Party, PartyInput};
use stockroom_products::{Product, ProductInput};
use stockroom_sales::{DashboardSummary, SaleListing};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// `PUT /products`: the product fields plus the id of the record to replace.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: ProductInput,
}

/// `PUT /customers` and `PUT /distributor`.
#[derive(Debug, Deserialize)]
pub struct UpdatePartyRequest {
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: PartyInput,
}

/// Body of every `DELETE`.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub id: Option<String>,
}

// -------------------------
// Request helpers
// -------------------------

/// Unwrap a JSON body, turning any rejection (bad syntax, wrong types,
/// missing content type) into a 400.
pub fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_body",
            rejection.body_text(),
        )),
    }
}

/// Parse the `id` a PUT/DELETE body must carry. `label` is the entity name
/// used in the message, e.g. "Product ID is required".
pub fn require_id<I>(id: Option<&str>, label: &str) -> Result<I, axum::response::Response>
where
    I: FromStr<Err = DomainError>,
{
    let id = id.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        errors::json_error(StatusCode::BAD_REQUEST, "validation_error", format!("{label} ID is required"))
    })?;
    id.parse::<I>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

// -------------------------
// Response mapping
// -------------------------

pub fn product_to_json(p: Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "name": p.name,
        "description": p.description,
        "sku": p.sku,
        "price": p.price,
        "quantity": p.quantity,
        "minQuantity": p.min_quantity,
        "userId": p.owner.to_string(),
        "createdAt": p.created_at,
        "updatedAt": p.updated_at,
    })
}

pub fn party_to_json(p: Party) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "name": p.name,
        "email": p.email,
        "phone": p.phone,
        "address": p.address,
        "userId": p.owner.to_string(),
        "createdAt": p.created_at,
        "updatedAt": p.updated_at,
    })
}

/// A sale with the names of what it references; a reference whose record
/// was deleted renders as `null`.
pub fn sale_to_json(l: SaleListing) -> serde_json::Value {
    let sale = l.sale;
    serde_json::json!({
        "id": sale.id.to_string(),
        "productId": sale.product_id.to_string(),
        "customerId": sale.customer_id.to_string(),
        "quantity": sale.quantity,
        "totalAmount": sale.total_amount,
        "userId": sale.owner.to_string(),
        "createdAt": sale.created_at,
        "product": l.product_name.map(|name| serde_json::json!({ "name": name })),
        "customer": l.customer_name.map(|name| serde_json::json!({ "name": name })),
    })
}

/// `totalSales` is a JSON number here, unlike per-record amounts.
pub fn dashboard_to_json(s: DashboardSummary) -> serde_json::Value {
    let total_sales = s
        .total_sales
        .normalize()
        .to_string()
        .parse::<serde_json::Number>()
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null);
    serde_json::json!({
        "totalProducts": s.total_products,
        "totalCustomers": s.total_customers,
        "totalSales": total_sales,
        "lowStockItems": s.low_stock_items,
    })
}
