//! Customers and distributors. One set of handlers serves both collections;
//! the router for each is layered with the [`PartyKind`] it manages.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroom_core::PartyId;
use stockroom_infra::Ledger;
use stockroom_parties::{PartyInput, PartyKind};

use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new().route(
        "/",
        get(list_parties)
            .post(create_party)
            .put(update_party)
            .delete(delete_party),
    )
}

pub async fn list_parties(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
    Extension(kind): Extension<PartyKind>,
) -> axum::response::Response {
    match ledger.list_parties(user.user_id(), kind).await {
        Ok(parties) => Json(parties.into_iter().map(dto::party_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::ledger_error_to_response(e, &format!("fetch {kind}s")),
    }
}

pub async fn create_party(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
    Extension(kind): Extension<PartyKind>,
    body: Result<Json<PartyInput>, JsonRejection>,
) -> axum::response::Response {
    let input = match dto::body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match ledger.create_party(user.user_id(), kind, input).await {
        Ok(party) => (StatusCode::CREATED, Json(dto::party_to_json(party))).into_response(),
        Err(e) => errors::ledger_error_to_response(e, &format!("create {kind}")),
    }
}

pub async fn update_party(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
    Extension(kind): Extension<PartyKind>,
    body: Result<Json<dto::UpdatePartyRequest>, JsonRejection>,
) -> axum::response::Response {
    let req = match dto::body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let id: PartyId = match dto::require_id(req.id.as_deref(), kind.label()) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match ledger.update_party(user.user_id(), kind, id, req.fields).await {
        Ok(party) => Json(dto::party_to_json(party)).into_response(),
        Err(e) => errors::ledger_error_to_response(e, &format!("update {kind}")),
    }
}

pub async fn delete_party(
    Extension(ledger): Extension<Arc<Ledger>>,
    Extension(user): Extension<UserContext>,
    Extension(kind): Extension<PartyKind>,
    body: Result<Json<dto::DeleteRequest>, JsonRejection>,
) -> axum::response::Response {
    let req = match dto::body(body) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let id: PartyId = match dto::require_id(req.id.as_deref(), kind.label()) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match ledger.delete_party(user.user_id(), kind, id).await {
        Ok(()) => Json(serde_json::json!({
            "message": format!("{} deleted successfully", kind.label()),
        }))
        .into_response(),
        Err(e) => errors::ledger_error_to_response(e, &format!("delete {kind}")),
    }
}
