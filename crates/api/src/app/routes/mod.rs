use axum::{routing::get, Extension, Router};

use stockroom_parties::PartyKind;

pub mod dashboard;
pub mod parties;
pub mod products;
pub mod sales;
pub mod system;

/// Router for all authenticated (user-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/dashboard", get(dashboard::summary))
        .nest("/products", products::router())
        .nest(
            "/customers",
            parties::router().layer(Extension(PartyKind::Customer)),
        )
        .nest(
            "/distributor",
            parties::router().layer(Extension(PartyKind::Distributor)),
        )
        .nest("/sales", sales::router())
}
