//! Storage wiring: picks the store backend from configuration.

use std::sync::Arc;

use stockroom_infra::{InMemoryStore, InventoryStore, Ledger, PostgresStore};

use crate::config::AppConfig;

/// Build the ledger over Postgres when `DATABASE_URL` is set, else in memory.
pub async fn build_ledger(config: &AppConfig) -> Result<Ledger, stockroom_infra::StoreError> {
    let store: Arc<dyn InventoryStore> = match &config.database {
        Some(db) => {
            let store = PostgresStore::connect(&db.url, db.max_connections).await?;
            tracing::info!(max_connections = db.max_connections, "using postgres store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
            Arc::new(InMemoryStore::new())
        }
    };

    tracing::info!(
        stock_policy = config.ledger.stock_policy.as_str(),
        low_stock = ?config.ledger.low_stock,
        "ledger configured"
    );
    Ok(Ledger::new(store, config.ledger))
}
