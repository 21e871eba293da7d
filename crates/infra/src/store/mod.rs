//! Storage boundary for products, parties and sales.
//!
//! Two implementations share one contract: [`InMemoryStore`] for tests and
//! local runs, [`PostgresStore`] for deployments.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::{InventoryStore, StoreError};
