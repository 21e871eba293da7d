//! Infrastructure layer: storage backends and the ledger service that fronts them.

pub mod ledger;
pub mod store;

pub use ledger::{Ledger, LedgerError, LedgerResult, LedgerSettings};
pub use store::{InMemoryStore, InventoryStore, PostgresStore, StoreError};
