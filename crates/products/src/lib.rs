//! Products module: the catalogue record and the rules that move its stock.
//!
//! Pure domain logic (no IO, no HTTP, no storage).

pub mod product;
pub mod stock;

pub use product::{Product, ProductDraft, ProductInput};
pub use stock::{LowStockRule, StockPolicy, DEFAULT_LOW_STOCK_THRESHOLD};
