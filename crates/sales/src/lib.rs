//! Sales module: recorded sales and the dashboard aggregate derived from them.
//!
//! Pure domain logic (no IO, no HTTP, no storage). Applying a sale to stock is
//! the store's job; the arithmetic lives in `stockroom_products::StockPolicy`.

pub mod dashboard;
pub mod sale;

pub use dashboard::DashboardSummary;
pub use sale::{Sale, SaleDraft, SaleInput, SaleListing};
