use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use stockroom_core::{DomainError, PartyId, ProductId, SaleId, User, UserId};
use stockroom_parties::{Party, PartyDraft, PartyKind};
use stockroom_products::{Product, ProductDraft, StockPolicy};
use stockroom_sales::{SaleDraft, SaleListing};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A looked-up record does not exist for this owner.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A domain rule refused the write (e.g. the stock policy rejected a sale).
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for one deployment's inventory records.
///
/// Every method is scoped by `owner`; rows belonging to another user behave
/// exactly like rows that do not exist. Update and delete report whether a
/// row matched rather than failing, so callers decide what "missing" means.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Insert the user, or refresh name/email if the id is already known.
    async fn upsert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn list_products(&self, owner: UserId) -> Result<Vec<Product>, StoreError>;
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;
    async fn update_product(
        &self,
        owner: UserId,
        id: ProductId,
        draft: ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError>;
    async fn delete_product(&self, owner: UserId, id: ProductId) -> Result<bool, StoreError>;

    async fn list_parties(&self, owner: UserId, kind: PartyKind) -> Result<Vec<Party>, StoreError>;
    async fn insert_party(&self, party: &Party) -> Result<(), StoreError>;
    async fn update_party(
        &self,
        owner: UserId,
        kind: PartyKind,
        id: PartyId,
        draft: PartyDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Party>, StoreError>;
    async fn delete_party(&self, owner: UserId, kind: PartyKind, id: PartyId) -> Result<bool, StoreError>;

    /// All sales of `owner`, newest first, joined with product and customer names.
    async fn list_sales(&self, owner: UserId) -> Result<Vec<SaleListing>, StoreError>;

    /// Record a sale and decrement the product's stock as one atomic unit.
    ///
    /// Either both the sale row and the new quantity become visible, or
    /// neither does. Concurrent sales of the same product are serialized.
    async fn record_sale(
        &self,
        owner: UserId,
        draft: &SaleDraft,
        policy: StockPolicy,
        now: DateTime<Utc>,
    ) -> Result<SaleListing, StoreError>;

    /// Remove a sale record. Stock is left as it is.
    async fn delete_sale(&self, owner: UserId, id: SaleId) -> Result<bool, StoreError>;
}
