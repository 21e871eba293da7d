use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::validate::{non_negative, optional_text, required_text};
use stockroom_core::{DomainError, DomainResult, Entity, Owned, ProductId, UserId};

/// A catalogue product owned by one user.
///
/// `quantity` is the authoritative on-hand stock. It is signed because a
/// permissive [`crate::StockPolicy`] lets sales drive it below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub owner: UserId,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub price: Decimal,
    pub quantity: i64,
    pub min_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a new product from validated fields.
    pub fn create(id: ProductId, owner: UserId, draft: ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner,
            name: draft.name,
            description: draft.description,
            sku: draft.sku,
            price: draft.price,
            quantity: draft.quantity,
            min_quantity: draft.min_quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field (full-record edit, as the product form submits).
    pub fn revise(&mut self, draft: ProductDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.description = draft.description;
        self.sku = draft.sku;
        self.price = draft.price;
        self.quantity = draft.quantity;
        self.min_quantity = draft.min_quantity;
        self.updated_at = now;
    }

    /// Value of `quantity` units at the current list price.
    pub fn price_for(&self, quantity: i64) -> DomainResult<Decimal> {
        self.price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| DomainError::invariant("sale total out of range"))
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl Owned for Product {
    fn owner(&self) -> UserId {
        self.owner
    }
}

/// Unvalidated product fields as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub min_quantity: Option<i64>,
}

/// Product fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub price: Decimal,
    pub quantity: i64,
    pub min_quantity: i64,
}

impl ProductInput {
    /// Validate into a [`ProductDraft`].
    ///
    /// `name`, `sku`, `price` and `quantity` are required; `minQuantity`
    /// defaults to 0. Numeric fields must not be negative.
    pub fn validate(self) -> DomainResult<ProductDraft> {
        let name = required_text("name", self.name.as_deref())?;
        let sku = required_text("sku", self.sku.as_deref())?;
        let price = match self.price {
            Some(p) if p < Decimal::ZERO => {
                return Err(DomainError::validation("price cannot be negative"));
            }
            Some(p) => p,
            None => return Err(DomainError::validation("price is required")),
        };
        let quantity = non_negative("quantity", self.quantity)?;
        let min_quantity = non_negative("minQuantity", Some(self.min_quantity.unwrap_or(0)))?;

        Ok(ProductDraft {
            name,
            description: optional_text(self.description.as_deref()),
            sku,
            price,
            quantity,
            min_quantity,
        })
    }
}
