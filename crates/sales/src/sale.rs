use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, Owned, PartyId, ProductId, SaleId, UserId};
use stockroom_products::Product;

/// A recorded sale of one product to one customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    pub id: SaleId,
    pub owner: UserId,
    pub product_id: ProductId,
    pub customer_id: PartyId,
    pub quantity: i64,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Build the sale row for `draft` against the product being sold.
    ///
    /// A draft without an explicit total is priced at `product.price * quantity`.
    pub fn record(
        id: SaleId,
        owner: UserId,
        draft: &SaleDraft,
        product: &Product,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let total_amount = match draft.total_amount {
            Some(total) => total,
            None => product.price_for(draft.quantity)?,
        };
        Ok(Self {
            id,
            owner,
            product_id: draft.product_id,
            customer_id: draft.customer_id,
            quantity: draft.quantity,
            total_amount,
            created_at: now,
        })
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> SaleId {
        self.id
    }
}

impl Owned for Sale {
    fn owner(&self) -> UserId {
        self.owner
    }
}

/// A sale joined with the display names of what it references.
///
/// Names are `None` when the product or customer was deleted after the sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleListing {
    pub sale: Sale,
    pub product_name: Option<String>,
    pub customer_name: Option<String>,
}

/// Unvalidated sale fields as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleInput {
    pub product_id: Option<String>,
    pub customer_id: Option<String>,
    pub quantity: Option<i64>,
    pub total_amount: Option<Decimal>,
}

/// Sale fields that passed validation. References are not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleDraft {
    pub product_id: ProductId,
    pub customer_id: PartyId,
    pub quantity: i64,
    pub total_amount: Option<Decimal>,
}

impl SaleInput {
    pub fn validate(self) -> DomainResult<SaleDraft> {
        let product_id: ProductId = self
            .product_id
            .as_deref()
            .ok_or_else(|| DomainError::validation("productId is required"))?
            .parse()?;
        let customer_id: PartyId = self
            .customer_id
            .as_deref()
            .ok_or_else(|| DomainError::validation("customerId is required"))?
            .parse()?;

        let quantity = match self.quantity {
            Some(q) if q > 0 => q,
            Some(_) => return Err(DomainError::validation("quantity must be a positive integer")),
            None => return Err(DomainError::validation("quantity is required")),
        };

        if let Some(total) = self.total_amount {
            if total < Decimal::ZERO {
                return Err(DomainError::validation("totalAmount cannot be negative"));
            }
        }

        Ok(SaleDraft {
            product_id,
            customer_id,
            quantity,
            total_amount: self.total_amount,
        })
    }
}
