//! Stock movement and low-stock rules.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult};

use crate::product::Product;

/// Threshold used by the dashboard when no rule is configured.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 100;

/// What a sale does when it asks for more units than are on hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Decrement unconditionally; stock may go negative (backorder).
    #[default]
    AllowNegative,
    /// Refuse the sale.
    Reject,
    /// Record the sale and floor stock at zero.
    Clamp,
}

impl StockPolicy {
    /// Compute on-hand stock after selling `sold` units out of `on_hand`.
    pub fn decrement(self, on_hand: i64, sold: i64) -> DomainResult<i64> {
        if sold <= 0 {
            return Err(DomainError::validation("quantity must be a positive integer"));
        }
        let remaining = on_hand
            .checked_sub(sold)
            .ok_or_else(|| DomainError::invariant("stock quantity out of range"))?;

        match self {
            StockPolicy::AllowNegative => Ok(remaining),
            StockPolicy::Clamp => Ok(remaining.max(0)),
            StockPolicy::Reject if remaining < 0 => Err(DomainError::invariant(format!(
                "insufficient stock: {on_hand} on hand, {sold} requested"
            ))),
            StockPolicy::Reject => Ok(remaining),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockPolicy::AllowNegative => "allow_negative",
            StockPolicy::Reject => "reject",
            StockPolicy::Clamp => "clamp",
        }
    }
}

impl FromStr for StockPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow_negative" | "allow" => Ok(StockPolicy::AllowNegative),
            "reject" => Ok(StockPolicy::Reject),
            "clamp" => Ok(StockPolicy::Clamp),
            other => Err(DomainError::validation(format!(
                "unknown stock policy '{other}' (expected allow_negative, reject or clamp)"
            ))),
        }
    }
}

/// When a product counts as low on stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowStockRule {
    /// `quantity` strictly below a fixed number of units, regardless of `min_quantity`.
    Fixed(i64),
    /// `quantity` strictly below the product's own `min_quantity`.
    MinQuantity,
}

impl Default for LowStockRule {
    fn default() -> Self {
        LowStockRule::Fixed(DEFAULT_LOW_STOCK_THRESHOLD)
    }
}

impl LowStockRule {
    pub fn is_low(&self, product: &Product) -> bool {
        match self {
            LowStockRule::Fixed(threshold) => product.quantity < *threshold,
            LowStockRule::MinQuantity => product.quantity < product.min_quantity,
        }
    }
}

impl FromStr for LowStockRule {
    type Err = DomainError;

    /// Accepts an integer threshold or the literal `min_quantity`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("min_quantity") {
            return Ok(LowStockRule::MinQuantity);
        }
        let threshold: i64 = s.parse().map_err(|_| {
            DomainError::validation(format!(
                "invalid low-stock threshold '{s}' (expected an integer or min_quantity)"
            ))
        })?;
        if threshold < 0 {
            return Err(DomainError::validation("low-stock threshold cannot be negative"));
        }
        Ok(LowStockRule::Fixed(threshold))
    }
}
