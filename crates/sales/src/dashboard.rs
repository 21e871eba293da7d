//! Dashboard aggregate, recomputed from current records on every read.

use rust_decimal::Decimal;

use stockroom_parties::{Party, PartyKind};
use stockroom_products::{LowStockRule, Product};

use crate::sale::Sale;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_products: usize,
    pub total_customers: usize,
    pub total_sales: Decimal,
    pub low_stock_items: usize,
}

impl DashboardSummary {
    /// Derive the summary from one user's products, parties and sales.
    ///
    /// Only parties of kind customer are counted. A sale amount whose addition
    /// would overflow contributes nothing instead of failing the aggregate.
    pub fn compute<'a>(
        products: &[Product],
        parties: &[Party],
        sales: impl IntoIterator<Item = &'a Sale>,
        rule: LowStockRule,
    ) -> Self {
        let total_sales = sales.into_iter().fold(Decimal::ZERO, |sum, sale| {
            sum.checked_add(sale.total_amount).unwrap_or(sum)
        });

        Self {
            total_products: products.len(),
            total_customers: parties.iter().filter(|p| p.kind == PartyKind::Customer).count(),
            total_sales,
            low_stock_items: products.iter().filter(|p| rule.is_low(p)).count(),
        }
    }
}
