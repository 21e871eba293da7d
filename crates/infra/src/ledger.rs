//! Inventory ledger: the application service in front of an [`InventoryStore`].
//!
//! Every operation takes the acting user explicitly. Inputs are validated
//! here before any store call, so a rejected request never touches storage.
//!
//! ```text
//! request input
//!   ↓
//! 1. validate (pure, per-entity rules)
//!   ↓
//! 2. store call scoped to the acting user
//!   ↓
//! 3. map "no row matched" to NotFound
//! ```

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use stockroom_core::{DomainError, PartyId, ProductId, SaleId, User, UserId};
use stockroom_parties::{Party, PartyInput, PartyKind};
use stockroom_products::{LowStockRule, Product, ProductInput, StockPolicy};
use stockroom_sales::{DashboardSummary, SaleInput, SaleListing};

use crate::store::{InventoryStore, StoreError};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed or incomplete input (deterministic).
    #[error("{0}")]
    Validation(String),
    /// The referenced record does not exist for the acting user.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// A stock policy or value-range rule refused the operation.
    #[error("{0}")]
    InvariantViolation(String),
    #[error(transparent)]
    Store(StoreError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<DomainError> for LedgerError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => LedgerError::Validation(msg),
            DomainError::InvalidId(msg) => LedgerError::Validation(msg),
            DomainError::InvariantViolation(msg) => LedgerError::InvariantViolation(msg),
            DomainError::NotFound(entity) => LedgerError::NotFound(entity),
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(entity) => LedgerError::NotFound(entity),
            StoreError::Domain(err) => err.into(),
            other => LedgerError::Store(other),
        }
    }
}

/// Behaviour switches read from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerSettings {
    pub stock_policy: StockPolicy,
    pub low_stock: LowStockRule,
}

#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn InventoryStore>,
    settings: LedgerSettings,
}

impl core::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ledger").field("settings", &self.settings).finish_non_exhaustive()
    }
}

impl Ledger {
    pub fn new(store: Arc<dyn InventoryStore>, settings: LedgerSettings) -> Self {
        Self { store, settings }
    }

    /// Make sure the authenticated user exists so owned records can reference it.
    ///
    /// Writes only when the user is new or its name/email changed; returns
    /// whether a write happened.
    pub async fn ensure_user(&self, user: &User) -> LedgerResult<bool> {
        if self.store.find_user(user.id).await?.as_ref() == Some(user) {
            return Ok(false);
        }
        self.store.upsert_user(user).await?;
        tracing::debug!(user_id = %user.id, "user registered");
        Ok(true)
    }

    pub async fn user(&self, id: UserId) -> LedgerResult<User> {
        self.store.find_user(id).await?.ok_or(LedgerError::NotFound("user"))
    }

    // ---------------------------------------------------------------------
    // Products
    // ---------------------------------------------------------------------

    pub async fn list_products(&self, owner: UserId) -> LedgerResult<Vec<Product>> {
        Ok(self.store.list_products(owner).await?)
    }

    pub async fn create_product(&self, owner: UserId, input: ProductInput) -> LedgerResult<Product> {
        let draft = input.validate()?;
        let product = Product::create(ProductId::new(), owner, draft, Utc::now());
        self.store.insert_product(&product).await?;
        tracing::info!(owner = %owner, product_id = %product.id, sku = %product.sku, "product created");
        Ok(product)
    }

    pub async fn update_product(&self, owner: UserId, id: ProductId, input: ProductInput) -> LedgerResult<Product> {
        let draft = input.validate()?;
        self.store
            .update_product(owner, id, draft, Utc::now())
            .await?
            .ok_or(LedgerError::NotFound("product"))
    }

    /// Past sales keep their `product_id`; nothing cascades.
    pub async fn delete_product(&self, owner: UserId, id: ProductId) -> LedgerResult<()> {
        if !self.store.delete_product(owner, id).await? {
            return Err(LedgerError::NotFound("product"));
        }
        tracing::info!(owner = %owner, product_id = %id, "product deleted");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Customers and distributors
    // ---------------------------------------------------------------------

    pub async fn list_parties(&self, owner: UserId, kind: PartyKind) -> LedgerResult<Vec<Party>> {
        Ok(self.store.list_parties(owner, kind).await?)
    }

    pub async fn create_party(&self, owner: UserId, kind: PartyKind, input: PartyInput) -> LedgerResult<Party> {
        let draft = input.validate()?;
        let party = Party::create(PartyId::new(), owner, kind, draft, Utc::now());
        self.store.insert_party(&party).await?;
        tracing::info!(owner = %owner, kind = %kind, party_id = %party.id, "party created");
        Ok(party)
    }

    pub async fn update_party(
        &self,
        owner: UserId,
        kind: PartyKind,
        id: PartyId,
        input: PartyInput,
    ) -> LedgerResult<Party> {
        let draft = input.validate()?;
        self.store
            .update_party(owner, kind, id, draft, Utc::now())
            .await?
            .ok_or(LedgerError::NotFound(kind.as_str()))
    }

    pub async fn delete_party(&self, owner: UserId, kind: PartyKind, id: PartyId) -> LedgerResult<()> {
        if !self.store.delete_party(owner, kind, id).await? {
            return Err(LedgerError::NotFound(kind.as_str()));
        }
        tracing::info!(owner = %owner, kind = %kind, party_id = %id, "party deleted");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Sales
    // ---------------------------------------------------------------------

    pub async fn list_sales(&self, owner: UserId) -> LedgerResult<Vec<SaleListing>> {
        Ok(self.store.list_sales(owner).await?)
    }

    /// Record a sale and decrement stock atomically, per the configured policy.
    pub async fn create_sale(&self, owner: UserId, input: SaleInput) -> LedgerResult<SaleListing> {
        let draft = input.validate()?;
        let listing = self
            .store
            .record_sale(owner, &draft, self.settings.stock_policy, Utc::now())
            .await?;
        tracing::info!(
            owner = %owner,
            sale_id = %listing.sale.id,
            product_id = %listing.sale.product_id,
            quantity = listing.sale.quantity,
            total_amount = %listing.sale.total_amount,
            policy = self.settings.stock_policy.as_str(),
            "sale recorded"
        );
        Ok(listing)
    }

    /// Removes the record only; stock is not restored.
    pub async fn delete_sale(&self, owner: UserId, id: SaleId) -> LedgerResult<()> {
        if !self.store.delete_sale(owner, id).await? {
            return Err(LedgerError::NotFound("sale"));
        }
        tracing::info!(owner = %owner, sale_id = %id, "sale deleted");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Dashboard
    // ---------------------------------------------------------------------

    /// Recompute the dashboard from current records. The three reads run concurrently.
    pub async fn dashboard_summary(&self, owner: UserId) -> LedgerResult<DashboardSummary> {
        let (products, customers, sales) = tokio::join!(
            self.store.list_products(owner),
            self.store.list_parties(owner, PartyKind::Customer),
            self.store.list_sales(owner),
        );
        let (products, customers, sales) = (products?, customers?, sales?);

        Ok(DashboardSummary::compute(
            &products,
            &customers,
            sales.iter().map(|listing| &listing.sale),
            self.settings.low_stock,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use crate::store::InMemoryStore;

    fn user(name: &str) -> User {
        User {
            id: UserId::new(),
            name: name.to_string(),
            email: format!("{}@shop.test", name.to_lowercase()),
        }
    }

    async fn ledger_with(settings: LedgerSettings) -> (Ledger, User) {
        let ledger = Ledger::new(Arc::new(InMemoryStore::new()), settings);
        let owner = user("Owner");
        ledger.ensure_user(&owner).await.unwrap();
        (ledger, owner)
    }

    async fn ledger() -> (Ledger, User) {
        ledger_with(LedgerSettings::default()).await
    }

    fn product_input(quantity: i64) -> ProductInput {
        ProductInput {
            name: Some("Widget".to_string()),
            description: None,
            sku: Some("W-1".to_string()),
            price: Some(Decimal::from(10)),
            quantity: Some(quantity),
            min_quantity: None,
        }
    }

    fn party_input(name: &str) -> PartyInput {
        PartyInput {
            name: Some(name.to_string()),
            email: Some("buyer@acme.test".to_string()),
            phone: None,
            address: None,
        }
    }

    fn sale_input(product: &Product, customer: &Party, quantity: i64) -> SaleInput {
        SaleInput {
            product_id: Some(product.id.to_string()),
            customer_id: Some(customer.id.to_string()),
            quantity: Some(quantity),
            total_amount: None,
        }
    }

    async fn stock_of(ledger: &Ledger, owner: UserId, id: ProductId) -> i64 {
        ledger
            .list_products(owner)
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.id == id)
            .map(|p| p.quantity)
            .unwrap()
    }

    #[tokio::test]
    async fn sale_decrements_stock_and_prices_from_product() {
        let (ledger, owner) = ledger().await;
        let product = ledger.create_product(owner.id, product_input(500)).await.unwrap();
        let customer = ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap();

        let listing = ledger.create_sale(owner.id, sale_input(&product, &customer, 50)).await.unwrap();

        assert_eq!(listing.sale.total_amount, Decimal::from(500));
        assert_eq!(listing.product_name.as_deref(), Some("Widget"));
        assert_eq!(listing.customer_name.as_deref(), Some("Acme"));
        assert_eq!(stock_of(&ledger, owner.id, product.id).await, 450);
    }

    #[tokio::test]
    async fn oversell_goes_negative_by_default() {
        let (ledger, owner) = ledger().await;
        let product = ledger.create_product(owner.id, product_input(3)).await.unwrap();
        let customer = ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap();

        ledger.create_sale(owner.id, sale_input(&product, &customer, 5)).await.unwrap();
        assert_eq!(stock_of(&ledger, owner.id, product.id).await, -2);
    }

    #[tokio::test]
    async fn reject_policy_leaves_no_trace() {
        let (ledger, owner) = ledger_with(LedgerSettings {
            stock_policy: StockPolicy::Reject,
            ..LedgerSettings::default()
        })
        .await;
        let product = ledger.create_product(owner.id, product_input(3)).await.unwrap();
        let customer = ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap();

        let err = ledger.create_sale(owner.id, sale_input(&product, &customer, 5)).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvariantViolation(_)));
        assert_eq!(stock_of(&ledger, owner.id, product.id).await, 3);
        assert!(ledger.list_sales(owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clamp_policy_floors_stock() {
        let (ledger, owner) = ledger_with(LedgerSettings {
            stock_policy: StockPolicy::Clamp,
            ..LedgerSettings::default()
        })
        .await;
        let product = ledger.create_product(owner.id, product_input(3)).await.unwrap();
        let customer = ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap();

        ledger.create_sale(owner.id, sale_input(&product, &customer, 5)).await.unwrap();
        assert_eq!(stock_of(&ledger, owner.id, product.id).await, 0);
    }

    #[tokio::test]
    async fn failed_sale_leaves_stock_unchanged() {
        let (ledger, owner) = ledger().await;
        let product = ledger.create_product(owner.id, product_input(10)).await.unwrap();
        let distributor = ledger
            .create_party(owner.id, PartyKind::Distributor, party_input("Supply Co"))
            .await
            .unwrap();

        // A distributor id is not a customer.
        let err = ledger.create_sale(owner.id, sale_input(&product, &distributor, 1)).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound("customer")));

        let mut bad = sale_input(&product, &distributor, 1);
        bad.quantity = Some(0);
        assert!(matches!(ledger.create_sale(owner.id, bad).await, Err(LedgerError::Validation(_))));

        assert_eq!(stock_of(&ledger, owner.id, product.id).await, 10);
        assert!(ledger.list_sales(owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sale_for_unknown_product_is_not_found() {
        let (ledger, owner) = ledger().await;
        let customer = ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap();
        let input = SaleInput {
            product_id: Some(ProductId::new().to_string()),
            customer_id: Some(customer.id.to_string()),
            quantity: Some(1),
            total_amount: None,
        };
        assert!(matches!(ledger.create_sale(owner.id, input).await, Err(LedgerError::NotFound("product"))));
    }

    #[tokio::test]
    async fn deleting_sale_does_not_restore_stock() {
        let (ledger, owner) = ledger().await;
        let product = ledger.create_product(owner.id, product_input(20)).await.unwrap();
        let customer = ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap();
        let listing = ledger.create_sale(owner.id, sale_input(&product, &customer, 5)).await.unwrap();

        ledger.delete_sale(owner.id, listing.sale.id).await.unwrap();
        assert_eq!(stock_of(&ledger, owner.id, product.id).await, 15);
        assert!(matches!(
            ledger.delete_sale(owner.id, listing.sale.id).await,
            Err(LedgerError::NotFound("sale"))
        ));
    }

    #[tokio::test]
    async fn deleted_product_keeps_past_sales_without_name() {
        let (ledger, owner) = ledger().await;
        let product = ledger.create_product(owner.id, product_input(20)).await.unwrap();
        let customer = ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap();
        ledger.create_sale(owner.id, sale_input(&product, &customer, 5)).await.unwrap();

        ledger.delete_product(owner.id, product.id).await.unwrap();
        let sales = ledger.list_sales(owner.id).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].sale.product_id, product.id);
        assert_eq!(sales[0].product_name, None);
        assert_eq!(sales[0].customer_name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn sales_are_listed_newest_first() {
        let (ledger, owner) = ledger().await;
        let product = ledger.create_product(owner.id, product_input(20)).await.unwrap();
        let customer = ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap();
        let first = ledger.create_sale(owner.id, sale_input(&product, &customer, 1)).await.unwrap();
        let second = ledger.create_sale(owner.id, sale_input(&product, &customer, 2)).await.unwrap();

        let ids: Vec<SaleId> = ledger.list_sales(owner.id).await.unwrap().iter().map(|l| l.sale.id).collect();
        assert_eq!(ids, vec![second.sale.id, first.sale.id]);
    }

    #[tokio::test]
    async fn records_are_isolated_per_user() {
        let (ledger, alice) = ledger().await;
        let bob = user("Bob");
        ledger.ensure_user(&bob).await.unwrap();

        let product = ledger.create_product(alice.id, product_input(10)).await.unwrap();
        let customer = ledger.create_party(alice.id, PartyKind::Customer, party_input("Acme")).await.unwrap();

        assert!(ledger.list_products(bob.id).await.unwrap().is_empty());
        assert!(ledger.list_parties(bob.id, PartyKind::Customer).await.unwrap().is_empty());
        assert!(matches!(
            ledger.update_product(bob.id, product.id, product_input(99)).await,
            Err(LedgerError::NotFound("product"))
        ));
        assert!(matches!(
            ledger.delete_party(bob.id, PartyKind::Customer, customer.id).await,
            Err(LedgerError::NotFound("customer"))
        ));

        // Bob cannot sell Alice's stock to Alice's customer.
        let err = ledger.create_sale(bob.id, sale_input(&product, &customer, 1)).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
        assert_eq!(stock_of(&ledger, alice.id, product.id).await, 10);
    }

    #[tokio::test]
    async fn customers_and_distributors_are_separate_collections() {
        let (ledger, owner) = ledger().await;
        let distributor = ledger
            .create_party(owner.id, PartyKind::Distributor, party_input("Supply Co"))
            .await
            .unwrap();

        assert!(ledger.list_parties(owner.id, PartyKind::Customer).await.unwrap().is_empty());
        assert!(matches!(
            ledger
                .update_party(owner.id, PartyKind::Customer, distributor.id, party_input("X"))
                .await,
            Err(LedgerError::NotFound("customer"))
        ));

        let renamed = ledger
            .update_party(owner.id, PartyKind::Distributor, distributor.id, party_input("Supply Ltd"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Supply Ltd");
        assert_eq!(renamed.created_at, distributor.created_at);
    }

    #[tokio::test]
    async fn invalid_product_input_is_rejected_before_storage() {
        let (ledger, owner) = ledger().await;
        let mut bad = product_input(10);
        bad.name = None;
        assert!(matches!(ledger.create_product(owner.id, bad).await, Err(LedgerError::Validation(_))));
        assert!(ledger.list_products(owner.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_for_unknown_user_are_not_found() {
        let ledger = Ledger::new(Arc::new(InMemoryStore::new()), LedgerSettings::default());
        let err = ledger.create_product(UserId::new(), product_input(1)).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound("user")));
    }

    #[tokio::test]
    async fn empty_dashboard_is_all_zero() {
        let (ledger, owner) = ledger().await;
        let summary = ledger.dashboard_summary(owner.id).await.unwrap();
        assert_eq!(summary.total_products, 0);
        assert_eq!(summary.total_customers, 0);
        assert_eq!(summary.total_sales, Decimal::ZERO);
        assert_eq!(summary.low_stock_items, 0);
    }

    #[tokio::test]
    async fn dashboard_reflects_current_records() {
        let (ledger, owner) = ledger().await;
        let widget = ledger.create_product(owner.id, product_input(500)).await.unwrap();
        ledger.create_product(owner.id, product_input(20)).await.unwrap();
        let customer = ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap();
        ledger
            .create_party(owner.id, PartyKind::Distributor, party_input("Supply Co"))
            .await
            .unwrap();

        // 500 - 450 = 50 leaves the widget under the default threshold too.
        ledger.create_sale(owner.id, sale_input(&widget, &customer, 450)).await.unwrap();

        let summary = ledger.dashboard_summary(owner.id).await.unwrap();
        assert_eq!(summary.total_products, 2);
        assert_eq!(summary.total_customers, 1);
        assert_eq!(summary.total_sales, Decimal::from(4500));
        assert_eq!(summary.low_stock_items, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sales_of_one_product_all_apply() {
        let (ledger, owner) = ledger().await;
        let product = ledger.create_product(owner.id, product_input(500)).await.unwrap();
        let customer = ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap();

        let owner_id = owner.id;
        let handles: Vec<_> = (0..50)
            .map(|_| {
                let ledger = ledger.clone();
                let input = sale_input(&product, &customer, 3);
                tokio::spawn(async move { ledger.create_sale(owner_id, input).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(stock_of(&ledger, owner.id, product.id).await, 500 - 50 * 3);
        assert_eq!(ledger.list_sales(owner.id).await.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn dashboard_counts_follow_deletes() {
        let (ledger, owner) = ledger().await;
        let first = ledger.create_product(owner.id, product_input(500)).await.unwrap();
        ledger.create_product(owner.id, product_input(5)).await.unwrap();
        let acme = ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap();
        ledger.create_party(owner.id, PartyKind::Customer, party_input("Globex")).await.unwrap();

        ledger.delete_product(owner.id, first.id).await.unwrap();
        ledger.delete_party(owner.id, PartyKind::Customer, acme.id).await.unwrap();

        let summary = ledger.dashboard_summary(owner.id).await.unwrap();
        assert_eq!(summary.total_products, 1);
        assert_eq!(summary.total_customers, 1);
        assert_eq!(summary.low_stock_items, 1);
    }

    #[derive(Debug, Clone, Copy)]
    enum Step {
        AddProduct,
        RemoveProduct(usize),
        AddCustomer,
        RemoveCustomer(usize),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            Just(Step::AddProduct),
            any::<usize>().prop_map(Step::RemoveProduct),
            Just(Step::AddCustomer),
            any::<usize>().prop_map(Step::RemoveCustomer),
        ]
    }

    proptest! {
        #[test]
        fn dashboard_counts_match_live_records(steps in prop::collection::vec(step(), 0..40)) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (total_products, total_customers, expected) = rt.block_on(async {
                let (ledger, owner) = ledger().await;
                let mut products = Vec::new();
                let mut customers = Vec::new();
                for step in steps {
                    match step {
                        Step::AddProduct => {
                            products.push(ledger.create_product(owner.id, product_input(1)).await.unwrap().id);
                        }
                        Step::RemoveProduct(i) if !products.is_empty() => {
                            let id = products.remove(i % products.len());
                            ledger.delete_product(owner.id, id).await.unwrap();
                        }
                        Step::AddCustomer => {
                            customers.push(
                                ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap().id,
                            );
                        }
                        Step::RemoveCustomer(i) if !customers.is_empty() => {
                            let id = customers.remove(i % customers.len());
                            ledger.delete_party(owner.id, PartyKind::Customer, id).await.unwrap();
                        }
                        _ => {}
                    }
                }
                let summary = ledger.dashboard_summary(owner.id).await.unwrap();
                (summary.total_products, summary.total_customers, (products.len(), customers.len()))
            });
            prop_assert_eq!(total_products, expected.0);
            prop_assert_eq!(total_customers, expected.1);
        }
    }

    #[tokio::test]
    async fn ensure_user_writes_only_on_change() {
        let ledger = Ledger::new(Arc::new(InMemoryStore::new()), LedgerSettings::default());
        let mut owner = user("Owner");

        assert!(ledger.ensure_user(&owner).await.unwrap());
        assert!(!ledger.ensure_user(&owner).await.unwrap());

        owner.name = "Renamed".to_string();
        assert!(ledger.ensure_user(&owner).await.unwrap());
        assert_eq!(ledger.user(owner.id).await.unwrap().name, "Renamed");
    }

    #[tokio::test]
    async fn sale_for_unknown_user_is_not_found() {
        let (ledger, owner) = ledger().await;
        let product = ledger.create_product(owner.id, product_input(10)).await.unwrap();
        let customer = ledger.create_party(owner.id, PartyKind::Customer, party_input("Acme")).await.unwrap();

        let err = ledger
            .create_sale(UserId::new(), sale_input(&product, &customer, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound("user")));
    }
}
