use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockroom_core::{Owned, PartyId, ProductId, SaleId, User, UserId};
use stockroom_parties::{Party, PartyDraft, PartyKind};
use stockroom_products::{Product, ProductDraft, StockPolicy};
use stockroom_sales::{Sale, SaleDraft, SaleListing};

use super::r#trait::{InventoryStore, StoreError};

// Ids are UUIDv7, so BTreeMap iteration order is creation order.
#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    products: BTreeMap<ProductId, Product>,
    parties: BTreeMap<PartyId, Party>,
    sales: BTreeMap<SaleId, Sale>,
}

impl State {
    fn listing(&self, sale: &Sale) -> SaleListing {
        SaleListing {
            sale: sale.clone(),
            product_name: self.products.get(&sale.product_id).map(|p| p.name.clone()),
            customer_name: self.parties.get(&sale.customer_id).map(|c| c.name.clone()),
        }
    }

    fn require_user(&self, id: UserId) -> Result<(), StoreError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::NotFound("user"))
        }
    }
}

/// In-memory inventory store.
///
/// Intended for tests/dev. A single lock guards all records, which makes
/// `record_sale` trivially atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait]
impl InventoryStore for InMemoryStore {
    async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        self.write()?.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn list_products(&self, owner: UserId) -> Result<Vec<Product>, StoreError> {
        let state = self.read()?;
        Ok(state
            .products
            .values()
            .filter(|p| p.owner() == owner)
            .cloned()
            .collect())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.require_user(product.owner)?;
        state.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(
        &self,
        owner: UserId,
        id: ProductId,
        draft: ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError> {
        let mut state = self.write()?;
        match state.products.get_mut(&id) {
            Some(product) if product.owner() == owner => {
                product.revise(draft, now);
                Ok(Some(product.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_product(&self, owner: UserId, id: ProductId) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        if state.products.get(&id).is_some_and(|p| p.owner() == owner) {
            state.products.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn list_parties(&self, owner: UserId, kind: PartyKind) -> Result<Vec<Party>, StoreError> {
        let state = self.read()?;
        Ok(state
            .parties
            .values()
            .filter(|p| p.owner() == owner && p.kind == kind)
            .cloned()
            .collect())
    }

    async fn insert_party(&self, party: &Party) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.require_user(party.owner)?;
        state.parties.insert(party.id, party.clone());
        Ok(())
    }

    async fn update_party(
        &self,
        owner: UserId,
        kind: PartyKind,
        id: PartyId,
        draft: PartyDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Party>, StoreError> {
        let mut state = self.write()?;
        match state.parties.get_mut(&id) {
            Some(party) if party.owner() == owner && party.kind == kind => {
                party.revise(draft, now);
                Ok(Some(party.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_party(&self, owner: UserId, kind: PartyKind, id: PartyId) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        if state
            .parties
            .get(&id)
            .is_some_and(|p| p.owner() == owner && p.kind == kind)
        {
            state.parties.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn list_sales(&self, owner: UserId) -> Result<Vec<SaleListing>, StoreError> {
        let state = self.read()?;
        let mut sales: Vec<&Sale> = state.sales.values().filter(|s| s.owner() == owner).collect();
        sales.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(sales.into_iter().map(|s| state.listing(s)).collect())
    }

    async fn record_sale(
        &self,
        owner: UserId,
        draft: &SaleDraft,
        policy: StockPolicy,
        now: DateTime<Utc>,
    ) -> Result<SaleListing, StoreError> {
        let mut state = self.write()?;
        state.require_user(owner)?;

        let is_customer = state
            .parties
            .get(&draft.customer_id)
            .is_some_and(|c| c.owner() == owner && c.kind == PartyKind::Customer);
        if !is_customer {
            return Err(StoreError::NotFound("customer"));
        }

        let product = match state.products.get(&draft.product_id) {
            Some(p) if p.owner() == owner => p,
            _ => return Err(StoreError::NotFound("product")),
        };

        // Compute everything before touching state so a refusal changes nothing.
        let remaining = policy.decrement(product.quantity, draft.quantity)?;
        let sale = Sale::record(SaleId::new(), owner, draft, product, now)?;

        if let Some(product) = state.products.get_mut(&draft.product_id) {
            product.quantity = remaining;
            product.updated_at = now;
        }
        state.sales.insert(sale.id, sale.clone());
        Ok(state.listing(&sale))
    }

    async fn delete_sale(&self, owner: UserId, id: SaleId) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        if state.sales.get(&id).is_some_and(|s| s.owner() == owner) {
            state.sales.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}
