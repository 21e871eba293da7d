//! Postgres-backed inventory store.
//!
//! Every statement filters on `user_id`, so a row owned by someone else is
//! indistinguishable from a missing row.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|-----------------------|------------|
//! | Database (foreign key violation) | `23503` | `NotFound("user")` |
//! | Database (other) | Any other | `Database` |
//! | RowNotFound | N/A | `NotFound("record")` |
//! | PoolClosed / PoolTimedOut / Io | N/A | `Unavailable` |
//! | Other | N/A | `Database` |
//!
//! ## Sales
//!
//! `record_sale` locks the product row with `SELECT ... FOR UPDATE` inside a
//! transaction. Concurrent sales of one product therefore apply their
//! decrements one after another, and a failure at any step rolls back both
//! the sale insert and the stock update.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use stockroom_core::{PartyId, ProductId, SaleId, User, UserId};
use stockroom_parties::{Party, PartyDraft, PartyKind};
use stockroom_products::{Product, ProductDraft, StockPolicy};
use stockroom_sales::{Sale, SaleDraft, SaleListing};

use super::r#trait::{InventoryStore, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const PRODUCT_COLUMNS: &str =
    "id, user_id, name, description, sku, price, quantity, min_quantity, created_at, updated_at";
const PARTY_COLUMNS: &str = "id, user_id, kind, name, email, phone, address, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a pool against `url` and apply the schema.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Idempotent: every statement in the schema is `IF NOT EXISTS`.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PostgresStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email
            "#,
        )
        .bind(Uuid::from(user.id))
        .bind(&user.name)
        .bind(&user.email)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_user", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;

        row.map(|row| {
            Ok::<_, sqlx::Error>(User {
                id: UserId::from_uuid(row.try_get("id")?),
                name: row.try_get("name")?,
                email: row.try_get("email")?,
            })
        })
        .transpose()
        .map_err(|e| map_sqlx_error("find_user", e))
    }

    #[instrument(skip(self), fields(owner = %owner), err)]
    async fn list_products(&self, owner: UserId) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(Uuid::from(owner))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter()
            .map(product_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_products", e))
    }

    #[instrument(skip(self, product), fields(owner = %product.owner, product_id = %product.id), err)]
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(Uuid::from(product.id))
        .bind(Uuid::from(product.owner))
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(product.price)
        .bind(product.quantity)
        .bind(product.min_quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    #[instrument(skip(self, draft), fields(owner = %owner, product_id = %id), err)]
    async fn update_product(
        &self,
        owner: UserId,
        id: ProductId,
        draft: ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET name = $3, description = $4, sku = $5, price = $6,
                quantity = $7, min_quantity = $8, updated_at = $9
            WHERE id = $1 AND user_id = $2
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(Uuid::from(id))
        .bind(Uuid::from(owner))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.sku)
        .bind(draft.price)
        .bind(draft.quantity)
        .bind(draft.min_quantity)
        .bind(now)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        row.as_ref()
            .map(product_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("update_product", e))
    }

    #[instrument(skip(self), fields(owner = %owner, product_id = %id), err)]
    async fn delete_product(&self, owner: UserId, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
            .bind(Uuid::from(id))
            .bind(Uuid::from(owner))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(owner = %owner, kind = %kind), err)]
    async fn list_parties(&self, owner: UserId, kind: PartyKind) -> Result<Vec<Party>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {PARTY_COLUMNS} FROM parties WHERE user_id = $1 AND kind = $2 ORDER BY created_at ASC, id ASC"
        ))
        .bind(Uuid::from(owner))
        .bind(kind.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_parties", e))?;

        rows.iter()
            .map(party_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_parties", e))
    }

    #[instrument(skip(self, party), fields(owner = %party.owner, kind = %party.kind, party_id = %party.id), err)]
    async fn insert_party(&self, party: &Party) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO parties ({PARTY_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(Uuid::from(party.id))
        .bind(Uuid::from(party.owner))
        .bind(party.kind.as_str())
        .bind(&party.name)
        .bind(&party.email)
        .bind(&party.phone)
        .bind(&party.address)
        .bind(party.created_at)
        .bind(party.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_party", e))?;
        Ok(())
    }

    #[instrument(skip(self, draft), fields(owner = %owner, kind = %kind, party_id = %id), err)]
    async fn update_party(
        &self,
        owner: UserId,
        kind: PartyKind,
        id: PartyId,
        draft: PartyDraft,
        now: DateTime<Utc>,
    ) -> Result<Option<Party>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE parties
            SET name = $4, email = $5, phone = $6, address = $7, updated_at = $8
            WHERE id = $1 AND user_id = $2 AND kind = $3
            RETURNING {PARTY_COLUMNS}
            "#
        ))
        .bind(Uuid::from(id))
        .bind(Uuid::from(owner))
        .bind(kind.as_str())
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.phone)
        .bind(&draft.address)
        .bind(now)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_party", e))?;

        row.as_ref()
            .map(party_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("update_party", e))
    }

    #[instrument(skip(self), fields(owner = %owner, kind = %kind, party_id = %id), err)]
    async fn delete_party(&self, owner: UserId, kind: PartyKind, id: PartyId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM parties WHERE id = $1 AND user_id = $2 AND kind = $3")
            .bind(Uuid::from(id))
            .bind(Uuid::from(owner))
            .bind(kind.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_party", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(owner = %owner), err)]
    async fn list_sales(&self, owner: UserId) -> Result<Vec<SaleListing>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                s.id, s.user_id, s.product_id, s.customer_id,
                s.quantity, s.total_amount, s.created_at,
                p.name AS product_name,
                c.name AS customer_name
            FROM sales s
            LEFT JOIN products p ON p.id = s.product_id AND p.user_id = s.user_id
            LEFT JOIN parties c ON c.id = s.customer_id AND c.user_id = s.user_id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC, s.id DESC
            "#,
        )
        .bind(Uuid::from(owner))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_sales", e))?;

        rows.iter()
            .map(|row| {
                Ok::<_, sqlx::Error>(SaleListing {
                    sale: sale_from_row(row)?,
                    product_name: row.try_get("product_name")?,
                    customer_name: row.try_get("customer_name")?,
                })
            })
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_sales", e))
    }

    #[instrument(
        skip(self, draft),
        fields(owner = %owner, product_id = %draft.product_id, quantity = draft.quantity),
        err
    )]
    async fn record_sale(
        &self,
        owner: UserId,
        draft: &SaleDraft,
        policy: StockPolicy,
        now: DateTime<Utc>,
    ) -> Result<SaleListing, StoreError> {
        // Dropping `tx` on any early return rolls the transaction back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("record_sale", e))?;

        let user_exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = $1")
            .bind(Uuid::from(owner))
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("record_sale", e))?;
        if user_exists.is_none() {
            return Err(StoreError::NotFound("user"));
        }

        let product_row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND user_id = $2 FOR UPDATE"
        ))
        .bind(Uuid::from(draft.product_id))
        .bind(Uuid::from(owner))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("record_sale", e))?
        .ok_or(StoreError::NotFound("product"))?;
        let product = product_from_row(&product_row).map_err(|e| map_sqlx_error("record_sale", e))?;

        let customer_name: String = sqlx::query_scalar(
            "SELECT name FROM parties WHERE id = $1 AND user_id = $2 AND kind = 'customer'",
        )
        .bind(Uuid::from(draft.customer_id))
        .bind(Uuid::from(owner))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("record_sale", e))?
        .ok_or(StoreError::NotFound("customer"))?;

        let remaining = policy.decrement(product.quantity, draft.quantity)?;
        let sale = Sale::record(SaleId::new(), owner, draft, &product, now)?;

        sqlx::query(
            r#"
            INSERT INTO sales (id, user_id, product_id, customer_id, quantity, total_amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::from(sale.id))
        .bind(Uuid::from(owner))
        .bind(Uuid::from(sale.product_id))
        .bind(Uuid::from(sale.customer_id))
        .bind(sale.quantity)
        .bind(sale.total_amount)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("record_sale", e))?;

        sqlx::query("UPDATE products SET quantity = $1, updated_at = $2 WHERE id = $3 AND user_id = $4")
            .bind(remaining)
            .bind(now)
            .bind(Uuid::from(product.id))
            .bind(Uuid::from(owner))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("record_sale", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("record_sale", e))?;

        Ok(SaleListing {
            sale,
            product_name: Some(product.name),
            customer_name: Some(customer_name),
        })
    }

    #[instrument(skip(self), fields(owner = %owner, sale_id = %id), err)]
    async fn delete_sale(&self, owner: UserId, id: SaleId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1 AND user_id = $2")
            .bind(Uuid::from(id))
            .bind(Uuid::from(owner))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_sale", e))?;
        Ok(result.rows_affected() > 0)
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id")?),
        owner: UserId::from_uuid(row.try_get("user_id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        sku: row.try_get("sku")?,
        price: row.try_get("price")?,
        quantity: row.try_get("quantity")?,
        min_quantity: row.try_get("min_quantity")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn party_from_row(row: &PgRow) -> Result<Party, sqlx::Error> {
    let kind: String = row.try_get("kind")?;
    Ok(Party {
        id: PartyId::from_uuid(row.try_get("id")?),
        owner: UserId::from_uuid(row.try_get("user_id")?),
        kind: kind.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn sale_from_row(row: &PgRow) -> Result<Sale, sqlx::Error> {
    Ok(Sale {
        id: SaleId::from_uuid(row.try_get("id")?),
        owner: UserId::from_uuid(row.try_get("user_id")?),
        product_id: ProductId::from_uuid(row.try_get("product_id")?),
        customer_id: PartyId::from_uuid(row.try_get("customer_id")?),
        quantity: row.try_get("quantity")?,
        total_amount: row.try_get("total_amount")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // The only foreign keys point at users.
                Some("23503") => StoreError::NotFound("user"),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound("record"),
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("{operation}: {err}"))
        }
        other => StoreError::Database(format!("{operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Run with `DATABASE_URL=postgres://... cargo test -p stockroom-infra -- --ignored`.
    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn record_sale_for_unknown_user_is_user_not_found() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let store = PostgresStore::connect(&url, 2).await.unwrap();

        let draft = SaleDraft {
            product_id: ProductId::new(),
            customer_id: PartyId::new(),
            quantity: 1,
            total_amount: None,
        };
        let err = store
            .record_sale(UserId::new(), &draft, StockPolicy::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("user")));
    }
}
