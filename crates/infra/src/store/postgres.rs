//! Postgres-backed store.
//!
//! The `commit_sale` contract maps straight onto a SQL transaction: a
//! conditional `UPDATE … AND version = $n` detects concurrent writers, and
//! the sale insert rides in the same transaction, so the stock decrement and
//! the ledger append become visible together or not at all.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use storekeep_core::{ItemId, Money, SaleId};
use storekeep_inventory::Item;
use storekeep_sales::{Sale, Store, StoreError};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn item_from_row(row: &PgRow) -> Result<Item, StoreError> {
    let id: Uuid = row.try_get("id").map_err(StoreError::backend)?;
    let name: String = row.try_get("name").map_err(StoreError::backend)?;
    let quantity: i64 = row.try_get("quantity").map_err(StoreError::backend)?;
    let price_cents: i64 = row.try_get("price_cents").map_err(StoreError::backend)?;
    let version: i64 = row.try_get("version").map_err(StoreError::backend)?;

    let price = Money::from_cents(price_cents).map_err(StoreError::backend)?;
    Ok(Item::from_parts(
        ItemId::from_uuid(id),
        name,
        quantity,
        price,
        version as u64,
    ))
}

fn sale_from_row(row: &PgRow) -> Result<Sale, StoreError> {
    let id: Uuid = row.try_get("id").map_err(StoreError::backend)?;
    let item_id: Uuid = row.try_get("item_id").map_err(StoreError::backend)?;
    let quantity: i64 = row.try_get("quantity").map_err(StoreError::backend)?;
    let total_cents: i64 = row.try_get("total_cents").map_err(StoreError::backend)?;
    let sale_date: NaiveDate = row.try_get("sale_date").map_err(StoreError::backend)?;

    let total = Money::from_cents(total_cents).map_err(StoreError::backend)?;
    Ok(Sale::new(
        SaleId::from_uuid(id),
        ItemId::from_uuid(item_id),
        quantity,
        total,
        sale_date,
    ))
}

#[async_trait]
impl Store for PostgresStore {
    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, quantity, price_cents, version FROM items WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, quantity, price_cents, version FROM items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter().map(item_from_row).collect()
    }

    async fn insert_item(&self, item: Item) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO items (id, name, quantity, price_cents, version) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(item.id().as_uuid())
        .bind(item.name())
        .bind(item.quantity())
        .bind(item.price().cents())
        .bind(item.version() as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return StoreError::Conflict { item_id: item.id() };
                }
            }
            StoreError::backend(e)
        })?;
        Ok(())
    }

    async fn update_item(&self, expected_version: u64, item: Item) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE items SET name = $2, quantity = $3, price_cents = $4, version = $5 \
             WHERE id = $1 AND version = $6",
        )
        .bind(item.id().as_uuid())
        .bind(item.name())
        .bind(item.quantity())
        .bind(item.price().cents())
        .bind(item.version() as i64)
        .bind(expected_version as i64)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict { item_id: item.id() });
        }
        Ok(())
    }

    async fn commit_sale(
        &self,
        expected_version: u64,
        item: Item,
        sale: Sale,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        let updated = sqlx::query(
            "UPDATE items SET name = $2, quantity = $3, price_cents = $4, version = $5 \
             WHERE id = $1 AND version = $6",
        )
        .bind(item.id().as_uuid())
        .bind(item.name())
        .bind(item.quantity())
        .bind(item.price().cents())
        .bind(item.version() as i64)
        .bind(expected_version as i64)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls it back: no half-applied sale.
            return Err(StoreError::Conflict { item_id: item.id() });
        }

        sqlx::query(
            "INSERT INTO sales (id, item_id, quantity, total_cents, sale_date) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(sale.id().as_uuid())
        .bind(sale.item_id().as_uuid())
        .bind(sale.quantity())
        .bind(sale.total().cents())
        .bind(sale.sale_date())
        .execute(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        tx.commit().await.map_err(StoreError::backend)?;
        Ok(())
    }

    async fn list_sales_on(&self, date: NaiveDate) -> Result<Vec<Sale>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, item_id, quantity, total_cents, sale_date \
             FROM sales WHERE sale_date = $1 ORDER BY id",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter().map(sale_from_row).collect()
    }
}
