//! The sale transaction path.

use std::sync::Arc;

use storekeep_core::{DomainError, DomainResult, ItemId, SaleId};

use crate::sale::Sale;
use crate::store::{Store, StoreError};

/// How many contended commits to absorb before giving up.
const MAX_COMMIT_ATTEMPTS: u32 = 8;

/// Validates and applies sales against inventory.
///
/// All stock-mutating traffic goes through this manager; it is the only
/// writer of `Item.quantity` outside the explicit update operation. Within
/// one call the order is fixed: read item, check stock, decrement, append
/// sale, with the last two as one atomic store commit. Across concurrent calls
/// on the same item the versioned commit serializes writers: a loser
/// re-reads current state and retries, so stock can never be decremented
/// past zero by interleaving.
#[derive(Clone)]
pub struct SaleManager {
    store: Arc<dyn Store>,
}

impl SaleManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record a sale of `quantity` units of `item_id` at today's date.
    ///
    /// Fails with `NotFound` for an unknown item, `InsufficientStock` when
    /// the request exceeds stock on hand; in both cases nothing is written.
    pub async fn record_sale(&self, item_id: ItemId, quantity: i64) -> DomainResult<Sale> {
        if quantity <= 0 {
            return Err(DomainError::validation(format!(
                "sale quantity must be positive: {quantity}"
            )));
        }

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let item = self
                .store
                .get_item(item_id)
                .await?
                .ok_or(DomainError::NotFound)?;

            let expected_version = item.version();
            // Total is fixed at the price in effect right now; later price
            // edits never reach back into the ledger.
            let total = item.price().times(quantity)?;

            let mut updated = item;
            updated.deduct(quantity)?;

            let sale = Sale::new(
                SaleId::new(),
                item_id,
                quantity,
                total,
                chrono::Local::now().date_naive(),
            );

            match self
                .store
                .commit_sale(expected_version, updated, sale.clone())
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        item_id = %item_id,
                        quantity,
                        total = %total,
                        "sale recorded"
                    );
                    return Ok(sale);
                }
                Err(StoreError::Conflict { .. }) => {
                    tracing::debug!(item_id = %item_id, attempt, "commit lost the race, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::conflict(format!(
            "sale on item {item_id} kept losing to concurrent writers"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use storekeep_core::Money;
    use storekeep_inventory::{Item, ItemUpdate};

    async fn seeded(name: &str, quantity: i64, price_cents: i64) -> (Arc<MemoryStore>, ItemId) {
        let store = Arc::new(MemoryStore::new());
        let item = Item::new(
            ItemId::new(),
            name,
            quantity,
            Money::from_cents(price_cents).unwrap(),
        )
        .unwrap();
        let id = item.id();
        store.insert_item(item).await.unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn records_sale_and_decrements_stock() {
        // Widget at quantity 5, $2.00: selling 3 yields a $6.00 sale and 2 left.
        let (store, id) = seeded("Widget", 5, 200).await;
        let manager = SaleManager::new(store.clone());

        let sale = manager.record_sale(id, 3).await.unwrap();
        assert_eq!(sale.quantity(), 3);
        assert_eq!(sale.total().cents(), 600);

        let item = store.get_item(id).await.unwrap().unwrap();
        assert_eq!(item.quantity(), 2);
    }

    #[tokio::test]
    async fn insufficient_stock_leaves_store_untouched() {
        let (store, id) = seeded("Widget", 2, 200).await;
        let manager = SaleManager::new(store.clone());

        let err = manager.record_sale(id, 5).await.unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));

        let item = store.get_item(id).await.unwrap().unwrap();
        assert_eq!(item.quantity(), 2);
        let today = chrono::Local::now().date_naive();
        assert!(store.list_sales_on(today).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let manager = SaleManager::new(store);
        let err = manager.record_sale(ItemId::new(), 1).await.unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[tokio::test]
    async fn rejects_non_positive_quantities() {
        let (store, id) = seeded("Widget", 5, 200).await;
        let manager = SaleManager::new(store);
        assert!(manager.record_sale(id, 0).await.is_err());
        assert!(manager.record_sale(id, -3).await.is_err());
    }

    #[tokio::test]
    async fn totals_survive_later_price_changes() {
        let (store, id) = seeded("Widget", 10, 200).await;
        let manager = SaleManager::new(store.clone());

        let sale = manager.record_sale(id, 3).await.unwrap();
        assert_eq!(sale.total().cents(), 600);

        let item = store.get_item(id).await.unwrap().unwrap();
        let version = item.version();
        let mut edited = item;
        edited
            .apply_update(ItemUpdate {
                name: "Widget".to_string(),
                quantity: edited.quantity(),
                price: Money::from_cents(999).unwrap(),
            })
            .unwrap();
        store.update_item(version, edited).await.unwrap();

        let today = chrono::Local::now().date_naive();
        let ledger = store.list_sales_on(today).await.unwrap();
        assert_eq!(ledger[0].total().cents(), 600);

        // New sales pick up the new price.
        let sale2 = manager.record_sale(id, 2).await.unwrap();
        assert_eq!(sale2.total().cents(), 1998);
    }

    #[tokio::test]
    async fn sequential_sales_drain_stock_exactly_to_zero() {
        let (store, id) = seeded("Widget", 5, 200).await;
        let manager = SaleManager::new(store.clone());

        let mut ok = 0;
        let mut insufficient = 0;
        for _ in 0..10 {
            match manager.record_sale(id, 1).await {
                Ok(_) => ok += 1,
                Err(DomainError::InsufficientStock { .. }) => insufficient += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 5);
        assert_eq!(insufficient, 5);
        assert_eq!(store.get_item(id).await.unwrap().unwrap().quantity(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sales_never_oversell() {
        let (store, id) = seeded("Widget", 10, 200).await;
        let manager = SaleManager::new(store.clone());

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..20 {
            let manager = manager.clone();
            tasks.spawn(async move { manager.record_sale(id, 1).await });
        }

        let mut ok: i64 = 0;
        while let Some(res) = tasks.join_next().await {
            match res.unwrap() {
                Ok(_) => ok += 1,
                Err(DomainError::InsufficientStock { .. }) | Err(DomainError::Conflict(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        // Every committed sale is matched by exactly one stock decrement.
        let item = store.get_item(id).await.unwrap().unwrap();
        assert!(ok <= 10);
        assert_eq!(item.quantity(), 10 - ok);
        assert!(item.quantity() >= 0);

        let today = chrono::Local::now().date_naive();
        assert_eq!(store.list_sales_on(today).await.unwrap().len(), ok as usize);
    }
}
