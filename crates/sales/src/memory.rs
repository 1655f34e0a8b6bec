//! In-memory store backend for development and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use storekeep_core::ItemId;
use storekeep_inventory::Item;

use crate::sale::Sale;
use crate::store::{Store, StoreError};

/// Mutex-backed reference implementation of [`Store`].
///
/// The single lock serializes every read-check-write sequence, so the
/// versioned `commit_sale` check and both writes happen as one critical
/// section. Sales append in id order (ids are time-ordered).
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    items: HashMap<ItemId, Item>,
    sales: Vec<Sale>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.items.get(&id).cloned())
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut items: Vec<Item> = inner.items.values().cloned().collect();
        items.sort_by_key(|i| *i.id().as_uuid());
        Ok(items)
    }

    async fn insert_item(&self, item: Item) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if inner.items.contains_key(&item.id()) {
            return Err(StoreError::Conflict { item_id: item.id() });
        }
        inner.items.insert(item.id(), item);
        Ok(())
    }

    async fn update_item(&self, expected_version: u64, item: Item) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let current = inner
            .items
            .get(&item.id())
            .ok_or(StoreError::Conflict { item_id: item.id() })?;
        if current.version() != expected_version {
            return Err(StoreError::Conflict { item_id: item.id() });
        }
        inner.items.insert(item.id(), item);
        Ok(())
    }

    async fn commit_sale(
        &self,
        expected_version: u64,
        item: Item,
        sale: Sale,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let current = inner
            .items
            .get(&item.id())
            .ok_or(StoreError::Conflict { item_id: item.id() })?;
        if current.version() != expected_version {
            return Err(StoreError::Conflict { item_id: item.id() });
        }
        inner.items.insert(item.id(), item);
        inner.sales.push(sale);
        Ok(())
    }

    async fn list_sales_on(&self, date: NaiveDate) -> Result<Vec<Sale>, StoreError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut sales: Vec<Sale> = inner
            .sales
            .iter()
            .filter(|s| s.sale_date() == date)
            .cloned()
            .collect();
        sales.sort_by_key(|s| s.id());
        Ok(sales)
    }
}
