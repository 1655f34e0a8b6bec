//! Persistence port for items and the sale ledger.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use storekeep_core::{DomainError, ItemId};
use storekeep_inventory::Item;

use crate::sale::Sale;

/// Store-level error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The expected version no longer matches: a concurrent writer got there
    /// first. Callers re-read and retry.
    #[error("version conflict on item {item_id}")]
    Conflict { item_id: ItemId },

    /// The backend itself failed (connection, SQL, ...).
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl core::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { item_id } => {
                DomainError::conflict(format!("concurrent write on item {item_id}"))
            }
            StoreError::Backend(msg) => DomainError::Store(msg),
        }
    }
}

/// The persistence collaborator.
///
/// Writes against an item carry the caller's `expected_version`; the backend
/// applies them only if the stored version still matches and fails with
/// [`StoreError::Conflict`] otherwise. `commit_sale` persists the decremented
/// item and the new sale as one atomic unit: a crash between the two halves
/// must not be observable.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    /// All items, in stable id order.
    async fn list_items(&self) -> Result<Vec<Item>, StoreError>;

    /// Insert a fresh item. Fails on id collision.
    async fn insert_item(&self, item: Item) -> Result<(), StoreError>;

    /// Replace an existing item if `expected_version` still matches.
    async fn update_item(&self, expected_version: u64, item: Item) -> Result<(), StoreError>;

    /// Atomically persist the post-sale item state and append the sale.
    ///
    /// Both writes become visible together or not at all.
    async fn commit_sale(
        &self,
        expected_version: u64,
        item: Item,
        sale: Sale,
    ) -> Result<(), StoreError>;

    /// Sales recorded on `date`, in stable id order (ids are time-ordered, so
    /// this is insertion order).
    async fn list_sales_on(&self, date: NaiveDate) -> Result<Vec<Sale>, StoreError>;
}
