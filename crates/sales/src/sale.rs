use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use storekeep_core::{ItemId, Money, SaleId};

/// An immutable record of units sold against an item.
///
/// Constructed exactly once per accepted sale request and never updated; the
/// total is fixed at the item's price at sale time, so later price edits do
/// not reach back into the ledger. No mutating methods exist on purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    id: SaleId,
    item_id: ItemId,
    quantity: i64,
    total: Money,
    sale_date: NaiveDate,
}

impl Sale {
    pub fn new(id: SaleId, item_id: ItemId, quantity: i64, total: Money, sale_date: NaiveDate) -> Self {
        Self {
            id,
            item_id,
            quantity,
            total,
            sale_date,
        }
    }

    pub fn id(&self) -> SaleId {
        self.id
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn sale_date(&self) -> NaiveDate {
        self.sale_date
    }
}
