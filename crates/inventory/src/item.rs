use serde::{Deserialize, Serialize};

use storekeep_core::{DomainError, DomainResult, ItemId, Money};

/// A stocked product.
///
/// `version` is the optimistic-concurrency token: every mutation bumps it, and
/// the store only applies a write whose expected version still matches. Items
/// are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    quantity: i64,
    price: Money,
    version: u64,
}

/// Full-field edit applied by the explicit update operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: String,
    pub quantity: i64,
    pub price: Money,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, quantity: i64, price: Money) -> DomainResult<Self> {
        let name = name.into();
        validate(&name, quantity)?;
        Ok(Self {
            id,
            name,
            quantity,
            price,
            version: 0,
        })
    }

    /// Rehydrate a persisted record without re-running creation validation.
    pub fn from_parts(id: ItemId, name: String, quantity: i64, price: Money, version: u64) -> Self {
        Self {
            id,
            name,
            quantity,
            price,
            version,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Remove `quantity` units of stock for a sale.
    ///
    /// Stock can never go negative: a request exceeding the quantity on hand
    /// fails with `InsufficientStock` and leaves the record untouched.
    pub fn deduct(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation(format!(
                "sale quantity must be positive: {quantity}"
            )));
        }
        if quantity > self.quantity {
            return Err(DomainError::InsufficientStock {
                requested: quantity,
                on_hand: self.quantity,
            });
        }
        self.quantity -= quantity;
        self.version += 1;
        Ok(())
    }

    /// Apply an explicit full-field edit.
    ///
    /// Past sale totals are fixed at sale time; a price edit here never
    /// rewrites them.
    pub fn apply_update(&mut self, update: ItemUpdate) -> DomainResult<()> {
        validate(&update.name, update.quantity)?;
        self.name = update.name;
        self.quantity = update.quantity;
        self.price = update.price;
        self.version += 1;
        Ok(())
    }

    /// Low-stock predicate against a policy threshold.
    pub fn is_below(&self, threshold: i64) -> bool {
        self.quantity < threshold
    }
}

fn validate(name: &str, quantity: i64) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if quantity < 0 {
        return Err(DomainError::validation(format!(
            "quantity cannot be negative: {quantity}"
        )));
    }
    Ok(())
}
