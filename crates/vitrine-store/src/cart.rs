//! Shopping cart entries and quantity arithmetic.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::product::{Product, ProductId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub qty: u32,
}

impl CartItem {
    pub fn subtotal_cents(&self) -> u64 {
        self.product.price_cents * self.qty as u64
    }
}

/// Result of decrementing a cart row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartChange {
    /// Quantity went down and the row stays
    Decremented { qty: u32 },
    /// Quantity reached zero and the row was removed
    Removed,
}

/// Ordered cart. Each product appears at most once; quantities are never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&CartItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, product: &ProductId) -> Option<usize> {
        self.items.iter().position(|item| &item.product.id == product)
    }

    pub fn quantity_of(&self, product: &ProductId) -> u32 {
        self.position(product)
            .map(|i| self.items[i].qty)
            .unwrap_or(0)
    }

    /// Total number of units across all rows
    pub fn unit_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |units, item| units.saturating_add(item.qty))
    }

    pub fn total_cents(&self) -> u64 {
        self.items.iter().map(CartItem::subtotal_cents).sum()
    }

    /// Add `qty` units, merging with an existing row. Returns the row index and new quantity.
    pub fn add(&mut self, product: &Product, qty: u32) -> StoreResult<(usize, u32)> {
        if qty == 0 {
            return Err(StoreError::InvalidQuantity);
        }

        let current = self.quantity_of(&product.id);
        let requested = match current.checked_add(qty) {
            Some(requested) if requested <= product.stock => requested,
            requested => {
                return Err(StoreError::InsufficientStock {
                    product: product.id.clone(),
                    requested: requested.unwrap_or(u32::MAX),
                    available: product.stock,
                })
            }
        };

        match self.position(&product.id) {
            Some(index) => {
                self.items[index].qty = requested;
                Ok((index, requested))
            }
            None => {
                self.items.push(CartItem {
                    product: product.clone(),
                    qty,
                });
                Ok((self.items.len() - 1, qty))
            }
        }
    }

    /// Take one unit off a row, removing it when it reaches zero
    pub fn decrease(&mut self, index: usize) -> StoreResult<CartChange> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;

        if item.qty > 1 {
            item.qty -= 1;
            Ok(CartChange::Decremented { qty: item.qty })
        } else {
            self.items.remove(index);
            Ok(CartChange::Removed)
        }
    }

    pub fn remove(&mut self, index: usize) -> StoreResult<CartItem> {
        if index >= self.items.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) -> Vec<CartItem> {
        std::mem::take(&mut self.items)
    }
}
