//! Application state snapshot.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vitrine_core::{AppMode, Timestamp};

use crate::cart::{Cart, CartItem};
use crate::product::{Product, ProductId};

/// Catalog filters applied to the browse view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub category: Option<String>,
}

impl Filters {
    pub fn matches(&self, product: &Product) -> bool {
        match &self.category {
            Some(category) => product.in_category(category),
            None => true,
        }
    }
}

/// Completed purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: Uuid,
    pub items: Vec<CartItem>,
    pub total_cents: u64,
    pub placed_at: Timestamp,
}

/// Canonical kiosk state, owned by the [`Store`](crate::Store)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationState {
    pub mode: AppMode,
    pub previous_mode: AppMode,
    pub cart: Cart,
    pub products: Vec<Product>,
    pub filters: Filters,
    /// Highlighted row in the cart view
    pub cart_active_index: usize,
    /// Coverflow position within the filtered catalog
    pub focused_index: usize,
    /// Product shown in the details view
    pub selected_product: Option<ProductId>,
    pub last_order: Option<OrderReceipt>,
}

impl ApplicationState {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            mode: AppMode::Browse,
            previous_mode: AppMode::Browse,
            cart: Cart::new(),
            products,
            filters: Filters::default(),
            cart_active_index: 0,
            focused_index: 0,
            selected_product: None,
            last_order: None,
        }
    }

    /// Products passing the current filters, in catalog order
    pub fn visible_products(&self) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| self.filters.matches(p))
            .collect()
    }

    /// Product under the coverflow focus, if any
    pub fn focused_product(&self) -> Option<&Product> {
        self.visible_products().get(self.focused_index).copied()
    }

    pub fn selected(&self) -> Option<&Product> {
        let id = self.selected_product.as_ref()?;
        self.product(id)
    }

    pub fn active_cart_item(&self) -> Option<&CartItem> {
        self.cart.get(self.cart_active_index)
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
