//! The reactive store: locked state plus a change broadcast.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use vitrine_core::{AppMode, Timestamp};

use crate::cart::{CartChange, CartItem};
use crate::error::{StoreError, StoreResult};
use crate::product::{Product, ProductId};
use crate::state::{ApplicationState, OrderReceipt};

/// Capacity of the change broadcast; slow subscribers see `Lagged` past this
pub const EVENT_CAPACITY: usize = 64;

/// Change notifications for UI subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreEvent {
    ModeChanged { from: AppMode, to: AppMode },
    CartChanged { rows: usize, units: u32, total_cents: u64, active_index: usize },
    CartIndexChanged { index: usize },
    FocusChanged { index: usize },
    FilterChanged { category: Option<String> },
    SelectionChanged { product: Option<ProductId> },
    OrderPlaced { order_id: Uuid, total_cents: u64 },
}

pub struct Store {
    state: RwLock<ApplicationState>,
    events: broadcast::Sender<StoreEvent>,
}

impl Store {
    pub fn new(products: Vec<Product>) -> Self {
        Self::with_state(ApplicationState::new(products))
    }

    pub fn with_state(state: ApplicationState) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(state),
            events,
        }
    }

    /// Snapshot of the current state
    pub fn get_state(&self) -> ApplicationState {
        self.state.read().clone()
    }

    /// Run a read-only query without cloning the whole state
    pub fn read<R>(&self, f: impl FnOnce(&ApplicationState) -> R) -> R {
        let state = self.state.read();
        f(&state)
    }

    pub fn mode(&self) -> AppMode {
        self.state.read().mode
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn cart_changed(state: &ApplicationState) -> StoreEvent {
        StoreEvent::CartChanged {
            rows: state.cart.len(),
            units: state.cart.unit_count(),
            total_cents: state.cart.total_cents(),
            active_index: state.cart_active_index,
        }
    }

    /// Keep the active row inside the cart after a removal
    fn clamp_active_index(state: &mut ApplicationState) {
        state.cart_active_index = match state.cart.len() {
            0 => 0,
            len => state.cart_active_index.min(len - 1),
        };
    }

    /// Add units of a catalog product. Returns the row's new quantity.
    pub fn add_to_cart(&self, product_id: &ProductId, qty: u32) -> StoreResult<u32> {
        let event = {
            let mut state = self.state.write();
            let product = state
                .product(product_id)
                .cloned()
                .ok_or_else(|| StoreError::UnknownProduct(product_id.clone()))?;
            let (_, new_qty) = state.cart.add(&product, qty)?;
            debug!("Cart: {} x{} (now {})", product_id, qty, new_qty);
            (Self::cart_changed(&state), new_qty)
        };
        self.publish(event.0);
        Ok(event.1)
    }

    /// Take one unit off a cart row; the row disappears at zero
    pub fn decrease_cart_item(&self, index: usize) -> StoreResult<CartChange> {
        let (change, event) = {
            let mut state = self.state.write();
            let change = state.cart.decrease(index)?;
            Self::clamp_active_index(&mut state);
            debug!("Cart row {} decreased: {:?}", index, change);
            (change, Self::cart_changed(&state))
        };
        self.publish(event);
        Ok(change)
    }

    pub fn remove_from_cart(&self, index: usize) -> StoreResult<CartItem> {
        let (removed, event) = {
            let mut state = self.state.write();
            let removed = state.cart.remove(index)?;
            Self::clamp_active_index(&mut state);
            debug!("Cart row {} removed ({})", index, removed.product.id);
            (removed, Self::cart_changed(&state))
        };
        self.publish(event);
        Ok(removed)
    }

    /// Switch mode, remembering the one we left. Returns whether anything changed.
    pub fn set_mode(&self, mode: AppMode) -> bool {
        let from = {
            let mut state = self.state.write();
            if state.mode == mode {
                return false;
            }
            let from = state.mode;
            state.previous_mode = from;
            state.mode = mode;
            from
        };
        debug!("Mode {} -> {}", from, mode);
        self.publish(StoreEvent::ModeChanged { from, to: mode });
        true
    }

    pub fn set_cart_active_index(&self, index: usize) -> StoreResult<()> {
        {
            let mut state = self.state.write();
            let len = state.cart.len();
            if index >= len && !(len == 0 && index == 0) {
                return Err(StoreError::IndexOutOfRange { index, len });
            }
            if state.cart_active_index == index {
                return Ok(());
            }
            state.cart_active_index = index;
        }
        self.publish(StoreEvent::CartIndexChanged { index });
        Ok(())
    }

    /// Move the coverflow focus within the filtered catalog
    pub fn set_focused_index(&self, index: usize) -> StoreResult<()> {
        {
            let mut state = self.state.write();
            let len = state.visible_products().len();
            if index >= len && !(len == 0 && index == 0) {
                return Err(StoreError::IndexOutOfRange { index, len });
            }
            if state.focused_index == index {
                return Ok(());
            }
            state.focused_index = index;
        }
        self.publish(StoreEvent::FocusChanged { index });
        Ok(())
    }

    /// Narrow the catalog to one category (`None` clears). Returns the visible count.
    pub fn set_filter_category(&self, category: Option<String>) -> usize {
        let (visible, focus_moved) = {
            let mut state = self.state.write();
            if state.filters.category == category {
                return state.visible_products().len();
            }
            state.filters.category = category.clone();
            let focus_moved = state.focused_index != 0;
            state.focused_index = 0;
            (state.visible_products().len(), focus_moved)
        };
        debug!("Filter {:?}: {} products visible", category, visible);
        self.publish(StoreEvent::FilterChanged { category });
        if focus_moved {
            self.publish(StoreEvent::FocusChanged { index: 0 });
        }
        visible
    }

    /// Choose the product for the details view (`None` clears)
    pub fn select_product(&self, product: Option<ProductId>) -> StoreResult<()> {
        {
            let mut state = self.state.write();
            if let Some(id) = &product {
                if state.product(id).is_none() {
                    return Err(StoreError::UnknownProduct(id.clone()));
                }
            }
            if state.selected_product == product {
                return Ok(());
            }
            state.selected_product = product.clone();
        }
        self.publish(StoreEvent::SelectionChanged { product });
        Ok(())
    }

    /// Purchase the cart: stock is deducted, the cart emptied, and the kiosk
    /// returns to browsing. Irreversible.
    pub fn place_order(&self) -> StoreResult<OrderReceipt> {
        let (receipt, from) = {
            let mut state = self.state.write();
            if state.cart.is_empty() {
                return Err(StoreError::EmptyCart);
            }

            let total_cents = state.cart.total_cents();
            let items = state.cart.clear();
            for item in &items {
                if let Some(product) = state.products.iter_mut().find(|p| p.id == item.product.id) {
                    product.stock = product.stock.saturating_sub(item.qty);
                }
            }

            let receipt = OrderReceipt {
                order_id: Uuid::new_v4(),
                items,
                total_cents,
                placed_at: Timestamp::now(),
            };
            state.cart_active_index = 0;
            state.last_order = Some(receipt.clone());

            let from = state.mode;
            if from != AppMode::Browse {
                state.previous_mode = from;
                state.mode = AppMode::Browse;
            }
            (receipt, from)
        };

        debug!("Order {} placed ({} cents)", receipt.order_id, receipt.total_cents);
        self.publish(StoreEvent::OrderPlaced {
            order_id: receipt.order_id,
            total_cents: receipt.total_cents,
        });
        if from != AppMode::Browse {
            self.publish(StoreEvent::ModeChanged {
                from,
                to: AppMode::Browse,
            });
        }
        Ok(receipt)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("cup", "Espresso Cup", "kitchen", 1250, 3),
            Product::new("rake", "Leaf Rake", "garden", 2400, 2),
            Product::new("pot", "Moka Pot", "kitchen", 3900, 5),
        ]
    }

    fn id(s: &str) -> ProductId {
        ProductId::new(s)
    }

    #[test]
    fn test_add_overflowing_quantity_is_refused() {
        let store = Store::new(catalog());
        store.add_to_cart(&id("cup"), 1).unwrap();
        assert!(matches!(
            store.add_to_cart(&id("cup"), u32::MAX),
            Err(StoreError::InsufficientStock { available: 3, .. })
        ));
        assert_eq!(store.read(|s| s.cart.quantity_of(&id("cup"))), 1);
    }

    #[test]
    fn test_add_unknown_product() {
        let store = Store::new(catalog());
        assert_eq!(
            store.add_to_cart(&id("lamp"), 1),
            Err(StoreError::UnknownProduct(id("lamp")))
        );
    }

    #[test]
    fn test_remove_last_item_resets_index() {
        let store = Store::new(catalog());
        store.add_to_cart(&id("cup"), 1).unwrap();
        assert_eq!(store.decrease_cart_item(0).unwrap(), CartChange::Removed);

        let state = store.get_state();
        assert!(state.cart.is_empty());
        assert_eq!(state.cart_active_index, 0);
    }

    #[test]
    fn test_active_index_clamped_after_removal() {
        let store = Store::new(catalog());
        store.add_to_cart(&id("cup"), 1).unwrap();
        store.add_to_cart(&id("pot"), 1).unwrap();
        store.set_cart_active_index(1).unwrap();

        store.remove_from_cart(1).unwrap();
        assert_eq!(store.read(|s| s.cart_active_index), 0);
    }

    #[test]
    fn test_active_index_bounds() {
        let store = Store::new(catalog());
        assert!(store.set_cart_active_index(0).is_ok());
        assert_eq!(
            store.set_cart_active_index(1),
            Err(StoreError::IndexOutOfRange { index: 1, len: 0 })
        );
    }

    #[test]
    fn test_set_mode_tracks_previous() {
        let store = Store::new(catalog());
        assert!(store.set_mode(AppMode::Cart));
        assert!(store.set_mode(AppMode::Details));
        assert!(!store.set_mode(AppMode::Details));

        let state = store.get_state();
        assert_eq!(state.mode, AppMode::Details);
        assert_eq!(state.previous_mode, AppMode::Cart);
    }

    #[test]
    fn test_filter_resets_focus() {
        let store = Store::new(catalog());
        store.set_focused_index(2).unwrap();
        assert_eq!(store.set_filter_category(Some("garden".into())), 1);
        assert_eq!(store.read(|s| s.focused_index), 0);
        assert_eq!(store.read(|s| s.focused_product().map(|p| p.id.clone())), Some(id("rake")));
        assert!(store.set_focused_index(1).is_err());
    }

    #[test]
    fn test_place_order() {
        let store = Store::new(catalog());
        store.add_to_cart(&id("cup"), 2).unwrap();
        store.set_mode(AppMode::Checkout);

        let receipt = store.place_order().unwrap();
        assert_eq!(receipt.total_cents, 2500);

        let state = store.get_state();
        assert!(state.cart.is_empty());
        assert_eq!(state.mode, AppMode::Browse);
        assert_eq!(state.product(&id("cup")).unwrap().stock, 1);
        assert_eq!(state.last_order.unwrap().order_id, receipt.order_id);

        assert_eq!(store.place_order(), Err(StoreError::EmptyCart));
    }

    #[test]
    fn test_select_unknown_product() {
        let store = Store::new(catalog());
        assert!(store.select_product(Some(id("lamp"))).is_err());
        assert!(store.select_product(Some(id("pot"))).is_ok());
        assert_eq!(store.read(|s| s.selected().map(|p| p.price_cents)), Some(3900));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = Store::new(catalog());
        let mut rx = store.subscribe();

        store.add_to_cart(&id("cup"), 1).unwrap();
        store.set_mode(AppMode::Cart);
        // No-ops publish nothing
        store.set_mode(AppMode::Cart);
        store.set_cart_active_index(0).unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::CartChanged {
                rows: 1,
                units: 1,
                total_cents: 1250,
                active_index: 0
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::ModeChanged {
                from: AppMode::Browse,
                to: AppMode::Cart
            }
        );
        assert!(rx.try_recv().is_err());
    }
}
