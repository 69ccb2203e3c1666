//! Mode-contextual action dispatch.
//!
//! Maps `(Action, AppMode)` onto a store mutation plus a feedback message.
//! Every pair is spelled out in one `match` so the compiler rejects a new
//! action or mode until its cells are decided. Nothing here is fatal: a
//! refused action is an [`Effect`] other than `Applied`, with no mutation.
//!
//! Callers hold the [`ActionLock`](crate::ActionLock) around `dispatch`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use vitrine_core::AppMode;
use vitrine_store::{format_price, CartChange, Product, ProductId, Store, StoreError};

use crate::action::{Action, NavDirection};
use crate::feedback::{Feedback, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Applied,
    /// No cell for this action in the current mode
    NotAvailable,
    CartEmpty,
    /// Navigation past the first or last item
    LimitReached,
    /// Nothing focused or selected to act on
    NoProduct,
    OutOfStock,
    /// The store refused the mutation
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub action: Action,
    /// Mode the action was evaluated in
    pub mode: AppMode,
    pub effect: Effect,
    pub feedback: Feedback,
}

impl Outcome {
    pub fn applied(&self) -> bool {
        self.effect == Effect::Applied
    }
}

type Step = (Effect, Feedback);

pub struct Dispatcher {
    store: Arc<Store>,
}

impl Dispatcher {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn dispatch(&self, action: &Action) -> Outcome {
        use AppMode::*;

        let mode = self.store.mode();
        let (effect, feedback) = match (action, mode) {
            (Action::Confirm, Browse) => self.add_focused(1),
            (Action::Confirm, Details) => self.add_selected(1),
            (Action::Confirm, Cart) => self.add_to_active(1),
            (Action::Confirm, Checkout) => Self::not_available(action, mode),

            (Action::Remove, Cart) => self.decrease_active(),
            (Action::Remove, Browse | Details | Checkout) => Self::not_available(action, mode),

            (Action::Back, Details) => self.smart_back(),
            (Action::Back, Cart) => self.go_to(Browse, "Back to browsing"),
            (Action::Back, Checkout) => self.go_to(Cart, "Checkout cancelled"),
            (Action::Back, Browse) => Self::not_available(action, mode),

            (Action::NextStep, Browse | Details) => self.go_to(Cart, "Your cart"),
            (Action::NextStep, Cart) => self.open_checkout(),
            (Action::NextStep, Checkout) => self.finalize_order(),

            (Action::DoubleAdd, Browse) => self.add_focused(2),
            (Action::DoubleAdd, Details) => self.add_selected(2),
            (Action::DoubleAdd, Cart) => self.add_to_active(2),
            (Action::DoubleAdd, Checkout) => Self::not_available(action, mode),

            (Action::OpenDetails, Browse) => self.show_focused_details(),
            (Action::OpenDetails, Cart) => self.show_active_details(),
            (Action::OpenDetails, Details | Checkout) => Self::not_available(action, mode),

            (Action::Navigate(direction), Browse) => self.navigate_catalog(*direction),
            (Action::Navigate(direction), Cart) => self.navigate_cart(*direction),
            (Action::Navigate(_), Details | Checkout) => Self::not_available(action, mode),

            (Action::ShowCart, Browse | Details | Checkout) => self.go_to(Cart, "Your cart"),
            (Action::ShowCart, Cart) => Self::not_available(action, mode),

            (Action::Filter(category), Browse) => self.filter(category.clone()),
            (Action::Filter(_), Details | Cart | Checkout) => Self::not_available(action, mode),
        };

        match effect {
            Effect::Applied => info!("{} in {}: {}", action, mode, feedback.message),
            _ => debug!("{} in {} not applied ({:?}): {}", action, mode, effect, feedback.message),
        }

        Outcome {
            action: action.clone(),
            mode,
            effect,
            feedback,
        }
    }

    fn not_available(action: &Action, mode: AppMode) -> Step {
        (
            Effect::NotAvailable,
            Feedback::info(format!("'{}' does nothing in {}", action, mode)),
        )
    }

    fn cart_empty() -> Step {
        (Effect::CartEmpty, Feedback::warning("Cart is empty"))
    }

    fn limit_reached() -> Step {
        (Effect::LimitReached, Feedback::info("Limit reached"))
    }

    fn rejected(err: StoreError) -> Step {
        match err {
            StoreError::InsufficientStock { available, .. } => (
                Effect::OutOfStock,
                Feedback::warning(format!("Out of stock ({} available)", available)),
            ),
            StoreError::EmptyCart => Self::cart_empty(),
            other => {
                warn!("Store refused mutation: {}", other);
                (Effect::Rejected, Feedback::new(other.to_string(), Severity::Error))
            }
        }
    }

    fn add(&self, product: &Product, qty: u32) -> Step {
        match self.store.add_to_cart(&product.id, qty) {
            Ok(total) => (
                Effect::Applied,
                Feedback::success(format!("Added {} x{} ({} in cart)", product.name, qty, total)),
            ),
            Err(err) => Self::rejected(err),
        }
    }

    fn add_focused(&self, qty: u32) -> Step {
        match self.store.read(|s| s.focused_product().cloned()) {
            Some(product) => self.add(&product, qty),
            None => (Effect::NoProduct, Feedback::info("No product in focus")),
        }
    }

    fn add_selected(&self, qty: u32) -> Step {
        match self.store.read(|s| s.selected().cloned()) {
            Some(product) => self.add(&product, qty),
            None => (Effect::NoProduct, Feedback::info("No product selected")),
        }
    }

    fn add_to_active(&self, qty: u32) -> Step {
        match self.store.read(|s| s.active_cart_item().map(|item| item.product.clone())) {
            Some(product) => self.add(&product, qty),
            None => Self::cart_empty(),
        }
    }

    fn decrease_active(&self) -> Step {
        let active = self.store.read(|s| {
            s.active_cart_item()
                .map(|item| (s.cart_active_index, item.product.name.clone()))
        });
        let Some((index, name)) = active else {
            return Self::cart_empty();
        };

        match self.store.decrease_cart_item(index) {
            Ok(CartChange::Decremented { qty }) => (
                Effect::Applied,
                Feedback::info(format!("{}: {} left", name, qty)),
            ),
            Ok(CartChange::Removed) => (
                Effect::Applied,
                Feedback::info(format!("Removed {}", name)),
            ),
            Err(err) => Self::rejected(err),
        }
    }

    fn go_to(&self, mode: AppMode, message: &str) -> Step {
        self.store.set_mode(mode);
        (Effect::Applied, Feedback::info(message))
    }

    /// Details returns wherever it was opened from
    fn smart_back(&self) -> Step {
        match self.store.read(|s| s.previous_mode) {
            AppMode::Cart => self.go_to(AppMode::Cart, "Back to cart"),
            _ => self.go_to(AppMode::Browse, "Back to browsing"),
        }
    }

    fn open_checkout(&self) -> Step {
        if self.store.read(|s| s.cart.is_empty()) {
            return Self::cart_empty();
        }
        self.go_to(AppMode::Checkout, "Review your order")
    }

    fn finalize_order(&self) -> Step {
        match self.store.place_order() {
            Ok(receipt) => (
                Effect::Applied,
                Feedback::success(format!(
                    "Order placed: {}",
                    format_price(receipt.total_cents)
                )),
            ),
            Err(err) => Self::rejected(err),
        }
    }

    fn show_details(&self, id: ProductId, name: String) -> Step {
        if let Err(err) = self.store.select_product(Some(id)) {
            return Self::rejected(err);
        }
        self.store.set_mode(AppMode::Details);
        (Effect::Applied, Feedback::info(name))
    }

    fn show_focused_details(&self) -> Step {
        match self.store.read(|s| s.focused_product().map(|p| (p.id.clone(), p.name.clone()))) {
            Some((id, name)) => self.show_details(id, name),
            None => (Effect::NoProduct, Feedback::info("No product in focus")),
        }
    }

    fn show_active_details(&self) -> Step {
        let active = self.store.read(|s| {
            s.active_cart_item()
                .map(|item| (item.product.id.clone(), item.product.name.clone()))
        });
        match active {
            Some((id, name)) => self.show_details(id, name),
            None => Self::cart_empty(),
        }
    }

    fn navigate_catalog(&self, direction: NavDirection) -> Step {
        let (index, len) = self
            .store
            .read(|s| (s.focused_index, s.visible_products().len()));
        let Some(next) = direction.step(index, len) else {
            return Self::limit_reached();
        };
        match self.store.set_focused_index(next) {
            Ok(()) => {
                let label = self
                    .store
                    .read(|s| {
                        s.focused_product()
                            .map(|p| format!("{} {}", p.name, p.price_label()))
                    })
                    .unwrap_or_default();
                (Effect::Applied, Feedback::info(label))
            }
            Err(err) => Self::rejected(err),
        }
    }

    fn navigate_cart(&self, direction: NavDirection) -> Step {
        let (index, len) = self.store.read(|s| (s.cart_active_index, s.cart.len()));
        let Some(next) = direction.step(index, len) else {
            return Self::limit_reached();
        };
        match self.store.set_cart_active_index(next) {
            Ok(()) => (
                Effect::Applied,
                Feedback::info(format!("Item {} of {}", next + 1, len)),
            ),
            Err(err) => Self::rejected(err),
        }
    }

    fn filter(&self, category: Option<String>) -> Step {
        let message = match &category {
            Some(name) => name.clone(),
            None => "All products".to_string(),
        };
        let visible = self.store.set_filter_category(category);
        (
            Effect::Applied,
            Feedback::info(format!("{}: {} products", message, visible)),
        )
    }
}
