//! # Vitrine-Store
//!
//! Canonical application state for the kiosk and the only place it is
//! mutated. Every mutation entry point validates its input, applies the
//! change under a write lock, and then broadcasts a [`StoreEvent`] to
//! subscribers (the UI layer). Calls that change nothing broadcast nothing.
//!
//! The store does not arbitrate between input modalities; callers serialize
//! through the action lock in `vitrine-control` before mutating.

pub mod cart;
pub mod error;
pub mod product;
pub mod state;
pub mod store;

pub use cart::*;
pub use error::{StoreError, StoreResult};
pub use product::*;
pub use state::*;
pub use store::*;
