//! Catalog products.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable catalog identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Dollar amount from cents, e.g. 1250 -> "$12.50"
pub fn format_price(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// Unit price in cents
    pub price_cents: u64,
    /// Units available for sale
    pub stock: u32,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        price_cents: u64,
        stock: u32,
    ) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.into(),
            category: category.into(),
            price_cents,
            stock,
        }
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.category.eq_ignore_ascii_case(category)
    }

    /// Formatted unit price, e.g. "$12.50"
    pub fn price_label(&self) -> String {
        format_price(self.price_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_label() {
        let product = Product::new("p1", "Espresso Cup", "kitchen", 1250, 3);
        assert_eq!(product.price_label(), "$12.50");
        assert_eq!(Product::new("p2", "Pin", "misc", 5, 1).price_label(), "$0.05");
        assert_eq!(format_price(250_000), "$2500.00");
    }

    #[test]
    fn test_category_match_ignores_case() {
        let product = Product::new("p1", "Espresso Cup", "Kitchen", 1250, 3);
        assert!(product.in_category("kitchen"));
        assert!(!product.in_category("garden"));
    }
}
