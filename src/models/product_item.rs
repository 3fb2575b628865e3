use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a product inside one quotation.
///
/// Items and offer lines are joined on this key with exact, case-sensitive
/// equality. That is a known fragility of the source data (free-typed
/// product names), kept deliberately: near-matches surface as
/// `UnmatchedProduct` warnings instead of being silently merged. Normalized
/// matching exists as an opt-in via [`crate::config::MatchMode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductKey(pub String);

impl ProductKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trimmed, lowercased form used by `MatchMode::Normalized`.
    pub fn normalized(&self) -> ProductKey {
        ProductKey(self.0.trim().to_lowercase())
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for ProductKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// One requested product on a quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductItem {
    pub product_key: ProductKey,

    /// Requested quantity. Negative values are kept on the record but
    /// contribute zero to every total (with a `NegativeQuantity` warning).
    pub quantity: Decimal,

    /// Unit of measure, free text ("kg", "cx 12un").
    pub unit: String,

    /// Unit price of the last approved purchase of this product, if any.
    pub last_approved_unit_price: Option<Decimal>,

    /// Supplier of that last approved purchase.
    pub last_approved_supplier: Option<String>,

    /// Unit price first quoted for this product in the current cycle.
    pub first_quoted_unit_price: Option<Decimal>,
}

impl ProductItem {
    pub fn new(product_key: impl Into<ProductKey>, quantity: Decimal, unit: impl Into<String>) -> Self {
        Self {
            product_key: product_key.into(),
            quantity,
            unit: unit.into(),
            last_approved_unit_price: None,
            last_approved_supplier: None,
            first_quoted_unit_price: None,
        }
    }

    /// Quantity used by every total: negative input counts as zero.
    pub fn effective_quantity(&self) -> Decimal {
        if self.quantity.is_sign_negative() {
            Decimal::ZERO
        } else {
            self.quantity
        }
    }
}
