use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ProductKey;

/// Non-fatal data-quality findings.
///
/// The calculators never fail on dirty input; they compute with what they
/// have and report what they saw. Warnings ride inside the result structs
/// so callers can surface them next to the numbers they affect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// Item quantity was negative; totals treat it as zero.
    NegativeQuantity {
        product_key: ProductKey,
        quantity: Decimal,
    },
    /// A supplier quoted a negative unit price. The arithmetic keeps it
    /// as-is, so downstream totals can go negative.
    NegativeUnitPrice {
        product_key: ProductKey,
        supplier_name: String,
        unit_price: Decimal,
    },
    /// A supplier line references a product no quotation item carries.
    /// Key matching is exact and case-sensitive by default.
    UnmatchedProduct {
        supplier_name: String,
        product_key: ProductKey,
    },
    /// No last-approved price is known for this item.
    MissingBaseline { product_key: ProductKey },
    /// No supplier quoted a positive price for this item.
    NoCompetingOffer { product_key: ProductKey },
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeQuantity {
                product_key,
                quantity,
            } => write!(f, "negative quantity {quantity} for '{product_key}'"),
            Self::NegativeUnitPrice {
                product_key,
                supplier_name,
                unit_price,
            } => write!(
                f,
                "negative unit price {unit_price} for '{product_key}' from {supplier_name}"
            ),
            Self::UnmatchedProduct {
                supplier_name,
                product_key,
            } => write!(
                f,
                "offer line '{product_key}' from {supplier_name} matches no quotation item"
            ),
            Self::MissingBaseline { product_key } => {
                write!(f, "no last-approved price for '{product_key}'")
            }
            Self::NoCompetingOffer { product_key } => {
                write!(f, "no competing offer for '{product_key}'")
            }
        }
    }
}
