use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ProductKey;

/// One product line inside a supplier's offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferLine {
    pub product_key: ProductKey,

    /// Quoted unit price. Zero or absent means "not quoting this product":
    /// the line never competes for best offer.
    pub unit_price: Decimal,

    /// DIFAL percentage (0–100), the interstate tax rate differential.
    pub difal_percent: Decimal,

    /// IPI as an absolute amount per unit, already computed upstream.
    pub ipi_amount_per_unit: Decimal,

    /// Promised delivery term in days for this line.
    pub delivery_term_days: Option<i64>,

    pub delivery_date: Option<NaiveDate>,
}

impl OfferLine {
    pub fn new(product_key: impl Into<ProductKey>, unit_price: Decimal) -> Self {
        Self {
            product_key: product_key.into(),
            unit_price,
            difal_percent: Decimal::ZERO,
            ipi_amount_per_unit: Decimal::ZERO,
            delivery_term_days: None,
            delivery_date: None,
        }
    }

    /// A line competes only when it carries a strictly positive price.
    pub fn is_competing(&self) -> bool {
        self.unit_price > Decimal::ZERO
    }
}

/// Everything one supplier quoted on a quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOffer {
    pub supplier_id: Uuid,
    pub supplier_name: String,

    /// Freight for the whole offer, one amount per supplier. Allocated to
    /// lines proportionally to line value, never split evenly.
    pub freight_total: Decimal,

    /// Payment term in days offered by this supplier.
    pub payment_term_days: Option<i64>,

    /// Lines in the order the supplier submitted them.
    pub lines: Vec<OfferLine>,
}

impl SupplierOffer {
    pub fn new(supplier_id: Uuid, supplier_name: impl Into<String>) -> Self {
        Self {
            supplier_id,
            supplier_name: supplier_name.into(),
            freight_total: Decimal::ZERO,
            payment_term_days: None,
            lines: Vec::new(),
        }
    }

    pub fn line_for(&self, key: &ProductKey) -> Option<&OfferLine> {
        self.lines.iter().find(|line| &line.product_key == key)
    }
}
