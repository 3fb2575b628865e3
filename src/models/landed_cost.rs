use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ProductKey;

/// Fully loaded unit cost of one supplier line, derived on demand and
/// never cached across offer edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandedCost {
    pub product_key: ProductKey,
    pub supplier_id: Uuid,
    pub supplier_name: String,

    /// Item quantity this line was matched against (zero when unmatched).
    pub quantity: Decimal,

    /// Raw quoted unit price, before any adjustment.
    pub unit_price: Decimal,

    pub difal_percent: Decimal,
    pub ipi_amount_per_unit: Decimal,

    /// `unit_price × (1 + difal/100) + ipi_per_unit`.
    pub taxed_unit_cost: Decimal,

    /// `quantity × taxed_unit_cost`; the freight-allocation weight.
    pub line_value: Decimal,

    /// This line's slice of the supplier's freight total.
    pub freight_share: Decimal,

    pub freight_per_unit: Decimal,

    /// `taxed_unit_cost + freight_per_unit`; the comparison figure.
    pub landed_unit_cost: Decimal,
}

/// The winning offer for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestOffer {
    pub cost: LandedCost,

    /// `landed_unit_cost × quantity`.
    pub line_total: Decimal,
}

impl BestOffer {
    pub fn from_cost(cost: LandedCost) -> Self {
        let line_total = cost.landed_unit_cost * cost.quantity;
        Self { cost, line_total }
    }
}
