use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DataQualityWarning, ProductKey};

/// One savings comparison against a baseline.
///
/// Only materialized when the baseline is strictly positive; a missing or
/// zero baseline makes the whole comparison unavailable (`None` at the use
/// site), never zero and never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsFigure {
    pub baseline: Decimal,
    /// `baseline − compared total`. Negative means the best offer costs more.
    pub absolute: Decimal,
    /// `absolute / baseline × 100`.
    pub percent: Decimal,
}

impl SavingsFigure {
    /// Builds the comparison, or `None` when the baseline cannot anchor one.
    pub fn against(baseline: Decimal, compared: Decimal) -> Option<Self> {
        if baseline > Decimal::ZERO {
            let absolute = baseline - compared;
            Some(Self {
                baseline,
                absolute,
                percent: absolute / baseline * Decimal::ONE_HUNDRED,
            })
        } else {
            None
        }
    }
}

/// Classification of a line's saving against the last approved price.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SavingsClass {
    /// Best price is below the last approved one.
    Positive,
    /// Best price is above the last approved one.
    Negative,
    /// Equal, or no baseline to compare against.
    Neutral,
}

impl SavingsClass {
    pub fn from_baseline(last_approved: Option<Decimal>, best_unit_price: Decimal) -> Self {
        match last_approved {
            Some(baseline) if baseline > best_unit_price => Self::Positive,
            Some(baseline) if baseline < best_unit_price => Self::Negative,
            _ => Self::Neutral,
        }
    }
}

/// Per-product detail row of the economic summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineComparison {
    pub product_key: ProductKey,
    pub quantity: Decimal,

    pub best_supplier: Option<String>,
    pub best_unit_price: Option<Decimal>,
    pub best_landed_unit_cost: Option<Decimal>,

    /// Mean of raw unit prices over competing offers.
    pub average_unit_price: Option<Decimal>,
    pub last_approved_unit_price: Option<Decimal>,
    pub last_approved_supplier: Option<String>,
    pub first_quoted_unit_price: Option<Decimal>,

    pub savings_vs_average: Option<SavingsFigure>,
    pub savings_vs_last_approved: Option<SavingsFigure>,
    pub savings_vs_first_quoted: Option<SavingsFigure>,

    pub classification: SavingsClass,
}

/// Quotation-level economics: totals, three savings baselines, and the
/// per-line breakdown. Missing baselines degrade single figures, never the
/// aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicSummary {
    pub quotation_id: Uuid,

    /// Σ best landed unit cost × quantity. The headline cost of buying at
    /// the selected offers, freight and taxes included.
    pub best_total: Decimal,

    /// Σ best raw unit price × quantity. The figure all savings baselines
    /// compare against, matching how the baselines themselves are quoted.
    pub best_unit_total: Decimal,

    /// Σ mean competing raw unit price × quantity.
    pub average_total: Decimal,

    /// Σ last approved unit price × quantity, counting 0 where absent.
    pub last_approved_total: Decimal,

    /// Σ first quoted unit price × quantity, falling back to the item's
    /// current best raw price when the first quote was not recorded.
    pub first_quoted_total: Decimal,

    pub savings_vs_average: Option<SavingsFigure>,
    pub savings_vs_last_approved: Option<SavingsFigure>,
    pub savings_vs_first_quoted: Option<SavingsFigure>,

    pub lines: Vec<LineComparison>,
    pub warnings: Vec<DataQualityWarning>,
}

/// Snapshot attached to an approval: what was bought at, and what it saved
/// against the recorded baselines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsRecord {
    pub quotation_id: Uuid,
    pub final_total: Decimal,
    pub vs_first_quoted: Option<SavingsFigure>,
    pub vs_last_approved: Option<SavingsFigure>,
}

impl SavingsRecord {
    pub fn from_summary(summary: &EconomicSummary) -> Self {
        Self {
            quotation_id: summary.quotation_id,
            final_total: summary.best_unit_total,
            vs_first_quoted: summary.savings_vs_first_quoted.clone(),
            vs_last_approved: summary.savings_vs_last_approved.clone(),
        }
    }
}

/// The supplier offering a given figure (price or term) for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierChoice {
    pub supplier_name: String,
    pub unit_price: Decimal,
}

/// Per-product winners across the three comparison axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductComparison {
    pub product_key: ProductKey,
    pub quantity: Decimal,

    /// Lowest raw unit price among competing lines.
    pub best_price: Option<SupplierChoice>,

    /// Fewest delivery days wins; lines without a term never win.
    pub best_delivery: Option<TermChoice>,

    /// Most payment days wins; offers without a term never win.
    pub best_payment: Option<TermChoice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermChoice {
    pub supplier_name: String,
    pub days: i64,
    pub unit_price: Decimal,
}

/// Side-by-side totals when buying everything at the best price, at the
/// fastest delivery, or at the longest payment term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparativeAnalysis {
    pub quotation_id: Uuid,
    pub products: Vec<ProductComparison>,

    pub best_price_total: Decimal,
    pub best_delivery_total: Decimal,
    pub best_payment_total: Decimal,
    pub last_approved_total: Decimal,

    pub savings_vs_last_approved: Option<SavingsFigure>,
    pub warnings: Vec<DataQualityWarning>,
}
