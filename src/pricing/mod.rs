//! Pure cost calculators.
//!
//! Everything here is a total function over an immutable [`Quotation`]
//! snapshot: no I/O, no mutation of inputs, no error path. Dirty data
//! produces [`DataQualityWarning`]s inside the result instead of failures.

pub mod best_offer;
pub mod freight;
pub mod summary;
pub mod tax;

pub use best_offer::{select_best_offers, select_best_offers_with, BestOfferReport, PRICE_TOLERANCE};
pub use summary::{
    build_comparative_analysis, build_comparative_analysis_with, build_economic_summary,
    build_economic_summary_with,
};
pub use tax::taxed_unit_cost;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::MatchMode;
use crate::models::{DataQualityWarning, LandedCost, ProductKey, Quotation};

use freight::MatchedLine;

/// Landed cost of every offer line on a quotation, with the data-quality
/// findings gathered along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostReport {
    pub costs: Vec<LandedCost>,
    pub warnings: Vec<DataQualityWarning>,
}

/// Computes tax-adjusted and freight-loaded unit costs for every line of
/// every offer, using exact product-key matching.
pub fn compute_landed_costs(quotation: &Quotation) -> CostReport {
    compute_landed_costs_with(quotation, MatchMode::Exact)
}

/// Same as [`compute_landed_costs`], with an explicit matching mode.
pub fn compute_landed_costs_with(quotation: &Quotation, mode: MatchMode) -> CostReport {
    let (index, mut warnings) = item_index(quotation, mode);

    let mut costs = Vec::new();
    for offer in &quotation.offers {
        let matched: Vec<MatchedLine<'_>> = offer
            .lines
            .iter()
            .map(|line| match index.get(&lookup_key(&line.product_key, mode)) {
                Some((canonical, quantity)) => MatchedLine {
                    line,
                    item_key: canonical.clone(),
                    quantity: *quantity,
                },
                None => {
                    warnings.push(DataQualityWarning::UnmatchedProduct {
                        supplier_name: offer.supplier_name.clone(),
                        product_key: line.product_key.clone(),
                    });
                    MatchedLine {
                        line,
                        item_key: line.product_key.clone(),
                        quantity: Decimal::ZERO,
                    }
                }
            })
            .collect();

        for m in &matched {
            if m.line.unit_price < Decimal::ZERO {
                warnings.push(DataQualityWarning::NegativeUnitPrice {
                    product_key: m.item_key.clone(),
                    supplier_name: offer.supplier_name.clone(),
                    unit_price: m.line.unit_price,
                });
            }
        }

        costs.extend(freight::allocate_offer(offer, &matched));
    }

    CostReport { costs, warnings }
}

/// Lookup key for joining lines to items under the given mode.
pub(crate) fn lookup_key(key: &ProductKey, mode: MatchMode) -> ProductKey {
    match mode {
        MatchMode::Exact => key.clone(),
        MatchMode::Normalized => key.normalized(),
    }
}

/// Index of quotation items: lookup key → (canonical item key, effective
/// quantity). First occurrence wins on duplicate keys; negative quantities
/// are warned and indexed as zero.
pub(crate) fn item_index(
    quotation: &Quotation,
    mode: MatchMode,
) -> (
    IndexMap<ProductKey, (ProductKey, Decimal)>,
    Vec<DataQualityWarning>,
) {
    let mut index = IndexMap::new();
    let mut warnings = Vec::new();

    for item in &quotation.items {
        if item.quantity < Decimal::ZERO {
            warnings.push(DataQualityWarning::NegativeQuantity {
                product_key: item.product_key.clone(),
                quantity: item.quantity,
            });
        }
        index
            .entry(lookup_key(&item.product_key, mode))
            .or_insert_with(|| (item.product_key.clone(), item.effective_quantity()));
    }

    (index, warnings)
}
