use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{compute_landed_costs_with, item_index, lookup_key, CostReport};
use crate::config::MatchMode;
use crate::models::{BestOffer, DataQualityWarning, LandedCost, ProductKey, Quotation};

/// Landed costs within this absolute distance count as equal. A tie keeps
/// the supplier that entered the quotation first, so re-running the
/// selection over the same data can never flip winners.
pub const PRICE_TOLERANCE: Decimal = dec!(0.01);

/// Winning offers per product, in quotation item order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestOfferReport {
    pub best: IndexMap<ProductKey, BestOffer>,

    /// Items with no competing line (no supplier quoted a positive price).
    pub without_offers: Vec<ProductKey>,

    pub warnings: Vec<DataQualityWarning>,
}

/// Selects the cheapest landed offer per product with exact key matching.
pub fn select_best_offers(quotation: &Quotation) -> BestOfferReport {
    select_best_offers_with(quotation, MatchMode::Exact)
}

/// Same as [`select_best_offers`], with an explicit matching mode.
pub fn select_best_offers_with(quotation: &Quotation, mode: MatchMode) -> BestOfferReport {
    let report = compute_landed_costs_with(quotation, mode);
    select_from_report(quotation, mode, &report)
}

/// Selection over an already computed cost report. Candidates are scanned
/// in supplier submission order; a challenger displaces the incumbent only
/// by beating it by more than [`PRICE_TOLERANCE`].
pub(crate) fn select_from_report(
    quotation: &Quotation,
    mode: MatchMode,
    report: &CostReport,
) -> BestOfferReport {
    let mut warnings = report.warnings.clone();

    let mut winners: IndexMap<ProductKey, &LandedCost> = IndexMap::new();
    for cost in report.costs.iter().filter(|c| c.unit_price > Decimal::ZERO) {
        match winners.get_mut(&cost.product_key) {
            None => {
                winners.insert(cost.product_key.clone(), cost);
            }
            Some(incumbent) => {
                if incumbent.landed_unit_cost - cost.landed_unit_cost > PRICE_TOLERANCE {
                    *incumbent = cost;
                }
            }
        }
    }

    // Emit in item order, collapsing duplicate item keys onto their first
    // occurrence's canonical key.
    let (index, _) = item_index(quotation, mode);
    let mut best = IndexMap::new();
    let mut without_offers = Vec::new();
    for item in &quotation.items {
        let Some((canonical, _)) = index.get(&lookup_key(&item.product_key, mode)) else {
            continue;
        };
        if best.contains_key(canonical) || without_offers.contains(canonical) {
            continue;
        }
        match winners.get(canonical) {
            Some(cost) => {
                best.insert(canonical.clone(), BestOffer::from_cost((*cost).clone()));
            }
            None => {
                warnings.push(DataQualityWarning::NoCompetingOffer {
                    product_key: canonical.clone(),
                });
                without_offers.push(canonical.clone());
            }
        }
    }

    BestOfferReport {
        best,
        without_offers,
        warnings,
    }
}
