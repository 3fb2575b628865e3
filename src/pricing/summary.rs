//! Quotation-level aggregation: the economic summary (totals and savings
//! against three baselines) and the comparative analysis (best price vs.
//! best delivery vs. best payment term).

use indexmap::{IndexMap, IndexSet};
use rust_decimal::Decimal;

use super::{best_offer, compute_landed_costs_with, item_index, lookup_key};
use crate::config::MatchMode;
use crate::models::{
    ComparativeAnalysis, DataQualityWarning, EconomicSummary, LineComparison, ProductComparison,
    ProductKey, Quotation, SavingsClass, SavingsFigure, SupplierChoice, TermChoice,
};

/// Builds the economic summary with exact key matching.
pub fn build_economic_summary(quotation: &Quotation) -> EconomicSummary {
    build_economic_summary_with(quotation, MatchMode::Exact)
}

/// Builds the economic summary with an explicit matching mode.
///
/// Totals run over items that drew at least one competing offer, so every
/// baseline is compared against the same basket. Savings figures compare
/// raw unit prices (the basis baselines were recorded on); the landed
/// `best_total` sits alongside as the headline cost.
pub fn build_economic_summary_with(quotation: &Quotation, mode: MatchMode) -> EconomicSummary {
    let cost_report = compute_landed_costs_with(quotation, mode);
    let selection = best_offer::select_from_report(quotation, mode, &cost_report);
    let best_by_product = selection.best;
    let mut warnings = selection.warnings;
    let (index, _) = item_index(quotation, mode);

    // Raw competing prices per product feed the average baseline.
    let mut competing: IndexMap<ProductKey, Vec<Decimal>> = IndexMap::new();
    for cost in cost_report
        .costs
        .iter()
        .filter(|c| c.unit_price > Decimal::ZERO)
    {
        competing
            .entry(cost.product_key.clone())
            .or_default()
            .push(cost.unit_price);
    }

    let mut lines = Vec::new();
    let mut seen: IndexSet<ProductKey> = IndexSet::new();

    let mut best_total = Decimal::ZERO;
    let mut best_unit_total = Decimal::ZERO;
    let mut average_total = Decimal::ZERO;
    let mut last_approved_total = Decimal::ZERO;
    let mut first_quoted_total = Decimal::ZERO;

    for item in &quotation.items {
        let Some((canonical, quantity)) = index.get(&lookup_key(&item.product_key, mode)) else {
            continue;
        };
        if !seen.insert(canonical.clone()) {
            continue;
        }

        let best = best_by_product.get(canonical);
        let best_unit_price = best.map(|b| b.cost.unit_price);
        let average_unit_price = competing.get(canonical).map(|prices| {
            let total: Decimal = prices.iter().copied().sum();
            total / Decimal::from(prices.len() as u64)
        });
        let last_approved = item.last_approved_unit_price;
        let first_quoted = item.first_quoted_unit_price.or(best_unit_price);

        if let Some(best) = best {
            best_total += best.cost.landed_unit_cost * *quantity;
            best_unit_total += best.cost.unit_price * *quantity;
            if let Some(average) = average_unit_price {
                average_total += average * *quantity;
            }
            last_approved_total += last_approved.unwrap_or(Decimal::ZERO) * *quantity;
            if let Some(first) = first_quoted {
                first_quoted_total += first * *quantity;
            }
            if last_approved.is_none() {
                warnings.push(DataQualityWarning::MissingBaseline {
                    product_key: canonical.clone(),
                });
            }
        }

        let classification = match best_unit_price {
            Some(best) => SavingsClass::from_baseline(last_approved, best),
            None => SavingsClass::Neutral,
        };

        lines.push(LineComparison {
            product_key: canonical.clone(),
            quantity: *quantity,
            best_supplier: best.map(|b| b.cost.supplier_name.clone()),
            best_unit_price,
            best_landed_unit_cost: best.map(|b| b.cost.landed_unit_cost),
            average_unit_price,
            last_approved_unit_price: last_approved,
            last_approved_supplier: item.last_approved_supplier.clone(),
            first_quoted_unit_price: first_quoted,
            savings_vs_average: average_unit_price
                .zip(best_unit_price)
                .and_then(|(baseline, best)| SavingsFigure::against(baseline, best)),
            savings_vs_last_approved: last_approved
                .zip(best_unit_price)
                .and_then(|(baseline, best)| SavingsFigure::against(baseline, best)),
            savings_vs_first_quoted: first_quoted
                .zip(best_unit_price)
                .and_then(|(baseline, best)| SavingsFigure::against(baseline, best)),
            classification,
        });
    }

    EconomicSummary {
        quotation_id: quotation.id,
        best_total,
        best_unit_total,
        average_total,
        last_approved_total,
        first_quoted_total,
        savings_vs_average: SavingsFigure::against(average_total, best_unit_total),
        savings_vs_last_approved: SavingsFigure::against(last_approved_total, best_unit_total),
        savings_vs_first_quoted: SavingsFigure::against(first_quoted_total, best_unit_total),
        lines,
        warnings,
    }
}

/// Builds the comparative analysis with exact key matching.
pub fn build_comparative_analysis(quotation: &Quotation) -> ComparativeAnalysis {
    build_comparative_analysis_with(quotation, MatchMode::Exact)
}

/// Picks, per product, the supplier with the lowest raw price, the fewest
/// delivery days and the most payment days, then totals the basket under
/// each of the three policies. Lines without a term never win that axis;
/// only competing lines (positive price) enter any axis.
pub fn build_comparative_analysis_with(quotation: &Quotation, mode: MatchMode) -> ComparativeAnalysis {
    let (index, mut warnings) = item_index(quotation, mode);

    #[derive(Default)]
    struct AxisWinners {
        price: Option<SupplierChoice>,
        delivery: Option<TermChoice>,
        payment: Option<TermChoice>,
    }

    let mut axes: IndexMap<ProductKey, AxisWinners> = IndexMap::new();

    for offer in &quotation.offers {
        for line in &offer.lines {
            let Some((canonical, _)) = index.get(&lookup_key(&line.product_key, mode)) else {
                warnings.push(DataQualityWarning::UnmatchedProduct {
                    supplier_name: offer.supplier_name.clone(),
                    product_key: line.product_key.clone(),
                });
                continue;
            };
            if line.unit_price < Decimal::ZERO {
                warnings.push(DataQualityWarning::NegativeUnitPrice {
                    product_key: line.product_key.clone(),
                    supplier_name: offer.supplier_name.clone(),
                    unit_price: line.unit_price,
                });
            }
            if !line.is_competing() {
                continue;
            }

            let entry = axes.entry(canonical.clone()).or_default();

            // Strict comparisons on every axis: ties keep the supplier
            // that submitted first.
            if entry
                .price
                .as_ref()
                .map_or(true, |p| line.unit_price < p.unit_price)
            {
                entry.price = Some(SupplierChoice {
                    supplier_name: offer.supplier_name.clone(),
                    unit_price: line.unit_price,
                });
            }

            if let Some(days) = line.delivery_term_days {
                if entry.delivery.as_ref().map_or(true, |d| days < d.days) {
                    entry.delivery = Some(TermChoice {
                        supplier_name: offer.supplier_name.clone(),
                        days,
                        unit_price: line.unit_price,
                    });
                }
            }

            if let Some(days) = offer.payment_term_days {
                if entry.payment.as_ref().map_or(true, |p| days > p.days) {
                    entry.payment = Some(TermChoice {
                        supplier_name: offer.supplier_name.clone(),
                        days,
                        unit_price: line.unit_price,
                    });
                }
            }
        }
    }

    let mut products = Vec::new();
    let mut seen: IndexSet<ProductKey> = IndexSet::new();

    let mut best_price_total = Decimal::ZERO;
    let mut best_delivery_total = Decimal::ZERO;
    let mut best_payment_total = Decimal::ZERO;
    let mut last_approved_total = Decimal::ZERO;

    for item in &quotation.items {
        let Some((canonical, quantity)) = index.get(&lookup_key(&item.product_key, mode)) else {
            continue;
        };
        if !seen.insert(canonical.clone()) {
            continue;
        }

        let winners = axes.get(canonical);
        let best_price = winners.and_then(|w| w.price.clone());
        let best_delivery = winners.and_then(|w| w.delivery.clone());
        let best_payment = winners.and_then(|w| w.payment.clone());

        match &best_price {
            Some(choice) => {
                best_price_total += choice.unit_price * *quantity;
                last_approved_total +=
                    item.last_approved_unit_price.unwrap_or(Decimal::ZERO) * *quantity;
            }
            None => warnings.push(DataQualityWarning::NoCompetingOffer {
                product_key: canonical.clone(),
            }),
        }
        if let Some(choice) = &best_delivery {
            best_delivery_total += choice.unit_price * *quantity;
        }
        if let Some(choice) = &best_payment {
            best_payment_total += choice.unit_price * *quantity;
        }

        products.push(ProductComparison {
            product_key: canonical.clone(),
            quantity: *quantity,
            best_price,
            best_delivery,
            best_payment,
        });
    }

    ComparativeAnalysis {
        quotation_id: quotation.id,
        products,
        best_price_total,
        best_delivery_total,
        best_payment_total,
        last_approved_total,
        savings_vs_last_approved: SavingsFigure::against(last_approved_total, best_price_total),
        warnings,
    }
}
