use rust_decimal::Decimal;

use super::tax::taxed_unit_cost;
use crate::models::{LandedCost, OfferLine, ProductKey, SupplierOffer};

/// An offer line joined to the quotation item it quotes.
///
/// `quantity` is the item's effective quantity (zero when the line matched
/// nothing or the item quantity was negative), and `item_key` is the item's
/// canonical key so downstream grouping does not depend on how the line
/// spelled the product.
#[derive(Debug)]
pub(crate) struct MatchedLine<'a> {
    pub line: &'a OfferLine,
    pub item_key: ProductKey,
    pub quantity: Decimal,
}

/// Allocates one supplier's freight across its lines, proportional to line
/// value, and returns the landed cost of every line.
///
/// A line participates in the split only when it has a positive quantity
/// and a positive taxed cost; everything else lands with zero freight. With
/// no participating value at all, every share is zero and no division
/// happens, so a freight total on an empty offer is simply not allocated.
pub(crate) fn allocate_offer(
    offer: &SupplierOffer,
    matched: &[MatchedLine<'_>],
) -> Vec<LandedCost> {
    let taxed: Vec<Decimal> = matched
        .iter()
        .map(|m| {
            taxed_unit_cost(
                m.line.unit_price,
                m.line.difal_percent,
                m.line.ipi_amount_per_unit,
            )
        })
        .collect();

    let supplier_total_value: Decimal = matched
        .iter()
        .zip(&taxed)
        .filter(|(m, taxed)| m.quantity > Decimal::ZERO && **taxed > Decimal::ZERO)
        .map(|(m, taxed)| m.quantity * *taxed)
        .sum();

    matched
        .iter()
        .zip(&taxed)
        .map(|(m, taxed_cost)| {
            let participates = m.quantity > Decimal::ZERO
                && *taxed_cost > Decimal::ZERO
                && supplier_total_value > Decimal::ZERO;

            let line_value = m.quantity * *taxed_cost;
            let (freight_share, freight_per_unit) = if participates {
                let share = line_value / supplier_total_value * offer.freight_total;
                (share, share / m.quantity)
            } else {
                (Decimal::ZERO, Decimal::ZERO)
            };

            LandedCost {
                product_key: m.item_key.clone(),
                supplier_id: offer.supplier_id,
                supplier_name: offer.supplier_name.clone(),
                quantity: m.quantity,
                unit_price: m.line.unit_price,
                difal_percent: m.line.difal_percent,
                ipi_amount_per_unit: m.line.ipi_amount_per_unit,
                taxed_unit_cost: *taxed_cost,
                line_value,
                freight_share,
                freight_per_unit,
                landed_unit_cost: *taxed_cost + freight_per_unit,
            }
        })
        .collect()
}
