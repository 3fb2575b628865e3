use rust_decimal::Decimal;

/// Tax-adjusted unit cost: `unit_price × (1 + difal/100) + ipi_per_unit`.
///
/// DIFAL scales the price (a percentage), IPI adds to it (an absolute
/// amount per unit). Total over all inputs; zeroed fields simply do not
/// move the price, and a negative price flows through so the caller can
/// flag it rather than have it silently clamped here.
pub fn taxed_unit_cost(
    unit_price: Decimal,
    difal_percent: Decimal,
    ipi_amount_per_unit: Decimal,
) -> Decimal {
    unit_price * (Decimal::ONE + difal_percent / Decimal::ONE_HUNDRED) + ipi_amount_per_unit
}
