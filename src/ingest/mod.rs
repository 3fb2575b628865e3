//! Ingestion boundary: lenient deserialization of quotation payloads.
//!
//! Upstream exports are spreadsheet-born. Numbers arrive as strings with
//! currency prefixes and decimal commas, terms arrive as prose ("30 dias"),
//! and half the fields have two spellings. All of that is absorbed here,
//! once, so the calculators only ever see typed values: a missing or
//! unparseable required numeric becomes zero, a malformed optional becomes
//! absent, and unknown fields are dropped. Nothing in this module fails.

use chrono::NaiveDate;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::models::{
    DataQualityWarning, OfferLine, ProductItem, ProductKey, Quotation, SupplierOffer,
};

/// Quotation payload as the purchasing front end exports it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuotation {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default, alias = "buyerId")]
    pub buyer_id: Option<Uuid>,
    #[serde(default, alias = "supervisorId")]
    pub supervisor_id: Option<Uuid>,
    #[serde(default)]
    pub items: Vec<RawProductItem>,
    #[serde(default, alias = "suppliers")]
    pub offers: Vec<RawSupplierOffer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawProductItem {
    #[serde(alias = "productKey", alias = "product", alias = "description")]
    pub product_key: String,
    #[serde(default, alias = "qty", deserialize_with = "lenient_decimal")]
    pub quantity: Decimal,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(
        default,
        alias = "lastApprovedUnitPrice",
        deserialize_with = "lenient_optional_decimal"
    )]
    pub last_approved_unit_price: Option<Decimal>,
    #[serde(default, alias = "lastApprovedSupplier")]
    pub last_approved_supplier: Option<String>,
    #[serde(
        default,
        alias = "firstQuotedUnitPrice",
        deserialize_with = "lenient_optional_decimal"
    )]
    pub first_quoted_unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSupplierOffer {
    #[serde(default, alias = "supplierId")]
    pub supplier_id: Option<Uuid>,
    #[serde(alias = "supplierName", alias = "supplier", alias = "name")]
    pub supplier_name: String,
    #[serde(
        default,
        alias = "freightTotal",
        alias = "freight",
        deserialize_with = "lenient_decimal"
    )]
    pub freight_total: Decimal,
    #[serde(default, alias = "paymentTerm", alias = "paymentTermDays")]
    pub payment_term: Option<RawTerm>,
    #[serde(default)]
    pub lines: Vec<RawOfferLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOfferLine {
    #[serde(alias = "productKey", alias = "product", alias = "description")]
    pub product_key: String,
    #[serde(
        default,
        alias = "unitPrice",
        alias = "price",
        deserialize_with = "lenient_decimal"
    )]
    pub unit_price: Decimal,
    #[serde(
        default,
        alias = "difal",
        alias = "difalPercent",
        deserialize_with = "lenient_decimal"
    )]
    pub difal_percent: Decimal,
    #[serde(
        default,
        alias = "ipi",
        alias = "ipiAmountPerUnit",
        deserialize_with = "lenient_decimal"
    )]
    pub ipi_amount_per_unit: Decimal,
    #[serde(default, alias = "deliveryTerm", alias = "deliveryTermDays")]
    pub delivery_term: Option<RawTerm>,
    #[serde(default, alias = "deliveryDate", deserialize_with = "lenient_date")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(
        default,
        alias = "lastApprovedUnitPrice",
        deserialize_with = "lenient_optional_decimal"
    )]
    pub last_approved_unit_price: Option<Decimal>,
    #[serde(default, alias = "lastApprovedSupplier")]
    pub last_approved_supplier: Option<String>,
    #[serde(
        default,
        alias = "firstQuotedUnitPrice",
        deserialize_with = "lenient_optional_decimal"
    )]
    pub first_quoted_unit_price: Option<Decimal>,
}

/// A term as upstream systems send it: a plain number of days or prose
/// like `"30 dias"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTerm {
    Days(i64),
    Text(String),
    Other(IgnoredAny),
}

impl RawTerm {
    /// Day count carried by the term. Prose yields its first number;
    /// negative or numberless terms yield nothing.
    pub fn days(&self) -> Option<i64> {
        match self {
            Self::Days(days) if *days >= 0 => Some(*days),
            Self::Days(_) => None,
            Self::Text(raw) => extract_day_count(raw),
            Self::Other(_) => None,
        }
    }
}

static DAY_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("day count pattern compiles"));

fn extract_day_count(raw: &str) -> Option<i64> {
    DAY_COUNT.find(raw).and_then(|m| m.as_str().parse().ok())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(Decimal),
    Text(String),
    Other(IgnoredAny),
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<NumberLike>::deserialize(deserializer)? {
        Some(NumberLike::Number(number)) => number,
        Some(NumberLike::Text(raw)) => parse_decimal_text(&raw).unwrap_or(Decimal::ZERO),
        Some(NumberLike::Other(_)) | None => Decimal::ZERO,
    };
    Ok(value)
}

fn lenient_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<NumberLike>::deserialize(deserializer)? {
        Some(NumberLike::Number(number)) => Some(number),
        Some(NumberLike::Text(raw)) => parse_decimal_text(&raw),
        Some(NumberLike::Other(_)) | None => None,
    };
    Ok(value)
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<NumberLike>::deserialize(deserializer)? {
        Some(NumberLike::Text(raw)) => parse_flexible_date(&raw),
        _ => None,
    };
    Ok(value)
}

/// Parses `"1.234,56"`, `"10,5"`, `"R$ 9.90"` and plain `"12.34"` alike.
/// A comma is the decimal separator only when no dot follows it.
fn parse_decimal_text(raw: &str) -> Option<Decimal> {
    let stripped = raw
        .trim()
        .trim_start_matches("R$")
        .trim_start_matches('$')
        .trim();
    if stripped.is_empty() {
        return None;
    }
    let mut cleaned = stripped.replace(' ', "");
    if cleaned.contains(',') {
        cleaned = if cleaned.contains('.') {
            cleaned.replace('.', "").replace(',', ".")
        } else {
            cleaned.replace(',', ".")
        };
    }
    cleaned.parse::<Decimal>().ok()
}

fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .ok()
}

/// Turns a raw payload into a typed [`Quotation`] plus the data-quality
/// warnings collected on the way.
///
/// Product keys keep their inner spelling; only surrounding whitespace is
/// dropped. Offers keep their submission order, which later drives
/// tie-breaking in the selection.
pub fn normalize_quotation(raw: RawQuotation) -> (Quotation, Vec<DataQualityWarning>) {
    let mut warnings = Vec::new();

    let mut quotation = Quotation::new(
        raw.id.unwrap_or_else(Uuid::new_v4),
        raw.buyer_id.unwrap_or_else(Uuid::nil),
    );
    quotation.supervisor_id = raw.supervisor_id;

    for raw_item in raw.items {
        if raw_item.quantity < Decimal::ZERO {
            warnings.push(DataQualityWarning::NegativeQuantity {
                product_key: ProductKey::from(raw_item.product_key.trim()),
                quantity: raw_item.quantity,
            });
        }
        let mut item = ProductItem::new(
            raw_item.product_key.trim(),
            raw_item.quantity,
            raw_item.unit.as_deref().unwrap_or("un").trim(),
        );
        item.last_approved_unit_price = raw_item.last_approved_unit_price;
        item.last_approved_supplier = raw_item.last_approved_supplier;
        item.first_quoted_unit_price = raw_item.first_quoted_unit_price;
        quotation.items.push(item);
    }

    let mut lifted = LiftedBaselines::default();

    for raw_offer in raw.offers {
        let mut offer = SupplierOffer::new(
            raw_offer.supplier_id.unwrap_or_else(Uuid::new_v4),
            raw_offer.supplier_name.trim(),
        );
        offer.freight_total = raw_offer.freight_total;
        offer.payment_term_days = raw_offer.payment_term.as_ref().and_then(RawTerm::days);

        for raw_line in raw_offer.lines {
            let key = ProductKey::from(raw_line.product_key.trim());
            lifted.collect(&key, &raw_line);

            if raw_line.unit_price < Decimal::ZERO {
                warnings.push(DataQualityWarning::NegativeUnitPrice {
                    product_key: key.clone(),
                    supplier_name: offer.supplier_name.clone(),
                    unit_price: raw_line.unit_price,
                });
            }

            let mut line = OfferLine::new(key, raw_line.unit_price);
            line.difal_percent = raw_line.difal_percent;
            line.ipi_amount_per_unit = raw_line.ipi_amount_per_unit;
            line.delivery_term_days = raw_line.delivery_term.as_ref().and_then(RawTerm::days);
            line.delivery_date = raw_line.delivery_date;
            offer.lines.push(line);
        }

        quotation.offers.push(offer);
    }

    lifted.apply(&mut quotation);

    (quotation, warnings)
}

/// Exports often repeat the item's historical prices on every supplier row
/// instead of the item itself. When the item carries none, the highest
/// row-level last-approved price (and its supplier, when named) is lifted
/// onto it; the first quote is lifted from the first row that has one.
#[derive(Default)]
struct LiftedBaselines {
    last_approved: IndexMap<ProductKey, (Decimal, Option<String>)>,
    first_quoted: IndexMap<ProductKey, Decimal>,
}

impl LiftedBaselines {
    fn collect(&mut self, key: &ProductKey, raw_line: &RawOfferLine) {
        if let Some(value) = raw_line.last_approved_unit_price {
            match self.last_approved.get_mut(key) {
                Some((existing, supplier)) if value > *existing => {
                    *existing = value;
                    *supplier = raw_line.last_approved_supplier.clone();
                }
                Some(_) => {}
                None => {
                    self.last_approved
                        .insert(key.clone(), (value, raw_line.last_approved_supplier.clone()));
                }
            }
        }
        if let Some(value) = raw_line.first_quoted_unit_price {
            self.first_quoted.entry(key.clone()).or_insert(value);
        }
    }

    fn apply(&self, quotation: &mut Quotation) {
        for item in &mut quotation.items {
            if item.last_approved_unit_price.is_none() {
                if let Some((value, supplier)) = self.last_approved.get(&item.product_key) {
                    item.last_approved_unit_price = Some(*value);
                    if item.last_approved_supplier.is_none() {
                        item.last_approved_supplier = supplier.clone();
                    }
                }
            }
            if item.first_quoted_unit_price.is_none() {
                if let Some(value) = self.first_quoted.get(&item.product_key) {
                    item.first_quoted_unit_price = Some(*value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn messy_export_normalizes_end_to_end() {
        let payload = r#"{
            "buyerId": "7f1bb87e-4710-4123-9c37-0d8e9a3c6f11",
            "items": [
                {"productKey": " Arroz 5kg ", "qty": "100", "unit": "fd",
                 "lastApprovedUnitPrice": "13,00", "unexpected": true}
            ],
            "suppliers": [
                {"supplierName": "Fornecedor A", "freightTotal": "R$ 50,00",
                 "paymentTerm": "45 dias",
                 "lines": [
                    {"productKey": "Arroz 5kg", "unitPrice": "10,00",
                     "difal": 10, "ipi": "0,50",
                     "deliveryTerm": "30 dias", "deliveryDate": "15/01/2026"}
                 ]}
            ]
        }"#;

        let raw: RawQuotation = serde_json::from_str(payload).unwrap();
        let (quotation, warnings) = normalize_quotation(raw);

        assert!(warnings.is_empty());
        assert_eq!(quotation.items.len(), 1);
        let item = &quotation.items[0];
        assert_eq!(item.product_key.as_str(), "Arroz 5kg");
        assert_eq!(item.quantity, dec!(100));
        assert_eq!(item.last_approved_unit_price, Some(dec!(13.00)));

        let offer = &quotation.offers[0];
        assert_eq!(offer.freight_total, dec!(50.00));
        assert_eq!(offer.payment_term_days, Some(45));
        let line = &offer.lines[0];
        assert_eq!(line.unit_price, dec!(10.00));
        assert_eq!(line.difal_percent, dec!(10));
        assert_eq!(line.ipi_amount_per_unit, dec!(0.50));
        assert_eq!(line.delivery_term_days, Some(30));
        assert_eq!(
            line.delivery_date,
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );
    }

    #[test]
    fn unparseable_required_numerics_become_zero() {
        let payload = r#"{
            "items": [{"productKey": "Feijão"}],
            "offers": [
                {"supplierName": "Fornecedor A",
                 "freightTotal": "a combinar",
                 "lines": [{"productKey": "Feijão", "unitPrice": "N/A", "difal": null}]}
            ]
        }"#;

        let raw: RawQuotation = serde_json::from_str(payload).unwrap();
        let (quotation, _) = normalize_quotation(raw);

        assert_eq!(quotation.items[0].quantity, Decimal::ZERO);
        assert_eq!(quotation.offers[0].freight_total, Decimal::ZERO);
        assert_eq!(quotation.offers[0].lines[0].unit_price, Decimal::ZERO);
        assert_eq!(quotation.offers[0].lines[0].difal_percent, Decimal::ZERO);
    }

    #[test]
    fn unparseable_optional_baselines_stay_absent() {
        let payload = r#"{
            "items": [{"productKey": "Café", "qty": 10,
                       "lastApprovedUnitPrice": "sem histórico"}]
        }"#;

        let raw: RawQuotation = serde_json::from_str(payload).unwrap();
        let (quotation, _) = normalize_quotation(raw);
        assert_eq!(quotation.items[0].last_approved_unit_price, None);
    }

    #[test]
    fn day_counts_come_out_of_prose() {
        assert_eq!(RawTerm::Text("30 dias".into()).days(), Some(30));
        assert_eq!(RawTerm::Text("entrega em 10 dias úteis".into()).days(), Some(10));
        assert_eq!(RawTerm::Text("imediata".into()).days(), None);
        assert_eq!(RawTerm::Days(15).days(), Some(15));
        assert_eq!(RawTerm::Days(-3).days(), None);
    }

    #[test]
    fn decimal_comma_and_thousand_separators_parse() {
        assert_eq!(parse_decimal_text("1.234,56"), Some(dec!(1234.56)));
        assert_eq!(parse_decimal_text("10,5"), Some(dec!(10.5)));
        assert_eq!(parse_decimal_text("12.34"), Some(dec!(12.34)));
        assert_eq!(parse_decimal_text("R$ 9,90"), Some(dec!(9.90)));
        assert_eq!(parse_decimal_text("  "), None);
        assert_eq!(parse_decimal_text("abc"), None);
    }

    #[test]
    fn dates_parse_iso_and_brazilian_or_not_at_all() {
        assert_eq!(
            parse_flexible_date("2026-01-15"),
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );
        assert_eq!(
            parse_flexible_date("15/01/2026"),
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );
        assert_eq!(parse_flexible_date("amanhã"), None);
    }

    #[test]
    fn row_level_baselines_lift_onto_the_item() {
        let payload = r#"{
            "items": [{"productKey": "Óleo", "qty": 24}],
            "offers": [
                {"supplierName": "Fornecedor A", "lines": [
                    {"productKey": "Óleo", "unitPrice": 8.0,
                     "lastApprovedUnitPrice": 8.50,
                     "lastApprovedSupplier": "Fornecedor Antigo"}
                ]},
                {"supplierName": "Fornecedor B", "lines": [
                    {"productKey": "Óleo", "unitPrice": 8.2,
                     "lastApprovedUnitPrice": 9.00}
                ]}
            ]
        }"#;

        let raw: RawQuotation = serde_json::from_str(payload).unwrap();
        let (quotation, _) = normalize_quotation(raw);

        let item = &quotation.items[0];
        assert_eq!(item.last_approved_unit_price, Some(dec!(9.00)));
        // the 9.00 row named no supplier, so none is invented
        assert_eq!(item.last_approved_supplier, None);
    }

    #[test]
    fn item_level_baseline_beats_the_lift() {
        let payload = r#"{
            "items": [{"productKey": "Óleo", "qty": 24,
                       "lastApprovedUnitPrice": 7.75}],
            "offers": [
                {"supplierName": "Fornecedor A", "lines": [
                    {"productKey": "Óleo", "unitPrice": 8.0,
                     "lastApprovedUnitPrice": 9.00}
                ]}
            ]
        }"#;

        let raw: RawQuotation = serde_json::from_str(payload).unwrap();
        let (quotation, _) = normalize_quotation(raw);
        assert_eq!(
            quotation.items[0].last_approved_unit_price,
            Some(dec!(7.75))
        );
    }

    #[test]
    fn negative_prices_and_quantities_warn_at_the_boundary() {
        let payload = r#"{
            "items": [{"productKey": "Sal", "qty": -5}],
            "offers": [
                {"supplierName": "Fornecedor A", "lines": [
                    {"productKey": "Sal", "unitPrice": -2.00}
                ]}
            ]
        }"#;

        let raw: RawQuotation = serde_json::from_str(payload).unwrap();
        let (_, warnings) = normalize_quotation(raw);

        assert!(warnings
            .iter()
            .any(|w| matches!(w, DataQualityWarning::NegativeQuantity { .. })));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, DataQualityWarning::NegativeUnitPrice { .. })));
    }

    #[test]
    fn missing_identifiers_are_generated_not_fatal() {
        let raw: RawQuotation = serde_json::from_str(r#"{"items": [], "offers": []}"#).unwrap();
        let (quotation, _) = normalize_quotation(raw);
        assert!(!quotation.id.is_nil());
        assert!(quotation.buyer_id.is_nil());
    }
}
