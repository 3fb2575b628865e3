// Core models
pub mod landed_cost;
pub mod product_item;
pub mod quotation;
pub mod summary;
pub mod supplier_offer;
pub mod warning;

pub use landed_cost::{BestOffer, LandedCost};
pub use product_item::{ProductItem, ProductKey};
pub use quotation::{Quotation, QuotationAction, QuotationStatus};
pub use summary::{
    ComparativeAnalysis, EconomicSummary, LineComparison, ProductComparison, SavingsClass,
    SavingsFigure, SavingsRecord, SupplierChoice, TermChoice,
};
pub use supplier_offer::{OfferLine, SupplierOffer};
pub use warning::DataQualityWarning;
