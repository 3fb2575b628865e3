//! Shared builders and harness for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use quotation_engine::config::EngineConfig;
use quotation_engine::events::{self, Event};
use quotation_engine::models::{
    OfferLine, ProductItem, Quotation, QuotationStatus, SupplierOffer,
};
use quotation_engine::repositories::{InMemoryQuotationRepository, QuotationRepository};
use quotation_engine::services::ApprovalService;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use uuid::Uuid;

pub fn item(product: &str, quantity: Decimal) -> ProductItem {
    ProductItem::new(product, quantity, "un")
}

pub fn line(product: &str, unit_price: Decimal) -> OfferLine {
    OfferLine::new(product, unit_price)
}

pub fn taxed_line(
    product: &str,
    unit_price: Decimal,
    difal_percent: Decimal,
    ipi_amount_per_unit: Decimal,
) -> OfferLine {
    let mut line = OfferLine::new(product, unit_price);
    line.difal_percent = difal_percent;
    line.ipi_amount_per_unit = ipi_amount_per_unit;
    line
}

pub fn offer(supplier_name: &str, freight_total: Decimal, lines: Vec<OfferLine>) -> SupplierOffer {
    let mut offer = SupplierOffer::new(Uuid::new_v4(), supplier_name);
    offer.freight_total = freight_total;
    offer.lines = lines;
    offer
}

pub fn quotation(items: Vec<ProductItem>, offers: Vec<SupplierOffer>) -> Quotation {
    let mut quotation = Quotation::new(Uuid::new_v4(), Uuid::new_v4());
    quotation.items = items;
    quotation.offers = offers;
    quotation
}

pub fn quotation_in(
    status: QuotationStatus,
    items: Vec<ProductItem>,
    offers: Vec<SupplierOffer>,
) -> Quotation {
    let mut quotation = self::quotation(items, offers);
    quotation.status = status;
    quotation
}

/// Approval harness over the in-memory repository: the service, its store,
/// and the event stream it publishes to.
pub struct TestEngine {
    pub service: ApprovalService,
    pub repository: Arc<InMemoryQuotationRepository>,
    pub events: mpsc::Receiver<Event>,
}

impl TestEngine {
    pub async fn seeded_with(quotation: &Quotation) -> Self {
        let repository = Arc::new(InMemoryQuotationRepository::new());
        repository
            .put(quotation.clone())
            .await
            .expect("seed quotation");

        let (sender, events) = events::channel(32);
        let service = ApprovalService::new(
            repository.clone(),
            Arc::new(sender),
            &EngineConfig::default(),
        );

        Self {
            service,
            repository,
            events,
        }
    }

    pub async fn stored(&self, id: Uuid) -> Quotation {
        self.repository.load(id).await.expect("stored quotation")
    }
}
