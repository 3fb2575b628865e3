use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::MatchMode;
use crate::errors::EngineError;
use crate::models::{ComparativeAnalysis, EconomicSummary};
use crate::pricing::{self, BestOfferReport, CostReport};
use crate::repositories::QuotationRepository;

/// Read side of the engine: loads a quotation snapshot from the repository
/// and runs the pure calculators from [`crate::pricing`] over it.
///
/// Every result embeds its own data-quality warnings, so callers get the
/// numbers and the caveats in one response.
#[derive(Clone)]
pub struct PricingService {
    repository: Arc<dyn QuotationRepository>,
    matching: MatchMode,
}

impl PricingService {
    /// Creates a pricing service. `matching` usually comes from
    /// [`crate::config::EngineConfig`].
    pub fn new(repository: Arc<dyn QuotationRepository>, matching: MatchMode) -> Self {
        Self {
            repository,
            matching,
        }
    }

    /// Tax-adjusted, freight-loaded cost of every offer line.
    #[instrument(skip(self))]
    pub async fn landed_costs(&self, quotation_id: Uuid) -> Result<CostReport, EngineError> {
        let quotation = self.repository.load(quotation_id).await?;
        let report = pricing::compute_landed_costs_with(&quotation, self.matching);
        info!(
            lines = report.costs.len(),
            warnings = report.warnings.len(),
            "Computed landed costs"
        );
        Ok(report)
    }

    /// Cheapest supplier per requested product, by landed unit cost.
    #[instrument(skip(self))]
    pub async fn best_offers(&self, quotation_id: Uuid) -> Result<BestOfferReport, EngineError> {
        let quotation = self.repository.load(quotation_id).await?;
        let report = pricing::select_best_offers_with(&quotation, self.matching);
        info!(
            winners = report.best.len(),
            without_offers = report.without_offers.len(),
            "Selected best offers"
        );
        Ok(report)
    }

    /// Quotation-level totals, baselines and savings figures.
    #[instrument(skip(self))]
    pub async fn economic_summary(
        &self,
        quotation_id: Uuid,
    ) -> Result<EconomicSummary, EngineError> {
        let quotation = self.repository.load(quotation_id).await?;
        let summary = pricing::build_economic_summary_with(&quotation, self.matching);
        info!(
            best_total = %summary.best_total,
            warnings = summary.warnings.len(),
            "Built economic summary"
        );
        Ok(summary)
    }

    /// Per-product winners along the price, delivery and payment axes.
    #[instrument(skip(self))]
    pub async fn comparative_analysis(
        &self,
        quotation_id: Uuid,
    ) -> Result<ComparativeAnalysis, EngineError> {
        let quotation = self.repository.load(quotation_id).await?;
        let analysis = pricing::build_comparative_analysis_with(&quotation, self.matching);
        info!(
            products = analysis.products.len(),
            "Built comparative analysis"
        );
        Ok(analysis)
    }
}
