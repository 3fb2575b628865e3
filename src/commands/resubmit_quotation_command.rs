use crate::{
    commands::{load_fresh, Command},
    config::MatchMode,
    errors::EngineError,
    events::{Event, EventSender},
    models::{EconomicSummary, QuotationAction, QuotationStatus},
    pricing::build_economic_summary_with,
    repositories::{QuotationRepository, StatusMetadata},
    workflow,
};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref QUOTATION_RESUBMISSIONS: IntCounter = IntCounter::new(
        "quotation_resubmissions_total",
        "Total number of renegotiated quotations resubmitted"
    )
    .expect("metric can be created");
    static ref QUOTATION_RESUBMISSION_FAILURES: IntCounter = IntCounter::new(
        "quotation_resubmission_failures_total",
        "Total number of failed quotation resubmissions"
    )
    .expect("metric can be created");
}

/// Returns a renegotiated quotation to the supervisor's queue. The
/// economics are recomputed from the current offers inside the critical
/// section, so the supervisor reviews figures that match what will be
/// approved, not the pre-renegotiation ones.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ResubmitQuotationCommand {
    pub quotation_id: Uuid,
    pub resubmitted_by: Uuid,
    /// Status the caller last observed.
    pub observed_status: QuotationStatus,
    /// Matching mode for the recompute.
    #[serde(default)]
    pub matching: MatchMode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResubmitQuotationResult {
    pub id: Uuid,
    pub status: QuotationStatus,
    /// Fresh economics over the renegotiated offers.
    pub summary: EconomicSummary,
}

#[async_trait::async_trait]
impl Command for ResubmitQuotationCommand {
    type Result = ResubmitQuotationResult;

    #[instrument(skip(self, repository, event_sender))]
    async fn execute(
        &self,
        repository: Arc<dyn QuotationRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, EngineError> {
        let quotation =
            load_fresh(repository.as_ref(), self.quotation_id, self.observed_status).await?;
        let next = workflow::transition(quotation.status, QuotationAction::Resubmit)?;

        let summary = build_economic_summary_with(&quotation, self.matching);

        let metadata = StatusMetadata::new(self.resubmitted_by, QuotationAction::Resubmit);
        repository
            .save_status(self.quotation_id, quotation.status, next, &metadata)
            .await?;

        self.log_and_trigger_event(&event_sender, &summary).await?;

        QUOTATION_RESUBMISSIONS.inc();

        Ok(ResubmitQuotationResult {
            id: self.quotation_id,
            status: next,
            summary,
        })
    }
}

impl ResubmitQuotationCommand {
    async fn log_and_trigger_event(
        &self,
        event_sender: &EventSender,
        summary: &EconomicSummary,
    ) -> Result<(), EngineError> {
        info!(
            quotation_id = %self.quotation_id,
            resubmitted_by = %self.resubmitted_by,
            best_total = %summary.best_total,
            "Quotation resubmitted after renegotiation"
        );

        event_sender
            .send(Event::QuotationResubmitted {
                quotation_id: self.quotation_id,
                resubmitted_by: self.resubmitted_by,
                best_total: summary.best_total,
            })
            .await
            .map_err(|e| {
                QUOTATION_RESUBMISSION_FAILURES.inc();
                let msg = format!("Failed to send event for resubmitted quotation: {}", e);
                error!("{}", msg);
                EngineError::Event(msg)
            })
    }
}
