use crate::{
    commands::{load_fresh, Command},
    config::MatchMode,
    errors::EngineError,
    events::{Event, EventSender},
    models::{QuotationAction, QuotationStatus, SavingsRecord},
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
    static ref QUOTATION_APPROVALS: IntCounter = IntCounter::new(
        "quotation_approvals_total",
        "Total number of quotations approved"
    )
    .expect("metric can be created");
    static ref QUOTATION_APPROVAL_FAILURES: IntCounter = IntCounter::new(
        "quotation_approval_failures_total",
        "Total number of failed quotation approvals"
    )
    .expect("metric can be created");
}

/// Approves a quotation from either approval queue and freezes the
/// savings achieved against the recorded baselines.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ApproveQuotationCommand {
    pub quotation_id: Uuid,
    pub approved_by: Uuid,
    /// Status the caller last observed.
    pub observed_status: QuotationStatus,
    /// Matching mode for the final pricing pass.
    #[serde(default)]
    pub matching: MatchMode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApproveQuotationResult {
    pub id: Uuid,
    pub status: QuotationStatus,
    pub savings: SavingsRecord,
}

#[async_trait::async_trait]
impl Command for ApproveQuotationCommand {
    type Result = ApproveQuotationResult;

    #[instrument(skip(self, repository, event_sender))]
    async fn execute(
        &self,
        repository: Arc<dyn QuotationRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, EngineError> {
        let quotation =
            load_fresh(repository.as_ref(), self.quotation_id, self.observed_status).await?;
        let next = workflow::transition(quotation.status, QuotationAction::Approve)?;

        // Price the quotation one last time so the frozen record reflects
        // exactly what was approved, not an earlier draft of the offers.
        let summary = build_economic_summary_with(&quotation, self.matching);
        let savings = SavingsRecord::from_summary(&summary);

        let mut metadata = StatusMetadata::new(self.approved_by, QuotationAction::Approve);
        metadata.savings = Some(savings.clone());

        repository
            .save_status(self.quotation_id, quotation.status, next, &metadata)
            .await?;

        self.log_and_trigger_event(&event_sender, &savings).await?;

        QUOTATION_APPROVALS.inc();

        Ok(ApproveQuotationResult {
            id: self.quotation_id,
            status: next,
            savings,
        })
    }
}

impl ApproveQuotationCommand {
    async fn log_and_trigger_event(
        &self,
        event_sender: &EventSender,
        savings: &SavingsRecord,
    ) -> Result<(), EngineError> {
        info!(
            quotation_id = %self.quotation_id,
            approved_by = %self.approved_by,
            final_total = %savings.final_total,
            "Quotation approved"
        );

        event_sender
            .send(Event::QuotationApproved {
                quotation_id: self.quotation_id,
                approved_by: self.approved_by,
                savings: savings.clone(),
            })
            .await
            .map_err(|e| {
                QUOTATION_APPROVAL_FAILURES.inc();
                let msg = format!("Failed to send event for approved quotation: {}", e);
                error!("{}", msg);
                EngineError::Event(msg)
            })
    }
}
