use crate::{
    commands::{load_fresh, Command},
    errors::EngineError,
    events::{Event, EventSender},
    models::{QuotationAction, QuotationStatus},
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
    static ref QUOTATION_SUBMISSIONS: IntCounter = IntCounter::new(
        "quotation_submissions_total",
        "Total number of quotations submitted for approval"
    )
    .expect("metric can be created");
    static ref QUOTATION_SUBMISSION_FAILURES: IntCounter = IntCounter::new(
        "quotation_submission_failures_total",
        "Total number of failed quotation submissions"
    )
    .expect("metric can be created");
}

/// Moves a draft into the buyer's approval queue.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubmitQuotationCommand {
    pub quotation_id: Uuid,
    pub submitted_by: Uuid,
    /// Status the caller last observed; the transition aborts with a
    /// conflict if the stored quotation has moved on.
    pub observed_status: QuotationStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitQuotationResult {
    pub id: Uuid,
    pub status: QuotationStatus,
}

#[async_trait::async_trait]
impl Command for SubmitQuotationCommand {
    type Result = SubmitQuotationResult;

    #[instrument(skip(self, repository, event_sender))]
    async fn execute(
        &self,
        repository: Arc<dyn QuotationRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, EngineError> {
        let quotation =
            load_fresh(repository.as_ref(), self.quotation_id, self.observed_status).await?;
        let next = workflow::transition(quotation.status, QuotationAction::Submit)?;

        let metadata = StatusMetadata::new(self.submitted_by, QuotationAction::Submit);
        repository
            .save_status(self.quotation_id, quotation.status, next, &metadata)
            .await?;

        self.log_and_trigger_event(&event_sender).await?;

        QUOTATION_SUBMISSIONS.inc();

        Ok(SubmitQuotationResult {
            id: self.quotation_id,
            status: next,
        })
    }
}

impl SubmitQuotationCommand {
    async fn log_and_trigger_event(&self, event_sender: &EventSender) -> Result<(), EngineError> {
        info!(
            quotation_id = %self.quotation_id,
            submitted_by = %self.submitted_by,
            "Quotation submitted for approval"
        );

        event_sender
            .send(Event::QuotationSubmitted {
                quotation_id: self.quotation_id,
                buyer_id: self.submitted_by,
            })
            .await
            .map_err(|e| {
                QUOTATION_SUBMISSION_FAILURES.inc();
                let msg = format!("Failed to send event for submitted quotation: {}", e);
                error!("{}", msg);
                EngineError::Event(msg)
            })
    }
}
