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
    static ref QUOTATION_REJECTIONS: IntCounter = IntCounter::new(
        "quotation_rejections_total",
        "Total number of quotations rejected"
    )
    .expect("metric can be created");
    static ref QUOTATION_REJECTION_FAILURES: IntCounter = IntCounter::new(
        "quotation_rejection_failures_total",
        "Total number of failed quotation rejections"
    )
    .expect("metric can be created");
}

/// Rejects a quotation. A reason is mandatory; without one the quotation
/// is left exactly as it was.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RejectQuotationCommand {
    pub quotation_id: Uuid,
    pub rejected_by: Uuid,
    /// Status the caller last observed.
    pub observed_status: QuotationStatus,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RejectQuotationResult {
    pub id: Uuid,
    pub status: QuotationStatus,
}

#[async_trait::async_trait]
impl Command for RejectQuotationCommand {
    type Result = RejectQuotationResult;

    #[instrument(skip(self, repository, event_sender))]
    async fn execute(
        &self,
        repository: Arc<dyn QuotationRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, EngineError> {
        if self.reason.trim().is_empty() {
            return Err(EngineError::MissingRequiredField {
                action: QuotationAction::Reject,
                field: "rejection_reason",
            });
        }

        let quotation =
            load_fresh(repository.as_ref(), self.quotation_id, self.observed_status).await?;
        let next = workflow::transition(quotation.status, QuotationAction::Reject)?;

        let mut metadata = StatusMetadata::new(self.rejected_by, QuotationAction::Reject);
        metadata.rejection_reason = Some(self.reason.trim().to_string());

        repository
            .save_status(self.quotation_id, quotation.status, next, &metadata)
            .await?;

        self.log_and_trigger_event(&event_sender).await?;

        QUOTATION_REJECTIONS.inc();

        Ok(RejectQuotationResult {
            id: self.quotation_id,
            status: next,
        })
    }
}

impl RejectQuotationCommand {
    async fn log_and_trigger_event(&self, event_sender: &EventSender) -> Result<(), EngineError> {
        info!(
            quotation_id = %self.quotation_id,
            rejected_by = %self.rejected_by,
            reason = %self.reason,
            "Quotation rejected"
        );

        event_sender
            .send(Event::QuotationRejected {
                quotation_id: self.quotation_id,
                rejected_by: self.rejected_by,
                reason: self.reason.trim().to_string(),
            })
            .await
            .map_err(|e| {
                QUOTATION_REJECTION_FAILURES.inc();
                let msg = format!("Failed to send event for rejected quotation: {}", e);
                error!("{}", msg);
                EngineError::Event(msg)
            })
    }
}
