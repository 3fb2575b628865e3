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
    static ref QUOTATION_ESCALATIONS: IntCounter = IntCounter::new(
        "quotation_escalations_total",
        "Total number of quotations escalated to a supervisor"
    )
    .expect("metric can be created");
}

/// Hands a quotation from the buyer's queue to a supervisor.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EscalateQuotationCommand {
    pub quotation_id: Uuid,
    pub escalated_by: Uuid,
    /// Status the caller last observed.
    pub observed_status: QuotationStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EscalateQuotationResult {
    pub id: Uuid,
    pub status: QuotationStatus,
}

#[async_trait::async_trait]
impl Command for EscalateQuotationCommand {
    type Result = EscalateQuotationResult;

    #[instrument(skip(self, repository, event_sender))]
    async fn execute(
        &self,
        repository: Arc<dyn QuotationRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, EngineError> {
        let quotation =
            load_fresh(repository.as_ref(), self.quotation_id, self.observed_status).await?;
        let next = workflow::transition(quotation.status, QuotationAction::Escalate)?;

        let metadata = StatusMetadata::new(self.escalated_by, QuotationAction::Escalate);
        repository
            .save_status(self.quotation_id, quotation.status, next, &metadata)
            .await?;

        info!(
            quotation_id = %self.quotation_id,
            escalated_by = %self.escalated_by,
            "Quotation escalated to supervisor"
        );

        event_sender
            .send(Event::QuotationEscalated {
                quotation_id: self.quotation_id,
                escalated_by: self.escalated_by,
            })
            .await
            .map_err(|e| {
                let msg = format!("Failed to send event for escalated quotation: {}", e);
                error!("{}", msg);
                EngineError::Event(msg)
            })?;

        QUOTATION_ESCALATIONS.inc();

        Ok(EscalateQuotationResult {
            id: self.quotation_id,
            status: next,
        })
    }
}
