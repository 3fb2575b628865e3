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
    static ref RENEGOTIATION_REQUESTS: IntCounter = IntCounter::new(
        "renegotiation_requests_total",
        "Total number of renegotiations requested by supervisors"
    )
    .expect("metric can be created");
}

/// Sends a quotation back to the buyer for renegotiation. Notes telling
/// the buyer what to renegotiate are mandatory; without them the
/// quotation is left exactly as it was.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RequestRenegotiationCommand {
    pub quotation_id: Uuid,
    pub requested_by: Uuid,
    /// Status the caller last observed.
    pub observed_status: QuotationStatus,
    pub notes: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RequestRenegotiationResult {
    pub id: Uuid,
    pub status: QuotationStatus,
}

#[async_trait::async_trait]
impl Command for RequestRenegotiationCommand {
    type Result = RequestRenegotiationResult;

    #[instrument(skip(self, repository, event_sender))]
    async fn execute(
        &self,
        repository: Arc<dyn QuotationRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, EngineError> {
        if self.notes.trim().is_empty() {
            return Err(EngineError::MissingRequiredField {
                action: QuotationAction::RequestRenegotiation,
                field: "renegotiation_notes",
            });
        }

        let quotation =
            load_fresh(repository.as_ref(), self.quotation_id, self.observed_status).await?;
        let next = workflow::transition(quotation.status, QuotationAction::RequestRenegotiation)?;

        let mut metadata =
            StatusMetadata::new(self.requested_by, QuotationAction::RequestRenegotiation);
        metadata.renegotiation_notes = Some(self.notes.trim().to_string());

        repository
            .save_status(self.quotation_id, quotation.status, next, &metadata)
            .await?;

        info!(
            quotation_id = %self.quotation_id,
            requested_by = %self.requested_by,
            "Renegotiation requested"
        );

        event_sender
            .send(Event::RenegotiationRequested {
                quotation_id: self.quotation_id,
                requested_by: self.requested_by,
                notes: self.notes.trim().to_string(),
            })
            .await
            .map_err(|e| {
                let msg = format!("Failed to send event for renegotiation request: {}", e);
                error!("{}", msg);
                EngineError::Event(msg)
            })?;

        RENEGOTIATION_REQUESTS.inc();

        Ok(RequestRenegotiationResult {
            id: self.quotation_id,
            status: next,
        })
    }
}
