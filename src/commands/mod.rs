use crate::{errors::EngineError, events::EventSender, repositories::QuotationRepository};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Quotation, QuotationStatus};

/// Command trait for implementing the Command Pattern
///
/// Each approval-flow action is encapsulated in one command object that
/// can be validated, executed against the repository, and produce events.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    /// Execute the command with the given dependencies
    ///
    /// # Arguments
    /// * `repository` - Storage boundary for loading and writing quotations
    /// * `event_sender` - Channel to publish workflow events
    async fn execute(
        &self,
        repository: Arc<dyn QuotationRepository>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, EngineError>;
}

/// Re-loads the quotation and checks it against the status the caller
/// last observed. Commands run behind the per-quotation lock, so a
/// mismatch means the caller's snapshot went stale before the lock was
/// acquired; the transition aborts with a conflict instead of acting on
/// outdated data.
pub(crate) async fn load_fresh(
    repository: &dyn QuotationRepository,
    quotation_id: Uuid,
    observed: QuotationStatus,
) -> Result<Quotation, EngineError> {
    let quotation = repository.load(quotation_id).await?;
    if quotation.status != observed {
        return Err(EngineError::conflict(format!(
            "quotation {} is now {}, not the {} the caller last saw",
            quotation_id, quotation.status, observed
        )));
    }
    Ok(quotation)
}

pub mod approve_quotation_command;
pub mod escalate_quotation_command;
pub mod reject_quotation_command;
pub mod request_renegotiation_command;
pub mod resubmit_quotation_command;
pub mod submit_quotation_command;

pub use approve_quotation_command::{ApproveQuotationCommand, ApproveQuotationResult};
pub use escalate_quotation_command::{EscalateQuotationCommand, EscalateQuotationResult};
pub use reject_quotation_command::{RejectQuotationCommand, RejectQuotationResult};
pub use request_renegotiation_command::{
    RequestRenegotiationCommand, RequestRenegotiationResult,
};
pub use resubmit_quotation_command::{ResubmitQuotationCommand, ResubmitQuotationResult};
pub use submit_quotation_command::{SubmitQuotationCommand, SubmitQuotationResult};
