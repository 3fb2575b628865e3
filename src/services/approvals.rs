use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::timeout;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::commands::{
    ApproveQuotationCommand, Command, EscalateQuotationCommand, RejectQuotationCommand,
    RequestRenegotiationCommand, ResubmitQuotationCommand, SubmitQuotationCommand,
};
use crate::config::{EngineConfig, MatchMode};
use crate::errors::EngineError;
use crate::events::EventSender;
use crate::models::{EconomicSummary, Quotation, QuotationAction, QuotationStatus, SavingsRecord};
use crate::repositories::QuotationRepository;
use crate::workflow::{self, StatusBreakdown};

/// Caller-supplied context for actions that need more than an actor id.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TransitionPayload {
    /// Mandatory for [`QuotationAction::Reject`].
    pub reason: Option<String>,
    /// Mandatory for [`QuotationAction::RequestRenegotiation`].
    pub notes: Option<String>,
}

impl TransitionPayload {
    /// Non-blank value carried for a named mandatory field.
    fn supplied(&self, field: &str) -> Option<&str> {
        let value = match field {
            "rejection_reason" => self.reason.as_deref(),
            "renegotiation_notes" => self.notes.as_deref(),
            _ => None,
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

/// What a successful transition produced.
#[derive(Debug, Serialize)]
pub struct TransitionOutcome {
    pub quotation_id: Uuid,
    pub status: QuotationStatus,

    /// Savings frozen at approval time; `Approve` only.
    pub savings: Option<SavingsRecord>,

    /// Economics recomputed from the fresh offers; `Resubmit` only.
    pub summary: Option<EconomicSummary>,
}

impl TransitionOutcome {
    fn bare(quotation_id: Uuid, status: QuotationStatus) -> Self {
        Self {
            quotation_id,
            status,
            savings: None,
            summary: None,
        }
    }
}

/// Write side of the engine: serializes workflow transitions per quotation
/// and dispatches them to the command layer.
///
/// At most one transition runs at a time for a given quotation. The
/// registry lock serializes writers in this process; the repository's
/// compare-and-set on the expected status is the second barrier and the
/// only one that holds across processes.
#[derive(Clone)]
pub struct ApprovalService {
    repository: Arc<dyn QuotationRepository>,
    event_sender: Arc<EventSender>,
    matching: MatchMode,
    transition_timeout: Duration,
    transition_locks: Arc<DashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl ApprovalService {
    pub fn new(
        repository: Arc<dyn QuotationRepository>,
        event_sender: Arc<EventSender>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            repository,
            event_sender,
            matching: config.product_matching,
            transition_timeout: config.transition_timeout(),
            transition_locks: Arc::new(DashMap::new()),
        }
    }

    /// Applies `action` to the quotation the caller last observed.
    ///
    /// The snapshot's status is the optimistic-concurrency token: if the
    /// stored quotation has moved on since the caller read it, the attempt
    /// fails with [`EngineError::Conflict`] and nothing is written. The
    /// whole attempt runs under a bounded timeout; when it fires, the
    /// in-flight write is dropped and the caller must re-read before
    /// retrying. Nothing here retries on its own.
    #[instrument(skip(self, quotation, payload), fields(quotation_id = %quotation.id))]
    pub async fn attempt_transition(
        &self,
        quotation: &Quotation,
        action: QuotationAction,
        actor: Uuid,
        payload: TransitionPayload,
    ) -> Result<TransitionOutcome, EngineError> {
        // Payload completeness is checked before any lock or IO, so a
        // malformed request can never touch the stored status.
        if let Some(field) = workflow::required_field(action) {
            if payload.supplied(field).is_none() {
                return Err(EngineError::MissingRequiredField { action, field });
            }
        }

        let quotation_id = quotation.id;
        let observed_status = quotation.status;

        let lock = self.acquire_transition_lock(quotation_id);
        let guard = lock.lock().await;

        let result = self
            .dispatch(quotation_id, observed_status, action, actor, &payload)
            .await;

        drop(guard);
        self.release_transition_lock(quotation_id, lock);

        match &result {
            Ok(outcome) => info!(status = %outcome.status, "Quotation transition applied"),
            Err(err) if err.is_retryable() => {
                warn!(error = %err, "Quotation transition contended; re-read and retry")
            }
            Err(err) => error!(error = %err, "Quotation transition failed"),
        }

        result
    }

    /// Counts of stored quotations per status, for the approvals dashboard.
    #[instrument(skip(self))]
    pub async fn status_breakdown(&self) -> Result<StatusBreakdown, EngineError> {
        let quotations = self.repository.list().await?;
        Ok(workflow::status_breakdown(&quotations))
    }

    async fn dispatch(
        &self,
        quotation_id: Uuid,
        observed_status: QuotationStatus,
        action: QuotationAction,
        actor: Uuid,
        payload: &TransitionPayload,
    ) -> Result<TransitionOutcome, EngineError> {
        match action {
            QuotationAction::Submit => {
                let command = SubmitQuotationCommand {
                    quotation_id,
                    submitted_by: actor,
                    observed_status,
                };
                let result = self.run(action, &command).await?;
                Ok(TransitionOutcome::bare(result.id, result.status))
            }
            QuotationAction::Approve => {
                let command = ApproveQuotationCommand {
                    quotation_id,
                    approved_by: actor,
                    observed_status,
                    matching: self.matching,
                };
                let result = self.run(action, &command).await?;
                Ok(TransitionOutcome {
                    quotation_id: result.id,
                    status: result.status,
                    savings: Some(result.savings),
                    summary: None,
                })
            }
            QuotationAction::Reject => {
                let command = RejectQuotationCommand {
                    quotation_id,
                    rejected_by: actor,
                    observed_status,
                    reason: payload.reason.clone().unwrap_or_default(),
                };
                let result = self.run(action, &command).await?;
                Ok(TransitionOutcome::bare(result.id, result.status))
            }
            QuotationAction::Escalate => {
                let command = EscalateQuotationCommand {
                    quotation_id,
                    escalated_by: actor,
                    observed_status,
                };
                let result = self.run(action, &command).await?;
                Ok(TransitionOutcome::bare(result.id, result.status))
            }
            QuotationAction::RequestRenegotiation => {
                let command = RequestRenegotiationCommand {
                    quotation_id,
                    requested_by: actor,
                    observed_status,
                    notes: payload.notes.clone().unwrap_or_default(),
                };
                let result = self.run(action, &command).await?;
                Ok(TransitionOutcome::bare(result.id, result.status))
            }
            QuotationAction::Resubmit => {
                let command = ResubmitQuotationCommand {
                    quotation_id,
                    resubmitted_by: actor,
                    observed_status,
                    matching: self.matching,
                };
                let result = self.run(action, &command).await?;
                Ok(TransitionOutcome {
                    quotation_id: result.id,
                    status: result.status,
                    savings: None,
                    summary: Some(result.summary),
                })
            }
        }
    }

    async fn run<C>(&self, action: QuotationAction, command: &C) -> Result<C::Result, EngineError>
    where
        C: Command,
    {
        let attempt = command.execute(
            Arc::clone(&self.repository),
            Arc::clone(&self.event_sender),
        );
        match timeout(self.transition_timeout, attempt).await {
            Ok(outcome) => outcome,
            Err(_) => Err(EngineError::Timeout(format!(
                "{} was still running after {:?}",
                action, self.transition_timeout
            ))),
        }
    }

    fn acquire_transition_lock(&self, quotation_id: Uuid) -> Arc<AsyncMutex<()>> {
        self.transition_locks
            .entry(quotation_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .value()
            .clone()
    }

    fn release_transition_lock(&self, quotation_id: Uuid, lock: Arc<AsyncMutex<()>>) {
        // Two refs mean the registry's clone plus ours: nobody is waiting,
        // so the entry can go.
        self.transition_locks.remove_if(&quotation_id, |_, existing| {
            Arc::ptr_eq(existing, &lock) && Arc::strong_count(existing) == 2
        });
    }
}
