use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EngineError;
use crate::models::{Quotation, QuotationAction, QuotationStatus, SavingsRecord};

pub mod memory;

pub use memory::InMemoryQuotationRepository;

/// Audit record attached to every status write: who did what, when, and
/// the side data the transition produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMetadata {
    pub actor: Uuid,
    pub action: QuotationAction,
    pub occurred_at: DateTime<Utc>,
    pub rejection_reason: Option<String>,
    pub renegotiation_notes: Option<String>,
    pub savings: Option<SavingsRecord>,
}

impl StatusMetadata {
    pub fn new(actor: Uuid, action: QuotationAction) -> Self {
        Self {
            actor,
            action,
            occurred_at: Utc::now(),
            rejection_reason: None,
            renegotiation_notes: None,
            savings: None,
        }
    }
}

/// Storage boundary for quotations.
///
/// `save_status` is a compare-and-set: the write only lands if the stored
/// status still equals `expected`, otherwise the repository answers
/// `Conflict` and the caller re-reads. This is the second conflict
/// barrier behind the per-quotation lock, and the only one a multi-node
/// deployment can rely on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuotationRepository: Send + Sync {
    /// Loads the full quotation.
    async fn load(&self, id: Uuid) -> Result<Quotation, EngineError>;

    /// Persists the outcome of a transition in one atomic write: the new
    /// status plus the metadata that rides with it.
    async fn save_status(
        &self,
        id: Uuid,
        expected: QuotationStatus,
        next: QuotationStatus,
        metadata: &StatusMetadata,
    ) -> Result<(), EngineError>;

    /// Inserts or wholesale-replaces a quotation. Intake and renegotiation
    /// edits go through here; transitions never do.
    async fn put(&self, quotation: Quotation) -> Result<(), EngineError>;

    /// Every stored quotation, in unspecified order.
    async fn list(&self) -> Result<Vec<Quotation>, EngineError>;
}
