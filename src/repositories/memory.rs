use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::{QuotationRepository, StatusMetadata};
use crate::errors::EngineError;
use crate::models::{Quotation, QuotationAction, QuotationStatus};

/// In-memory store, the default backing for tests and single-node runs.
/// Writes go through the same compare-and-set discipline a database
/// implementation would use, so races show up here too.
#[derive(Debug, Default)]
pub struct InMemoryQuotationRepository {
    quotations: DashMap<Uuid, Quotation>,
    history: DashMap<Uuid, Vec<StatusMetadata>>,
}

impl InMemoryQuotationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Audit entries recorded for a quotation, oldest first.
    pub fn audit_trail(&self, id: Uuid) -> Vec<StatusMetadata> {
        self.history
            .get(&id)
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QuotationRepository for InMemoryQuotationRepository {
    async fn load(&self, id: Uuid) -> Result<Quotation, EngineError> {
        self.quotations
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or_else(|| EngineError::NotFound(format!("quotation {}", id)))
    }

    async fn save_status(
        &self,
        id: Uuid,
        expected: QuotationStatus,
        next: QuotationStatus,
        metadata: &StatusMetadata,
    ) -> Result<(), EngineError> {
        let mut entry = self
            .quotations
            .get_mut(&id)
            .ok_or_else(|| EngineError::NotFound(format!("quotation {}", id)))?;

        if entry.status != expected {
            return Err(EngineError::conflict(format!(
                "quotation {} moved to {} while a write expected {}",
                id, entry.status, expected
            )));
        }

        entry.status = next;
        match metadata.action {
            QuotationAction::Reject => {
                entry.rejection_reason = metadata.rejection_reason.clone();
            }
            QuotationAction::RequestRenegotiation => {
                entry.renegotiation_notes = metadata.renegotiation_notes.clone();
            }
            _ => {}
        }
        // release the quotation shard before touching the history map
        drop(entry);

        self.history.entry(id).or_default().push(metadata.clone());
        Ok(())
    }

    async fn put(&self, quotation: Quotation) -> Result<(), EngineError> {
        self.quotations.insert(quotation.id, quotation);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Quotation>, EngineError> {
        Ok(self.quotations.iter().map(|entry| entry.clone()).collect())
    }
}
