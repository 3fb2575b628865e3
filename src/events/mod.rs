use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::SavingsRecord;

/// Events emitted by the approval workflow, one per transition that
/// actually happened. Rejected transitions emit nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    QuotationSubmitted {
        quotation_id: Uuid,
        buyer_id: Uuid,
    },
    QuotationApproved {
        quotation_id: Uuid,
        approved_by: Uuid,
        savings: SavingsRecord,
    },
    QuotationRejected {
        quotation_id: Uuid,
        rejected_by: Uuid,
        reason: String,
    },
    QuotationEscalated {
        quotation_id: Uuid,
        escalated_by: Uuid,
    },
    RenegotiationRequested {
        quotation_id: Uuid,
        requested_by: Uuid,
        notes: String,
    },
    QuotationResubmitted {
        quotation_id: Uuid,
        resubmitted_by: Uuid,
        best_total: Decimal,
    },
}

impl Event {
    /// The quotation this event belongs to.
    pub fn quotation_id(&self) -> Uuid {
        match self {
            Event::QuotationSubmitted { quotation_id, .. }
            | Event::QuotationApproved { quotation_id, .. }
            | Event::QuotationRejected { quotation_id, .. }
            | Event::QuotationEscalated { quotation_id, .. }
            | Event::RenegotiationRequested { quotation_id, .. }
            | Event::QuotationResubmitted { quotation_id, .. } => *quotation_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates the sender/receiver pair for the workflow event stream.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Handlers implementing this trait process workflow events asynchronously.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: Event) -> Result<(), String>;
}

/// Logs every workflow event. The default subscriber in deployments with
/// nothing downstream yet.
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn handle_event(&self, event: Event) -> Result<(), String> {
        match &event {
            Event::QuotationApproved {
                quotation_id,
                savings,
                ..
            } => {
                info!(
                    quotation_id = %quotation_id,
                    final_total = %savings.final_total,
                    "Quotation approved"
                );
            }
            Event::QuotationRejected {
                quotation_id,
                reason,
                ..
            } => {
                info!(quotation_id = %quotation_id, reason = %reason, "Quotation rejected");
            }
            other => {
                info!(quotation_id = %other.quotation_id(), event = ?other, "Workflow event");
            }
        }
        Ok(())
    }
}

/// Processes incoming events, distributing each to every registered
/// handler in order. A failing handler is logged and does not stop the
/// others. The loop ends when all senders are dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, handlers: Vec<Arc<dyn EventHandler>>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        for handler in &handlers {
            if let Err(e) = handler.handle_event(event.clone()).await {
                error!(
                    quotation_id = %event.quotation_id(),
                    "Event handler failed: {}",
                    e
                );
            }
        }
    }

    warn!("Event processing loop has ended");
}
