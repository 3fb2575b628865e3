use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ProductItem, SupplierOffer};

/// Lifecycle states of a quotation.
///
/// `Approved` and `Rejected` are terminal. Every legal move between states
/// lives in [`crate::workflow::transition`]; nothing else in the crate
/// compares statuses to decide what is allowed.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuotationStatus {
    Draft,
    AwaitingBuyerApproval,
    AwaitingSupervisorApproval,
    Approved,
    Rejected,
    Renegotiation,
}

impl QuotationStatus {
    /// Terminal states accept no further actions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Whether offers and items may still be edited in this state.
    pub fn offers_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Renegotiation)
    }
}

/// Actions a caller can request against a quotation.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuotationAction {
    Submit,
    Approve,
    Reject,
    Escalate,
    RequestRenegotiation,
    Resubmit,
}

/// A quotation with its requested items and the offers received.
///
/// The engine treats a loaded quotation as an immutable snapshot: the
/// calculators borrow it and never mutate it, and `offers` keeps supplier
/// insertion order because best-offer tie-breaks depend on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: Uuid,
    pub status: QuotationStatus,
    pub buyer_id: Uuid,
    pub supervisor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,

    /// Requested products, in presentation order.
    pub items: Vec<ProductItem>,

    /// Supplier offers in submission order. First-come wins cost ties.
    pub offers: Vec<SupplierOffer>,

    pub rejection_reason: Option<String>,
    pub renegotiation_notes: Option<String>,
}

impl Quotation {
    pub fn new(id: Uuid, buyer_id: Uuid) -> Self {
        Self {
            id,
            status: QuotationStatus::Draft,
            buyer_id,
            supervisor_id: None,
            created_at: Utc::now(),
            items: Vec::new(),
            offers: Vec::new(),
            rejection_reason: None,
            renegotiation_notes: None,
        }
    }
}
