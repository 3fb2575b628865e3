//! Approval workflow for quotations.
//!
//! The whole flow lives in one transition table: submission hands a draft
//! to the buyer, the buyer either settles it or escalates to a supervisor,
//! and the supervisor can send it back for renegotiation, from where a
//! resubmission returns it to the supervisor's queue. `Approved` and
//! `Rejected` are terminal.

use indexmap::IndexMap;
use strum::IntoEnumIterator;

use crate::errors::EngineError;
use crate::models::{Quotation, QuotationAction, QuotationStatus};

/// The transition table. Everything else in this module (and the guard
/// checks in the command layer) derives from this function.
fn next_status(current: QuotationStatus, action: QuotationAction) -> Option<QuotationStatus> {
    use QuotationAction as A;
    use QuotationStatus as S;

    match (current, action) {
        (S::Draft, A::Submit) => Some(S::AwaitingBuyerApproval),

        (S::AwaitingBuyerApproval, A::Approve) => Some(S::Approved),
        (S::AwaitingBuyerApproval, A::Reject) => Some(S::Rejected),
        (S::AwaitingBuyerApproval, A::Escalate) => Some(S::AwaitingSupervisorApproval),

        (S::AwaitingSupervisorApproval, A::Approve) => Some(S::Approved),
        (S::AwaitingSupervisorApproval, A::Reject) => Some(S::Rejected),
        (S::AwaitingSupervisorApproval, A::RequestRenegotiation) => Some(S::Renegotiation),

        (S::Renegotiation, A::Resubmit) => Some(S::AwaitingSupervisorApproval),

        _ => None,
    }
}

/// Applies `action` to `current`, or reports the actions that would have
/// been legal instead.
pub fn transition(
    current: QuotationStatus,
    action: QuotationAction,
) -> Result<QuotationStatus, EngineError> {
    next_status(current, action).ok_or_else(|| EngineError::IllegalTransition {
        current,
        action,
        allowed: allowed_actions(current),
    })
}

/// Actions that may legally be taken from `status`, in declaration order.
pub fn allowed_actions(status: QuotationStatus) -> Vec<QuotationAction> {
    QuotationAction::iter()
        .filter(|action| next_status(status, *action).is_some())
        .collect()
}

/// The field an action cannot proceed without, if any.
pub fn required_field(action: QuotationAction) -> Option<&'static str> {
    match action {
        QuotationAction::Reject => Some("rejection_reason"),
        QuotationAction::RequestRenegotiation => Some("renegotiation_notes"),
        _ => None,
    }
}

/// Quotation counts keyed by status, in status declaration order.
pub type StatusBreakdown = IndexMap<QuotationStatus, usize>;

/// Counts quotations per status. Every status appears, in declaration
/// order, so dashboards render empty buckets too.
pub fn status_breakdown(quotations: &[Quotation]) -> StatusBreakdown {
    let mut breakdown: StatusBreakdown =
        QuotationStatus::iter().map(|status| (status, 0)).collect();
    for quotation in quotations {
        *breakdown.entry(quotation.status).or_insert(0) += 1;
    }
    breakdown
}
