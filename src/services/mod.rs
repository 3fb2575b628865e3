// Read side: repository-loading wrappers over the pure calculators
pub mod pricing;

// Write side: serialized workflow transitions
pub mod approvals;

pub use approvals::{ApprovalService, TransitionOutcome, TransitionPayload};
pub use pricing::PricingService;
