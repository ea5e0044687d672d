// Update execution state:
// - ConfirmationGate: pending offers keyed by conversation
// - SyncResult / UpdateReport: what happened while applying a plan
pub mod confirmation;
pub mod context;

pub use confirmation::{ConfirmationGate, GateDecision, PendingConfirmation};
pub use context::{SyncResult, UpdateReport};
