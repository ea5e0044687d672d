pub mod file_sync;
pub mod planner;
pub mod publisher;
pub mod version_file;

pub mod update;
pub use update::{ConfirmationGate, GateDecision, PendingConfirmation, UpdateReport};

pub use file_sync::FileSynchronizer;
pub use planner::{PlanOutcome, UpdatePlan, UpdatePlanner};
pub use publisher::{PublishCredentials, PublisherState, RemotePublisher};
pub use version_file::VersionFile;
