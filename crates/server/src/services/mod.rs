//! Domain services for provisioning, search, activation, and intake.

pub mod activation;
pub mod audit;
pub mod duplicates;
pub mod order_intake;
pub mod provisioning;
pub mod saga;

pub use activation::{ActivationOutcome, ActivationService};
pub use duplicates::DuplicateDetector;
pub use order_intake::{OrderIntakeService, OrderSubmission};
pub use provisioning::{NewCustomer, ProvisioningService};
