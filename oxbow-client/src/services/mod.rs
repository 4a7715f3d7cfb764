//! Thin REST services, one per business entity
//!
//! Each service issues single HTTP calls against a fixed path-per-entity
//! endpoint, with typed request and response schemas. No caching, no
//! retries; those belong to the query layer above.

pub mod machine_repair;
pub mod mold_instance;
pub mod production_command;
pub mod production_plan;
pub mod vendor;

pub use machine_repair::{MachineRepair, MachineRepairService};
pub use mold_instance::{MoldInstance, MoldInstanceService};
pub use production_command::{ProductionCommand, ProductionCommandService};
pub use production_plan::{ProductionPlan, ProductionPlanService};
pub use vendor::{Vendor, VendorService};

pub(crate) fn default_true() -> bool {
    true
}
