//! The scenario layer: everything in §4 that operates over a whole run
//! rather than a single vertex or front — configuration, the step archive,
//! fire identity, perimeter upkeep, scheduling, assets, stop conditions, and
//! the [`Scenario`] orchestrator that ties them together per §4.9/§6.4.

pub mod active_fire;
pub mod asset_tracker;
pub mod config;
pub mod ellipse;
pub mod gusting;
pub mod lock;
pub mod percentile;
pub mod perimeter_maintenance;
pub mod propagator;
#[allow(clippy::module_inception)]
mod scenario;
pub mod scenario_fire;
pub mod scheduler;
pub mod stop_conditions;
pub mod time_step;
pub mod validation;

pub use active_fire::{ActiveFire, ActiveFireId, ActiveFireRegistry};
pub use asset_tracker::{Asset, AssetGeometryNode, AssetOperation};
pub use config::{ConfigFlags, ConfigValues, ScenarioConfig};
pub use ellipse::{EllipseInputs, EllipseModel};
pub use gusting::{GustBias, GustMode, GustingModel};
pub use lock::ScenarioLock;
pub use percentile::PercentileTable;
pub use perimeter_maintenance::MaintenanceOptions;
pub use propagator::PropagationMode;
pub use scenario::{Scenario, ScenarioState};
pub use scenario_fire::ScenarioFire;
pub use scheduler::{Scheduler, TerminationReason};
pub use stop_conditions::{StopCondition, StopConditions};
pub use time_step::{ScenarioTimeStep, StepArchive};
pub use validation::{Severity, ValidationCollector, ValidationEntry};
