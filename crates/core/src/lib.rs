//! Wildland fire perimeter-growth engine.
//!
//! Advances one or more fire perimeters through simulated time using an
//! elliptical-wavelet (Huygens) growth model, sampling a host-supplied grid
//! for fuel, weather and terrain, and maintaining each perimeter's topology
//! (vertex density, self-intersections, fire-to-fire merges) as it grows.
//! The [`scenario::Scenario`] type is the entry point: configure it, add one
//! or more ignitions, then call [`scenario::Scenario::reset`] followed by
//! repeated [`scenario::Scenario::step`] calls.

pub mod core_types;
pub mod error;
pub mod grid;
pub mod scenario;

pub use core_types::{
    AttributeSet, AttributeValue, FbpScalars, FireFront, FirePoint, FrontId, HistoryRef, Ignition, IgnitionGeometry,
    StatId, StepId, StopStatus, Unit, Vec2, Vec3, VectorScalars,
};
pub use error::EngineError;
pub use grid::{
    Breach, FbpOutputs, FireBreak, FuelModel, GridSample, GridSampler, RothermelStyleFuelModel, SampleOptions,
    TerrainCache, TerrainData, UniformGridSampler, VectorEngine,
};
pub use scenario::{
    ActiveFire, ActiveFireId, ActiveFireRegistry, Asset, AssetGeometryNode, AssetOperation, ConfigFlags, ConfigValues,
    EllipseInputs, EllipseModel, GustBias, GustMode, GustingModel, MaintenanceOptions, PercentileTable,
    PropagationMode, Scenario, ScenarioConfig, ScenarioFire, ScenarioLock, ScenarioState, ScenarioTimeStep, Scheduler,
    Severity, StepArchive, StopCondition, StopConditions, TerminationReason, ValidationCollector, ValidationEntry,
};
