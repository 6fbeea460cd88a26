//! Engine-wide error type.
//!
//! One variant per error kind recognized by the scenario growth engine.
//! Every fallible public method returns `Result<T, EngineError>`; the FFI
//! crate projects this onto a small C-ABI error-code table the way
//! `FireSimErrorCode` does for the field simulation, keeping the "record the
//! last error as a thread-local string" mechanism on that side of the boundary.

use std::fmt;

/// All error kinds recognized by the scenario growth engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A required collaborator (grid, ignition, time manager) was never configured.
    Uninitialized { what: &'static str },
    /// The configured spatial reference could not be resolved.
    ProjectionUnknown,
    /// A configuration setter received an out-of-range or malformed value.
    InvalidArgument { message: String },
    /// An allocation failed (arena growth, vertex pool).
    OutOfMemory,
    /// A referenced fuel type has no registered [`crate::grid::fuel_model::FuelModel`] entry.
    FireTypeUnknown { fuel_type: String },
    /// `retrieve_stat`/`retrieve_attribute` was called with an unrecognized [`crate::core_types::stat::StatId`].
    StatUnknown,
    /// A time value was out of range (before scenario start, NaN, etc.).
    InvalidTime,
    /// An [`crate::scenario::active_fire::ActiveFire`] id did not resolve to a live fire.
    FireUnknown,
    /// A referenced vector firebreak id does not exist.
    VectorEngineUnknown,
    /// A referenced asset id does not exist.
    AssetUnknown,
    /// The scenario's lifecycle state doesn't allow the requested operation
    /// (e.g. `step()` called while `configuring`).
    ScenarioBadState { state: &'static str },
    /// A configuration write was attempted while a simulation run holds the
    /// scenario's simulation lock.
    ScenarioSimulationRunning,
    /// `step()` was called before `reset()` primed the step-0 fronts.
    FireNotStarted,
    /// Every front of a fire has reached a terminal stopped state.
    BurnedOut,
    /// Deserialization produced a structurally invalid object.
    ObjectInvalid { context: String },
    /// Deserialized data was produced by an incompatible schema version.
    VersionMismatch { found: u32, expected: u32 },
    /// A host-side file operation failed (surfaced but not originated here).
    FileIo { message: String },
    /// A non-fatal condition worth surfacing but not treated as failure.
    NoDataWarning { message: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Uninitialized { what } => write!(f, "{what} is not initialized"),
            EngineError::ProjectionUnknown => write!(f, "spatial reference is unknown"),
            EngineError::InvalidArgument { message } => write!(f, "invalid argument: {message}"),
            EngineError::OutOfMemory => write!(f, "out of memory"),
            EngineError::FireTypeUnknown { fuel_type } => {
                write!(f, "unknown fuel type: {fuel_type}")
            }
            EngineError::StatUnknown => write!(f, "unknown statistic id"),
            EngineError::InvalidTime => write!(f, "invalid time value"),
            EngineError::FireUnknown => write!(f, "unknown fire id"),
            EngineError::VectorEngineUnknown => write!(f, "unknown vector firebreak id"),
            EngineError::AssetUnknown => write!(f, "unknown asset id"),
            EngineError::ScenarioBadState { state } => {
                write!(f, "operation not valid in scenario state '{state}'")
            }
            EngineError::ScenarioSimulationRunning => {
                write!(f, "scenario is currently simulating; configuration is locked")
            }
            EngineError::FireNotStarted => write!(f, "scenario has not been reset"),
            EngineError::BurnedOut => write!(f, "fire has burned out"),
            EngineError::ObjectInvalid { context } => {
                write!(f, "invalid object at {context}")
            }
            EngineError::VersionMismatch { found, expected } => {
                write!(f, "version mismatch: found {found}, expected {expected}")
            }
            EngineError::FileIo { message } => write!(f, "file I/O error: {message}"),
            EngineError::NoDataWarning { message } => write!(f, "no data: {message}"),
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = EngineError::InvalidArgument {
            message: "perimeter_resolution must be > 0".into(),
        };
        assert!(err.to_string().contains("perimeter_resolution"));
    }
}
