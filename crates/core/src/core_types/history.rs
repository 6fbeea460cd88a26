//! Cross-step back-references.
//!
//! The original engine links [`crate::core_types::fire_point::FirePoint`]s
//! across time steps with raw pointers (`m_prevPoint`/`m_succPoint`). Each
//! time step here instead owns an arena of vertices, and a history link is a
//! `(step_id, front_id, index)` triple validated against the scenario's
//! retained-step table on every dereference (see
//! [`crate::scenario::time_step::StepArchive`]).

use serde::{Deserialize, Serialize};

/// A unique, monotonically increasing identifier for a [`crate::scenario::time_step::ScenarioTimeStep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepId(pub u64);

/// Identifies one [`crate::core_types::fire_front::FireFront`] within a step's [`crate::scenario::scenario_fire::ScenarioFire`] collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrontId(pub u32);

/// A non-owning reference to a vertex in a (possibly purged) prior time step.
///
/// Dereferencing goes through [`crate::scenario::time_step::StepArchive::resolve`],
/// which returns `None` if the target step was purged and no rewrite has
/// replaced this reference yet — callers must not assume a `HistoryRef` is
/// always resolvable without checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRef {
    pub step: StepId,
    pub front: FrontId,
    pub index: usize,
}

impl HistoryRef {
    #[must_use]
    pub fn new(step: StepId, front: FrontId, index: usize) -> Self {
        HistoryRef { step, front, index }
    }
}
