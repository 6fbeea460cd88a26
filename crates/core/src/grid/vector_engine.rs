//! [`VectorEngine`]: polyline firebreaks with per-break breach rules.

use crate::core_types::vec2::Vec2;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// One polyline firebreak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireBreak {
    pub id: u32,
    pub polyline: Vec<Vec2>,
    /// Number of independent crossing attempts required before the break is
    /// considered breached at all; `None` means the break can never be
    /// breached regardless of configuration.
    pub breach_threshold: Option<u32>,
}

/// Where a propagation segment would cross a firebreak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breach {
    pub break_id: u32,
    pub point: Vec2,
}

/// Polyline firebreaks with breach bookkeeping.
///
/// Object-safe so hosts can supply their own firebreak store; `&mut self` on
/// the mutating method matches the at-most-one-writer-per-step discipline
/// the Propagator already observes for other engine-owned state.
pub trait VectorEngine: Send + Sync {
    /// If the segment `from -> to` crosses any firebreak, return the
    /// nearest crossing (by parametric distance from `from`).
    fn intersect_segment(&self, from: Vec2, to: Vec2) -> Option<Breach>;

    /// Whether the given BREACHING configuration flag allows crossing is
    /// the engine's concern; this only tracks whether `break_id`'s own
    /// breach criterion (e.g. "N independent crossing attempts") has been
    /// satisfied yet.
    fn is_breached(&self, break_id: u32) -> bool;

    /// Record one crossing attempt against `break_id`. Returns the updated
    /// breached state (`true` if this attempt satisfied the criterion).
    fn record_attempt(&mut self, break_id: u32) -> Result<bool, EngineError>;
}

/// Reference [`VectorEngine`]: an in-memory list of [`FireBreak`]s with a
/// per-break attempt counter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVectorEngine {
    breaks: Vec<FireBreak>,
    attempts: Vec<u32>,
    breached: Vec<bool>,
}

impl InMemoryVectorEngine {
    #[must_use]
    pub fn new() -> Self {
        InMemoryVectorEngine::default()
    }

    pub fn add(&mut self, fire_break: FireBreak) {
        self.breaks.push(fire_break);
        self.attempts.push(0);
        self.breached.push(false);
    }

    fn index_of(&self, break_id: u32) -> Option<usize> {
        self.breaks.iter().position(|b| b.id == break_id)
    }
}

impl VectorEngine for InMemoryVectorEngine {
    fn intersect_segment(&self, from: Vec2, to: Vec2) -> Option<Breach> {
        let mut best: Option<(f64, Breach)> = None;
        for fire_break in &self.breaks {
            for w in fire_break.polyline.windows(2) {
                let (q0, q1) = (w[0], w[1]);
                if let Some((t, point)) = segment_intersection_param(from, to, q0, q1) {
                    let better = match &best {
                        Some((best_t, _)) => t < *best_t,
                        None => true,
                    };
                    if better {
                        best = Some((
                            t,
                            Breach {
                                break_id: fire_break.id,
                                point,
                            },
                        ));
                    }
                }
            }
        }
        best.map(|(_, breach)| breach)
    }

    fn is_breached(&self, break_id: u32) -> bool {
        self.index_of(break_id)
            .and_then(|idx| self.breached.get(idx).copied())
            .unwrap_or(false)
    }

    fn record_attempt(&mut self, break_id: u32) -> Result<bool, EngineError> {
        let idx = self.index_of(break_id).ok_or(EngineError::VectorEngineUnknown)?;
        self.attempts[idx] += 1;
        let threshold = self.breaks[idx].breach_threshold;
        if let Some(threshold) = threshold {
            if self.attempts[idx] >= threshold {
                self.breached[idx] = true;
            }
        }
        Ok(self.breached[idx])
    }
}

fn segment_intersection_param(p0: Vec2, p1: Vec2, q0: Vec2, q1: Vec2) -> Option<(f64, Vec2)> {
    let r = p1 - p0;
    let s = q1 - q0;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let qp = q0 - p0;
    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = (qp.x * r.y - qp.y * r.x) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((t, p0 + r * t))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crossing_break(id: u32, threshold: Option<u32>) -> FireBreak {
        FireBreak {
            id,
            polyline: vec![Vec2::new(-10.0, 5.0), Vec2::new(10.0, 5.0)],
            breach_threshold: threshold,
        }
    }

    #[test]
    fn intersect_segment_finds_crossing_point() {
        let mut engine = InMemoryVectorEngine::new();
        engine.add(crossing_break(1, None));
        let hit = engine
            .intersect_segment(Vec2::new(0.0, 0.0), Vec2::new(0.0, 10.0))
            .unwrap();
        assert_eq!(hit.break_id, 1);
        assert!((hit.point.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn parallel_segment_never_intersects() {
        let mut engine = InMemoryVectorEngine::new();
        engine.add(crossing_break(1, None));
        assert!(engine
            .intersect_segment(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0))
            .is_none());
    }

    #[test]
    fn record_attempt_breaches_after_threshold() {
        let mut engine = InMemoryVectorEngine::new();
        engine.add(crossing_break(1, Some(2)));
        assert!(!engine.record_attempt(1).unwrap());
        assert!(!engine.is_breached(1));
        assert!(engine.record_attempt(1).unwrap());
        assert!(engine.is_breached(1));
    }

    #[test]
    fn no_threshold_never_breaches() {
        let mut engine = InMemoryVectorEngine::new();
        engine.add(crossing_break(1, None));
        for _ in 0..10 {
            engine.record_attempt(1).unwrap();
        }
        assert!(!engine.is_breached(1));
    }

    #[test]
    fn unknown_break_id_errors() {
        let mut engine = InMemoryVectorEngine::new();
        assert_eq!(
            engine.record_attempt(99).unwrap_err(),
            EngineError::VectorEngineUnknown
        );
    }
}
