//! [`StopConditions`]: user-registered early-termination rules, per §4.13.
//!
//! Evaluated once per displayable step, after [`crate::scenario::asset_tracker`]
//! but before the boundary/end-time checks, so a registered condition can end
//! a run before its natural `end_time`.

use crate::core_types::vec2::Vec2;

/// One registered stop condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopCondition {
    /// Stop once the total burned area exceeds this many square meters.
    AreaExceeds { square_meters: f64 },
    /// Stop once the total perimeter length has grown by less than
    /// `meters_per_step` for `consecutive_steps` displayable steps in a row
    /// (a fire that has essentially stalled).
    GrowthRateBelow { meters_per_step: f64, consecutive_steps: u32 },
    /// Stop once `t` reaches or passes this absolute time.
    ResponseTimeElapsed { at_time: i64 },
}

/// The subset of a step's statistics stop conditions need to evaluate.
#[derive(Debug, Clone, Copy)]
pub struct StepStats {
    pub t: i64,
    pub area: f64,
    pub perimeter_length: f64,
}

impl StepStats {
    #[must_use]
    pub fn new(t: i64, area: f64, perimeter_length: f64) -> Self {
        StepStats { t, area, perimeter_length }
    }
}

/// Registered conditions plus the running state [`StopConditions::evaluate`]
/// needs across calls (the growth-rate streak counter).
///
/// Only one [`StopCondition::GrowthRateBelow`] condition is meaningful per
/// instance: the streak counter is shared across every registered condition
/// of that kind, so a second one with a different threshold would observe a
/// streak reset by the first. Registering more than one is accepted but not
/// recommended.
#[derive(Debug, Clone, Default)]
pub struct StopConditions {
    conditions: Vec<StopCondition>,
    growth_streak: u32,
    last_perimeter_length: Option<f64>,
}

impl StopConditions {
    #[must_use]
    pub fn new() -> Self {
        StopConditions::default()
    }

    pub fn add(&mut self, condition: StopCondition) {
        self.conditions.push(condition);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate every registered condition against `stats`, updating the
    /// growth-rate streak, and return whether any condition is now met.
    /// Should only be called on displayable steps.
    pub fn evaluate(&mut self, stats: &StepStats) -> bool {
        let mut growth_triggered = false;
        let mut any_growth_condition = false;

        for &condition in &self.conditions {
            if let StopCondition::GrowthRateBelow { meters_per_step, consecutive_steps } = condition {
                any_growth_condition = true;
                let growth = self.last_perimeter_length.map_or(f64::INFINITY, |prev| stats.perimeter_length - prev);
                if growth < meters_per_step {
                    self.growth_streak += 1;
                } else {
                    self.growth_streak = 0;
                }
                if self.growth_streak >= consecutive_steps {
                    growth_triggered = true;
                }
            }
        }
        if any_growth_condition {
            self.last_perimeter_length = Some(stats.perimeter_length);
        }

        let other_triggered = self.conditions.iter().any(|c| match *c {
            StopCondition::AreaExceeds { square_meters } => stats.area > square_meters,
            StopCondition::ResponseTimeElapsed { at_time } => stats.t >= at_time,
            StopCondition::GrowthRateBelow { .. } => false,
        });

        growth_triggered || other_triggered
    }
}

/// Sum of the squared distances between consecutive points, used by callers
/// that need a quick perimeter-growth proxy without building a full
/// [`StepStats`] (kept here so both this module and
/// [`crate::scenario::asset_tracker`] share one helper rather than each
/// re-deriving polygon length).
#[must_use]
pub fn polyline_length(points: &[Vec2]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_condition_triggers_once_exceeded() {
        let mut sc = StopConditions::new();
        sc.add(StopCondition::AreaExceeds { square_meters: 100.0 });
        assert!(!sc.evaluate(&StepStats::new(0, 50.0, 0.0)));
        assert!(sc.evaluate(&StepStats::new(60, 150.0, 0.0)));
    }

    #[test]
    fn response_time_triggers_once_time_reached() {
        let mut sc = StopConditions::new();
        sc.add(StopCondition::ResponseTimeElapsed { at_time: 600 });
        assert!(!sc.evaluate(&StepStats::new(0, 0.0, 0.0)));
        assert!(sc.evaluate(&StepStats::new(600, 0.0, 0.0)));
    }

    #[test]
    fn growth_rate_triggers_after_consecutive_stalled_steps() {
        let mut sc = StopConditions::new();
        sc.add(StopCondition::GrowthRateBelow {
            meters_per_step: 1.0,
            consecutive_steps: 2,
        });
        assert!(!sc.evaluate(&StepStats::new(0, 0.0, 100.0)));
        assert!(!sc.evaluate(&StepStats::new(60, 0.0, 100.2)));
        assert!(sc.evaluate(&StepStats::new(120, 0.0, 100.3)));
    }

    #[test]
    fn growth_rate_streak_resets_on_a_fast_step() {
        let mut sc = StopConditions::new();
        sc.add(StopCondition::GrowthRateBelow {
            meters_per_step: 1.0,
            consecutive_steps: 2,
        });
        assert!(!sc.evaluate(&StepStats::new(0, 0.0, 100.0)));
        assert!(!sc.evaluate(&StepStats::new(60, 0.0, 100.1)));
        assert!(!sc.evaluate(&StepStats::new(120, 0.0, 150.0)));
        assert!(!sc.evaluate(&StepStats::new(180, 0.0, 150.1)));
    }

    #[test]
    fn empty_conditions_never_trigger() {
        let mut sc = StopConditions::new();
        assert!(sc.is_empty());
        assert!(!sc.evaluate(&StepStats::new(1_000_000, 1e12, 1e12)));
    }
}
