//! [`Scheduler`]: picks the length of the next sub-step and recognizes when a
//! run has finished, per §4.10.

use serde::{Deserialize, Serialize};

use crate::scenario::config::{ConfigFlags, ConfigValues};
use crate::scenario::gusting::GustingModel;

/// Why a run stopped advancing, per §4.10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Reached `end_time`.
    Complete,
    /// `BOUNDARY_STOP` tripped: a front reached the grid's extents.
    CompleteExtents,
    /// An [`crate::scenario::asset_tracker::Asset`] operation was satisfied.
    CompleteAssets,
    /// A registered stop condition (§4.13) fired.
    CompleteStopCondition,
}

/// Picks Δt for the next sub-step from the active constraints: never
/// overshoot `end_time`, always land exactly on a display boundary, cap the
/// step during the acceleration phase, bound per-vertex displacement by
/// `spatial_threshold`, and never straddle a wind-gust transition.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    pub values: ConfigValues,
    pub flags: ConfigFlags,
}

impl Scheduler {
    #[must_use]
    pub fn new(values: ConfigValues, flags: ConfigFlags) -> Self {
        Scheduler { values, flags }
    }

    /// Seconds from `t` to the *next* display boundary strictly after it (a
    /// multiple of `display_interval` measured from `start_time`) — a full
    /// `display_interval` away when `t` is itself already a boundary.
    #[must_use]
    pub fn seconds_to_next_display(&self, t: i64) -> i64 {
        let elapsed = t - self.values.start_time;
        let interval = self.values.display_interval.max(1);
        let remainder = elapsed.rem_euclid(interval);
        if remainder == 0 {
            interval
        } else {
            interval - remainder
        }
    }

    /// Choose the next sub-step length (seconds) from `t`, given whether any
    /// ignition is still in its acceleration phase (§4.7: `ROSt < 0.9 *
    /// ROSeq`) and the fastest currently-burning vertex's ROS (m/min, `0.0`
    /// if nothing is spreading).
    #[must_use]
    pub fn next_dt(&self, t: i64, accelerating: bool, max_ros_m_per_min: f64, gusting: &GustingModel) -> i64 {
        let mut dt = self.values.end_time - t;
        if dt <= 0 {
            return 0;
        }

        dt = dt.min(self.seconds_to_next_display(t).max(1));

        if accelerating {
            dt = dt.min(self.values.temporal_threshold_accel.max(1));
        }

        if max_ros_m_per_min > 0.0 {
            let spatial_dt = ((self.values.spatial_threshold / max_ros_m_per_min) * 60.0).floor() as i64;
            dt = dt.min(spatial_dt.max(1));
        }

        let gust_event = gusting.next_event_time(t);
        if gust_event != i64::MAX {
            dt = dt.min((gust_event - t).max(1));
        }

        dt.max(1)
    }

    /// Whether `t` is a step the host should be shown/queried (a display
    /// boundary or the end of the run), as opposed to an internal sub-step.
    #[must_use]
    pub fn is_displayable(&self, t: i64) -> bool {
        let interval = self.values.display_interval.max(1);
        t >= self.values.end_time || (t - self.values.start_time).rem_euclid(interval) == 0
    }

    /// Whether any ignition with the given per-ignition `ros_t`/`roseq`
    /// pair is still accelerating (§4.7): `ROSt < 90% of ROSeq`.
    #[must_use]
    pub fn is_accelerating(ros_t: f64, roseq: f64) -> bool {
        roseq > 0.0 && ros_t < 0.9 * roseq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> Scheduler {
        Scheduler::new(
            ConfigValues {
                start_time: 0,
                end_time: 3600,
                display_interval: 600,
                temporal_threshold_accel: 60,
                spatial_threshold: 5.0,
                ..ConfigValues::default()
            },
            ConfigFlags::default(),
        )
    }

    #[test]
    fn dt_never_overshoots_display_boundary() {
        let s = scheduler();
        let gust = GustingModel::default();
        let dt = s.next_dt(0, false, 0.0, &gust);
        assert!(dt <= 600);
        assert_eq!((0 + dt) % 600, 0);
    }

    #[test]
    fn dt_never_overshoots_end_time() {
        let s = scheduler();
        let gust = GustingModel::default();
        let dt = s.next_dt(3590, false, 0.0, &gust);
        assert_eq!(dt, 10);
    }

    #[test]
    fn zero_dt_once_end_time_reached() {
        let s = scheduler();
        let gust = GustingModel::default();
        assert_eq!(s.next_dt(3600, false, 0.0, &gust), 0);
    }

    #[test]
    fn acceleration_phase_caps_dt() {
        let s = scheduler();
        let gust = GustingModel::default();
        let dt = s.next_dt(0, true, 0.0, &gust);
        assert!(dt <= 60);
    }

    #[test]
    fn spatial_threshold_caps_dt_for_fast_vertices() {
        let s = scheduler();
        let gust = GustingModel::default();
        // At 300 m/min, 5 m of allowed displacement takes 1 second.
        let dt = s.next_dt(0, false, 300.0, &gust);
        assert_eq!(dt, 1);
    }

    #[test]
    fn displayable_only_on_boundaries_and_end() {
        let s = scheduler();
        assert!(s.is_displayable(0));
        assert!(!s.is_displayable(100));
        assert!(s.is_displayable(600));
        assert!(s.is_displayable(3600));
    }

    #[test]
    fn accelerating_when_ros_t_below_ninety_percent_of_roseq() {
        assert!(Scheduler::is_accelerating(8.0, 10.0));
        assert!(!Scheduler::is_accelerating(9.5, 10.0));
    }
}
