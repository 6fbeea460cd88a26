//! [`FirePoint`]: a single vertex on a fire perimeter ring.

use serde::{Deserialize, Serialize};

use crate::core_types::history::HistoryRef;
use crate::core_types::stat::{self, StatId, Unit};
use crate::core_types::vec2::{compass_to_cartesian_radians, Vec2};
use crate::error::EngineError;

/// Why a [`FirePoint`] is no longer moving, or `Normal` if it's still spreading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopStatus {
    /// Still spreading normally.
    Normal,
    /// Fuel at this location is valid but can't support any rate of spread
    /// (e.g. low buildup index on a fuel type with a high ROS floor).
    NoRos,
    /// Ran into non-burnable fuel (water, rock, bare ground).
    NoFuel,
    /// Stopped at a vector (polyline) firebreak that hasn't been breached.
    VectorBreak,
    /// Would have entered another fire's interior; triggers a merge.
    FireBreak,
    /// Was supposed to aim at a wind/vector target but no target was available.
    NoWindTarget,
}

impl StopStatus {
    /// True for every variant except `Normal`.
    #[inline]
    #[must_use]
    pub fn is_stopped(self) -> bool {
        self != StopStatus::Normal
    }
}

/// Scalars sampled from the fuel model for one vertex, before the vector-of-growth
/// adjustment the ellipse/propagator stage applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FbpScalars {
    /// Rate of spread index (m/min), pre-percentile-scaling.
    pub rsi: f64,
    /// Equilibrium rate of spread (m/min).
    pub roseq: f64,
    /// Instantaneous rate of spread (m/min).
    pub ros: f64,
    /// Back rate of spread (m/min).
    pub bros: f64,
    /// Flank rate of spread (m/min).
    pub fros: f64,
    /// Azimuth of the rate-of-spread vector, in **compass** radians (0 = north, clockwise).
    pub raz: f64,
    /// Surface fuel consumption (kg/m^2).
    pub sfc: f64,
    /// Crown fraction burned (fraction 0-1).
    pub cfb: f64,
    /// Crown fuel consumption (kg/m^2).
    pub cfc: f64,
    /// Total fuel consumption (kg/m^2).
    pub tfc: f64,
    /// Fire intensity (kW/m).
    pub fi: f64,
}

/// Per-vertex statistics derived from [`FbpScalars`] once the vector of growth
/// (the direction this specific vertex is actually moving, as opposed to the
/// fuel model's raw head/flank/back axes) has been determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorScalars {
    pub ros: f64,
    pub sfc: f64,
    pub cfb: f64,
    pub cfc: f64,
    pub tfc: f64,
    pub fi: f64,
    pub flame_length: f64,
    /// Ratio of this vertex's vector ROS to the fuel model's equilibrium ROS.
    /// Defaults to 1.0 when the point is stopped.
    pub ros_ratio: f64,
}

impl VectorScalars {
    fn stopped() -> Self {
        VectorScalars {
            ros_ratio: 1.0,
            ..Default::default()
        }
    }
}

/// A single vertex on a [`crate::core_types::fire_front::FireFront`] ring.
///
/// All constructors zero every FBP/vector scalar; [`StopStatus::is_stopped`]
/// points are always all-zero except `ros_ratio` (defaults to 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirePoint {
    pub position: Vec2,
    pub status: StopStatus,
    /// 2-D growth vector (m/min) produced by the ellipse model for this vertex.
    /// Zero for stopped points.
    pub ellipse_ros: Vec2,
    pub fbp: FbpScalars,
    pub vector: VectorScalars,
    /// Back-reference to the vertex this one descended from in the previous
    /// time step, or `None` if this vertex was inserted by densification or
    /// is part of the step-0 ignition front.
    pub prev_point: Option<HistoryRef>,
    /// Forward reference populated once the *next* step's propagation
    /// creates a descendant of this vertex.
    pub succ_point: Option<HistoryRef>,
    /// True once a vector firebreak at this vertex's location has satisfied
    /// its breach criterion, allowing the point to cross on a later sub-step.
    pub successful_breach: bool,
}

impl FirePoint {
    /// Create a new vertex at `position` with `Normal` status and all scalars zeroed.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        FirePoint {
            position,
            status: StopStatus::Normal,
            ellipse_ros: Vec2::zeros(),
            fbp: FbpScalars::default(),
            vector: VectorScalars::default(),
            prev_point: None,
            succ_point: None,
            successful_breach: false,
        }
    }

    /// Create a new vertex that inherits a non-normal stop status (e.g. an
    /// ignition placed directly on non-burnable fuel). All scalars stay zero
    /// except `ros_ratio`, which defaults to 1.0 for stopped points.
    #[must_use]
    pub fn new_stopped(position: Vec2, status: StopStatus) -> Self {
        debug_assert!(status.is_stopped());
        FirePoint {
            position,
            status,
            ellipse_ros: Vec2::zeros(),
            fbp: FbpScalars::default(),
            vector: VectorScalars::stopped(),
            prev_point: None,
            succ_point: None,
            successful_breach: false,
        }
    }

    /// A vertex descended from `parent` via densification (no history link),
    /// at `position`, normal status.
    #[must_use]
    pub fn densified(position: Vec2) -> Self {
        Self::new(position)
    }

    /// True iff this vertex can still move: `status == Normal` and the
    /// ellipse growth vector is non-degenerate.
    #[must_use]
    pub fn can_move(&self) -> bool {
        !self.status.is_stopped() && self.ellipse_ros != Vec2::zeros()
    }

    /// Retrieve a named statistic in its native (storage) units.
    ///
    /// Stopped points return 0.0 for every physical stat; `Active` is 0.0
    /// when stopped and 1.0 when spreading normally; `Raz` is 0.0 when stopped
    /// (matching the original engine, which never applies the compass->Cartesian
    /// conversion to a frozen vertex).
    pub fn retrieve_stat(&self, stat: StatId) -> Result<f64, EngineError> {
        if self.status.is_stopped() {
            return Ok(match stat {
                StatId::Active | StatId::Raz => 0.0,
                _ => 0.0,
            });
        }
        Ok(match stat {
            StatId::FbpRsi => self.fbp.rsi,
            StatId::FbpRoseq => self.fbp.roseq,
            StatId::FbpRos => self.fbp.ros,
            StatId::FbpBros => self.fbp.bros,
            StatId::FbpFros => self.fbp.fros,
            StatId::Raz => compass_to_cartesian_radians(self.fbp.raz),
            StatId::Ros => self.vector.ros,
            StatId::Cfb => self.vector.cfb,
            StatId::Hcfb => self.fbp.cfb,
            StatId::Cfc => self.vector.cfc,
            StatId::Sfc => self.vector.sfc,
            StatId::Tfc => self.vector.tfc,
            StatId::Fi => self.vector.fi,
            StatId::Hfi => self.fbp.fi,
            StatId::FlameLength => self.vector.flame_length,
            StatId::Active => 1.0,
        })
    }

    /// Retrieve a statistic converted to `unit`; unitless stats and unit
    /// mismatches pass the native value through unchanged.
    pub fn retrieve_attribute(&self, stat_id: StatId, unit: Unit) -> Result<f64, EngineError> {
        let raw = self.retrieve_stat(stat_id)?;
        Ok(stat::convert(stat_id, raw, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::vec2::normalize_radians;

    #[test]
    fn new_point_has_all_scalars_zeroed() {
        let p = FirePoint::new(Vec2::new(1.0, 2.0));
        assert_eq!(p.fbp, FbpScalars::default());
        assert_eq!(p.vector, VectorScalars::default());
        assert_eq!(p.retrieve_stat(StatId::Ros).unwrap(), 0.0);
    }

    #[test]
    fn stopped_point_zeroes_every_stat_including_active_and_raz() {
        let mut p = FirePoint::new(Vec2::new(0.0, 0.0));
        p.status = StopStatus::NoFuel;
        p.fbp.fi = 999.0; // simulate stale data that must still read back as zero
        for stat in [
            StatId::FbpRsi,
            StatId::Ros,
            StatId::Fi,
            StatId::FlameLength,
            StatId::Active,
            StatId::Raz,
        ] {
            assert_eq!(p.retrieve_stat(stat).unwrap(), 0.0);
        }
    }

    #[test]
    fn stopped_point_defaults_ros_ratio_to_one() {
        let p = FirePoint::new_stopped(Vec2::new(0.0, 0.0), StopStatus::NoFuel);
        assert_eq!(p.vector.ros_ratio, 1.0);
    }

    #[test]
    fn active_point_reports_active_one() {
        let mut p = FirePoint::new(Vec2::new(0.0, 0.0));
        p.ellipse_ros = Vec2::new(1.0, 0.0);
        assert_eq!(p.retrieve_stat(StatId::Active).unwrap(), 1.0);
        assert!(p.can_move());
    }

    #[test]
    fn retrieve_attribute_matches_retrieve_stat_for_unitless() {
        let mut p = FirePoint::new(Vec2::new(0.0, 0.0));
        p.fbp.raz = 0.3;
        let native = p.retrieve_attribute(StatId::Raz, Unit::Native).unwrap();
        let stat = p.retrieve_stat(StatId::Raz).unwrap();
        assert_eq!(native, stat);
    }

    #[test]
    fn raz_round_trips_through_compass_and_cartesian() {
        let mut p = FirePoint::new(Vec2::new(0.0, 0.0));
        p.fbp.raz = 1.2;
        let cartesian = p.retrieve_stat(StatId::Raz).unwrap();
        let back = crate::core_types::vec2::cartesian_to_compass_radians(cartesian);
        assert!((back - normalize_radians(1.2)).abs() < 1e-9);
    }

    #[test]
    fn can_move_false_when_ellipse_vector_is_degenerate() {
        let p = FirePoint::new(Vec2::new(0.0, 0.0));
        assert!(!p.can_move());
    }
}
