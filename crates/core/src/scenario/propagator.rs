//! [`Propagator`]: advances one [`FirePoint`] by one sub-step, per §4.6-4.7.

use crate::core_types::fire_front::Orientation;
use crate::core_types::fire_point::{FbpScalars, StopStatus};
use crate::core_types::vec2::Vec2;
use crate::grid::terrain::TerrainData;
use crate::grid::vector_engine::VectorEngine;
use crate::scenario::ellipse::EllipseModel;

/// 2-D (`USE_2DGROWTH` on) vs. 3-D (terrain-tangent-plane) propagation, §4.7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationMode {
    TwoD,
    ThreeD,
}

/// Outcome of advancing one vertex by one sub-step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationResult {
    pub position: Vec2,
    pub status: StopStatus,
    /// Set whenever this sub-step's displacement crossed a vector firebreak,
    /// whether or not the crossing was allowed. Callers use it to feed
    /// [`crate::grid::vector_engine::VectorEngine::record_attempt`] so a
    /// break's crossing-attempt count keeps advancing even once it's already
    /// breached.
    pub breach_id: Option<u32>,
}

/// Everything [`propagate_vertex`] needs beyond the vertex's own position and
/// FBP scalars: its neighbors (for the local tangent/normal), the active
/// propagation mode, and the collaborators that can halt it.
pub struct PropagatorContext<'a> {
    pub mode: PropagationMode,
    pub orientation: Orientation,
    pub terrain: Option<&'a TerrainData>,
    pub vector_engine: Option<&'a dyn VectorEngine>,
    pub breaching_enabled: bool,
    pub minimum_spreading_ros: f64,
}

/// Advance `position` by one sub-step of length `dt_minutes`, given the
/// vertex's sampled `fbp` and its ring neighbors `pred`/`succ`. Stop
/// conditions are evaluated in the order required by §4.6: vector break,
/// non-burnable fuel, sub-minimum ROS, then fire-break.
pub fn propagate_vertex(
    position: Vec2,
    pred: Vec2,
    succ: Vec2,
    fbp: &FbpScalars,
    dt_minutes: f64,
    ctx: &PropagatorContext<'_>,
    is_burnable: impl Fn(Vec2) -> bool,
    enters_other_fire: impl Fn(Vec2) -> bool,
) -> PropagationResult {
    let normal = outward_normal(pred, succ, ctx.orientation);
    if normal == Vec2::zeros() {
        return PropagationResult {
            position,
            status: StopStatus::NoRos,
            breach_id: None,
        };
    }

    let azimuth = normal.y.atan2(normal.x);
    let magnitude = EllipseModel::radius_at_azimuth(fbp, azimuth);
    let mut displacement = normal * magnitude * dt_minutes;

    if ctx.mode == PropagationMode::ThreeD {
        if let Some(terrain) = ctx.terrain {
            displacement = project_to_slope_plane(displacement, position, terrain);
        }
    }

    let new_position = position + displacement;

    let mut breach_id = None;
    if let Some(engine) = ctx.vector_engine {
        if let Some(breach) = engine.intersect_segment(position, new_position) {
            let may_cross = ctx.breaching_enabled && engine.is_breached(breach.break_id);
            if !may_cross {
                return PropagationResult {
                    position: breach.point,
                    status: StopStatus::VectorBreak,
                    breach_id: Some(breach.break_id),
                };
            }
            breach_id = Some(breach.break_id);
        }
    }

    if !is_burnable(new_position) {
        return PropagationResult {
            position,
            status: StopStatus::NoFuel,
            breach_id,
        };
    }

    if fbp.ros < ctx.minimum_spreading_ros {
        return PropagationResult {
            position,
            status: StopStatus::NoRos,
            breach_id,
        };
    }

    if enters_other_fire(new_position) {
        return PropagationResult {
            position: new_position,
            status: StopStatus::FireBreak,
            breach_id,
        };
    }

    PropagationResult {
        position: new_position,
        status: StopStatus::Normal,
        breach_id,
    }
}

/// Outward unit normal of the ring at a vertex whose neighbors are `pred`
/// and `succ`, honoring ring orientation (an `Interior` hole's "outward" is
/// the enclosing fire's inward direction). Returns the zero vector for a
/// degenerate (coincident) neighbor pair.
fn outward_normal(pred: Vec2, succ: Vec2, orientation: Orientation) -> Vec2 {
    let tangent = succ - pred;
    let len = tangent.norm();
    if len < f64::EPSILON {
        return Vec2::zeros();
    }
    let tangent = tangent / len;
    let normal = Vec2::new(tangent.y, -tangent.x);
    match orientation {
        Orientation::Exterior => normal,
        Orientation::Interior => -normal,
    }
}

/// Projects a horizontal displacement through the terrain-tangent plane at
/// `position` and back to 2-D (§4.6 3-D mode): the component of motion
/// aligned with the local upslope direction is foreshortened by `cos(slope)`,
/// since the true Huygens wavelet travels along the slope surface but the
/// perimeter is stored in map-projected (horizontal) coordinates.
fn project_to_slope_plane(displacement: Vec2, position: Vec2, terrain: &TerrainData) -> Vec2 {
    #[allow(clippy::cast_possible_truncation)]
    let (x, y) = (position.x as f32, position.y as f32);
    let slope_rad = f64::from(terrain.slope_at_horn(x, y).to_radians());
    if slope_rad.abs() < 1e-9 {
        return displacement;
    }
    let aspect_compass = f64::from(terrain.aspect_at_horn(x, y)).to_radians();
    let aspect_cartesian = crate::core_types::vec2::compass_to_cartesian_radians(aspect_compass);
    let upslope = Vec2::new(aspect_cartesian.cos(), aspect_cartesian.sin());
    let along = displacement.dot(&upslope);
    let perpendicular = displacement - upslope * along;
    perpendicular + upslope * (along * slope_rad.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fbp(ros: f64, raz_compass: f64) -> FbpScalars {
        FbpScalars {
            rsi: ros,
            roseq: ros,
            ros,
            bros: ros,
            fros: ros,
            raz: raz_compass,
            ..FbpScalars::default()
        }
    }

    fn flat_ctx() -> PropagatorContext<'static> {
        PropagatorContext {
            mode: PropagationMode::TwoD,
            orientation: Orientation::Exterior,
            terrain: None,
            vector_engine: None,
            breaching_enabled: false,
            minimum_spreading_ros: 0.001,
        }
    }

    #[test]
    fn isotropic_ros_moves_outward_by_ros_times_dt() {
        let ctx = flat_ctx();
        let pred = Vec2::new(-1.0, 0.0);
        let succ = Vec2::new(1.0, 0.0);
        let f = fbp(2.0, 0.0);
        let result = propagate_vertex(Vec2::new(0.0, 1.0), pred, succ, &f, 1.0, &ctx, |_| true, |_| false);
        assert_eq!(result.status, StopStatus::Normal);
        assert!((result.position - Vec2::new(0.0, 1.0)).norm() > 0.0);
    }

    #[test]
    fn non_burnable_destination_stops_with_no_fuel() {
        let ctx = flat_ctx();
        let f = fbp(2.0, 0.0);
        let result = propagate_vertex(
            Vec2::new(0.0, 1.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            &f,
            1.0,
            &ctx,
            |_| false,
            |_| false,
        );
        assert_eq!(result.status, StopStatus::NoFuel);
    }

    #[test]
    fn below_minimum_ros_stops_with_no_ros() {
        let ctx = flat_ctx();
        let f = fbp(0.0, 0.0);
        let result = propagate_vertex(
            Vec2::new(0.0, 1.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            &f,
            1.0,
            &ctx,
            |_| true,
            |_| false,
        );
        assert_eq!(result.status, StopStatus::NoRos);
    }

    #[test]
    fn entering_other_fire_interior_stops_with_fire_break() {
        let ctx = flat_ctx();
        let f = fbp(2.0, 0.0);
        let result = propagate_vertex(
            Vec2::new(0.0, 1.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            &f,
            1.0,
            &ctx,
            |_| true,
            |_| true,
        );
        assert_eq!(result.status, StopStatus::FireBreak);
    }

    #[test]
    fn degenerate_neighbors_stop_with_no_ros() {
        let ctx = flat_ctx();
        let f = fbp(2.0, 0.0);
        let result = propagate_vertex(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 1.0),
            &f,
            1.0,
            &ctx,
            |_| true,
            |_| false,
        );
        assert_eq!(result.status, StopStatus::NoRos);
    }
}
