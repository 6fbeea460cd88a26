//! 2-D vector type alias for perimeter vertex positions and growth vectors.

use nalgebra::Vector2;

/// 2-D vector type used for world positions (projected grid units, meters-like),
/// ellipse growth vectors (m/min), and edge normals.
///
/// This is a simple alias for `nalgebra::Vector2<f64>` — the perimeter model
/// accumulates many small sub-step displacements over long runs, so `f64` is
/// used here (unlike the `f32` used for bulk per-cell grid fields elsewhere
/// in this codebase) to keep vertex drift negligible over thousands of steps.
pub type Vec2 = Vector2<f64>;

/// Convert a compass bearing in radians (0 = north, clockwise positive) to a
/// standard Cartesian angle in radians (0 = east, counter-clockwise positive).
#[inline]
#[must_use]
pub fn compass_to_cartesian_radians(compass: f64) -> f64 {
    let cartesian = std::f64::consts::FRAC_PI_2 - compass;
    normalize_radians(cartesian)
}

/// Convert a standard Cartesian angle in radians back to a compass bearing in radians.
#[inline]
#[must_use]
pub fn cartesian_to_compass_radians(cartesian: f64) -> f64 {
    let compass = std::f64::consts::FRAC_PI_2 - cartesian;
    normalize_radians(compass)
}

/// Normalize an angle in radians into `[0, 2*pi)`.
#[inline]
#[must_use]
pub fn normalize_radians(angle: f64) -> f64 {
    let two_pi = std::f64::consts::TAU;
    let wrapped = angle % two_pi;
    if wrapped < 0.0 {
        wrapped + two_pi
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn compass_cartesian_round_trip_is_identity() {
        for deg in (0..360).step_by(17) {
            let compass = f64::from(deg).to_radians();
            let cartesian = compass_to_cartesian_radians(compass);
            let back = cartesian_to_compass_radians(cartesian);
            assert_relative_eq!(back, normalize_radians(compass), epsilon = 1e-9);
        }
    }

    #[test]
    fn north_maps_to_cartesian_east_axis() {
        // Compass north (0 rad) points along Cartesian +y, i.e. pi/2.
        assert_relative_eq!(compass_to_cartesian_radians(0.0), std::f64::consts::FRAC_PI_2);
    }
}
