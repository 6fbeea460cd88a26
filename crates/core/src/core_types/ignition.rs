//! [`Ignition`]: an input geometry plus a start time, consumed once at step 0.

use serde::{Deserialize, Serialize};

use crate::core_types::attribute::AttributeSet;
use crate::core_types::vec2::Vec2;

/// The shape of an ignition.
///
/// - `PointSet`: each point synthesizes its own small circular front at reset.
/// - `Polyline`: an open line; the line itself becomes the initial front
///   (both "sides" of the line spread outward).
/// - `InteriorPolygon`: a closed ring that starts as an *interior* (hole)
///   front — the area inside does not burn, the boundary spreads outward.
/// - `ExteriorPolygon`: a closed ring that starts as an ordinary exterior
///   front — the interior is already burned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IgnitionGeometry {
    PointSet(Vec<Vec2>),
    Polyline(Vec<Vec2>),
    InteriorPolygon(Vec<Vec2>),
    ExteriorPolygon(Vec<Vec2>),
}

impl IgnitionGeometry {
    /// The raw vertex list backing this geometry, regardless of kind.
    #[must_use]
    pub fn vertices(&self) -> &[Vec2] {
        match self {
            IgnitionGeometry::PointSet(v)
            | IgnitionGeometry::Polyline(v)
            | IgnitionGeometry::InteriorPolygon(v)
            | IgnitionGeometry::ExteriorPolygon(v) => v,
        }
    }
}

/// One input ignition: a geometry, a GMT start time (seconds since the
/// epoch the host's time manager uses), and any import-driver attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ignition {
    pub geometry: IgnitionGeometry,
    /// GMT start time, in seconds. Local time is derived by the grid engine,
    /// not stored here.
    pub start_time: i64,
    pub attributes: AttributeSet,
}

impl Ignition {
    #[must_use]
    pub fn new(geometry: IgnitionGeometry, start_time: i64) -> Self {
        Ignition {
            geometry,
            start_time,
            attributes: AttributeSet::new(),
        }
    }

    /// True if this geometry has too few vertices to be meaningful
    /// (`PointSet` always valid if non-empty; polygon/polyline kinds need
    /// at least 2 vertices to form an edge).
    #[must_use]
    pub fn is_structurally_valid(&self) -> bool {
        match &self.geometry {
            IgnitionGeometry::PointSet(v) => !v.is_empty(),
            IgnitionGeometry::Polyline(v) => v.len() >= 2,
            IgnitionGeometry::InteriorPolygon(v) | IgnitionGeometry::ExteriorPolygon(v) => {
                v.len() >= 3
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_set_with_no_points_is_invalid() {
        let ign = Ignition::new(IgnitionGeometry::PointSet(vec![]), 0);
        assert!(!ign.is_structurally_valid());
    }

    #[test]
    fn polyline_needs_at_least_two_vertices() {
        let one = Ignition::new(IgnitionGeometry::Polyline(vec![Vec2::new(0.0, 0.0)]), 0);
        assert!(!one.is_structurally_valid());
        let two = Ignition::new(
            IgnitionGeometry::Polyline(vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)]),
            0,
        );
        assert!(two.is_structurally_valid());
    }

    #[test]
    fn polygon_needs_at_least_three_vertices() {
        let tri = Ignition::new(
            IgnitionGeometry::ExteriorPolygon(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
            ]),
            0,
        );
        assert!(tri.is_structurally_valid());
    }

    #[test]
    fn vertices_accessor_covers_all_variants() {
        let v = vec![Vec2::new(0.0, 0.0)];
        assert_eq!(IgnitionGeometry::PointSet(v.clone()).vertices(), &v[..]);
        assert_eq!(IgnitionGeometry::Polyline(v.clone()).vertices(), &v[..]);
    }
}
