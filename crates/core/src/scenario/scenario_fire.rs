//! [`ScenarioFire`]: the [`FireFront`]s belonging to one [`ActiveFireId`] at one time step.

use serde::{Deserialize, Serialize};

use crate::core_types::fire_front::FireFront;
use crate::scenario::active_fire::ActiveFireId;

/// All fronts of one fire at one time step. A fire with an interior hole
/// carries two fronts: one `Exterior`, one `Interior`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFire {
    pub active_fire: ActiveFireId,
    pub fronts: Vec<FireFront>,
}

impl ScenarioFire {
    #[must_use]
    pub fn new(active_fire: ActiveFireId, fronts: Vec<FireFront>) -> Self {
        ScenarioFire { active_fire, fronts }
    }

    /// Total vertex count across all fronts, used by statistics and
    /// capacity planning for the next step's arena.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.fronts.iter().map(FireFront::len).sum()
    }

    /// Combined bounding box across all fronts, if any front is non-empty.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(crate::core_types::vec2::Vec2, crate::core_types::vec2::Vec2)> {
        self.fronts.iter().filter_map(FireFront::bounding_box).reduce(|(amin, amax), (bmin, bmax)| {
            (
                crate::core_types::vec2::Vec2::new(amin.x.min(bmin.x), amin.y.min(bmin.y)),
                crate::core_types::vec2::Vec2::new(amax.x.max(bmax.x), amax.y.max(bmax.y)),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::fire_front::Orientation;
    use crate::core_types::fire_point::FirePoint;
    use crate::core_types::vec2::Vec2;

    fn triangle() -> FireFront {
        FireFront::from_vertices(
            vec![
                FirePoint::new(Vec2::new(0.0, 0.0)),
                FirePoint::new(Vec2::new(1.0, 0.0)),
                FirePoint::new(Vec2::new(0.0, 1.0)),
            ],
            Orientation::Exterior,
        )
    }

    #[test]
    fn vertex_count_sums_across_fronts() {
        let sf = ScenarioFire::new(ActiveFireId(0), vec![triangle(), triangle()]);
        assert_eq!(sf.vertex_count(), 6);
    }

    #[test]
    fn bounding_box_unions_all_fronts() {
        let mut second = triangle();
        for idx in second.indices().collect::<Vec<_>>() {
            second.get_mut(idx).unwrap().position += Vec2::new(5.0, 5.0);
        }
        let sf = ScenarioFire::new(ActiveFireId(0), vec![triangle(), second]);
        let (min, max) = sf.bounding_box().unwrap();
        assert_eq!(min, Vec2::new(0.0, 0.0));
        assert_eq!(max, Vec2::new(6.0, 6.0));
    }
}
