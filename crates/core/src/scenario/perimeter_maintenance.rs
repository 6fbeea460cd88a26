//! [`PerimeterMaintenance`]: vertex-density and topology upkeep, per §4.8.
//!
//! Runs after every sub-step on every [`FireFront`]: coalesce close
//! vertices, densify sparse edges, resolve self-intersections, merge
//! overlapping fires of different [`ActiveFireId`]s, then fix up winding.

use crate::core_types::fire_front::{FireFront, Orientation};
use crate::core_types::fire_point::FirePoint;
use crate::core_types::vec2::Vec2;
use crate::scenario::active_fire::{ActiveFireId, ActiveFireRegistry};
use crate::scenario::scenario_fire::ScenarioFire;

/// Tunables for one [`PerimeterMaintenance`] pass, drawn from
/// [`crate::scenario::config::ConfigValues`]/[`crate::scenario::config::ConfigFlags`].
#[derive(Debug, Clone, Copy)]
pub struct MaintenanceOptions {
    pub perimeter_spacing: f64,
    pub perimeter_resolution: f64,
    pub suppress_tight_concave_addpoint: bool,
    /// A split-off loop whose enclosed area is below this fraction of the
    /// front's total area is clipped rather than spun out as its own front.
    pub split_area_fraction: f64,
}

/// §4.8.1: remove vertices whose distance to *both* neighbors is below
/// `perimeter_spacing`. Never reduces a front below 3 vertices.
pub fn coalesce(front: &mut FireFront, options: &MaintenanceOptions) {
    loop {
        if front.len() <= 3 {
            return;
        }
        let indices: Vec<usize> = front.indices().collect();
        let mut to_remove = None;
        for &idx in &indices {
            let p = front.get(idx).unwrap().position;
            let prev = front.get(front.prev_index(idx)).unwrap().position;
            let next = front.get(front.next_index(idx)).unwrap().position;
            if (p - prev).norm() < options.perimeter_spacing && (p - next).norm() < options.perimeter_spacing {
                to_remove = Some(idx);
                break;
            }
        }
        match to_remove {
            Some(idx) => front.remove(idx),
            None => return,
        }
    }
}

/// §4.8.2: insert midpoints between neighbors farther apart than
/// `perimeter_resolution`. Inserted vertices carry no prior-step history
/// link (they are new, not descended from anything). When
/// `suppress_tight_concave_addpoint` is set, a concave vertex (interior
/// angle turning away from the outward normal) whose neighbor is already
/// closer than twice the minimum spacing is skipped, capping insertion
/// density on tightly curved concave arcs.
pub fn densify(front: &mut FireFront, options: &MaintenanceOptions) {
    let mut idx = match front.head() {
        Some(h) => h,
        None => return,
    };
    let start = idx;
    let mut first = true;
    loop {
        if !first && idx == start {
            break;
        }
        first = false;
        let next = front.next_index(idx);
        let a = front.get(idx).unwrap().position;
        let b = front.get(next).unwrap().position;
        let gap = (b - a).norm();
        if gap > options.perimeter_resolution {
            if options.suppress_tight_concave_addpoint
                && gap < 2.0 * options.perimeter_spacing
                && is_concave(front, idx)
            {
                idx = next;
                continue;
            }
            let midpoint = FirePoint::densified(a + (b - a) * 0.5);
            let inserted = front.insert_after(idx, midpoint);
            idx = inserted;
            continue;
        }
        idx = next;
    }
}

/// Whether the ring turns concave at vertex `idx` (the cross product of the
/// incoming and outgoing edges has the opposite sign from the ring's
/// overall winding).
fn is_concave(front: &FireFront, idx: usize) -> bool {
    let prev = front.get(front.prev_index(idx)).unwrap().position;
    let here = front.get(idx).unwrap().position;
    let next = front.get(front.next_index(idx)).unwrap().position;
    let in_edge = here - prev;
    let out_edge = next - here;
    let cross = in_edge.x * out_edge.y - in_edge.y * out_edge.x;
    match front.orientation() {
        Orientation::Exterior => cross < 0.0,
        Orientation::Interior => cross > 0.0,
    }
}

/// §4.8.3: detect edge-edge crossings and resolve each by either clipping a
/// collapsed small loop or splitting the front into two rings. Returns the
/// (possibly just one, possibly several) resulting fronts; callers replace
/// the original front with this list.
pub fn resolve_self_intersections(front: FireFront, options: &MaintenanceOptions) -> Vec<FireFront> {
    let mut pending = vec![front];
    let mut settled = Vec::new();

    while let Some(mut candidate) = pending.pop() {
        let hits = candidate.find_self_intersections();
        let Some(hit) = hits.into_iter().next() else {
            settled.push(candidate);
            continue;
        };

        let indices: Vec<usize> = candidate.indices().collect();
        let n = indices.len();
        let (lo, hi) = (hit.edge_i.min(hit.edge_j), hit.edge_i.max(hit.edge_j));

        // The loop strictly between the two crossing edges, closed through
        // the crossing point itself (not just the bare original vertices).
        let loop_positions: Vec<usize> = (lo + 1..=hi).collect();
        let rest_positions: Vec<usize> = (0..=lo).chain(hi + 1..n).collect();

        let loop_area = polygon_area2_with_extra_point(&candidate, &loop_positions, &indices, hit.point);
        let total_area = candidate.signed_area2().abs().max(f64::EPSILON);

        if loop_area.abs() / total_area < options.split_area_fraction {
            // Clip: rebuild the ring as `rest` with the intersection point
            // spliced in between its two ends.
            let mut vertices: Vec<FirePoint> = rest_positions
                .iter()
                .map(|&p| candidate.get(indices[p]).unwrap().clone())
                .collect();
            vertices.push(FirePoint::densified(hit.point));
            let orientation = candidate.orientation();
            pending.push(FireFront::from_vertices(vertices, orientation));
        } else {
            // Split: each side becomes its own ring, sharing the crossing point.
            let mut loop_vertices: Vec<FirePoint> =
                loop_positions.iter().map(|&p| candidate.get(indices[p]).unwrap().clone()).collect();
            loop_vertices.push(FirePoint::densified(hit.point));

            let mut rest_vertices: Vec<FirePoint> =
                rest_positions.iter().map(|&p| candidate.get(indices[p]).unwrap().clone()).collect();
            rest_vertices.push(FirePoint::densified(hit.point));

            let orientation = candidate.orientation();
            let mut a = FireFront::from_vertices(loop_vertices, orientation);
            let mut b = FireFront::from_vertices(rest_vertices, orientation);
            a.recompute_orientation();
            b.recompute_orientation();
            if a.len() >= 3 {
                pending.push(a);
            }
            if b.len() >= 3 {
                pending.push(b);
            }
        }
    }

    settled
}

/// Shoelace area (doubled) of the sub-polygon named by `positions` (indices
/// into `ring_order`, itself ring-order arena slots), closed through `extra`
/// — the crossing point that actually bounds this loop.
fn polygon_area2_with_extra_point(front: &FireFront, positions: &[usize], ring_order: &[usize], extra: Vec2) -> f64 {
    let mut poly: Vec<Vec2> = positions.iter().map(|&p| front.get(ring_order[p]).unwrap().position).collect();
    poly.push(extra);
    if poly.len() < 3 {
        return 0.0;
    }
    let mut area2 = 0.0;
    for w in 0..poly.len() {
        let a = poly[w];
        let b = poly[(w + 1) % poly.len()];
        area2 += a.x * b.y - b.x * a.y;
    }
    area2
}

/// §4.8.4: merge any two [`ScenarioFire`]s of different [`ActiveFireId`]s
/// whose hulls overlap. Discards vertices of each front strictly inside the
/// other, then joins the remainder into a single simple ring via a convex
/// hull over the surviving vertices — an intentional simplification of
/// "exact polygon union" (see DESIGN.md) adequate for maintaining a closed,
/// simple exterior front across a merge.
pub fn merge_overlapping_fires(fires: &mut Vec<ScenarioFire>, registry: &mut ActiveFireRegistry) {
    loop {
        let mut merge_pair = None;
        'search: for i in 0..fires.len() {
            for j in (i + 1)..fires.len() {
                if fires[i].active_fire == fires[j].active_fire {
                    continue;
                }
                if fronts_overlap(&fires[i], &fires[j]) {
                    merge_pair = Some((i, j));
                    break 'search;
                }
            }
        }
        let Some((i, j)) = merge_pair else { break };

        let b = fires.remove(j);
        let a = fires.remove(i);
        let surviving_id = registry.merge(a.active_fire, b.active_fire);

        let mut points: Vec<Vec2> = Vec::new();
        for front in &a.fronts {
            for idx in front.indices() {
                let p = front.get(idx).unwrap().position;
                if !polygon_contains(&b, p) {
                    points.push(p);
                }
            }
        }
        for front in &b.fronts {
            for idx in front.indices() {
                let p = front.get(idx).unwrap().position;
                if !polygon_contains(&a, p) {
                    points.push(p);
                }
            }
        }

        let hull = convex_hull(points);
        let merged_front = if hull.len() >= 3 {
            FireFront::from_vertices(hull.into_iter().map(FirePoint::densified).collect(), Orientation::Exterior)
        } else {
            a.fronts.into_iter().next().expect("fire always has at least one front")
        };

        fires.push(ScenarioFire::new(surviving_id, vec![merged_front]));
    }
}

fn fronts_overlap(a: &ScenarioFire, b: &ScenarioFire) -> bool {
    let (Some((amin, amax)), Some((bmin, bmax))) = (a.bounding_box(), b.bounding_box()) else {
        return false;
    };
    amin.x <= bmax.x && amax.x >= bmin.x && amin.y <= bmax.y && amax.y >= bmin.y
}

fn polygon_contains(fire: &ScenarioFire, point: Vec2) -> bool {
    fire.fronts.iter().any(|front| point_in_ring(front, point))
}

/// Ray-casting point-in-polygon test over one ring's live vertices. Shared
/// with [`crate::scenario::asset_tracker`], which needs the same "has this
/// front's interior reached this point" test for asset arrival.
pub(crate) fn point_in_ring(front: &FireFront, point: Vec2) -> bool {
    let indices: Vec<usize> = front.indices().collect();
    let n = indices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    for w in 0..n {
        let a = front.get(indices[w]).unwrap().position;
        let b = front.get(indices[(w + 1) % n]).unwrap().position;
        let crosses = (a.y > point.y) != (b.y > point.y);
        if crosses {
            let x_at_y = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x_at_y {
                inside = !inside;
            }
        }
    }
    inside
}

/// Andrew's monotone-chain convex hull, returned in counter-clockwise order.
fn convex_hull(mut points: Vec<Vec2>) -> Vec<Vec2> {
    points.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap().then(a.y.partial_cmp(&b.y).unwrap()));
    points.dedup_by(|a, b| (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
    if points.len() < 3 {
        return points;
    }

    let cross = |o: Vec2, a: Vec2, b: Vec2| (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x);

    let mut lower = Vec::new();
    for &p in &points {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper = Vec::new();
    for &p in points.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// §4.8.5: recompute winding after any topology change above.
pub fn rotation_fix(front: &mut FireFront) {
    front.recompute_orientation();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::vec2::Vec2;

    fn options() -> MaintenanceOptions {
        MaintenanceOptions {
            perimeter_spacing: 1.0,
            perimeter_resolution: 10.0,
            suppress_tight_concave_addpoint: false,
            split_area_fraction: 0.1,
        }
    }

    fn square(side: f64) -> FireFront {
        FireFront::from_vertices(
            vec![
                FirePoint::new(Vec2::new(0.0, 0.0)),
                FirePoint::new(Vec2::new(side, 0.0)),
                FirePoint::new(Vec2::new(side, side)),
                FirePoint::new(Vec2::new(0.0, side)),
            ],
            Orientation::Exterior,
        )
    }

    #[test]
    fn coalesce_removes_vertices_closer_than_spacing() {
        let mut front = square(10.0);
        let idx = front.insert_after(0, FirePoint::new(Vec2::new(0.1, 0.0)));
        assert_eq!(front.len(), 5);
        coalesce(&mut front, &options());
        assert!(front.get(idx).is_none() || front.len() < 5);
    }

    #[test]
    fn coalesce_never_drops_below_three_vertices() {
        let mut front = square(0.5); // every edge shorter than spacing
        coalesce(&mut front, &options());
        assert!(front.len() >= 3);
    }

    #[test]
    fn densify_inserts_midpoints_on_long_edges() {
        let mut front = square(100.0);
        densify(&mut front, &options());
        assert!(front.len() > 4);
        for idx in front.indices().collect::<Vec<_>>() {
            let a = front.get(idx).unwrap().position;
            let b = front.get(front.next_index(idx)).unwrap().position;
            assert!((a - b).norm() <= options().perimeter_resolution + 1e-6);
        }
    }

    #[test]
    fn densify_leaves_short_edges_untouched() {
        let mut front = square(5.0);
        let before = front.len();
        densify(&mut front, &options());
        assert_eq!(front.len(), before);
    }

    #[test]
    fn bowtie_splits_into_two_simple_fronts() {
        let pts = vec![
            FirePoint::new(Vec2::new(0.0, 0.0)),
            FirePoint::new(Vec2::new(10.0, 10.0)),
            FirePoint::new(Vec2::new(10.0, 0.0)),
            FirePoint::new(Vec2::new(0.0, 10.0)),
        ];
        let front = FireFront::from_vertices(pts, Orientation::Exterior);
        let result = resolve_self_intersections(front, &options());
        assert_eq!(result.len(), 2);
        for f in &result {
            assert!(f.find_self_intersections().is_empty());
            assert!(f.len() >= 3);
        }
    }

    #[test]
    fn simple_ring_is_untouched_by_intersection_resolution() {
        let front = square(10.0);
        let result = resolve_self_intersections(front, &options());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 4);
    }

    #[test]
    fn overlapping_fires_merge_into_one_with_surviving_id() {
        let mut registry = ActiveFireRegistry::new();
        let a_id = registry.spawn(0);
        let b_id = registry.spawn(1);

        let circle = |cx: f64, cy: f64, r: f64, n: usize| {
            let pts: Vec<FirePoint> = (0..n)
                .map(|i| {
                    let theta = std::f64::consts::TAU * (i as f64) / (n as f64);
                    FirePoint::new(Vec2::new(cx + r * theta.cos(), cy + r * theta.sin()))
                })
                .collect();
            FireFront::from_vertices(pts, Orientation::Exterior)
        };

        let mut fires = vec![
            ScenarioFire::new(a_id, vec![circle(-3.0, 0.0, 5.0, 16)]),
            ScenarioFire::new(b_id, vec![circle(3.0, 0.0, 5.0, 16)]),
        ];
        merge_overlapping_fires(&mut fires, &mut registry);

        assert_eq!(fires.len(), 1);
        assert!(fires[0].active_fire == a_id || fires[0].active_fire == b_id);
        assert!(registry.resolve(a_id) == registry.resolve(b_id));
    }

    #[test]
    fn non_overlapping_fires_are_left_alone() {
        let mut registry = ActiveFireRegistry::new();
        let a_id = registry.spawn(0);
        let b_id = registry.spawn(1);
        let mut fires = vec![
            ScenarioFire::new(a_id, vec![square(1.0)]),
            ScenarioFire::new(b_id, vec![{
                let mut f = square(1.0);
                for idx in f.indices().collect::<Vec<_>>() {
                    f.get_mut(idx).unwrap().position += Vec2::new(1000.0, 1000.0);
                }
                f
            }]),
        ];
        merge_overlapping_fires(&mut fires, &mut registry);
        assert_eq!(fires.len(), 2);
    }
}
