//! [`FireFront`]: a closed, oriented ring of [`FirePoint`]s.
//!
//! The original engine links vertices with a true doubly-linked circular
//! list of heap nodes. Here the ring is an indexable arena: a flat
//! `Vec<FirePoint>` plus parallel `next`/`prev` index arrays. Indices survive
//! a `rayon` fan-out over a frozen snapshot and split/merge never invalidates
//! a pointer, at the cost of a free-list for removed slots.

use serde::{Deserialize, Serialize};

use crate::core_types::fire_point::FirePoint;
use crate::core_types::vec2::Vec2;

/// Which way a ring winds: `Exterior` encloses burned area (positive signed
/// area), `Interior` is an unburned hole inside another front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Exterior,
    Interior,
}

/// One edge-edge crossing found by [`FireFront::find_self_intersections`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub edge_i: usize,
    pub edge_j: usize,
    pub point: Vec2,
}

/// A closed, oriented ring of [`FirePoint`]s.
///
/// Vertices live in `points`, indexed by slot. `next`/`prev` hold, for each
/// occupied slot, the index of the following/preceding live vertex around
/// the ring. Removed slots are tracked in `free` and their `next`/`prev`
/// entries are meaningless until reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireFront {
    points: Vec<FirePoint>,
    next: Vec<usize>,
    prev: Vec<usize>,
    live: Vec<bool>,
    free: Vec<usize>,
    head: Option<usize>,
    orientation: Orientation,
}

impl FireFront {
    /// Build a ring from an ordered sequence of vertices (first connects to
    /// last). `orientation` is taken as given; call
    /// [`FireFront::recompute_orientation`] afterward if the winding of
    /// `vertices` is not already known.
    #[must_use]
    pub fn from_vertices(vertices: Vec<FirePoint>, orientation: Orientation) -> Self {
        let n = vertices.len();
        let mut next = vec![0; n];
        let mut prev = vec![0; n];
        for i in 0..n {
            next[i] = (i + 1) % n.max(1);
            prev[i] = (i + n - 1) % n.max(1);
        }
        FireFront {
            points: vertices,
            next,
            prev,
            live: vec![true; n],
            free: Vec::new(),
            head: if n == 0 { None } else { Some(0) },
            orientation,
        }
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of live vertices in the ring.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len() - self.free.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn head(&self) -> Option<usize> {
        self.head
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FirePoint> {
        if self.live.get(index).copied().unwrap_or(false) {
            self.points.get(index)
        } else {
            None
        }
    }

    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut FirePoint> {
        if self.live.get(index).copied().unwrap_or(false) {
            self.points.get_mut(index)
        } else {
            None
        }
    }

    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        self.next[index]
    }

    #[must_use]
    pub fn prev_index(&self, index: usize) -> usize {
        self.prev[index]
    }

    /// Iterate live vertex indices in ring order, starting at `head`.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        let start = self.head;
        let mut current = start;
        let mut done = start.is_none();
        std::iter::from_fn(move || {
            if done {
                return None;
            }
            let idx = current?;
            current = Some(self.next[idx]);
            if current == start {
                done = true;
            }
            Some(idx)
        })
    }

    /// Insert `point` between `a` and the vertex currently following `a`.
    /// Returns the new vertex's slot index. Used by densification: the
    /// inserted point carries no prior-step history link by construction.
    pub fn insert_after(&mut self, a: usize, point: FirePoint) -> usize {
        let b = self.next[a];
        let idx = if let Some(slot) = self.free.pop() {
            self.points[slot] = point;
            self.live[slot] = true;
            slot
        } else {
            self.points.push(point);
            self.next.push(0);
            self.prev.push(0);
            self.live.push(true);
            self.points.len() - 1
        };
        self.next[a] = idx;
        self.prev[idx] = a;
        self.next[idx] = b;
        self.prev[b] = idx;
        idx
    }

    /// Remove the vertex at `index` from the ring, reconnecting its
    /// neighbors. Panics if it is the last remaining vertex (a ring must
    /// never shrink below a point).
    pub fn remove(&mut self, index: usize) {
        assert!(self.len() > 1, "cannot remove the last vertex of a ring");
        let p = self.prev[index];
        let n = self.next[index];
        self.next[p] = n;
        self.prev[n] = p;
        self.live[index] = false;
        if self.head == Some(index) {
            self.head = Some(n);
        }
        self.free.push(index);
    }

    /// Twice the signed area of the polygon (shoelace formula); positive for
    /// counter-clockwise winding in a standard Cartesian frame.
    #[must_use]
    pub fn signed_area2(&self) -> f64 {
        let indices: Vec<usize> = self.indices().collect();
        let mut area2 = 0.0;
        for w in 0..indices.len() {
            let a = &self.points[indices[w]].position;
            let b = &self.points[indices[self.next_wrap(w, indices.len())]].position;
            area2 += a.x * b.y - b.x * a.y;
        }
        area2
    }

    fn next_wrap(&self, i: usize, n: usize) -> usize {
        (i + 1) % n.max(1)
    }

    /// Centroid of the polygon, area-weighted (shoelace-consistent).
    #[must_use]
    pub fn centroid(&self) -> Vec2 {
        let indices: Vec<usize> = self.indices().collect();
        let area2 = self.signed_area2();
        if area2.abs() < f64::EPSILON || indices.len() < 3 {
            let sum: Vec2 = indices
                .iter()
                .map(|&i| self.points[i].position)
                .fold(Vec2::zeros(), |acc, p| acc + p);
            return sum / (indices.len().max(1) as f64);
        }
        let mut cx = 0.0;
        let mut cy = 0.0;
        for w in 0..indices.len() {
            let a = &self.points[indices[w]].position;
            let b = &self.points[indices[self.next_wrap(w, indices.len())]].position;
            let cross = a.x * b.y - b.x * a.y;
            cx += (a.x + b.x) * cross;
            cy += (a.y + b.y) * cross;
        }
        let factor = 1.0 / (3.0 * area2);
        Vec2::new(cx * factor, cy * factor)
    }

    /// Re-derive `orientation` from the current signed area. A degenerate
    /// (near-zero area) ring keeps its previous orientation.
    pub fn recompute_orientation(&mut self) {
        let area2 = self.signed_area2();
        if area2.abs() < f64::EPSILON {
            return;
        }
        self.orientation = if area2 > 0.0 {
            Orientation::Exterior
        } else {
            Orientation::Interior
        };
    }

    /// Axis-aligned bounding box `(min, max)` of live vertices.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(Vec2, Vec2)> {
        let mut indices = self.indices();
        let first = indices.next()?;
        let mut min = self.points[first].position;
        let mut max = min;
        for i in indices {
            let p = self.points[i].position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }

    /// Sum of edge lengths around the ring, used by growth-rate stop
    /// conditions and reporting.
    #[must_use]
    pub fn perimeter_length(&self) -> f64 {
        let indices: Vec<usize> = self.indices().collect();
        let n = indices.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|w| {
                let a = self.points[indices[w]].position;
                let b = self.points[indices[self.next_wrap(w, n)]].position;
                (b - a).norm()
            })
            .sum()
    }

    /// Detect edge-edge crossings among non-adjacent edges. `edge_i`/`edge_j`
    /// are positions into the ring-order sequence (not arena slots).
    #[must_use]
    pub fn find_self_intersections(&self) -> Vec<Intersection> {
        let indices: Vec<usize> = self.indices().collect();
        let n = indices.len();
        let mut hits = Vec::new();
        if n < 4 {
            return hits;
        }
        for i in 0..n {
            let a0 = self.points[indices[i]].position;
            let a1 = self.points[indices[self.next_wrap(i, n)]].position;
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue; // adjacent through the wrap
                }
                let b0 = self.points[indices[j]].position;
                let b1 = self.points[indices[self.next_wrap(j, n)]].position;
                if let Some(point) = segment_intersection(a0, a1, b0, b1) {
                    hits.push(Intersection {
                        edge_i: i,
                        edge_j: j,
                        point,
                    });
                }
            }
        }
        hits
    }
}

/// Standard parametric segment-segment intersection test. Returns `None` for
/// parallel/collinear segments, matching the original engine's treatment of
/// degenerate crossings as "no intersection" (handled separately by the
/// coalesce pass instead).
fn segment_intersection(p0: Vec2, p1: Vec2, q0: Vec2, q1: Vec2) -> Option<Vec2> {
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
        Some(p0 + r * t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> FireFront {
        let pts = vec![
            FirePoint::new(Vec2::new(0.0, 0.0)),
            FirePoint::new(Vec2::new(side, 0.0)),
            FirePoint::new(Vec2::new(side, side)),
            FirePoint::new(Vec2::new(0.0, side)),
        ];
        FireFront::from_vertices(pts, Orientation::Exterior)
    }

    #[test]
    fn signed_area_of_ccw_square_is_positive() {
        let front = square(10.0);
        assert!((front.signed_area2() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn centroid_of_square_is_its_center() {
        let front = square(10.0);
        let c = front.centroid();
        assert!((c.x - 5.0).abs() < 1e-9);
        assert!((c.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn insert_after_grows_ring_and_preserves_order() {
        let mut front = square(10.0);
        let idx = front.insert_after(0, FirePoint::new(Vec2::new(5.0, 0.0)));
        assert_eq!(front.len(), 5);
        assert_eq!(front.next_index(0), idx);
        assert_eq!(front.prev_index(idx), 0);
    }

    #[test]
    fn remove_reconnects_neighbors() {
        let mut front = square(10.0);
        let removed = 1;
        let p = front.prev_index(removed);
        let n = front.next_index(removed);
        front.remove(removed);
        assert_eq!(front.next_index(p), n);
        assert_eq!(front.prev_index(n), p);
        assert_eq!(front.len(), 3);
    }

    #[test]
    fn perimeter_length_of_square_is_four_sides() {
        let front = square(10.0);
        assert!((front.perimeter_length() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn bounding_box_matches_square_extent() {
        let front = square(10.0);
        let (min, max) = front.bounding_box().unwrap();
        assert_eq!(min, Vec2::new(0.0, 0.0));
        assert_eq!(max, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn self_intersection_detects_bowtie() {
        // A bowtie: (0,0) -> (10,10) -> (10,0) -> (0,10) -> close, the first
        // and third edges cross in the middle.
        let pts = vec![
            FirePoint::new(Vec2::new(0.0, 0.0)),
            FirePoint::new(Vec2::new(10.0, 10.0)),
            FirePoint::new(Vec2::new(10.0, 0.0)),
            FirePoint::new(Vec2::new(0.0, 10.0)),
        ];
        let front = FireFront::from_vertices(pts, Orientation::Exterior);
        let hits = front.find_self_intersections();
        assert_eq!(hits.len(), 1);
        assert!((hits[0].point.x - 5.0).abs() < 1e-9);
        assert!((hits[0].point.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn convex_ring_has_no_self_intersections() {
        let front = square(10.0);
        assert!(front.find_self_intersections().is_empty());
    }

    #[test]
    fn recompute_orientation_flips_on_negative_area() {
        // Clockwise winding -> negative signed area -> Interior.
        let pts = vec![
            FirePoint::new(Vec2::new(0.0, 0.0)),
            FirePoint::new(Vec2::new(0.0, 10.0)),
            FirePoint::new(Vec2::new(10.0, 10.0)),
            FirePoint::new(Vec2::new(10.0, 0.0)),
        ];
        let mut front = FireFront::from_vertices(pts, Orientation::Exterior);
        front.recompute_orientation();
        assert_eq!(front.orientation(), Orientation::Interior);
    }
}
