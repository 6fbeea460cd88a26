use crate::core_types::vec2::Vec2;
use rustc_hash::FxHashMap;

/// Spatial index using hash-based grid for fast neighbor queries between
/// fire-front vertices, asset nodes, and firebreak segments.
pub(crate) struct SpatialIndex {
    grid: FxHashMap<u64, Vec<(u32, Vec2)>>,
    cell_size: f64,
    origin: Vec2,
}

impl SpatialIndex {
    /// Create a new spatial index. `origin` anchors the cell grid; `cell_size`
    /// should be on the order of the expected query radius for good locality.
    pub fn new(origin: Vec2, cell_size: f64) -> Self {
        SpatialIndex {
            grid: FxHashMap::with_capacity_and_hasher(1024, Default::default()),
            cell_size,
            origin,
        }
    }

    /// Hash a position to a cell ID using Morton encoding.
    #[inline(always)]
    fn hash_position(&self, pos: Vec2) -> u64 {
        let ix = ((pos.x - self.origin.x) / self.cell_size).floor() as i32;
        let iy = ((pos.y - self.origin.y) / self.cell_size).floor() as i32;
        morton_encode(ix, iy)
    }

    /// Insert an element into the spatial index.
    pub fn insert(&mut self, id: u32, position: Vec2) {
        let hash = self.hash_position(position);
        self.grid.entry(hash).or_default().push((id, position));
    }

    /// Remove every occurrence of `id` at `position`'s cell. Used when a
    /// vertex moves or is purged between time steps.
    pub fn remove(&mut self, id: u32, position: Vec2) {
        let hash = self.hash_position(position);
        if let Some(bucket) = self.grid.get_mut(&hash) {
            bucket.retain(|(bucket_id, _)| *bucket_id != id);
        }
    }

    /// Query all elements within `radius` of `pos`.
    pub fn query_radius(&self, pos: Vec2, radius: f64) -> Vec<u32> {
        let cells_needed = (radius / self.cell_size).ceil() as i32;
        let radius_sq = radius * radius;

        let base_ix = ((pos.x - self.origin.x) / self.cell_size).floor() as i32;
        let base_iy = ((pos.y - self.origin.y) / self.cell_size).floor() as i32;

        let side = (2 * cells_needed + 1) as usize;
        let mut results = Vec::with_capacity((side * side * 8).min(2000));

        for dx in -cells_needed..=cells_needed {
            for dy in -cells_needed..=cells_needed {
                let hash = morton_encode(base_ix + dx, base_iy + dy);
                if let Some(elements) = self.grid.get(&hash) {
                    for (id, element_pos) in elements {
                        let ddx = element_pos.x - pos.x;
                        let ddy = element_pos.y - pos.y;
                        if ddx * ddx + ddy * ddy <= radius_sq {
                            results.push(*id);
                        }
                    }
                }
            }
        }

        results
    }
}

/// Morton encode 2D coordinates into a single 64-bit integer for spatial
/// locality in hash lookups.
#[inline(always)]
fn morton_encode(x: i32, y: i32) -> u64 {
    fn part(v: i32) -> u64 {
        let mut x = (v as i64 as u64) & 0xffff_ffff;
        x = (x | (x << 16)) & 0x0000_ffff_0000_ffff;
        x = (x | (x << 8)) & 0x00ff_00ff_00ff_00ff;
        x = (x | (x << 4)) & 0x0f0f_0f0f_0f0f_0f0f;
        x = (x | (x << 2)) & 0x3333_3333_3333_3333;
        x = (x | (x << 1)) & 0x5555_5555_5555_5555;
        x
    }
    part(x) | (part(y) << 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_query_finds_nearby_and_excludes_far() {
        let mut index = SpatialIndex::new(Vec2::new(-100.0, -100.0), 10.0);

        index.insert(1, Vec2::new(0.0, 0.0));
        index.insert(2, Vec2::new(5.0, 5.0));
        index.insert(3, Vec2::new(50.0, 50.0));

        let nearby = index.query_radius(Vec2::new(0.0, 0.0), 15.0);
        assert!(nearby.contains(&1));
        assert!(nearby.contains(&2));
        assert!(!nearby.contains(&3));
    }

    #[test]
    fn remove_drops_element_from_future_queries() {
        let mut index = SpatialIndex::new(Vec2::new(-100.0, -100.0), 10.0);
        index.insert(1, Vec2::new(0.0, 0.0));
        index.remove(1, Vec2::new(0.0, 0.0));
        let nearby = index.query_radius(Vec2::new(0.0, 0.0), 15.0);
        assert!(!nearby.contains(&1));
    }

    #[test]
    fn morton_encoding_distinguishes_neighbors() {
        let code1 = morton_encode(0, 0);
        let code2 = morton_encode(1, 0);
        let code3 = morton_encode(0, 1);
        assert_ne!(code1, code2);
        assert_ne!(code1, code3);
    }
}
