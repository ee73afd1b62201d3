//! Spatial hashing for fast static collider lookups.
//!
//! Static boxes are bucketed by their XZ footprint so overlap and movement queries
//! only test the few boxes near the query volume instead of every box in the arena.

use bevy::prelude::*;
use std::collections::HashMap;

/// Size of each spatial grid cell in world units.
/// Should be roughly the size of the largest box footprint.
pub const SPATIAL_CELL_SIZE: f32 = 8.0;

/// An axis-aligned box in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Closest point inside the box to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.closest_point(center).distance_squared(center) <= radius * radius
    }

    /// Whether the XZ footprint, grown by `margin`, contains the point's XZ
    pub fn footprint_contains(&self, point: Vec3, margin: f32) -> bool {
        point.x >= self.min.x - margin
            && point.x <= self.max.x + margin
            && point.z >= self.min.z - margin
            && point.z <= self.max.z + margin
    }

    /// Slab test. Returns the entry distance and surface normal.
    pub fn ray_intersection(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<(f32, Vec3)> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            // Entering through the min face means the face normal points along -axis.
            let mut face = -1.0;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                face = 1.0;
            }

            if t0 > t_min {
                t_min = t0;
                normal = Vec3::ZERO;
                normal[axis] = face;
            }
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        if normal == Vec3::ZERO {
            // Origin inside the box.
            normal = -dir;
        }
        Some((t_min, normal))
    }
}

/// Spatial hash grid over static boxes.
///
/// Each box is stored once and referenced from every XZ cell its footprint overlaps.
#[derive(Default, Debug, Clone)]
pub struct SpatialGrid {
    /// Map from grid cell (x, z) to indices of boxes overlapping that cell.
    cells: HashMap<(i32, i32), Vec<usize>>,
    bounds: Vec<Aabb>,
}

impl SpatialGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a world position to grid cell coordinates.
    #[inline]
    fn world_to_cell(pos: Vec3) -> (i32, i32) {
        (
            (pos.x / SPATIAL_CELL_SIZE).floor() as i32,
            (pos.z / SPATIAL_CELL_SIZE).floor() as i32,
        )
    }

    /// Add a box; returns its index.
    pub fn insert(&mut self, aabb: Aabb) -> usize {
        let min_cell = Self::world_to_cell(aabb.min);
        let max_cell = Self::world_to_cell(aabb.max);

        let idx = self.bounds.len();
        self.bounds.push(aabb);

        for cx in min_cell.0..=max_cell.0 {
            for cz in min_cell.1..=max_cell.1 {
                self.cells.entry((cx, cz)).or_default().push(idx);
            }
        }

        idx
    }

    /// Indices of boxes whose cells overlap the query box, each listed once, ascending.
    pub fn query(&self, area: Aabb) -> Vec<usize> {
        let min_cell = Self::world_to_cell(area.min);
        let max_cell = Self::world_to_cell(area.max);
        let mut found = Vec::new();

        for cx in min_cell.0..=max_cell.0 {
            for cz in min_cell.1..=max_cell.1 {
                if let Some(indices) = self.cells.get(&(cx, cz)) {
                    found.extend(indices.iter().copied());
                }
            }
        }

        found.sort_unstable();
        found.dedup();
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_query_finds_nearby_only() {
        let mut grid = SpatialGrid::new();
        let near = grid.insert(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0)));
        let far = grid.insert(Aabb::from_center_half_extents(
            Vec3::new(100.0, 0.0, 100.0),
            Vec3::splat(1.0),
        ));

        let hits = grid.query(Aabb::from_center_half_extents(Vec3::new(0.5, 0.0, 0.5), Vec3::splat(0.5)));
        assert!(hits.contains(&near));
        assert!(!hits.contains(&far));
    }

    #[test]
    fn test_large_box_listed_once() {
        let mut grid = SpatialGrid::new();
        grid.insert(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(50.0, 0.5, 50.0)));
        let hits = grid.query(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(30.0)));
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn test_ray_hits_top_face() {
        let ground = Aabb::from_center_half_extents(Vec3::new(0.0, -0.5, 0.0), Vec3::new(10.0, 0.5, 10.0));
        let (t, normal) = ground
            .ray_intersection(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 100.0)
            .expect("ray should hit");
        assert!((t - 5.0).abs() < 1e-5);
        assert_eq!(normal, Vec3::Y);
    }

    #[test]
    fn test_ray_misses_beyond_range() {
        let ground = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        assert!(ground
            .ray_intersection(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y, 5.0)
            .is_none());
        assert!(ground
            .ray_intersection(Vec3::new(5.0, 10.0, 0.0), Vec3::NEG_Y, 50.0)
            .is_none());
    }

    #[test]
    fn test_sphere_touching_corner() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        assert!(aabb.intersects_sphere(Vec3::new(1.5, 1.0, 1.0), 0.6));
        assert!(!aabb.intersects_sphere(Vec3::new(2.0, 2.0, 2.0), 1.0));
    }
}
