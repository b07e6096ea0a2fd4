use glam::Vec3;

/// World-space size of one grid cell. The grid is centered on the world
/// origin, so resizing never translates existing objects.
pub const CELL_SIZE: f32 = 1.0;

/// World coordinate to integer cell index along one axis of a `cells`-wide
/// grid. May fall outside `0..cells`; callers bounds-check.
pub fn world_to_cell(world: f32, cells: usize) -> i32 {
    (world / CELL_SIZE + cells as f32 / 2.0).floor() as i32
}

/// Inverse of [`world_to_cell`]: the world coordinate of a cell's center.
pub fn cell_to_world(cell: i32, cells: usize) -> f32 {
    (cell as f32 - cells as f32 / 2.0 + 0.5) * CELL_SIZE
}

/// Distance from the world origin to the grid edge along one axis.
pub fn half_extent(cells: usize) -> f32 {
    cells as f32 * CELL_SIZE / 2.0
}

/// A world-space picking ray supplied by the external camera.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    /// Intersection with the horizontal plane `y = height`, or `None` when
    /// the ray is parallel to it or the plane lies behind the origin.
    pub fn intersect_height_plane(&self, height: f32) -> Option<Vec3> {
        if self.dir.y.abs() < f32::EPSILON {
            return None;
        }
        let t = (height - self.origin.y) / self.dir.y;
        if t < 0.0 {
            return None;
        }
        Some(self.origin + self.dir * t)
    }

    /// Shortest distance from the ray to `point`, treating the ray as a
    /// half-line from its origin.
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        let dir = self.dir.normalize_or_zero();
        if dir == Vec3::ZERO {
            return self.origin.distance(point);
        }
        let offset = point - self.origin;
        let along = offset.dot(dir).max(0.0);
        (offset - dir * along).length()
    }
}
