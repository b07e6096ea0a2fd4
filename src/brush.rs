use std::f32::consts::FRAC_PI_2;

/// Radii at or below this behave as a single-cell point brush.
pub const POINT_BRUSH_RADIUS: f32 = 0.1;

/// Inclusive slack so a one-cell radius still reaches its 4-neighbors.
pub const EDGE_SLACK: f32 = 0.5;

/// Falloff weight of the cell at integer offset `(dx, dz)` from the brush
/// center, in `[0, 1]`.
///
/// Squared-cosine profile: 1.0 at the center, 0 at the radius boundary,
/// and exactly 0 past `radius + EDGE_SLACK`. The same profile is shared by
/// sculpting, smoothing, and density-driven instance scaling; nothing else
/// in the crate derives its own falloff.
pub fn intensity(radius_cells: f32, dx: i32, dz: i32) -> f32 {
    if radius_cells <= POINT_BRUSH_RADIUS {
        return if dx == 0 && dz == 0 { 1.0 } else { 0.0 };
    }
    let dist = (((dx * dx) + (dz * dz)) as f32).sqrt();
    if dist > radius_cells + EDGE_SLACK {
        return 0.0;
    }
    let ratio = (dist / radius_cells).min(1.0);
    let edge = (ratio * FRAC_PI_2).cos();
    edge * edge
}

/// Enumerate the in-bounds cells of a `width` x `depth` grid covered by a
/// brush at `(cx, cz)`, with each cell's falloff weight. Covered means
/// within `radius + EDGE_SLACK` of the center; boundary cells carry weight
/// zero but still belong to the footprint.
pub fn covered_cells(
    cx: i32,
    cz: i32,
    radius_cells: f32,
    width: usize,
    depth: usize,
) -> Vec<(usize, usize, f32)> {
    let reach = (radius_cells.max(0.0) + EDGE_SLACK).ceil() as i32;
    let mut cells = Vec::new();
    for dz in -reach..=reach {
        let z = cz + dz;
        if z < 0 || z >= depth as i32 {
            continue;
        }
        for dx in -reach..=reach {
            let x = cx + dx;
            if x < 0 || x >= width as i32 {
                continue;
            }
            let dist = (((dx * dx) + (dz * dz)) as f32).sqrt();
            if dist > radius_cells + EDGE_SLACK {
                continue;
            }
            cells.push((x as usize, z as usize, intensity(radius_cells, dx, dz)));
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_brush_touches_only_center() {
        assert_eq!(intensity(0.0, 0, 0), 1.0);
        assert_eq!(intensity(0.05, 0, 0), 1.0);
        assert_eq!(intensity(0.0, 1, 0), 0.0);
        assert_eq!(intensity(0.1, 0, 1), 0.0);
    }

    #[test]
    fn center_is_full_and_boundary_is_zero() {
        assert_eq!(intensity(2.0, 0, 0), 1.0);
        // At exactly the radius the squared cosine touches zero.
        assert!(intensity(2.0, 2, 0).abs() < 1e-6);
        // Past radius + slack the cell is excluded entirely.
        assert_eq!(intensity(2.0, 3, 0), 0.0);
    }

    #[test]
    fn falloff_is_monotonic_in_distance() {
        let radius = 4.0;
        let mut previous = f32::INFINITY;
        for d in 0..=5 {
            let w = intensity(radius, d, 0);
            assert!(w <= previous, "intensity rose at distance {d}");
            assert!((0.0..=1.0).contains(&w));
            previous = w;
        }
    }

    #[test]
    fn footprint_respects_grid_bounds() {
        let cells = covered_cells(0, 0, 1.0, 10, 10);
        assert!(cells.iter().all(|&(x, z, _)| x < 10 && z < 10));
        // Corner placement keeps the in-bounds quadrant: center, two
        // 4-neighbors, and the zero-weight diagonal at distance sqrt(2).
        assert_eq!(cells.len(), 4);
        assert!(cells.contains(&(0, 0, 1.0)));
    }

    #[test]
    fn radius_one_reaches_its_four_neighbors() {
        let cells = covered_cells(5, 5, 1.0, 11, 11);
        for neighbor in [(4, 5), (6, 5), (5, 4), (5, 6)] {
            assert!(
                cells.iter().any(|&(x, z, _)| (x, z) == neighbor),
                "missing 4-neighbor {neighbor:?}"
            );
        }
    }
}
