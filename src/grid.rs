use std::sync::Arc;

use crate::brush;
use crate::color::{self, CellColor};
use crate::coords;

/// Smallest grid edge the editor will create.
pub const MIN_DIM: usize = 5;
/// Largest grid edge the editor will create.
pub const MAX_DIM: usize = 100;

/// The height/color field under the garden plan.
///
/// Rows are shared `Arc` slices: cloning the grid is cheap and yields a
/// consistent snapshot, and brush mutation replaces only the rows it
/// touches. A renderer holding last frame's clone never observes a
/// half-updated row.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainGrid {
    width: usize,
    depth: usize,
    heights: Vec<Arc<[f32]>>,
    colors: Vec<Arc<[CellColor]>>,
}

/// Deterministic starting height for a cell, seeded only by the grid
/// dimensions. Resizing reuses this for cells outside the copied overlap so
/// regenerated areas blend with freshly created ones.
fn initial_height(x: usize, z: usize, width: usize, depth: usize) -> f32 {
    let seed = (width * 31 + depth * 7) as f32;
    let wave = ((x as f32 * 0.35 + seed).sin() + (z as f32 * 0.35 + seed).cos()) * 0.4;
    (wave + 0.8).max(0.0)
}

fn clamp_dim(cells: usize) -> usize {
    cells.clamp(MIN_DIM, MAX_DIM)
}

impl TerrainGrid {
    pub fn new(width: usize, depth: usize) -> Self {
        let width = clamp_dim(width);
        let depth = clamp_dim(depth);
        let heights = (0..depth)
            .map(|z| {
                (0..width)
                    .map(|x| initial_height(x, z, width, depth))
                    .collect()
            })
            .collect();
        let colors = (0..depth)
            .map(|_| Arc::from(vec![color::BACKGROUND; width]))
            .collect();
        Self {
            width,
            depth,
            heights,
            colors,
        }
    }

    /// Rebuild from loaded row data. Dimensions must already be validated;
    /// heights are clamped non-negative.
    pub(crate) fn from_rows(height_rows: Vec<Vec<f32>>, color_rows: Vec<Vec<CellColor>>) -> Self {
        let depth = height_rows.len();
        let width = height_rows.first().map(Vec::len).unwrap_or(0);
        let heights = height_rows
            .into_iter()
            .map(|row| row.into_iter().map(|h| h.max(0.0)).collect())
            .collect();
        let colors = color_rows.into_iter().map(Arc::from).collect();
        Self {
            width,
            depth,
            heights,
            colors,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Height at a cell; 0.0 outside the grid. Stale indices computed from
    /// pointer math during a resize read the sentinel rather than panic.
    pub fn height_at(&self, x: i32, z: i32) -> f32 {
        if x < 0 || z < 0 || x >= self.width as i32 || z >= self.depth as i32 {
            return 0.0;
        }
        self.heights[z as usize][x as usize]
    }

    /// Color at a cell; the background color outside the grid.
    pub fn color_at(&self, x: i32, z: i32) -> CellColor {
        if x < 0 || z < 0 || x >= self.width as i32 || z >= self.depth as i32 {
            return color::BACKGROUND;
        }
        self.colors[z as usize][x as usize]
    }

    /// Terrain height under a world position, point-sampled from the cell
    /// beneath it. 0.0 outside the grid.
    pub fn ground_height(&self, world_x: f32, world_z: f32) -> f32 {
        let x = coords::world_to_cell(world_x, self.width);
        let z = coords::world_to_cell(world_z, self.depth);
        self.height_at(x, z)
    }

    pub fn height_rows(&self) -> &[Arc<[f32]>] {
        &self.heights
    }

    pub fn color_rows(&self) -> &[Arc<[CellColor]>] {
        &self.colors
    }

    /// Raise (positive delta) or lower the terrain around `(cx, cz)` with
    /// the shared falloff profile. Heights never drop below zero.
    pub fn apply_brush(&mut self, cx: i32, cz: i32, radius_cells: f32, delta: f32) {
        let cells = brush::covered_cells(cx, cz, radius_cells, self.width, self.depth);
        self.rewrite_height_rows(&cells, |_, _, weight, height| {
            (height + delta * weight).max(0.0)
        });
    }

    /// Move each covered cell toward the average of its 4-neighbors,
    /// weighted by falloff and `strength` in `[0, 1]`. Neighbor averages are
    /// read from the pre-stroke heights so the result is order-independent.
    pub fn smooth(&mut self, cx: i32, cz: i32, radius_cells: f32, strength: f32) {
        let strength = strength.clamp(0.0, 1.0);
        let cells = brush::covered_cells(cx, cz, radius_cells, self.width, self.depth);
        let before = self.heights.clone();
        let width = self.width as i32;
        let depth = self.depth as i32;
        let sample = move |x: i32, z: i32| -> f32 {
            if x < 0 || z < 0 || x >= width || z >= depth {
                return 0.0;
            }
            before[z as usize][x as usize]
        };
        self.rewrite_height_rows(&cells, |x, z, weight, height| {
            let (xi, zi) = (x as i32, z as i32);
            let neighborhood =
                (sample(xi - 1, zi) + sample(xi + 1, zi) + sample(xi, zi - 1) + sample(xi, zi + 1))
                    / 4.0;
            (height + (neighborhood - height) * strength * weight).max(0.0)
        });
    }

    /// Paint the categorical color across the brush footprint.
    pub fn paint(&mut self, cx: i32, cz: i32, radius_cells: f32, paint: CellColor) {
        let cells = brush::covered_cells(cx, cz, radius_cells, self.width, self.depth);
        let mut idx = 0;
        while idx < cells.len() {
            let z = cells[idx].1;
            let mut row = self.colors[z].to_vec();
            while idx < cells.len() && cells[idx].1 == z {
                row[cells[idx].0] = paint;
                idx += 1;
            }
            self.colors[z] = Arc::from(row);
        }
    }

    /// Rebuild at the new dimensions: cells inside the old/new overlap keep
    /// their height and color, the rest regenerate procedurally for the new
    /// dimensions. Requested sizes are clamped to `[MIN_DIM, MAX_DIM]`.
    pub fn resize(&mut self, new_width: usize, new_depth: usize) -> (usize, usize) {
        let new_width = clamp_dim(new_width);
        let new_depth = clamp_dim(new_depth);
        if new_width == self.width && new_depth == self.depth {
            return (self.width, self.depth);
        }

        let heights = (0..new_depth)
            .map(|z| {
                (0..new_width)
                    .map(|x| {
                        if x < self.width && z < self.depth {
                            self.heights[z][x]
                        } else {
                            initial_height(x, z, new_width, new_depth)
                        }
                    })
                    .collect()
            })
            .collect();
        let colors = (0..new_depth)
            .map(|z| {
                (0..new_width)
                    .map(|x| {
                        if x < self.width && z < self.depth {
                            self.colors[z][x]
                        } else {
                            color::BACKGROUND
                        }
                    })
                    .collect()
            })
            .collect();

        self.width = new_width;
        self.depth = new_depth;
        self.heights = heights;
        self.colors = colors;
        (new_width, new_depth)
    }

    /// Copy-on-write over the touched height rows: each row listed in
    /// `cells` is cloned once, every covered cell rewritten through `edit`,
    /// and the fresh row swapped in. Cells arrive row-grouped from
    /// [`brush::covered_cells`]. Zero-weight footprint cells pass through
    /// `edit` unchanged by construction of the callers.
    fn rewrite_height_rows(
        &mut self,
        cells: &[(usize, usize, f32)],
        mut edit: impl FnMut(usize, usize, f32, f32) -> f32,
    ) {
        let mut idx = 0;
        while idx < cells.len() {
            let z = cells[idx].1;
            let mut row = self.heights[z].to_vec();
            while idx < cells.len() && cells[idx].1 == z {
                let (x, _, weight) = cells[idx];
                if weight > 0.0 {
                    row[x] = edit(x, z, weight, row[x]);
                }
                idx += 1;
            }
            self.heights[z] = Arc::from(row);
        }
    }
}

impl Default for TerrainGrid {
    fn default() -> Self {
        Self::new(20, 20)
    }
}
