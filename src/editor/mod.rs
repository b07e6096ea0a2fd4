use glam::Vec3;
use tracing::{info, warn};

use crate::coords::{self, Ray};
use crate::grid::TerrainGrid;
use crate::objects::{NewObject, ObjectSet};
use crate::plan::{self, PlanDocument, PlanFormatError, PlanLoadError, io};
use crate::schema;

pub mod input;

pub use input::{PointerButton, PointerEvent};

/// Screen distance a pointer must travel before a press on an object stops
/// being a click and becomes a drag.
pub const DRAG_THRESHOLD_PX: f32 = 4.0;

/// World-space radius around an object's anchor within which a pointer ray
/// counts as hitting it.
pub const PICK_RADIUS: f32 = 0.75;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorMode {
    Select,
    Terrain,
    /// Place one object of the tagged kind, then return to `Select`.
    Add(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerrainTool {
    Sculpt,
    Smooth,
}

#[derive(Clone, Debug)]
pub struct BrushSettings {
    pub tool: TerrainTool,
    pub radius_cells: f32,
    pub strength: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            tool: TerrainTool::Sculpt,
            radius_cells: 2.0,
            strength: 0.2,
        }
    }
}

/// Gesture state within the current pointer interaction. A press on an
/// object is only a *potential* drag until the pointer travels past
/// [`DRAG_THRESHOLD_PX`]; releasing before that keeps it a selection click.
#[derive(Clone, Copy, Debug)]
enum Gesture {
    Idle,
    PendingDrag {
        id: u64,
        start: glam::Vec2,
        plane_height: f32,
    },
    Dragging {
        id: u64,
        plane_height: f32,
    },
    Stroke {
        lowering: bool,
    },
}

/// The live editing surface: owns the terrain grid, the object collection,
/// and the mode/gesture state machine, and exposes the imperative handle a
/// front-end drives. The renderer reads `grid()` and `objects()` once per
/// frame and never writes back.
pub struct GardenEditor {
    grid: TerrainGrid,
    objects: ObjectSet,
    mode: EditorMode,
    pub brush: BrushSettings,
    placement_yaw: f32,
    selection: Option<u64>,
    gesture: Gesture,
}

impl GardenEditor {
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            grid: TerrainGrid::new(width, depth),
            objects: ObjectSet::new(),
            mode: EditorMode::Select,
            brush: BrushSettings::default(),
            placement_yaw: 0.0,
            selection: None,
            gesture: Gesture::Idle,
        }
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    pub fn objects(&self) -> &ObjectSet {
        &self.objects
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn selection(&self) -> Option<u64> {
        self.selection
    }

    /// False while a drag or paint stroke owns the pointer; the external
    /// orbit control must stay off until release so camera and edit
    /// gestures never fight over the same pointer.
    pub fn camera_enabled(&self) -> bool {
        !matches!(self.gesture, Gesture::Dragging { .. } | Gesture::Stroke { .. })
    }

    /// Switch editing mode. Entering anything other than `Select` clears
    /// the selection. Unregistered add-kinds fall back to `Select`.
    pub fn set_mode(&mut self, mode: EditorMode) {
        self.gesture = Gesture::Idle;
        if let EditorMode::Add(kind) = &mode {
            if schema::schema_for(kind).is_none() {
                warn!(kind = %kind, "unknown object kind for add mode");
                self.mode = EditorMode::Select;
                return;
            }
        }
        if mode != EditorMode::Select {
            self.selection = None;
        }
        self.mode = mode;
    }

    /// Resize the grid and drop objects that now fall outside the world
    /// bounds. Returns the (clamped) new dimensions and leaves the editor
    /// in `Select` mode.
    pub fn resize(&mut self, width: usize, depth: usize) -> (usize, usize) {
        let (width, depth) = self.grid.resize(width, depth);
        let half_x = coords::half_extent(width);
        let half_z = coords::half_extent(depth);
        let dropped = self
            .objects
            .retain_within_bounds(-half_x, half_x, -half_z, half_z);
        if let Some(id) = self.selection {
            if self.objects.get(id).is_none() {
                self.selection = None;
            }
        }
        self.gesture = Gesture::Idle;
        self.mode = EditorMode::Select;
        info!(width, depth, dropped, "resized terrain grid");
        (width, depth)
    }

    /// Place an object of `kind` at a world position with the current
    /// placement yaw.
    pub fn add_object(&mut self, kind: &str, world_x: f32, world_z: f32) -> Option<u64> {
        let mut partial = NewObject::at(kind, world_x, world_z);
        if self.placement_yaw != 0.0 {
            partial.rotation_y = Some(self.placement_yaw);
        }
        self.objects.add(partial)
    }

    pub fn remove_object(&mut self, id: u64) {
        self.objects.remove(id);
        if self.selection == Some(id) {
            self.selection = None;
        }
    }

    pub fn update_object_property(&mut self, id: u64, name: &str, raw: &str) {
        self.objects.update_property(id, name, raw);
    }

    /// Turn the yaw applied to the next placement; wraps into `[0, 360)`.
    pub fn rotate_placement(&mut self, delta_deg: f32) {
        self.placement_yaw = (self.placement_yaw + delta_deg).rem_euclid(360.0);
    }

    pub fn rotate_selected(&mut self, delta_deg: f32) {
        if let Some(id) = self.selection {
            self.objects.rotate(id, delta_deg);
        }
    }

    pub fn pointer_down(&mut self, ev: &PointerEvent) {
        if ev.button != PointerButton::Primary {
            return;
        }
        match self.mode.clone() {
            EditorMode::Select => {
                if let Some(id) = self.pick_object(&ev.ray) {
                    let plane_height = self.object_plane_height(id);
                    self.selection = Some(id);
                    self.gesture = Gesture::PendingDrag {
                        id,
                        start: ev.screen,
                        plane_height,
                    };
                } else {
                    // A press on empty ground deselects.
                    self.selection = None;
                }
            }
            EditorMode::Terrain => {
                // Stroke direction is fixed here for the whole stroke.
                let lowering = ev.shift;
                self.gesture = Gesture::Stroke { lowering };
                self.stamp(ev, lowering);
            }
            EditorMode::Add(kind) => {
                let Some(hit) = ev.ray.intersect_height_plane(0.0) else {
                    return;
                };
                if !self.on_grid(hit.x, hit.z) {
                    return;
                }
                if let Some(id) = self.add_object(&kind, hit.x, hit.z) {
                    self.selection = Some(id);
                }
                self.mode = EditorMode::Select;
            }
        }
    }

    pub fn pointer_move(&mut self, ev: &PointerEvent) {
        match self.gesture {
            Gesture::PendingDrag {
                id,
                start,
                plane_height,
            } => {
                if (ev.screen - start).length() >= DRAG_THRESHOLD_PX {
                    self.gesture = Gesture::Dragging { id, plane_height };
                    self.drag_to(id, plane_height, ev);
                }
            }
            Gesture::Dragging { id, plane_height } => self.drag_to(id, plane_height, ev),
            Gesture::Stroke { lowering } => self.stamp(ev, lowering),
            Gesture::Idle => {}
        }
    }

    /// Release ends the gesture. A pending drag that never promoted is a
    /// pure selection click; the object keeps its position.
    pub fn pointer_up(&mut self, _ev: &PointerEvent) {
        self.gesture = Gesture::Idle;
    }

    /// The pointer leaving the viewport ends any stroke or drag; edits
    /// already applied stay.
    pub fn pointer_leave(&mut self) {
        self.gesture = Gesture::Idle;
    }

    pub fn to_document(&self) -> PlanDocument {
        plan::save(&self.grid, &self.objects)
    }

    /// Replace the whole model from a parsed document. On any error the
    /// prior grid and objects are untouched. Returns the new dimensions so
    /// size-dependent UI can resynchronize.
    pub fn load_document(&mut self, doc: PlanDocument) -> Result<(usize, usize), PlanFormatError> {
        let loaded = plan::apply(doc)?;
        self.grid = loaded.grid;
        self.objects = loaded.objects;
        self.selection = None;
        self.gesture = Gesture::Idle;
        self.mode = EditorMode::Select;
        Ok((loaded.width, loaded.depth))
    }

    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), io::PlanIoError> {
        io::write_plan_file(path, &self.to_document())
    }

    pub fn load_from_file(
        &mut self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(usize, usize), PlanLoadError> {
        let doc = io::read_plan_file(path)?;
        Ok(self.load_document(doc)?)
    }

    /// Human-readable configuration warnings for a status panel.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.brush.radius_cells < 0.0 {
            issues.push("Brush radius must not be negative.".to_string());
        }
        if self.brush.strength <= 0.0 {
            issues.push("Brush strength should be greater than zero.".to_string());
        }
        if self.objects.is_empty() {
            issues.push("No objects placed yet.".to_string());
        }
        issues
    }

    fn on_grid(&self, world_x: f32, world_z: f32) -> bool {
        let half_x = coords::half_extent(self.grid.width());
        let half_z = coords::half_extent(self.grid.depth());
        world_x >= -half_x && world_x < half_x && world_z >= -half_z && world_z < half_z
    }

    fn pick_object(&self, ray: &Ray) -> Option<u64> {
        let mut best: Option<(u64, f32)> = None;
        for obj in self.objects.iter() {
            let anchor = Vec3::new(
                obj.world_x,
                self.grid.ground_height(obj.world_x, obj.world_z),
                obj.world_z,
            );
            let dist = ray.distance_to_point(anchor);
            if dist <= PICK_RADIUS && best.is_none_or(|(_, d)| dist < d) {
                best = Some((obj.id, dist));
            }
        }
        best.map(|(id, _)| id)
    }

    /// The drag plane stays at the object's initial ground height so the
    /// object does not climb hills mid-drag; its resting height re-derives
    /// from the terrain wherever it lands.
    fn object_plane_height(&self, id: u64) -> f32 {
        self.objects
            .get(id)
            .map(|obj| self.grid.ground_height(obj.world_x, obj.world_z))
            .unwrap_or(0.0)
    }

    fn drag_to(&mut self, id: u64, plane_height: f32, ev: &PointerEvent) {
        if let Some(hit) = ev.ray.intersect_height_plane(plane_height) {
            self.objects.update_position(id, hit.x, hit.z);
        }
    }

    fn stamp(&mut self, ev: &PointerEvent, lowering: bool) {
        let Some(hit) = ev.ray.intersect_height_plane(0.0) else {
            return;
        };
        let cx = coords::world_to_cell(hit.x, self.grid.width());
        let cz = coords::world_to_cell(hit.z, self.grid.depth());
        match self.brush.tool {
            TerrainTool::Sculpt => {
                let delta = if lowering {
                    -self.brush.strength
                } else {
                    self.brush.strength
                };
                self.grid.apply_brush(cx, cz, self.brush.radius_cells, delta);
            }
            TerrainTool::Smooth => {
                self.grid
                    .smooth(cx, cz, self.brush.radius_cells, self.brush.strength);
            }
        }
    }
}

impl Default for GardenEditor {
    fn default() -> Self {
        Self::new(20, 20)
    }
}
