//! Core model of a grid-based garden/terrain planning editor.
//!
//! The crate owns the height/color grid, the placed-object collection, the
//! brush mathematics, world/grid coordinate mapping, the mode/gesture state
//! machine, and the versioned plan file format. Rendering, camera control,
//! and UI chrome live outside: a renderer reads [`GardenEditor::grid`] and
//! [`GardenEditor::objects`] once per frame, and an input layer feeds
//! pointer events (screen position plus camera-supplied picking ray) into
//! the editor.

pub mod brush;
pub mod color;
pub mod coords;
pub mod editor;
pub mod grid;
pub mod objects;
pub mod plan;
pub mod schema;

pub use editor::{EditorMode, GardenEditor, PointerButton, PointerEvent, TerrainTool};
pub use grid::TerrainGrid;
pub use objects::{NewObject, ObjectSet, PlacedObject};
pub use plan::{PLAN_VERSION, PlanDocument, PlanFormatError, PlanLoadError};
pub use schema::{ObjectSchema, ParamValue, PropertyKind};
