use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::CellColor;
use crate::coords;
use crate::grid::{MAX_DIM, MIN_DIM, TerrainGrid};
use crate::objects::{ObjectSet, PlacedObject};
use crate::schema;
use crate::schema::ParamValue;

pub mod io;

/// Version written by `save`. Documents below [`WORLD_COORDS_VERSION`]
/// position objects by integer grid cell instead of world coordinates and
/// are upgraded on load.
pub const PLAN_VERSION: u32 = 4;
pub const WORLD_COORDS_VERSION: u32 = 4;

/// The persisted plan. Field names are wire format and must not change:
/// `version`, `heightData[z][x]`, `colorData[z][x]`, `objects`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub version: u32,
    #[serde(rename = "heightData")]
    pub height_data: Vec<Vec<f32>>,
    #[serde(rename = "colorData")]
    pub color_data: Vec<Vec<CellColor>>,
    pub objects: Vec<PlanObjectRecord>,
}

/// One object as persisted. Positions are `worldX`/`worldZ` since
/// [`WORLD_COORDS_VERSION`]; legacy records carry `gridX`/`gridZ`, which
/// never survive a round-trip. Type-specific properties sit inline next to
/// the fixed fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanObjectRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "worldX", default, skip_serializing_if = "Option::is_none")]
    pub world_x: Option<f32>,
    #[serde(rename = "worldZ", default, skip_serializing_if = "Option::is_none")]
    pub world_z: Option<f32>,
    #[serde(rename = "rotationY", default, skip_serializing_if = "Option::is_none")]
    pub rotation_y: Option<f32>,
    #[serde(rename = "gridX", default, skip_serializing_if = "Option::is_none")]
    pub grid_x: Option<i32>,
    #[serde(rename = "gridZ", default, skip_serializing_if = "Option::is_none")]
    pub grid_z: Option<i32>,
    #[serde(flatten)]
    pub params: BTreeMap<String, ParamValue>,
}

/// Result of a successful load; the caller swaps its stores wholesale and
/// resynchronizes size-dependent UI from the returned dimensions.
#[derive(Clone, Debug)]
pub struct LoadedPlan {
    pub grid: TerrainGrid,
    pub objects: ObjectSet,
    pub width: usize,
    pub depth: usize,
}

#[derive(Debug)]
pub enum PlanFormatError {
    /// A `heightData` or `colorData` row has the wrong length.
    RaggedRow {
        field: &'static str,
        row: usize,
        len: usize,
        expected: usize,
    },
    /// `heightData` and `colorData` disagree on row count.
    RowCountMismatch { heights: usize, colors: usize },
    DimensionsOutOfRange { width: usize, depth: usize },
}

impl fmt::Display for PlanFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanFormatError::RaggedRow {
                field,
                row,
                len,
                expected,
            } => {
                write!(
                    f,
                    "{field} row {row} holds {len} cells, expected {expected}"
                )
            }
            PlanFormatError::RowCountMismatch { heights, colors } => {
                write!(
                    f,
                    "heightData has {heights} rows but colorData has {colors}"
                )
            }
            PlanFormatError::DimensionsOutOfRange { width, depth } => {
                write!(
                    f,
                    "grid of {width}x{depth} cells is outside {MIN_DIM}..{MAX_DIM}"
                )
            }
        }
    }
}

impl std::error::Error for PlanFormatError {}

/// A file load failure: either the file could not be read/parsed or the
/// parsed document failed validation. Both leave the caller's model intact.
#[derive(Debug)]
pub enum PlanLoadError {
    Io(io::PlanIoError),
    Format(PlanFormatError),
}

impl fmt::Display for PlanLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanLoadError::Io(err) => write!(f, "{err}"),
            PlanLoadError::Format(err) => write!(f, "invalid plan document: {err}"),
        }
    }
}

impl std::error::Error for PlanLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlanLoadError::Io(err) => Some(err),
            PlanLoadError::Format(err) => Some(err),
        }
    }
}

impl From<io::PlanIoError> for PlanLoadError {
    fn from(value: io::PlanIoError) -> Self {
        PlanLoadError::Io(value)
    }
}

impl From<PlanFormatError> for PlanLoadError {
    fn from(value: PlanFormatError) -> Self {
        PlanLoadError::Format(value)
    }
}

/// Snapshot the whole model into a current-version document. The full
/// parameter bag is written per object, so a reader can reconstruct
/// geometry without consulting the schema registry.
pub fn save(grid: &TerrainGrid, objects: &ObjectSet) -> PlanDocument {
    PlanDocument {
        version: PLAN_VERSION,
        height_data: grid.height_rows().iter().map(|row| row.to_vec()).collect(),
        color_data: grid.color_rows().iter().map(|row| row.to_vec()).collect(),
        objects: objects.records().iter().map(record_from_object).collect(),
    }
}

fn record_from_object(obj: &PlacedObject) -> PlanObjectRecord {
    PlanObjectRecord {
        id: Some(obj.id),
        kind: obj.kind.clone(),
        world_x: Some(obj.world_x),
        world_z: Some(obj.world_z),
        rotation_y: obj.rotation_y,
        grid_x: None,
        grid_z: None,
        params: obj.params.clone(),
    }
}

/// Validate and materialize a document into fresh stores.
///
/// Dimension problems fail the whole load with the prior model untouched;
/// individually broken object records (unknown type, no usable position)
/// are dropped with a warning and the load proceeds.
pub fn apply(doc: PlanDocument) -> Result<LoadedPlan, PlanFormatError> {
    let depth = doc.height_data.len();
    let width = doc.height_data.first().map(Vec::len).unwrap_or(0);

    for (row, cells) in doc.height_data.iter().enumerate() {
        if cells.len() != width {
            return Err(PlanFormatError::RaggedRow {
                field: "heightData",
                row,
                len: cells.len(),
                expected: width,
            });
        }
    }
    if doc.color_data.len() != depth {
        return Err(PlanFormatError::RowCountMismatch {
            heights: depth,
            colors: doc.color_data.len(),
        });
    }
    for (row, cells) in doc.color_data.iter().enumerate() {
        if cells.len() != width {
            return Err(PlanFormatError::RaggedRow {
                field: "colorData",
                row,
                len: cells.len(),
                expected: width,
            });
        }
    }
    if !(MIN_DIM..=MAX_DIM).contains(&width) || !(MIN_DIM..=MAX_DIM).contains(&depth) {
        return Err(PlanFormatError::DimensionsOutOfRange { width, depth });
    }

    let grid = TerrainGrid::from_rows(doc.height_data, doc.color_data);

    let mut records = Vec::with_capacity(doc.objects.len());
    let mut max_id = doc
        .objects
        .iter()
        .filter_map(|record| record.id)
        .max()
        .unwrap_or(0);
    for record in doc.objects {
        let Some(schema) = schema::schema_for(&record.kind) else {
            warn!(kind = %record.kind, "skipping object of unknown type");
            continue;
        };
        let Some((world_x, world_z)) = resolve_position(&record, doc.version, &grid) else {
            warn!(kind = %record.kind, "skipping object without a usable position");
            continue;
        };

        let id = record.id.unwrap_or_else(|| {
            max_id += 1;
            max_id
        });
        let mut params = record.params;
        schema::complete(schema, &mut params);
        records.push(PlacedObject {
            id,
            kind: record.kind,
            world_x,
            world_z,
            rotation_y: record.rotation_y,
            params,
        });
    }

    Ok(LoadedPlan {
        width: grid.width(),
        depth: grid.depth(),
        objects: ObjectSet::from_records(records),
        grid,
    })
}

/// One-way coordinate upgrade: legacy documents place objects by grid cell;
/// the cell center under the loaded grid becomes the world position. Never
/// re-applied on save, since the legacy fields are dropped here.
fn resolve_position(
    record: &PlanObjectRecord,
    version: u32,
    grid: &TerrainGrid,
) -> Option<(f32, f32)> {
    if let (Some(world_x), Some(world_z)) = (record.world_x, record.world_z) {
        return Some((world_x, world_z));
    }
    if version < WORLD_COORDS_VERSION {
        if let (Some(grid_x), Some(grid_z)) = (record.grid_x, record.grid_z) {
            return Some((
                coords::cell_to_world(grid_x, grid.width()),
                coords::cell_to_world(grid_z, grid.depth()),
            ));
        }
    }
    None
}
