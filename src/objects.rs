use std::collections::BTreeMap;

use crate::schema::{self, ParamValue};

/// One placed landscape object. `world_y` does not exist on purpose: the
/// vertical position is derived from the terrain under `(world_x, world_z)`
/// whenever a renderer or query needs it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedObject {
    pub id: u64,
    pub kind: String,
    pub world_x: f32,
    pub world_z: f32,
    /// Rotation around the vertical axis, degrees.
    pub rotation_y: Option<f32>,
    /// Type-specific properties. After creation or load every key of the
    /// kind's schema is present.
    pub params: BTreeMap<String, ParamValue>,
}

impl PlacedObject {
    pub fn yaw_degrees(&self) -> f32 {
        self.rotation_y.unwrap_or(0.0)
    }
}

/// A partial record handed to [`ObjectSet::add`]; whatever it omits is
/// filled from the schema registry.
#[derive(Clone, Debug, Default)]
pub struct NewObject {
    pub kind: String,
    pub world_x: f32,
    pub world_z: f32,
    pub rotation_y: Option<f32>,
    pub params: BTreeMap<String, ParamValue>,
}

impl NewObject {
    pub fn at(kind: impl Into<String>, world_x: f32, world_z: f32) -> Self {
        Self {
            kind: kind.into(),
            world_x,
            world_z,
            ..Self::default()
        }
    }
}

/// Ordered collection of placed objects. Insertion order carries no meaning
/// beyond draw order; ids are unique for the process lifetime and re-seeded
/// past the maximum after a load.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectSet {
    objects: Vec<PlacedObject>,
    next_id: u64,
}

impl Default for ObjectSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectSet {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild from loaded records, keeping their ids, and seed the id
    /// counter past the largest one.
    pub(crate) fn from_records(objects: Vec<PlacedObject>) -> Self {
        let next_id = objects.iter().map(|obj| obj.id).max().unwrap_or(0) + 1;
        Self { objects, next_id }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedObject> {
        self.objects.iter()
    }

    pub fn get(&self, id: u64) -> Option<&PlacedObject> {
        self.objects.iter().find(|obj| obj.id == id)
    }

    /// Strictly increasing, never reused within a session.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Schema-complete the partial record and append it. Returns the new
    /// object's id, or `None` when the kind is not registered.
    pub fn add(&mut self, partial: NewObject) -> Option<u64> {
        let schema = schema::schema_for(&partial.kind)?;
        let mut params = partial.params;
        schema::complete(schema, &mut params);
        let id = self.next_id();
        self.objects.push(PlacedObject {
            id,
            kind: partial.kind,
            world_x: partial.world_x,
            world_z: partial.world_z,
            rotation_y: partial.rotation_y,
            params,
        });
        Some(id)
    }

    /// No-op when the id is unknown.
    pub fn remove(&mut self, id: u64) {
        self.objects.retain(|obj| obj.id != id);
    }

    /// Replace the position fields only; used by the drag interaction.
    pub fn update_position(&mut self, id: u64, world_x: f32, world_z: f32) {
        if let Some(obj) = self.objects.iter_mut().find(|obj| obj.id == id) {
            obj.world_x = world_x;
            obj.world_z = world_z;
        }
    }

    /// Write a property through its schema descriptor: numbers parse and
    /// clamp (schema default on garbage), selects validate against their
    /// options, colors normalize to `#rrggbb`. Unknown id or property name
    /// is a silent no-op.
    pub fn update_property(&mut self, id: u64, name: &str, raw: &str) {
        let Some(obj) = self.objects.iter_mut().find(|obj| obj.id == id) else {
            return;
        };
        let Some(descriptor) = schema::schema_for(&obj.kind).and_then(|s| s.property(name)) else {
            return;
        };
        obj.params
            .insert(descriptor.name.to_string(), descriptor.sanitize(raw));
    }

    /// Turn the object by `delta_deg`, wrapping into `[0, 360)`.
    pub fn rotate(&mut self, id: u64, delta_deg: f32) {
        if let Some(obj) = self.objects.iter_mut().find(|obj| obj.id == id) {
            let mut yaw = obj.yaw_degrees() + delta_deg;
            yaw = yaw.rem_euclid(360.0);
            obj.rotation_y = Some(yaw);
        }
    }

    /// Objects whose position lies inside the half-open box
    /// `[min_x, max_x) x [min_z, max_z)`.
    pub fn within_bounds(
        &self,
        min_x: f32,
        max_x: f32,
        min_z: f32,
        max_z: f32,
    ) -> impl Iterator<Item = &PlacedObject> {
        self.objects.iter().filter(move |obj| {
            obj.world_x >= min_x && obj.world_x < max_x && obj.world_z >= min_z && obj.world_z < max_z
        })
    }

    /// Drop everything outside the half-open box; returns how many objects
    /// were removed. Used after a grid resize.
    pub fn retain_within_bounds(&mut self, min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> usize {
        let before = self.objects.len();
        self.objects.retain(|obj| {
            obj.world_x >= min_x && obj.world_x < max_x && obj.world_z >= min_z && obj.world_z < max_z
        });
        before - self.objects.len()
    }

    pub(crate) fn records(&self) -> &[PlacedObject] {
        &self.objects
    }
}
