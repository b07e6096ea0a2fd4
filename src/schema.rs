use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::color::{CellColor, MID_GREY};

/// Static editable-property registry for every placeable object kind.
///
/// The registry is the single source of truth for (a) property panels in a
/// front-end, (b) default-filling when an object is added or loaded with
/// missing keys, and (c) value clamping when a property is edited. Object
/// records themselves only carry an open parameter bag; nothing here is
/// persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f32),
    Text(String),
}

impl ParamValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            ParamValue::Number(value) => Some(*value),
            ParamValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Number(_) => None,
            ParamValue::Text(value) => Some(value.as_str()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyKind {
    /// Numeric slider/drag value, clamped to `[min, max]`.
    Number { min: f32, max: f32, step: f32 },
    /// Free RGB color, stored as a `#rrggbb` string.
    Color,
    /// One of a fixed set of options.
    Select { options: &'static [&'static str] },
}

#[derive(Clone, Debug)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: PropertyKind,
    /// Declared default. A schema entry may omit this; `fallback` then
    /// derives a generic one from the property kind.
    pub default: Option<ParamValue>,
}

impl PropertyDescriptor {
    /// The value used when an object record is missing this property:
    /// the declared default, else mid-grey for colors, the range minimum
    /// for numbers, and the first option for selects.
    pub fn fallback(&self) -> ParamValue {
        if let Some(value) = &self.default {
            return value.clone();
        }
        match self.kind {
            PropertyKind::Number { min, .. } => ParamValue::Number(min),
            PropertyKind::Color => ParamValue::Text(MID_GREY.to_string()),
            PropertyKind::Select { options } => {
                ParamValue::Text(options.first().copied().unwrap_or_default().to_string())
            }
        }
    }

    /// Interpret a raw edit from a front-end input field.
    ///
    /// Numbers are parsed and clamped to `[min, max]`, substituting the
    /// default on parse failure. Select values must be one of the declared
    /// options. Colors must parse as `#rrggbb`.
    pub fn sanitize(&self, raw: &str) -> ParamValue {
        match self.kind {
            PropertyKind::Number { min, max, .. } => match raw.trim().parse::<f32>() {
                Ok(value) if value.is_finite() => ParamValue::Number(value.clamp(min, max)),
                _ => self.fallback(),
            },
            PropertyKind::Color => match CellColor::parse(raw.trim()) {
                Some(color) => ParamValue::Text(color.to_string()),
                None => self.fallback(),
            },
            PropertyKind::Select { options } => {
                let trimmed = raw.trim();
                if options.contains(&trimmed) {
                    ParamValue::Text(trimmed.to_string())
                } else {
                    self.fallback()
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct ObjectSchema {
    pub kind: &'static str,
    pub label: &'static str,
    pub properties: Vec<PropertyDescriptor>,
}

impl ObjectSchema {
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|prop| prop.name == name)
    }
}

/// Fill every schema property missing from `params` with its fallback.
pub fn complete(schema: &ObjectSchema, params: &mut BTreeMap<String, ParamValue>) {
    for prop in &schema.properties {
        params
            .entry(prop.name.to_string())
            .or_insert_with(|| prop.fallback());
    }
}

pub fn registry() -> &'static [ObjectSchema] {
    static REGISTRY: OnceLock<Vec<ObjectSchema>> = OnceLock::new();
    REGISTRY.get_or_init(build_registry)
}

pub fn schema_for(kind: &str) -> Option<&'static ObjectSchema> {
    registry().iter().find(|schema| schema.kind == kind)
}

/// Kind tags in display order, for mode pickers and the add toolbar.
pub fn kinds() -> impl Iterator<Item = &'static str> {
    registry().iter().map(|schema| schema.kind)
}

fn number(
    name: &'static str,
    label: &'static str,
    min: f32,
    max: f32,
    step: f32,
    default: f32,
) -> PropertyDescriptor {
    PropertyDescriptor {
        name,
        label,
        kind: PropertyKind::Number { min, max, step },
        default: Some(ParamValue::Number(default)),
    }
}

fn color(name: &'static str, label: &'static str, default: &'static str) -> PropertyDescriptor {
    PropertyDescriptor {
        name,
        label,
        kind: PropertyKind::Color,
        default: Some(ParamValue::Text(default.to_string())),
    }
}

fn select(
    name: &'static str,
    label: &'static str,
    options: &'static [&'static str],
    default: &'static str,
) -> PropertyDescriptor {
    PropertyDescriptor {
        name,
        label,
        kind: PropertyKind::Select { options },
        default: Some(ParamValue::Text(default.to_string())),
    }
}

fn build_registry() -> Vec<ObjectSchema> {
    vec![
        ObjectSchema {
            kind: "tree",
            label: "Tree",
            properties: vec![
                number("height", "Height", 1.0, 8.0, 0.25, 3.0),
                number("crownRadius", "Crown radius", 0.5, 3.0, 0.1, 1.2),
                color("trunkColor", "Trunk color", "#8b5a2b"),
                color("leafColor", "Leaf color", "#3f7d2c"),
                select("shape", "Shape", &["round", "conical", "spreading"], "round"),
            ],
        },
        ObjectSchema {
            kind: "shrub",
            label: "Shrub",
            properties: vec![
                number("height", "Height", 0.3, 2.0, 0.1, 0.8),
                number("radius", "Radius", 0.3, 1.5, 0.1, 0.6),
                color("leafColor", "Leaf color", "#4c8a3a"),
            ],
        },
        ObjectSchema {
            kind: "grass",
            label: "Grass patch",
            properties: vec![
                number("patchRadius", "Patch radius", 0.5, 3.0, 0.1, 1.0),
                number("bladeHeight", "Blade height", 0.1, 0.6, 0.05, 0.25),
                number("density", "Density", 0.2, 1.0, 0.05, 0.7),
                color("color", "Color", "#5aa03c"),
            ],
        },
        ObjectSchema {
            kind: "flowers",
            label: "Flower bed",
            properties: vec![
                number("patchRadius", "Patch radius", 0.3, 2.0, 0.1, 0.8),
                number("stemHeight", "Stem height", 0.1, 0.8, 0.05, 0.3),
                color("bloomColor", "Bloom color", "#d05a8c"),
            ],
        },
        ObjectSchema {
            kind: "stone",
            label: "Stone",
            properties: vec![
                number("size", "Size", 0.2, 2.5, 0.1, 0.8),
                color("color", "Color", "#9a9a93"),
            ],
        },
        ObjectSchema {
            kind: "hedge",
            label: "Hedge",
            properties: vec![
                number("length", "Length", 0.5, 6.0, 0.25, 2.0),
                number("height", "Height", 0.4, 2.5, 0.1, 1.0),
                color("leafColor", "Leaf color", "#35702a"),
            ],
        },
        ObjectSchema {
            kind: "pond",
            label: "Pond",
            properties: vec![
                number("radius", "Radius", 0.5, 4.0, 0.25, 1.5),
                number("depth", "Depth", 0.1, 1.5, 0.05, 0.4),
                color("waterColor", "Water color", "#3f6fa8"),
            ],
        },
        ObjectSchema {
            kind: "house",
            label: "House",
            properties: vec![
                number("width", "Width", 2.0, 8.0, 0.5, 4.0),
                number("depth", "Depth", 2.0, 8.0, 0.5, 3.0),
                color("wallColor", "Wall color", "#d9c7a0"),
                color("roofColor", "Roof color", "#7a3b2e"),
                select("roofStyle", "Roof style", &["gable", "hip", "flat"], "gable"),
            ],
        },
        ObjectSchema {
            kind: "fence",
            label: "Fence",
            properties: vec![
                number("length", "Length", 1.0, 10.0, 0.5, 3.0),
                number("height", "Height", 0.5, 2.0, 0.1, 1.0),
                color("color", "Color", "#7b6248"),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_resolves() {
        for kind in kinds() {
            let schema = schema_for(kind).expect("registered kind resolves");
            assert_eq!(schema.kind, kind);
            assert!(!schema.properties.is_empty());
        }
        assert!(schema_for("gazebo").is_none());
    }

    #[test]
    fn declared_defaults_win_over_generic_fallbacks() {
        let tree = schema_for("tree").unwrap();
        let height = tree.property("height").unwrap();
        assert_eq!(height.fallback(), ParamValue::Number(3.0));

        let undeclared = PropertyDescriptor {
            name: "tint",
            label: "Tint",
            kind: PropertyKind::Color,
            default: None,
        };
        assert_eq!(
            undeclared.fallback(),
            ParamValue::Text("#808080".to_string())
        );

        let bare_number = PropertyDescriptor {
            name: "count",
            label: "Count",
            kind: PropertyKind::Number {
                min: 2.0,
                max: 9.0,
                step: 1.0,
            },
            default: None,
        };
        assert_eq!(bare_number.fallback(), ParamValue::Number(2.0));
    }

    #[test]
    fn sanitize_clamps_and_substitutes() {
        let tree = schema_for("tree").unwrap();
        let height = tree.property("height").unwrap();
        assert_eq!(height.sanitize("5.5"), ParamValue::Number(5.5));
        assert_eq!(height.sanitize("250"), ParamValue::Number(8.0));
        assert_eq!(height.sanitize("-3"), ParamValue::Number(1.0));
        assert_eq!(height.sanitize("tall"), ParamValue::Number(3.0));

        let shape = tree.property("shape").unwrap();
        assert_eq!(
            shape.sanitize("conical"),
            ParamValue::Text("conical".to_string())
        );
        assert_eq!(
            shape.sanitize("cubist"),
            ParamValue::Text("round".to_string())
        );

        let leaf = tree.property("leafColor").unwrap();
        assert_eq!(
            leaf.sanitize("#A0B0C0"),
            ParamValue::Text("#a0b0c0".to_string())
        );
        assert_eq!(
            leaf.sanitize("chartreuse"),
            ParamValue::Text("#3f7d2c".to_string())
        );
    }

    #[test]
    fn complete_fills_only_missing_keys() {
        let tree = schema_for("tree").unwrap();
        let mut params = BTreeMap::new();
        params.insert("height".to_string(), ParamValue::Number(6.0));
        complete(tree, &mut params);

        assert_eq!(params.len(), tree.properties.len());
        assert_eq!(params.get("height"), Some(&ParamValue::Number(6.0)));
        assert_eq!(
            params.get("leafColor"),
            Some(&ParamValue::Text("#3f7d2c".to_string()))
        );
    }
}
