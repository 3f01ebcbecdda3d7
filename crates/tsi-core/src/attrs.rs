//! # Attribute Taxonomy
//!
//! Recognized attribute keys and the value class each one expects. The
//! attribute set is open: unrecognized keys are carried through verbatim
//! and left unconstrained in generated schemas.

use crate::definition::AttrValue;

/// A recognized per-variable attribute key.
///
/// `parse` maps raw key strings onto this enum; everything unknown lands
/// in [`AttrKey::Other`] and is treated as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKey {
    /// Units of measurement (string).
    Units,
    /// Descriptive name (string).
    LongName,
    /// Conventions standard name (string).
    StandardName,
    /// Minimum valid value (numeric).
    ValidMin,
    /// Maximum valid value (numeric).
    ValidMax,
    /// Two-element numeric range.
    ValidRange,
    /// Value used for missing data (numeric).
    FillValue,
    /// Geometry container class (`polygon` | `line` | `point`).
    GeometryType,
    /// Ordered pair of coordinate variable names (string).
    NodeCoordinates,
    /// Topology variable name (string).
    NodeCount,
    /// Reference from a data variable to a geometry container (string).
    Geometry,
    /// Anything else; passes through unconstrained.
    Other,
}

impl AttrKey {
    /// Classify a raw attribute key.
    pub fn parse(key: &str) -> Self {
        match key {
            "units" => Self::Units,
            "long_name" => Self::LongName,
            "standard_name" => Self::StandardName,
            "valid_min" => Self::ValidMin,
            "valid_max" => Self::ValidMax,
            "valid_range" => Self::ValidRange,
            "_FillValue" => Self::FillValue,
            "geometry_type" => Self::GeometryType,
            "node_coordinates" => Self::NodeCoordinates,
            "node_count" => Self::NodeCount,
            "geometry" => Self::Geometry,
            _ => Self::Other,
        }
    }

    /// Canonical key spelling. [`AttrKey::Other`] has no single spelling
    /// and returns the empty string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Units => "units",
            Self::LongName => "long_name",
            Self::StandardName => "standard_name",
            Self::ValidMin => "valid_min",
            Self::ValidMax => "valid_max",
            Self::ValidRange => "valid_range",
            Self::FillValue => "_FillValue",
            Self::GeometryType => "geometry_type",
            Self::NodeCoordinates => "node_coordinates",
            Self::NodeCount => "node_count",
            Self::Geometry => "geometry",
            Self::Other => "",
        }
    }

    /// Check a value against the class this key expects. Returns `false`
    /// when the value's type conflicts with the key's meaning; callers
    /// degrade such attributes to opaque passthrough rather than failing.
    /// [`AttrKey::Other`] accepts anything.
    pub fn accepts(&self, value: &AttrValue) -> bool {
        match self {
            Self::Units
            | Self::LongName
            | Self::StandardName
            | Self::NodeCoordinates
            | Self::NodeCount
            | Self::Geometry => matches!(value, AttrValue::Text(_)),
            Self::ValidMin | Self::ValidMax | Self::FillValue => value.is_numeric(),
            Self::ValidRange => value.is_numeric_list(2),
            Self::GeometryType => value
                .as_str()
                .is_some_and(|s| crate::definition::GeometryType::from_attr(s).is_some()),
            Self::Other => true,
        }
    }
}
