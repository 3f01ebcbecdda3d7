//! # Definition-File Model
//!
//! The in-memory representation of one parsed definition file: global
//! attributes, dimensions, and variables, in declaration order. A
//! [`DefinitionFile`] is constructed once by the parser and never mutated
//! afterwards; translation is a pure function over it.

use serde::{Deserialize, Serialize};

use crate::attrs::AttrKey;

/// Regex source for a single identifier token, as emitted into generated
/// schema `pattern` constraints.
pub const IDENTIFIER_PATTERN: &str = "^[a-zA-Z_][a-zA-Z0-9_]*$";

/// Returns true if `s` is a valid identifier: a letter or underscore
/// followed by letters, digits, or underscores.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Declared size of a dimension.
///
/// The size kind is an explicit per-dimension property of the source text.
/// It is never inferred, and the two kinds are never coerced into one
/// another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimensionSize {
    /// A fixed positive element count.
    Fixed(u64),
    /// Variable-length axis (`UNLIMITED`, or the `_` template placeholder).
    Unlimited,
}

/// A named axis referenced by variable shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    /// Dimension name, unique within the file.
    pub name: String,
    /// Declared size.
    pub size: DimensionSize,
}

/// Value class of a variable, mapped from the source type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarType {
    /// `char` / `string`.
    Text,
    /// `byte` / `short` / `int` / `long` / `int64` / `uint` / `uint64`.
    Integer,
    /// `float` / `double` / `real`.
    Float,
}

impl VarType {
    /// Map a source type keyword to a value class. Returns `None` for
    /// unknown keywords; the parser reports those as errors.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "char" | "string" => Some(Self::Text),
            "byte" | "ubyte" | "short" | "ushort" | "int" | "uint" | "long" | "int64"
            | "uint64" => Some(Self::Integer),
            "float" | "double" | "real" => Some(Self::Float),
            _ => None,
        }
    }

    /// The JSON Schema type name for numeric attribute slots of a variable
    /// of this class. Integer variables constrain their numeric attributes
    /// as `integer`; everything else uses `number`.
    pub fn json_number_type(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            _ => "number",
        }
    }
}

/// A single attribute value literal.
///
/// Recognized keys are interpreted by the translator; anything else is
/// carried verbatim and round-tripped as an opaque value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// Quoted string literal.
    Text(String),
    /// Integer literal.
    Int(i64),
    /// Floating-point literal.
    Float(f64),
    /// Comma-separated literal list (e.g. `valid_range = 0.0, 1.0`).
    List(Vec<AttrValue>),
}

impl AttrValue {
    /// The string payload, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric payload widened to `f64`, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// True for `Int` and `Float` values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// True if this is a list of exactly `n` numeric values.
    pub fn is_numeric_list(&self, n: usize) -> bool {
        match self {
            Self::List(items) => items.len() == n && items.iter().all(AttrValue::is_numeric),
            _ => false,
        }
    }
}

/// Geometry class of a container variable.
///
/// The per-type node minimum is the one piece of physics-format knowledge
/// baked into translation. It is keyed here, on the container's declared
/// type, not on dimension or variable naming conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryType {
    /// Closed outline; at least 3 nodes.
    Polygon,
    /// Open polyline; at least 2 nodes.
    Line,
    /// Isolated points.
    Point,
}

impl GeometryType {
    /// Parse the `geometry_type` attribute value.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "polygon" => Some(Self::Polygon),
            "line" => Some(Self::Line),
            "point" => Some(Self::Point),
            _ => None,
        }
    }

    /// Canonical attribute spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Polygon => "polygon",
            Self::Line => "line",
            Self::Point => "point",
        }
    }

    /// Lower bound for the node dimensions of a container of this type.
    pub fn min_nodes(&self) -> u64 {
        match self {
            Self::Polygon => 3,
            Self::Line => 2,
            Self::Point => 1,
        }
    }
}

impl std::fmt::Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named field of a definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name, unique within the file.
    pub name: String,
    /// Value class from the declaration keyword.
    pub var_type: VarType,
    /// Ordered dimension-name references; empty for scalars.
    pub shape: Vec<String>,
    /// Attributes in declaration order.
    pub attributes: Vec<(String, AttrValue)>,
}

impl Variable {
    /// Look up an attribute by key.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Number of axes (0 for scalars).
    pub fn arity(&self) -> usize {
        self.shape.len()
    }

    /// The container geometry type, when this variable declares a valid
    /// `geometry_type` attribute. Variables with a malformed value are not
    /// treated as containers; the translator reports those separately.
    pub fn geometry_type(&self) -> Option<GeometryType> {
        self.attr(AttrKey::GeometryType.as_str())
            .and_then(AttrValue::as_str)
            .and_then(GeometryType::from_attr)
    }

    /// True if this variable is a geometry container.
    pub fn is_geometry_container(&self) -> bool {
        self.geometry_type().is_some()
    }
}

/// An ordered collection of declarations for one logical data structure.
///
/// Parsed fresh from its source on each run; no caching, no mutation after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionFile {
    /// Structure name from the file header.
    pub name: String,
    /// Global attributes in declaration order.
    pub global_attributes: Vec<(String, AttrValue)>,
    /// Dimensions in declaration order.
    pub dimensions: Vec<Dimension>,
    /// Variables in declaration order.
    pub variables: Vec<Variable>,
}

impl DefinitionFile {
    /// Look up a dimension by name.
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// Look up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Look up a global attribute by key.
    pub fn global_attribute(&self, key: &str) -> Option<&AttrValue> {
        self.global_attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterate over the geometry containers in declaration order.
    pub fn geometry_containers(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|v| v.is_geometry_container())
    }
}
