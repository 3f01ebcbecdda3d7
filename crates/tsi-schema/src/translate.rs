//! # Definition Translator
//!
//! Maps a validated [`DefinitionFile`] onto a draft-07 JSON Schema value.
//! The mapping is structural and 1:1 (dimensions, variables, and global
//! attributes each become one constraint group) with one piece of domain
//! knowledge baked in: the node dimensions of a geometry container carry
//! the per-geometry-type minimum node count.
//!
//! The translator re-validates geometry-container self-consistency
//! (containers must reference variables declared in the same file) even
//! though the parser has its own validation pass, because container
//! resolution is translation semantics, not grammar.

use std::collections::HashMap;

use serde_json::{json, Map, Value};
use thiserror::Error;

use tsi_core::{
    detect_domain, AttrKey, AttrValue, DefinitionFile, GeometryType, Variable,
    IDENTIFIER_PATTERN,
};

/// Default base URL for generated `$id` URIs.
pub const DEFAULT_BASE_URL: &str = "https://schemas.standard-interfaces.org";

/// Pattern for a `node_coordinates` value when no container pins the
/// coordinate names: exactly two whitespace-separated identifiers.
const TWO_IDENTIFIER_PATTERN: &str =
    "^[a-zA-Z_][a-zA-Z0-9_]*\\s+[a-zA-Z_][a-zA-Z0-9_]*$";

/// Well-known global attribute keys; all carry string values.
const GLOBAL_TEXT_KEYS: &[&str] = &["title", "institution", "source", "conventions", "comment"];

/// Fatal translation errors. Each aborts translation of the current file;
/// batch callers record the failure and continue.
#[derive(Error, Debug)]
pub enum TranslateError {
    /// A geometry container references a variable not declared in the file.
    #[error("geometry container '{container}' references undeclared variable '{target}'")]
    UnresolvedGeometryReference {
        /// The offending container.
        container: String,
        /// The missing variable name.
        target: String,
    },

    /// A geometry container lacks a usable `node_coordinates` or
    /// `node_count` attribute.
    #[error("geometry container '{container}' has no usable '{missing}' attribute")]
    IncompleteGeometryContainer {
        /// The offending container.
        container: String,
        /// The attribute that is missing or malformed.
        missing: &'static str,
    },
}

/// A recognized attribute whose value type conflicts with its key.
///
/// Recoverable: the attribute is demoted to an unconstrained passthrough
/// and translation continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    /// Owning variable, or `None` for a global attribute.
    pub variable: Option<String>,
    /// The recognized attribute key.
    pub key: String,
    /// What the key expects.
    pub expected: &'static str,
    /// What the value actually was.
    pub found: &'static str,
}

impl std::fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.variable {
            Some(var) => write!(
                f,
                "attribute '{}' on '{}' expects {}, got {}; passing through unconstrained",
                self.key, var, self.expected, self.found
            ),
            None => write!(
                f,
                "global attribute '{}' expects {}, got {}; passing through unconstrained",
                self.key, self.expected, self.found
            ),
        }
    }
}

/// Options controlling `$id` construction and output naming.
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Base URL for the schema `$id`.
    pub base_url: String,
    /// Domain override; detected from variable-name prefixes when absent.
    pub domain: Option<String>,
    /// Artifact file name override (`<name>.schema.json`); derived from
    /// the definition name when absent.
    pub file_name: Option<String>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            domain: None,
            file_name: None,
        }
    }
}

/// A generated schema: the constraint tree plus its placement identity.
///
/// The document holds only validation semantics; provenance is attached
/// separately by the writer.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSchema {
    /// Physics domain the schema belongs to (output subdirectory).
    pub domain: String,
    /// Artifact file name (`<name>.schema.json`).
    pub file_name: String,
    /// The draft-07 schema document.
    pub document: Value,
}

/// Result of translating one definition file.
#[derive(Debug, Clone)]
pub struct Translation {
    /// The generated schema.
    pub schema: GeneratedSchema,
    /// Recoverable attribute type mismatches encountered on the way.
    pub warnings: Vec<TypeMismatch>,
}

/// A resolved geometry container.
struct ResolvedContainer {
    name: String,
    geometry: GeometryType,
    coordinates: [String; 2],
    node_count: String,
}

/// Translate a definition file into a generated schema.
///
/// Pure function of its inputs: translating the same definition twice
/// yields structurally identical documents.
///
/// # Errors
///
/// Returns [`TranslateError`] when a geometry container is incomplete or
/// references a variable not declared in the file. Attribute type
/// mismatches do not fail translation; they are returned as warnings.
pub fn translate(
    def: &DefinitionFile,
    opts: &TranslateOptions,
) -> Result<Translation, TranslateError> {
    let mut warnings = Vec::new();

    for (key, value) in &def.global_attributes {
        if GLOBAL_TEXT_KEYS.contains(&key.as_str()) && value.as_str().is_none() {
            push_warning(
                &mut warnings,
                TypeMismatch {
                    variable: None,
                    key: key.clone(),
                    expected: "a string value",
                    found: value_kind(value),
                },
            );
        }
    }

    let containers = resolve_containers(def, &mut warnings)?;

    let domain = opts
        .domain
        .clone()
        .unwrap_or_else(|| detect_domain(def).to_string());
    let file_name = opts
        .file_name
        .clone()
        .unwrap_or_else(|| format!("{}.schema.json", def.name.replace('_', "-")));

    let title = def
        .global_attribute("title")
        .and_then(AttrValue::as_str)
        .unwrap_or("NetCDF Schema")
        .to_string();

    let document = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "$id": format!("{}/{}/{}", opts.base_url, domain, file_name),
        "title": title,
        "description": format!("Schema for {title} - generated from CDL"),
        "type": "object",
        "properties": {
            "dimensions": dimensions_group(def, &containers),
            "variables": variables_group(def, &containers, &mut warnings),
            "global_attributes": global_attributes_group(),
        },
        "required": ["dimensions", "variables"],
        "additionalProperties": true,
    });

    Ok(Translation {
        schema: GeneratedSchema {
            domain,
            file_name,
            document,
        },
        warnings,
    })
}

/// Resolve every geometry container in the file, or fail.
fn resolve_containers(
    def: &DefinitionFile,
    warnings: &mut Vec<TypeMismatch>,
) -> Result<Vec<ResolvedContainer>, TranslateError> {
    let mut containers = Vec::new();

    for variable in &def.variables {
        let Some(value) = variable.attr(AttrKey::GeometryType.as_str()) else {
            continue;
        };

        let Some(geometry) = value.as_str().and_then(GeometryType::from_attr) else {
            // Not a container: the declared geometry type is unusable.
            // Degrade the attribute and keep the variable as plain data.
            push_warning(
                warnings,
                TypeMismatch {
                    variable: Some(variable.name.clone()),
                    key: AttrKey::GeometryType.as_str().to_string(),
                    expected: "one of polygon, line, point",
                    found: value_kind(value),
                },
            );
            continue;
        };

        let coordinates = container_text_attr(variable, AttrKey::NodeCoordinates)?;
        let tokens: Vec<&str> = coordinates.split_whitespace().collect();
        let [first, second] = tokens.as_slice() else {
            return Err(TranslateError::IncompleteGeometryContainer {
                container: variable.name.clone(),
                missing: "node_coordinates",
            });
        };
        for token in [first, second] {
            if def.variable(token).is_none() {
                return Err(TranslateError::UnresolvedGeometryReference {
                    container: variable.name.clone(),
                    target: token.to_string(),
                });
            }
        }

        let node_count = container_text_attr(variable, AttrKey::NodeCount)?;
        if def.variable(&node_count).is_none() {
            return Err(TranslateError::UnresolvedGeometryReference {
                container: variable.name.clone(),
                target: node_count,
            });
        }

        containers.push(ResolvedContainer {
            name: variable.name.clone(),
            geometry,
            coordinates: [first.to_string(), second.to_string()],
            node_count,
        });
    }

    Ok(containers)
}

/// Fetch a required text attribute from a container variable.
fn container_text_attr(
    variable: &Variable,
    key: AttrKey,
) -> Result<String, TranslateError> {
    variable
        .attr(key.as_str())
        .and_then(AttrValue::as_str)
        .map(str::to_string)
        .ok_or(TranslateError::IncompleteGeometryContainer {
            container: variable.name.clone(),
            missing: key.as_str(),
        })
}

/// Build the closed dimensions constraint group.
fn dimensions_group(def: &DefinitionFile, containers: &[ResolvedContainer]) -> Value {
    // Node dimensions inherit the container's geometry minimum; when
    // containers share a dimension the largest minimum wins.
    let mut node_minimums: HashMap<&str, (u64, GeometryType)> = HashMap::new();
    for container in containers {
        for coordinate in &container.coordinates {
            let Some(variable) = def.variable(coordinate) else {
                continue;
            };
            for dim in &variable.shape {
                let candidate = (container.geometry.min_nodes(), container.geometry);
                node_minimums
                    .entry(dim.as_str())
                    .and_modify(|current| {
                        if candidate.0 > current.0 {
                            *current = candidate;
                        }
                    })
                    .or_insert(candidate);
            }
        }
    }

    let mut properties = Map::new();
    let mut required = Vec::new();

    for dimension in &def.dimensions {
        let constraint = match node_minimums.get(dimension.name.as_str()) {
            Some((minimum, geometry)) if *minimum > 1 => json!({
                "type": "integer",
                "description": format!(
                    "Dimension: {} (minimum {} nodes for {} geometry)",
                    dimension.name, minimum, geometry
                ),
                "minimum": *minimum,
            }),
            _ => json!({
                "type": "integer",
                "description": format!("Dimension: {}", dimension.name),
                "minimum": 1,
            }),
        };
        properties.insert(dimension.name.clone(), constraint);
        required.push(Value::String(dimension.name.clone()));
    }

    json!({
        "type": "object",
        "description": "Dimension definitions",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

/// Build the open variables constraint group.
fn variables_group(
    def: &DefinitionFile,
    containers: &[ResolvedContainer],
    warnings: &mut Vec<TypeMismatch>,
) -> Value {
    // Variables a container depends on are required alongside it.
    let mut referenced: Vec<&str> = Vec::new();
    for container in containers {
        referenced.extend(container.coordinates.iter().map(String::as_str));
        referenced.push(container.node_count.as_str());
    }

    let mut properties = Map::new();
    let mut required = Vec::new();

    for variable in &def.variables {
        let container = containers.iter().find(|c| c.name == variable.name);

        let constraint = match container {
            Some(container) => container_constraint(variable, container),
            None => variable_constraint(variable, warnings),
        };
        properties.insert(variable.name.clone(), constraint);

        let has_units = variable
            .attr(AttrKey::Units.as_str())
            .is_some_and(|v| AttrKey::Units.accepts(v));
        if container.is_some() || has_units || referenced.contains(&variable.name.as_str()) {
            required.push(Value::String(variable.name.clone()));
        }
    }

    json!({
        "type": "object",
        "description": "Variable definitions",
        "properties": properties,
        "required": required,
        "additionalProperties": true,
    })
}

/// Constraint object for a geometry container variable.
///
/// Containers are structural metadata, not data arrays: they require the
/// three geometry attributes and carry no `dimensions` requirement. The
/// `node_coordinates` pattern pins the referenced names in declared order,
/// because coordinate order is semantically meaningful.
fn container_constraint(variable: &Variable, container: &ResolvedContainer) -> Value {
    json!({
        "type": "object",
        "description": variable_description(variable),
        "properties": {
            "geometry_type": {
                "type": "string",
                "enum": [container.geometry.as_str()],
                "description": "Type of geometry represented",
            },
            "node_coordinates": {
                "type": "string",
                "pattern": format!(
                    "^{}\\s+{}$",
                    container.coordinates[0], container.coordinates[1]
                ),
                "description": "Space-separated coordinate variable names",
            },
            "node_count": {
                "type": "string",
                "pattern": IDENTIFIER_PATTERN,
                "description": "Variable containing node count per element",
            },
        },
        "required": ["geometry_type", "node_coordinates", "node_count"],
        "additionalProperties": true,
    })
}

/// Constraint object for a plain data variable.
fn variable_constraint(variable: &Variable, warnings: &mut Vec<TypeMismatch>) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    if variable.arity() > 0 {
        properties.insert(
            "dimensions".to_string(),
            json!({
                "type": "array",
                "items": {"type": "string", "pattern": IDENTIFIER_PATTERN},
                "minItems": variable.arity(),
                "maxItems": variable.arity(),
                "description": "Dimension names for this variable",
            }),
        );
        required.push(Value::String("dimensions".to_string()));
    }

    let number_type = variable.var_type.json_number_type();

    for (key, value) in &variable.attributes {
        let attr_key = AttrKey::parse(key);
        if attr_key == AttrKey::Other {
            continue;
        }
        if attr_key == AttrKey::GeometryType {
            // An unusable geometry type was already reported during
            // container resolution; leave it as passthrough here.
            continue;
        }
        if !attr_key.accepts(value) {
            push_warning(
                warnings,
                TypeMismatch {
                    variable: Some(variable.name.clone()),
                    key: key.clone(),
                    expected: expected_kind(attr_key),
                    found: value_kind(value),
                },
            );
            continue;
        }

        let slot = match attr_key {
            AttrKey::Units => {
                required.push(Value::String("units".to_string()));
                json!({
                    "type": "string",
                    "description": "Units of measurement",
                    "examples": [value.as_str()],
                })
            }
            AttrKey::LongName => json!({
                "type": "string",
                "description": "Descriptive name for the variable",
            }),
            AttrKey::StandardName => json!({
                "type": "string",
                "description": "Conventions standard name",
            }),
            AttrKey::ValidMin => json!({
                "type": number_type,
                "description": "Minimum valid value",
            }),
            AttrKey::ValidMax => json!({
                "type": number_type,
                "description": "Maximum valid value",
            }),
            AttrKey::ValidRange => json!({
                "type": "array",
                "items": {"type": number_type},
                "minItems": 2,
                "maxItems": 2,
                "description": "Inclusive range of valid values",
            }),
            AttrKey::FillValue => json!({
                "type": number_type,
                "description": "Value used for missing data",
            }),
            AttrKey::NodeCoordinates => json!({
                "type": "string",
                "pattern": TWO_IDENTIFIER_PATTERN,
                "description": "Space-separated coordinate variable names",
            }),
            AttrKey::NodeCount => json!({
                "type": "string",
                "pattern": IDENTIFIER_PATTERN,
                "description": "Variable containing node count per element",
            }),
            AttrKey::Geometry => json!({
                "type": "string",
                "pattern": IDENTIFIER_PATTERN,
                "description": "Name of the geometry container for this variable",
            }),
            AttrKey::GeometryType | AttrKey::Other => continue,
        };
        properties.insert(key.clone(), slot);
    }

    let mut constraint = Map::new();
    constraint.insert("type".to_string(), json!("object"));
    constraint.insert(
        "description".to_string(),
        json!(variable_description(variable)),
    );
    constraint.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        constraint.insert("required".to_string(), Value::Array(required));
    }
    constraint.insert("additionalProperties".to_string(), json!(true));
    Value::Object(constraint)
}

/// Human-readable description: the `long_name` attribute when usable.
fn variable_description(variable: &Variable) -> String {
    variable
        .attr(AttrKey::LongName.as_str())
        .and_then(AttrValue::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Variable: {}", variable.name))
}

/// Build the fully-optional global attributes group.
fn global_attributes_group() -> Value {
    json!({
        "type": "object",
        "description": "Global metadata attributes",
        "properties": {
            "title": {"type": "string", "description": "Title of the dataset"},
            "institution": {
                "type": "string",
                "description": "Institution responsible for the data",
            },
            "source": {
                "type": "string",
                "description": "Method of production of the original data",
            },
            "conventions": {
                "type": "string",
                "description": "Name of conventions followed",
                "examples": ["CF-1.8", "CF-1.8, IMAS-3.0"],
            },
            "comment": {
                "type": "string",
                "description": "Additional information about the dataset",
            },
        },
        "additionalProperties": true,
    })
}

/// Record a warning and log it.
fn push_warning(warnings: &mut Vec<TypeMismatch>, warning: TypeMismatch) {
    tracing::warn!("{warning}");
    warnings.push(warning);
}

/// Value class name for diagnostics.
fn value_kind(value: &AttrValue) -> &'static str {
    match value {
        AttrValue::Text(_) => "string",
        AttrValue::Int(_) => "integer",
        AttrValue::Float(_) => "float",
        AttrValue::List(_) => "list",
    }
}

/// Expected class name for diagnostics.
fn expected_kind(key: AttrKey) -> &'static str {
    match key {
        AttrKey::Units
        | AttrKey::LongName
        | AttrKey::StandardName
        | AttrKey::NodeCoordinates
        | AttrKey::NodeCount
        | AttrKey::Geometry => "a string value",
        AttrKey::ValidMin | AttrKey::ValidMax | AttrKey::FillValue => "a numeric value",
        AttrKey::ValidRange => "a two-element numeric list",
        AttrKey::GeometryType => "one of polygon, line, point",
        AttrKey::Other => "any value",
    }
}
