//! # Generated-Schema Validation
//!
//! Runtime validation of data documents against generated schemas
//! (JSON Schema draft-07).
//!
//! ## Schema Resolution
//!
//! Generated schemas live in a directory tree mirroring the definition
//! domains (`schemas/<domain>/<name>.schema.json`). The validator loads
//! every `*.schema.json` under the root at construction time and indexes
//! each one by its domain-qualified relative name
//! (`pf_active/coil-current.schema.json`) and, when unambiguous, by its
//! bare file name. Generated schemas are self-contained; there is no
//! cross-schema `$ref` resolution to perform.
//!
//! Documents may be JSON or YAML; YAML is converted to a JSON value tree
//! before validation.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

/// Error during schema validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the schema that was validated against.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The schema file could not be loaded.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema name or directory.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The document file could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoadError {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema name.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// IO error reading schema or document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single validation violation with structured context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A validator over a tree of generated schemas, backed by the
/// `jsonschema` crate.
#[derive(Debug)]
pub struct SchemaValidator {
    /// Root directory containing generated schema files.
    schema_dir: PathBuf,
    /// Map from schema name to parsed JSON value.
    schemas: HashMap<String, Value>,
}

impl SchemaValidator {
    /// Create a validator by loading every `*.schema.json` under the
    /// given directory tree.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidationError::SchemaLoadError` if the directory
    /// cannot be walked or any schema file cannot be read or parsed.
    pub fn new(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaValidationError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();

        let mut files = Vec::new();
        collect_schema_files(&schema_dir, &mut files).map_err(|e| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_dir.display().to_string(),
                reason: format!("cannot read schema directory: {e}"),
            }
        })?;
        files.sort();

        let mut schemas = HashMap::new();
        for path in files {
            let content = std::fs::read_to_string(&path)?;
            let relative = path
                .strip_prefix(&schema_dir)
                .unwrap_or(&path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let value: Value = serde_json::from_str(&content).map_err(|e| {
                SchemaValidationError::SchemaLoadError {
                    schema_name: relative.clone(),
                    reason: format!("invalid JSON: {e}"),
                }
            })?;

            // Bare-filename alias for convenience; the domain-qualified
            // name always wins on collision.
            if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
                if file_name != relative && !schemas.contains_key(file_name) {
                    schemas.insert(file_name.to_string(), value.clone());
                }
            }
            schemas.insert(relative, value);
        }

        Ok(Self {
            schema_dir,
            schemas,
        })
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Returns the names of all loaded schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Look up a loaded schema by name.
    pub fn get_schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Build a compiled draft-07 `Validator` for a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError` if the schema is unknown, or
    /// `ValidatorBuildError` if the schema does not compile.
    pub fn build_validator(
        &self,
        schema_name: &str,
    ) -> Result<Validator, SchemaValidationError> {
        let schema_value = self.schemas.get(schema_name).ok_or_else(|| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_name.to_string(),
                reason: format!("schema not found in {}", self.schema_dir.display()),
            }
        })?;

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft7);
        opts.build(schema_value)
            .map_err(|e| SchemaValidationError::ValidatorBuildError {
                schema_name: schema_name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Validate a parsed JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` with structured violation details if
    /// the document is invalid.
    pub fn validate_document(
        &self,
        instance: &Value,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        let validator = self.build_validator(schema_name)?;

        let errors: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError::ValidationFailed {
                schema_name: schema_name.to_string(),
                violations: ValidationViolations { violations: errors },
            })
        }
    }

    /// Validate a JSON or YAML document file against a named schema.
    ///
    /// The format is chosen by extension (`.yaml`/`.yml` for YAML,
    /// anything else is treated as JSON).
    pub fn validate_file(
        &self,
        document_path: &Path,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        let content = std::fs::read_to_string(document_path).map_err(|e| {
            SchemaValidationError::DocumentLoadError {
                path: document_path.display().to_string(),
                reason: format!("cannot read file: {e}"),
            }
        })?;

        let ext = document_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        let json_value = match ext {
            "yaml" | "yml" => {
                let yaml_value: serde_yaml::Value =
                    serde_yaml::from_str(&content).map_err(|e| {
                        SchemaValidationError::DocumentLoadError {
                            path: document_path.display().to_string(),
                            reason: format!("invalid YAML: {e}"),
                        }
                    })?;
                yaml_to_json_value(&yaml_value).map_err(|e| {
                    SchemaValidationError::DocumentLoadError {
                        path: document_path.display().to_string(),
                        reason: format!("YAML-to-JSON conversion failed: {e}"),
                    }
                })?
            }
            _ => serde_json::from_str(&content).map_err(|e| {
                SchemaValidationError::DocumentLoadError {
                    path: document_path.display().to_string(),
                    reason: format!("invalid JSON: {e}"),
                }
            })?,
        };

        self.validate_document(&json_value, schema_name)
    }
}

/// Recursively collect `*.schema.json` files under `dir`.
fn collect_schema_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_schema_files(&path, out)?;
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".schema.json"))
        {
            out.push(path);
        }
    }
    Ok(())
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Data documents use only the JSON-compatible subset of YAML; tags are
/// ignored and anchors arrive pre-resolved.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> =
                seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Write a small schema tree into a temp directory.
    fn schema_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base");
        std::fs::create_dir_all(&base).unwrap();
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {
                "dimensions": {
                    "type": "object",
                    "properties": {"node": {"type": "integer", "minimum": 3}},
                    "required": ["node"],
                    "additionalProperties": false,
                }
            },
            "required": ["dimensions"],
        });
        std::fs::write(
            base.join("polygon-geometry.schema.json"),
            serde_json::to_string_pretty(&schema).unwrap(),
        )
        .unwrap();
        dir
    }

    #[test]
    fn loads_schemas_recursively() {
        let dir = schema_tree();
        let validator = SchemaValidator::new(dir.path()).unwrap();
        let names = validator.schema_names();
        assert!(names.contains(&"base/polygon-geometry.schema.json"));
        // Bare-filename alias.
        assert!(names.contains(&"polygon-geometry.schema.json"));
        assert!(validator
            .get_schema("base/polygon-geometry.schema.json")
            .is_some());
    }

    #[test]
    fn valid_document_passes() {
        let dir = schema_tree();
        let validator = SchemaValidator::new(dir.path()).unwrap();
        let doc = json!({"dimensions": {"node": 8}});
        validator
            .validate_document(&doc, "base/polygon-geometry.schema.json")
            .unwrap();
    }

    #[test]
    fn violations_are_structured() {
        let dir = schema_tree();
        let validator = SchemaValidator::new(dir.path()).unwrap();
        let doc = json!({"dimensions": {"node": 2}});
        let err = validator
            .validate_document(&doc, "base/polygon-geometry.schema.json")
            .unwrap_err();
        match err {
            SchemaValidationError::ValidationFailed { violations, .. } => {
                assert_eq!(violations.len(), 1);
                assert!(!violations.is_empty());
                let v = &violations.violations()[0];
                assert!(v.instance_path.contains("node"), "{}", v.instance_path);
            }
            other => panic!("expected ValidationFailed, got: {other}"),
        }
    }

    #[test]
    fn unknown_schema_is_load_error() {
        let dir = schema_tree();
        let validator = SchemaValidator::new(dir.path()).unwrap();
        let err = validator
            .validate_document(&json!({}), "nonexistent.schema.json")
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaValidationError::SchemaLoadError { .. }
        ));
    }

    #[test]
    fn validate_yaml_file() {
        let dir = schema_tree();
        let validator = SchemaValidator::new(dir.path()).unwrap();
        let doc_path = dir.path().join("doc.yaml");
        std::fs::write(&doc_path, "dimensions:\n  node: 5\n").unwrap();
        validator
            .validate_file(&doc_path, "base/polygon-geometry.schema.json")
            .unwrap();
    }

    #[test]
    fn validate_json_file_with_violation() {
        let dir = schema_tree();
        let validator = SchemaValidator::new(dir.path()).unwrap();
        let doc_path = dir.path().join("doc.json");
        std::fs::write(&doc_path, r#"{"dimensions": {"node": 1}}"#).unwrap();
        let err = validator
            .validate_file(&doc_path, "base/polygon-geometry.schema.json")
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaValidationError::ValidationFailed { .. }
        ));
    }

    #[test]
    fn malformed_document_is_load_error() {
        let dir = schema_tree();
        let validator = SchemaValidator::new(dir.path()).unwrap();
        let doc_path = dir.path().join("doc.json");
        std::fs::write(&doc_path, "not json").unwrap();
        let err = validator
            .validate_file(&doc_path, "base/polygon-geometry.schema.json")
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaValidationError::DocumentLoadError { .. }
        ));
    }

    #[test]
    fn yaml_to_json_conversion() {
        let yaml_str = "
dimensions:
  node: 8
title: outline
nested:
  - 1
  - 2.5
enabled: true
";
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml_str).unwrap();
        let json_value = yaml_to_json_value(&yaml_value).unwrap();
        assert_eq!(json_value["dimensions"]["node"], 8);
        assert_eq!(json_value["title"], "outline");
        assert_eq!(json_value["nested"][1], 2.5);
        assert_eq!(json_value["enabled"], true);
    }

    #[test]
    fn violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""dimensions" is a required property"#.to_string(),
        };
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn violation_display_path() {
        let v = Violation {
            instance_path: "/dimensions/node".to_string(),
            schema_path: "/properties/dimensions/properties/node/minimum".to_string(),
            message: "2 is less than the minimum of 3".to_string(),
        };
        let display = v.to_string();
        assert!(display.contains("/dimensions/node"));
        assert!(display.contains("less than the minimum"));
    }
}
