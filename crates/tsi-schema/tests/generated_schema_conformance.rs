//! End-to-end conformance tests: parse a definition, generate its schema,
//! and drive the compiled validator against conforming and non-conforming
//! data documents.

use serde_json::{json, Value};
use tempfile::TempDir;

use tsi_cdl::parse_definition;
use tsi_schema::{
    run_batch, translate, BatchOptions, SchemaValidator, TranslateOptions,
};

const OUTLINE: &str = r#"
netcdf vessel_outline {
:title = "Vessel Outline" ;
:institution = "Test Institution" ;
:conventions = "CF-1.8" ;

dimensions:
    outline_node = UNLIMITED ;
    outline_element = UNLIMITED ;

variables:
    int outline_geometry ;
        outline_geometry:geometry_type = "polygon" ;
        outline_geometry:node_coordinates = "outline_r outline_z" ;
        outline_geometry:node_count = "outline_node_count" ;

    double outline_r(outline_node) ;
        outline_r:units = "m" ;
        outline_r:long_name = "Major radius coordinate" ;
        outline_r:_FillValue = -999.0 ;

    double outline_z(outline_node) ;
        outline_z:units = "m" ;
        outline_z:long_name = "Vertical coordinate" ;
        outline_z:_FillValue = -999.0 ;

    int outline_node_count(outline_element) ;
        outline_node_count:long_name = "count of nodes per polygon" ;
        outline_node_count:valid_min = 3 ;
}
"#;

/// Generate the outline schema into a temp tree and load a validator over it.
fn outline_validator() -> (TempDir, SchemaValidator) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("definitions");
    let output = dir.path().join("schemas");
    std::fs::create_dir_all(input.join("vessel")).unwrap();
    std::fs::write(input.join("vessel/vessel-outline.cdl"), OUTLINE).unwrap();

    let report = run_batch(&BatchOptions::new(&input, &output)).unwrap();
    assert!(report.is_success());

    let validator = SchemaValidator::new(&output).unwrap();
    (dir, validator)
}

fn valid_outline_document() -> Value {
    json!({
        "dimensions": {"outline_node": 8, "outline_element": 2},
        "variables": {
            "outline_geometry": {
                "geometry_type": "polygon",
                "node_coordinates": "outline_r outline_z",
                "node_count": "outline_node_count",
            },
            "outline_r": {
                "dimensions": ["outline_node"],
                "units": "m",
                "long_name": "Major radius coordinate",
                "_FillValue": -999.0,
            },
            "outline_z": {
                "dimensions": ["outline_node"],
                "units": "m",
                "long_name": "Vertical coordinate",
                "_FillValue": -999.0,
            },
            "outline_node_count": {
                "dimensions": ["outline_element"],
                "valid_min": 3,
            },
        },
        "global_attributes": {
            "title": "Vessel Outline",
            "institution": "Test Institution",
            "conventions": "CF-1.8",
        },
    })
}

const SCHEMA_NAME: &str = "vessel/vessel-outline.schema.json";

#[test]
fn valid_document_passes() {
    let (_dir, validator) = outline_validator();
    validator
        .validate_document(&valid_outline_document(), SCHEMA_NAME)
        .unwrap();
}

#[test]
fn generated_schema_compiles_as_draft7() {
    let (_dir, validator) = outline_validator();
    validator.build_validator(SCHEMA_NAME).unwrap();
}

#[test]
fn missing_dimension_fails() {
    let (_dir, validator) = outline_validator();
    let mut doc = valid_outline_document();
    doc["dimensions"].as_object_mut().unwrap().remove("outline_node");
    let err = validator.validate_document(&doc, SCHEMA_NAME).unwrap_err();
    assert!(err.to_string().contains("outline_node"), "{err}");
}

#[test]
fn dimension_set_is_closed() {
    let (_dir, validator) = outline_validator();
    let mut doc = valid_outline_document();
    doc["dimensions"]["intruder"] = json!(5);
    assert!(validator.validate_document(&doc, SCHEMA_NAME).is_err());
}

#[test]
fn polygon_node_dimension_has_minimum_three() {
    let (_dir, validator) = outline_validator();
    let mut doc = valid_outline_document();
    doc["dimensions"]["outline_node"] = json!(2);
    let err = validator.validate_document(&doc, SCHEMA_NAME).unwrap_err();
    assert!(err.to_string().contains("minimum"), "{err}");

    doc["dimensions"]["outline_node"] = json!(3);
    validator.validate_document(&doc, SCHEMA_NAME).unwrap();
}

#[test]
fn variable_attributes_are_open() {
    let (_dir, validator) = outline_validator();
    let mut doc = valid_outline_document();
    doc["variables"]["outline_r"]["comment"] = json!("any extra attribute is fine");
    validator.validate_document(&doc, SCHEMA_NAME).unwrap();
}

#[test]
fn extra_variables_are_allowed() {
    let (_dir, validator) = outline_validator();
    let mut doc = valid_outline_document();
    doc["variables"]["extra_diagnostic"] = json!({"units": "V"});
    validator.validate_document(&doc, SCHEMA_NAME).unwrap();
}

#[test]
fn missing_geometry_container_fails() {
    let (_dir, validator) = outline_validator();
    let mut doc = valid_outline_document();
    doc["variables"]
        .as_object_mut()
        .unwrap()
        .remove("outline_geometry");
    assert!(validator.validate_document(&doc, SCHEMA_NAME).is_err());
}

#[test]
fn wrong_geometry_type_fails() {
    let (_dir, validator) = outline_validator();
    let mut doc = valid_outline_document();
    doc["variables"]["outline_geometry"]["geometry_type"] = json!("line");
    assert!(validator.validate_document(&doc, SCHEMA_NAME).is_err());
}

#[test]
fn node_coordinate_order_is_enforced() {
    let (_dir, validator) = outline_validator();

    let mut doc = valid_outline_document();
    doc["variables"]["outline_geometry"]["node_coordinates"] = json!("outline_z outline_r");
    assert!(
        validator.validate_document(&doc, SCHEMA_NAME).is_err(),
        "reversed coordinate order must be rejected"
    );
}

#[test]
fn coordinate_variable_without_units_fails() {
    let (_dir, validator) = outline_validator();
    let mut doc = valid_outline_document();
    doc["variables"]["outline_r"]
        .as_object_mut()
        .unwrap()
        .remove("units");
    assert!(validator.validate_document(&doc, SCHEMA_NAME).is_err());
}

#[test]
fn wrong_shape_arity_fails() {
    let (_dir, validator) = outline_validator();
    let mut doc = valid_outline_document();
    doc["variables"]["outline_r"]["dimensions"] = json!(["outline_node", "outline_element"]);
    assert!(validator.validate_document(&doc, SCHEMA_NAME).is_err());
}

#[test]
fn top_level_is_open_to_new_groups() {
    let (_dir, validator) = outline_validator();
    let mut doc = valid_outline_document();
    doc["coordinates"] = json!({"future": "extension"});
    validator.validate_document(&doc, SCHEMA_NAME).unwrap();
}

#[test]
fn global_attributes_are_optional() {
    let (_dir, validator) = outline_validator();
    let mut doc = valid_outline_document();
    doc.as_object_mut().unwrap().remove("global_attributes");
    validator.validate_document(&doc, SCHEMA_NAME).unwrap();
}

#[test]
fn translation_alone_never_touches_disk() {
    // A failing translation in batch mode writes nothing; here the same
    // failure is observable directly from the pure function.
    let src = r#"
netcdf broken {
dimensions:
    node = UNLIMITED ;
variables:
    int geometry_container ;
        geometry_container:geometry_type = "polygon" ;
        geometry_container:node_coordinates = "r z" ;
        geometry_container:node_count = "missing_var" ;
    double r(node) ;
    double z(node) ;
}
"#;
    let def = parse_definition(src).unwrap();
    assert!(translate(&def, &TranslateOptions::default()).is_err());
}
