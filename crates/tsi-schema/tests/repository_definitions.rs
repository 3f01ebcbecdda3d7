//! Translate the repository's own definition tree and sanity-check the
//! generated artifacts.

use std::path::PathBuf;

use tsi_schema::{run_batch, BatchOptions, SchemaValidator};

/// Repository root, two levels above this crate.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

#[test]
fn all_repository_definitions_translate() {
    let definitions = repo_root().join("definitions");
    assert!(definitions.is_dir(), "missing {}", definitions.display());

    let out = tempfile::tempdir().unwrap();
    let report = run_batch(&BatchOptions::new(&definitions, out.path())).unwrap();

    assert!(
        report.is_success(),
        "repository definitions failed to translate: {:?}",
        report
            .failed
            .iter()
            .map(|f| format!("{}: {}", f.source.display(), f.error))
            .collect::<Vec<_>>()
    );
    assert!(report.generated.len() >= 4);
    for generated in &report.generated {
        assert!(
            generated.warnings.is_empty(),
            "unexpected warnings for {}",
            generated.source.display()
        );
    }

    for expected in [
        "base/polygon-geometry.schema.json",
        "pf_active/coil-current.schema.json",
        "pf_active/coil-geometry.schema.json",
        "vessel/vessel-outline.schema.json",
    ] {
        assert!(
            out.path().join(expected).is_file(),
            "missing generated schema {expected}"
        );
    }
}

#[test]
fn generated_repository_schemas_compile_and_constrain() {
    let definitions = repo_root().join("definitions");
    let out = tempfile::tempdir().unwrap();
    run_batch(&BatchOptions::new(&definitions, out.path())).unwrap();

    let validator = SchemaValidator::new(out.path()).unwrap();
    for name in validator.schema_names() {
        validator
            .build_validator(name)
            .unwrap_or_else(|e| panic!("schema {name} does not compile: {e}"));
    }

    // The polygon base schema carries the node minimum.
    let schema = validator
        .get_schema("base/polygon-geometry.schema.json")
        .unwrap();
    assert_eq!(
        schema["properties"]["dimensions"]["properties"]["node"]["minimum"],
        serde_json::json!(3)
    );
}
