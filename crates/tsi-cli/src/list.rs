//! # List Subcommand
//!
//! Lists the categories and files of a resource directory: the
//! definitions tree (`definitions/<domain>/*.cdl`) or the generated
//! schemas tree (`schemas/<domain>/*.schema.json`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

/// Arguments for the `tsi list` subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Resource directory to list (definitions or schemas root).
    pub dir: PathBuf,
}

/// Execute the list subcommand.
pub fn run_list(args: &ListArgs) -> Result<u8> {
    let categories = read_categories(&args.dir)?;

    let mut total = 0usize;
    for (category, files) in &categories {
        println!("{category}/");
        for file in files {
            println!("  {file}");
        }
        total += files.len();
    }
    println!("Total: {} files in {} categories", total, categories.len());
    Ok(0)
}

/// Category subdirectories and their files, both sorted.
fn read_categories(dir: &Path) -> Result<Vec<(String, Vec<String>)>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read resource directory: {}", dir.display()))?;

    let mut categories = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let category = entry.file_name().to_string_lossy().into_owned();

        let mut files = Vec::new();
        for file_entry in std::fs::read_dir(&path)? {
            let file_entry = file_entry?;
            if file_entry.path().is_file() {
                files.push(file_entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort();
        categories.push((category, files));
    }
    categories.sort();
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_categories_and_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("vessel")).unwrap();
        std::fs::create_dir_all(dir.path().join("pf_active")).unwrap();
        std::fs::write(dir.path().join("vessel/vessel-outline.cdl"), "").unwrap();
        std::fs::write(dir.path().join("pf_active/coil-current.cdl"), "").unwrap();
        std::fs::write(dir.path().join("pf_active/coil-geometry.cdl"), "").unwrap();

        let categories = read_categories(dir.path()).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].0, "pf_active");
        assert_eq!(
            categories[0].1,
            vec!["coil-current.cdl", "coil-geometry.cdl"]
        );
        assert_eq!(categories[1].0, "vessel");

        let code = run_list(&ListArgs {
            dir: dir.path().to_path_buf(),
        })
        .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let args = ListArgs {
            dir: PathBuf::from("/nonexistent/resources"),
        };
        assert!(run_list(&args).is_err());
    }
}
