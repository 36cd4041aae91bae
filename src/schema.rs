//! Migration-directory scanning for `modules map`.
//!
//! A migrations directory groups schema migrations by module: each
//! subdirectory is one module holding `*.json` migration files, and
//! top-level `*.json` files belong to the main application. A
//! migration file lists operations; only `table` operations name an
//! entity worth cataloging.
//!
//! Layout:
//! ```text
//! migrations/
//!   0001_init.json          <- app-level
//!   billing/
//!     0001_invoices.json    <- module "billing"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("cannot read migrations under {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("migration {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("module '{0}' has no migrations directory")]
    ModuleNotFound(String),
}

// ============================================================================
// MIGRATION FILE FORMAT
// ============================================================================

/// One parsed migration file.
#[derive(Debug, Deserialize)]
struct MigrationFile {
    #[serde(default)]
    operations: Vec<Operation>,
}

/// One schema operation. Anything other than `table` is skipped.
#[derive(Debug, Deserialize)]
struct Operation {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
}

/// Tables discovered for one module's migration set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMigrations {
    /// Module name, taken from the subdirectory name.
    pub module: String,
    /// Table names in discovery order, de-duplicated.
    pub tables: Vec<String>,
}

// ============================================================================
// SCANNING
// ============================================================================

/// Discover module migrations under `dir`.
///
/// With `only_module`, restricts the scan to that one subdirectory and
/// fails if it does not exist. Traversal is name-sorted so repeated
/// runs report in a stable order.
pub fn scan_module_migrations(
    dir: &Path,
    only_module: Option<&str>,
) -> Result<Vec<ModuleMigrations>, SchemaError> {
    let mut subdirs: Vec<PathBuf> = read_dir_sorted(dir)?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect();

    if let Some(name) = only_module {
        subdirs.retain(|p| p.file_name().is_some_and(|n| n == name));
        if subdirs.is_empty() {
            return Err(SchemaError::ModuleNotFound(name.to_string()));
        }
    }

    let mut discovered = Vec::new();
    for subdir in subdirs {
        let module = subdir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tables = scan_tables(&subdir)?;
        discovered.push(ModuleMigrations { module, tables });
    }
    Ok(discovered)
}

/// Discover the main application's tables: top-level migration files.
pub fn scan_app_migrations(dir: &Path) -> Result<Vec<String>, SchemaError> {
    scan_tables_in(read_dir_sorted(dir)?)
}

/// Tables named by every migration file directly inside `dir`.
fn scan_tables(dir: &Path) -> Result<Vec<String>, SchemaError> {
    scan_tables_in(read_dir_sorted(dir)?)
}

fn scan_tables_in(paths: Vec<PathBuf>) -> Result<Vec<String>, SchemaError> {
    let mut tables: Vec<String> = Vec::new();
    for path in paths {
        if !path.is_file() || path.extension().is_none_or(|e| e != "json") {
            continue;
        }

        let contents = fs::read_to_string(&path).map_err(|source| SchemaError::Io {
            path: path.clone(),
            source,
        })?;
        let migration: MigrationFile =
            serde_json::from_str(&contents).map_err(|source| SchemaError::Parse {
                path: path.clone(),
                source,
            })?;

        for op in migration.operations {
            if op.kind != "table" {
                continue;
            }
            if let Some(name) = op.name {
                if !tables.contains(&name) {
                    tables.push(name);
                }
            }
        }
    }
    Ok(tables)
}

/// Directory entries sorted by name, for deterministic output.
fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, SchemaError> {
    let entries = fs::read_dir(dir).map_err(|source| SchemaError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SchemaError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_migration(path: &Path, ops: &str) {
        fs::write(path, format!(r#"{{"operations": [{}]}}"#, ops)).unwrap();
    }

    #[test]
    fn finds_tables_grouped_by_module_subdirectory() {
        let dir = tempdir().unwrap();
        let billing = dir.path().join("billing");
        fs::create_dir(&billing).unwrap();
        write_migration(
            &billing.join("0001_init.json"),
            r#"{"type": "table", "name": "invoice"}, {"type": "index", "name": "ix_invoice"}"#,
        );
        write_migration(
            &billing.join("0002_more.json"),
            r#"{"type": "table", "name": "payment"}"#,
        );

        let found = scan_module_migrations(dir.path(), None).unwrap();
        assert_eq!(
            found,
            vec![ModuleMigrations {
                module: "billing".to_string(),
                tables: vec!["invoice".to_string(), "payment".to_string()],
            }]
        );
    }

    #[test]
    fn skips_non_table_operations_and_duplicates() {
        let dir = tempdir().unwrap();
        let m = dir.path().join("auth");
        fs::create_dir(&m).unwrap();
        write_migration(
            &m.join("a.json"),
            r#"{"type": "table", "name": "user"}, {"type": "table", "name": "user"}, {"type": "column"}"#,
        );

        let found = scan_module_migrations(dir.path(), None).unwrap();
        assert_eq!(found[0].tables, vec!["user".to_string()]);
    }

    #[test]
    fn only_module_restricts_and_validates() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("billing")).unwrap();
        fs::create_dir(dir.path().join("auth")).unwrap();

        let found = scan_module_migrations(dir.path(), Some("auth")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].module, "auth");

        assert!(matches!(
            scan_module_migrations(dir.path(), Some("ghost")),
            Err(SchemaError::ModuleNotFound(_))
        ));
    }

    #[test]
    fn app_migrations_are_top_level_files_only() {
        let dir = tempdir().unwrap();
        write_migration(
            &dir.path().join("0001.json"),
            r#"{"type": "table", "name": "settings"}"#,
        );
        let sub = dir.path().join("billing");
        fs::create_dir(&sub).unwrap();
        write_migration(&sub.join("x.json"), r#"{"type": "table", "name": "invoice"}"#);

        let tables = scan_app_migrations(dir.path()).unwrap();
        assert_eq!(tables, vec!["settings".to_string()]);
    }

    #[test]
    fn invalid_json_names_the_offending_file() {
        let dir = tempdir().unwrap();
        let m = dir.path().join("billing");
        fs::create_dir(&m).unwrap();
        fs::write(m.join("bad.json"), "{oops").unwrap();

        match scan_module_migrations(dir.path(), None) {
            Err(SchemaError::Parse { path, .. }) => {
                assert!(path.ends_with("bad.json"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn non_json_files_are_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "notes").unwrap();
        assert!(scan_app_migrations(dir.path()).unwrap().is_empty());
    }
}
