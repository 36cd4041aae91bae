//! Catalog store: JSON-persisted modules and entities.
//!
//! The catalog lives in one pretty-printed JSON file under the user's
//! data directory. CRUD mutates in memory and saves explicitly; the
//! paged queries project catalog rows into the display rows the pager
//! consumes.
//!
//! Structure:
//! - Pure functions: key/timestamp generation, row projection, paging
//! - Effect functions: catalog load/save, CRUD

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use thiserror::Error;

use crate::pager::{DataSourceError, PageState};
use crate::types::{Catalog, Entity, Module, Row, SortDirection};

/// Current catalog format version.
const CATALOG_VERSION: u32 = 1;

/// Catalog filename within the data directory.
const CATALOG_FILENAME: &str = "catalog.json";

// ============================================================================
// ERRORS
// ============================================================================

/// Failures crossing the store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("catalog i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("module with ID {0} not found")]
    ModuleNotFound(u64),

    #[error("unknown sort field '{0}'")]
    UnknownSortField(String),

    #[error("unknown filter '{0}'")]
    UnknownFilter(String),

    #[error("filter '{0}' has a non-numeric value")]
    BadFilterValue(String),
}

impl From<StoreError> for DataSourceError {
    fn from(e: StoreError) -> Self {
        DataSourceError::new(e.to_string())
    }
}

// ============================================================================
// PURE FUNCTIONS (Computations)
// ============================================================================

/// Returns the default catalog path.
///
/// Linux: ~/.local/share/modctl/catalog.json
pub fn default_catalog_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("modctl")
        .join(CATALOG_FILENAME)
}

/// Generate a unique module key.
///
/// Format: "mdc-" + timestamp hex + short suffix for uniqueness
/// within the same millisecond.
pub fn generate_module_key() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let suffix: u32 = std::process::id() ^ (timestamp as u32);

    format!("mdc-{:x}{:04x}", timestamp, suffix & 0xFFFF)
}

/// Current timestamp as RFC 3339 (UTC, second precision).
fn current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Slice one page out of an already-sorted row set.
fn paginate<T>(items: Vec<T>, state: &PageState) -> Vec<T> {
    let offset = (state.page.saturating_sub(1)) * state.limit;
    items
        .into_iter()
        .skip(offset as usize)
        .take(state.limit as usize)
        .collect()
}

// ============================================================================
// STORE
// ============================================================================

/// The catalog plus the file it persists to.
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    catalog: Catalog,
}

impl CatalogStore {
    /// Open the catalog at `path`, starting empty if the file does not
    /// exist yet. A present-but-unreadable file is an error, not an
    /// empty catalog.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let catalog = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Catalog {
                version: CATALOG_VERSION,
                next_module_id: 1,
                next_entity_id: 1,
                ..Catalog::default()
            },
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            path = %path.display(),
            modules = catalog.modules.len(),
            entities = catalog.entities.len(),
            "catalog opened"
        );
        Ok(Self { path, catalog })
    }

    /// Open the catalog at the default data-directory location.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(default_catalog_path())
    }

    /// Persist the catalog to its file, creating parent directories.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.catalog)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // MODULE CRUD
    // ------------------------------------------------------------------

    /// Insert a new module and persist.
    pub fn create_module(&mut self, title: &str) -> Result<Module, StoreError> {
        let module = Module {
            id: self.catalog.next_module_id,
            key: generate_module_key(),
            title: title.to_string(),
            created_at: current_timestamp(),
        };
        self.catalog.next_module_id += 1;
        self.catalog.modules.push(module.clone());
        self.save()?;

        tracing::debug!(id = module.id, title = %module.title, "module created");
        Ok(module)
    }

    /// Delete a module and all of its entities. Persists on success.
    pub fn remove_module(&mut self, id: u64) -> Result<Module, StoreError> {
        let idx = self
            .catalog
            .modules
            .iter()
            .position(|m| m.id == id)
            .ok_or(StoreError::ModuleNotFound(id))?;

        let module = self.catalog.modules.remove(idx);
        self.catalog.entities.retain(|e| e.module_id != id);
        self.save()?;
        Ok(module)
    }

    /// Look a module up by id.
    pub fn module(&self, id: u64) -> Option<&Module> {
        self.catalog.modules.iter().find(|m| m.id == id)
    }

    /// Look a module up by title.
    pub fn module_by_title(&self, title: &str) -> Option<&Module> {
        self.catalog.modules.iter().find(|m| m.title == title)
    }

    /// Fetch a module by title, creating it when missing.
    pub fn ensure_module(&mut self, title: &str) -> Result<Module, StoreError> {
        if let Some(module) = self.module_by_title(title) {
            return Ok(module.clone());
        }
        self.create_module(title)
    }

    // ------------------------------------------------------------------
    // ENTITY CRUD
    // ------------------------------------------------------------------

    /// Insert a new entity under a module and persist.
    pub fn add_entity(
        &mut self,
        module_id: u64,
        name: &str,
        label: &str,
    ) -> Result<Entity, StoreError> {
        if self.module(module_id).is_none() {
            return Err(StoreError::ModuleNotFound(module_id));
        }

        let entity = Entity {
            id: self.catalog.next_entity_id,
            module_id,
            name: name.to_string(),
            label: label.to_string(),
            created_at: current_timestamp(),
        };
        self.catalog.next_entity_id += 1;
        self.catalog.entities.push(entity.clone());
        self.save()?;
        Ok(entity)
    }

    /// Whether a module already has an entity with this name.
    pub fn has_entity(&self, module_id: u64, name: &str) -> bool {
        self.catalog
            .entities
            .iter()
            .any(|e| e.module_id == module_id && e.name == name)
    }

    /// Delete entities matching (module, name). Returns how many went.
    pub fn remove_entity(&mut self, module_id: u64, name: &str) -> Result<usize, StoreError> {
        let before = self.catalog.entities.len();
        self.catalog
            .entities
            .retain(|e| !(e.module_id == module_id && e.name == name));
        let removed = before - self.catalog.entities.len();
        if removed > 0 {
            self.save()?;
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // PAGED QUERIES
    // ------------------------------------------------------------------

    /// One page of modules, with per-module entity counts.
    ///
    /// Row keys: `id`, `created_at`, `title`, `entities`.
    pub fn query_modules(&self, state: &PageState) -> Result<Vec<Row>, StoreError> {
        if let Some(key) = state.filters.keys().next() {
            return Err(StoreError::UnknownFilter(key.clone()));
        }

        let mut modules: Vec<&Module> = self.catalog.modules.iter().collect();
        sort_by_field(
            &mut modules,
            state.sort_by.as_deref(),
            state.sort_direction,
            |m, field| match field {
                "id" => Some(SortKey::Number(m.id)),
                "title" => Some(SortKey::Text(&m.title)),
                "created_at" => Some(SortKey::Text(&m.created_at)),
                _ => None,
            },
        )?;

        let page = paginate(modules, state);
        Ok(page
            .into_iter()
            .map(|m| {
                let count = self
                    .catalog
                    .entities
                    .iter()
                    .filter(|e| e.module_id == m.id)
                    .count();
                Row::from([
                    ("id".to_string(), m.id.to_string()),
                    ("created_at".to_string(), m.created_at.clone()),
                    ("title".to_string(), m.title.clone()),
                    ("entities".to_string(), count.to_string()),
                ])
            })
            .collect())
    }

    /// One page of entities, joined with their module titles.
    ///
    /// Honors the `module` filter (module id). Row keys: `id`,
    /// `created_at`, `name`, `label`, `module`.
    pub fn query_entities(&self, state: &PageState) -> Result<Vec<Row>, StoreError> {
        let mut module_filter: Option<u64> = None;
        for (key, value) in &state.filters {
            match key.as_str() {
                "module" => {
                    let id = value
                        .parse()
                        .map_err(|_| StoreError::BadFilterValue(key.clone()))?;
                    module_filter = Some(id);
                }
                other => return Err(StoreError::UnknownFilter(other.to_string())),
            }
        }

        let mut entities: Vec<&Entity> = self
            .catalog
            .entities
            .iter()
            .filter(|e| module_filter.is_none_or(|id| e.module_id == id))
            .collect();
        sort_by_field(
            &mut entities,
            state.sort_by.as_deref(),
            state.sort_direction,
            |e, field| match field {
                "id" => Some(SortKey::Number(e.id)),
                "name" => Some(SortKey::Text(&e.name)),
                "label" => Some(SortKey::Text(&e.label)),
                "created_at" => Some(SortKey::Text(&e.created_at)),
                _ => None,
            },
        )?;

        let page = paginate(entities, state);
        Ok(page
            .into_iter()
            .map(|e| {
                let module_title = self
                    .module(e.module_id)
                    .map(|m| m.title.clone())
                    .unwrap_or_default();
                Row::from([
                    ("id".to_string(), e.id.to_string()),
                    ("created_at".to_string(), e.created_at.clone()),
                    ("name".to_string(), e.name.clone()),
                    ("label".to_string(), e.label.clone()),
                    ("module".to_string(), module_title),
                ])
            })
            .collect())
    }
}

// ============================================================================
// SORTING
// ============================================================================

/// Sort key for one row: numeric and textual fields order differently.
enum SortKey<'a> {
    Number(u64),
    Text(&'a str),
}

/// Sort `items` by a named field, or leave insertion (id) order when no
/// field was requested. A field the type doesn't have is an error the
/// pager shows in place of the table.
fn sort_by_field<'a, T, F>(
    items: &mut [&'a T],
    field: Option<&str>,
    direction: SortDirection,
    key_of: F,
) -> Result<(), StoreError>
where
    F: Fn(&'a T, &str) -> Option<SortKey<'a>>,
{
    let Some(field) = field else {
        return Ok(());
    };

    // Validate the field before committing to the sort.
    if let Some(&first) = items.first() {
        if key_of(first, field).is_none() {
            return Err(StoreError::UnknownSortField(field.to_string()));
        }
    }

    items.sort_by(|&a, &b| {
        let ord = match (key_of(a, field), key_of(b, field)) {
            (Some(SortKey::Number(x)), Some(SortKey::Number(y))) => x.cmp(&y),
            (Some(SortKey::Text(x)), Some(SortKey::Text(y))) => x.cmp(y),
            _ => std::cmp::Ordering::Equal,
        };
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> CatalogStore {
        CatalogStore::open(dir.path().join("catalog.json")).unwrap()
    }

    fn seeded(dir: &tempfile::TempDir) -> CatalogStore {
        let mut store = store_in(dir);
        let billing = store.create_module("Billing").unwrap();
        let auth = store.create_module("Auth").unwrap();
        store.add_entity(billing.id, "invoice", "Invoices").unwrap();
        store.add_entity(billing.id, "payment", "Payments").unwrap();
        store.add_entity(auth.id, "user", "Users").unwrap();
        store
    }

    #[test]
    fn open_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.query_modules(&PageState::default()).unwrap().is_empty());
    }

    #[test]
    fn create_module_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let mut store = CatalogStore::open(&path).unwrap();
        let module = store.create_module("Billing").unwrap();
        assert_eq!(module.id, 1);
        assert!(module.key.starts_with("mdc-"));

        let reopened = CatalogStore::open(&path).unwrap();
        assert_eq!(reopened.module(1).unwrap().title, "Billing");
    }

    #[test]
    fn corrupt_catalog_is_an_error_not_an_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            CatalogStore::open(&path),
            Err(StoreError::Parse(_))
        ));
    }

    #[test]
    fn remove_module_cascades_to_entities() {
        let dir = tempdir().unwrap();
        let mut store = seeded(&dir);

        let removed = store.remove_module(1).unwrap();
        assert_eq!(removed.title, "Billing");

        let mut state = PageState::default();
        state.filters.insert("module".to_string(), "1".to_string());
        assert!(store.query_entities(&state).unwrap().is_empty());
    }

    #[test]
    fn remove_missing_module_reports_not_found() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        assert!(matches!(
            store.remove_module(99),
            Err(StoreError::ModuleNotFound(99))
        ));
    }

    #[test]
    fn add_entity_requires_existing_module() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        assert!(matches!(
            store.add_entity(5, "invoice", "Invoices"),
            Err(StoreError::ModuleNotFound(5))
        ));
    }

    #[test]
    fn ensure_module_reuses_existing_title() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        let first = store.ensure_module("Billing").unwrap();
        let second = store.ensure_module("Billing").unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn remove_entity_returns_removed_count() {
        let dir = tempdir().unwrap();
        let mut store = seeded(&dir);
        assert_eq!(store.remove_entity(1, "invoice").unwrap(), 1);
        assert_eq!(store.remove_entity(1, "invoice").unwrap(), 0);
    }

    #[test]
    fn query_modules_counts_entities() {
        let dir = tempdir().unwrap();
        let store = seeded(&dir);

        let rows = store.query_modules(&PageState::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["title"], "Billing");
        assert_eq!(rows[0]["entities"], "2");
        assert_eq!(rows[1]["entities"], "1");
    }

    #[test]
    fn query_modules_sorts_by_title_desc() {
        let dir = tempdir().unwrap();
        let store = seeded(&dir);

        let mut state = PageState::default();
        state.sort_by = Some("title".to_string());
        state.sort_direction = SortDirection::Desc;

        let rows = store.query_modules(&state).unwrap();
        assert_eq!(rows[0]["title"], "Billing");
        assert_eq!(rows[1]["title"], "Auth");
    }

    #[test]
    fn query_modules_rejects_unknown_sort_field() {
        let dir = tempdir().unwrap();
        let store = seeded(&dir);

        let mut state = PageState::default();
        state.sort_by = Some("flavor".to_string());
        assert!(matches!(
            store.query_modules(&state),
            Err(StoreError::UnknownSortField(_))
        ));
    }

    #[test]
    fn query_entities_honors_module_filter() {
        let dir = tempdir().unwrap();
        let store = seeded(&dir);

        let mut state = PageState::default();
        state.filters.insert("module".to_string(), "1".to_string());

        let rows = store.query_entities(&state).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r["module"] == "Billing"));
    }

    #[test]
    fn query_entities_rejects_unknown_filter() {
        let dir = tempdir().unwrap();
        let store = seeded(&dir);

        let mut state = PageState::default();
        state.filters.insert("owner".to_string(), "x".to_string());
        assert!(matches!(
            store.query_entities(&state),
            Err(StoreError::UnknownFilter(_))
        ));
    }

    #[test]
    fn pagination_slices_and_high_pages_are_empty() {
        let dir = tempdir().unwrap();
        let store = seeded(&dir);

        let rows = store.query_entities(&PageState::new(1, 2)).unwrap();
        assert_eq!(rows.len(), 2);

        let rows = store.query_entities(&PageState::new(2, 2)).unwrap();
        assert_eq!(rows.len(), 1);

        let rows = store.query_entities(&PageState::new(9, 2)).unwrap();
        assert!(rows.is_empty());
    }
}
