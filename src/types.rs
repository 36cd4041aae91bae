//! Domain types for modctl.
//!
//! The catalog tracks application modules and the schema entities
//! (tables) that belong to each of them. Everything here is plain
//! data; behavior lives in `store` and `pager`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// CATALOG ROWS
// ============================================================================

/// An application module registered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Numeric identifier, assigned by the store.
    pub id: u64,
    /// Opaque unique key ("mdc-<hex>"), assigned at creation.
    pub key: String,
    /// Human-readable module title.
    pub title: String,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
}

/// A schema entity (table) owned by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Numeric identifier, assigned by the store.
    pub id: u64,
    /// Owning module id.
    pub module_id: u64,
    /// Table name. Unique within a module.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
}

/// The persisted catalog: all modules and entities plus id counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog format version.
    pub version: u32,
    /// Next module id to hand out.
    pub next_module_id: u64,
    /// Next entity id to hand out.
    pub next_entity_id: u64,
    /// All registered modules.
    pub modules: Vec<Module>,
    /// All registered entities.
    pub entities: Vec<Entity>,
}

// ============================================================================
// QUERY PRIMITIVES
// ============================================================================

/// Sort direction for paged queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortDirection {
    /// Ascending (the default).
    #[default]
    #[value(alias = "ASC")]
    Asc,
    /// Descending.
    #[value(alias = "DESC")]
    Desc,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// One displayable row: column key → display value.
///
/// The pager never interprets rows; rendering order comes from the
/// column spec supplied alongside them.
pub type Row = BTreeMap<String, String>;
