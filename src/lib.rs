//! modctl: admin CLI for a catalog of application modules and their
//! schema entities.

pub mod pager;
pub mod prompt;
pub mod schema;
pub mod store;
pub mod types;
