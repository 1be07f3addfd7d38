//! Extraction passes over migration files and the schema snapshot
//!
//! Both extractors consume the [`crate::parser`] statement stream with the
//! same current-table scan state. The migration pass collects foreign-key
//! shaped columns touched by changed files; the schema pass builds the
//! index-coverage aggregate consulted for every one of them.

pub mod migration;
pub mod schema;

pub use migration::MigrationColumns;
pub use schema::{SchemaColumn, SchemaIndex};
