//! Schema extractor
//!
//! Builds the per-run index-coverage aggregate from the consolidated schema
//! snapshot in a single forward pass: declared index membership (exact
//! `table:column`, any position), raw composite groupings for audit text,
//! and every retained `_id` column with its declared type. When a table
//! block closes, its columns are inspected for polymorphic pairs — a
//! `<base>_id` column with a `<base>_type` sibling is tagged with the
//! association base name, preserving the literal declared type underneath.

use crate::error::CheckError;
use crate::parser::{self, ColumnType, Statement};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use super::migration::normalize_column_name;

/// A retained foreign-key shaped column from the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    /// Literal declared type
    pub kind: ColumnType,
    /// Association base name when part of a polymorphic pair
    pub polymorphic: Option<String>,
}

/// Index coverage aggregate, built once per run and read-only afterwards.
#[derive(Debug, Default)]
pub struct SchemaIndex {
    /// Exact `(table, column)` membership across all declared indexes
    indexed: HashSet<(String, String)>,
    /// Raw per-table index groupings, order preserved (audit text only)
    indexes: HashMap<String, Vec<Vec<String>>>,
    /// Retained `_id` columns, ordered for deterministic audit output
    columns: BTreeMap<(String, String), SchemaColumn>,
}

impl SchemaIndex {
    /// Build the aggregate from the snapshot file.
    ///
    /// A missing snapshot is fatal: without it no coverage decision is sound.
    pub fn from_file(path: &Path) -> Result<Self, CheckError> {
        if !path.exists() {
            return Err(CheckError::SchemaNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path).map_err(|e| CheckError::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Ok(Self::from_str(&content))
    }

    /// Build the aggregate from snapshot text.
    pub fn from_str(content: &str) -> Self {
        let mut schema = SchemaIndex::default();
        let mut current_table: Option<String> = None;
        // All columns of the open block, used for polymorphic detection
        let mut block_columns: Vec<(String, ColumnType)> = Vec::new();

        for line in content.lines() {
            match parser::classify(line) {
                Some(Statement::CreateTable { table }) => {
                    log::debug!("schema: entering table block `{}`", table);
                    current_table = Some(table);
                    block_columns.clear();
                }
                Some(Statement::Column { name, kind }) => {
                    if current_table.is_some() {
                        let column = normalize_column_name(&name, &kind);
                        block_columns.push((column, kind));
                    }
                }
                Some(Statement::InlineIndex { columns }) => {
                    if let Some(table) = current_table.clone() {
                        schema.record_index(table, columns);
                    }
                }
                Some(Statement::AddIndex { table, columns }) => {
                    schema.record_index(table, columns);
                }
                Some(Statement::EndTable) => {
                    if let Some(table) = current_table.take() {
                        schema.close_table(table, &block_columns);
                        block_columns.clear();
                    }
                }
                Some(Statement::AddColumn { .. }) | Some(Statement::ChangeColumn { .. }) => {
                    // Snapshots are fully consolidated; incremental statements
                    // do not appear and are ignored if they do
                }
                None => {
                    if parser::looks_like_index(line) {
                        log::debug!("schema: skipping unparseable index line: {}", line.trim());
                    }
                }
            }
        }

        schema
    }

    fn record_index(&mut self, table: String, columns: Vec<String>) {
        log::debug!("schema: index on `{}` over {:?}", table, columns);
        for column in &columns {
            self.indexed.insert((table.clone(), column.clone()));
        }
        self.indexes.entry(table).or_default().push(columns);
    }

    /// Finalize a closed table block: retain `_id` columns and classify
    /// polymorphic pairs by sibling `_type` column.
    fn close_table(&mut self, table: String, block_columns: &[(String, ColumnType)]) {
        let names: HashSet<&str> = block_columns.iter().map(|(n, _)| n.as_str()).collect();
        for (column, kind) in block_columns {
            let Some(base) = column.strip_suffix("_id") else {
                continue;
            };
            if base.is_empty() {
                continue;
            }
            let sibling = format!("{}_type", base);
            let polymorphic = names.contains(sibling.as_str()).then(|| base.to_string());
            if polymorphic.is_some() {
                log::debug!(
                    "schema: polymorphic pair `{}` on `{}` ({} + {})",
                    base,
                    table,
                    sibling,
                    column
                );
            }
            self.columns.insert(
                (table.clone(), column.clone()),
                SchemaColumn {
                    kind: kind.clone(),
                    polymorphic,
                },
            );
        }
    }

    /// Exact-membership coverage lookup: true when the column appears in any
    /// declared index on its table, in any position.
    pub fn covered(&self, table: &str, column: &str) -> bool {
        self.indexed
            .contains(&(table.to_string(), column.to_string()))
    }

    /// Retained snapshot declaration for a column, if any.
    pub fn column(&self, table: &str, column: &str) -> Option<&SchemaColumn> {
        self.columns.get(&(table.to_string(), column.to_string()))
    }

    /// All retained `_id` columns, in deterministic order.
    pub fn all_columns(&self) -> impl Iterator<Item = (&str, &str, &SchemaColumn)> {
        self.columns
            .iter()
            .map(|((table, column), decl)| (table.as_str(), column.as_str(), decl))
    }

    /// Declared index groupings for a table, order preserved.
    pub fn indexes_for(&self, table: &str) -> &[Vec<String>] {
        self.indexes.get(table).map(|v| v.as_slice()).unwrap_or(&[])
    }
}
