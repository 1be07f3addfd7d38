//! Change-log extractor
//!
//! Scans changed migration files and collects the foreign-key shaped columns
//! they touch. Only columns whose final name ends in `_id` are retained;
//! association shorthand (`references` / `belongs_to`) is rewritten to its
//! implicit `_id` column first. Re-declarations of the same `table:column`
//! overwrite earlier ones, so only the final declared type is checked.

use crate::error::CheckError;
use crate::parser::{self, ColumnType, Statement};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Columns collected from the changed migration files, keyed by
/// `(table, column)` with last-write-wins semantics.
#[derive(Debug, Default)]
pub struct MigrationColumns {
    columns: HashMap<(String, String), ColumnType>,
}

impl MigrationColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan one migration file.
    ///
    /// Unreadable files are fatal; a file the caller told us changed but that
    /// cannot be read means the run cannot make a sound decision.
    pub fn scan_file(&mut self, path: &Path) -> Result<(), CheckError> {
        let content = fs::read_to_string(path).map_err(|e| CheckError::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        self.scan_lines(&content);
        Ok(())
    }

    /// Scan migration text line by line.
    ///
    /// Lines matching no recognized statement are skipped silently.
    pub fn scan_lines(&mut self, content: &str) {
        let mut current_table: Option<String> = None;

        for line in content.lines() {
            match parser::classify(line) {
                Some(Statement::CreateTable { table }) => {
                    log::debug!("migration: entering table block `{}`", table);
                    current_table = Some(table);
                }
                Some(Statement::EndTable) => {
                    current_table = None;
                }
                Some(Statement::Column { name, kind }) => {
                    // Inside a block only foreign-key-typed declarations count
                    if let Some(table) = current_table.clone() {
                        if kind.is_foreign_key_type() {
                            let column = normalize_column_name(&name, &kind);
                            self.retain(table, column, kind);
                        }
                    }
                }
                Some(Statement::AddColumn { table, column, kind })
                | Some(Statement::ChangeColumn { table, column, kind }) => {
                    // Explicit-table statements carry the type positionally;
                    // record any type so a later conversion can overwrite it
                    self.retain(table, column, kind);
                }
                Some(Statement::InlineIndex { .. })
                | Some(Statement::AddIndex { .. })
                | None => {}
            }
        }
    }

    /// Keep a candidate if its column name is foreign-key shaped.
    fn retain(&mut self, table: String, column: String, kind: ColumnType) {
        if !column.ends_with("_id") {
            return;
        }
        log::debug!(
            "migration: candidate {}.{} ({})",
            table,
            column,
            kind.token()
        );
        self.columns.insert((table, column), kind);
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Iterate collected `(table, column, type)` entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &ColumnType)> {
        self.columns
            .iter()
            .map(|((table, column), kind)| (table.as_str(), column.as_str(), kind))
    }

    /// Declared type for a collected column, if present.
    pub fn get(&self, table: &str, column: &str) -> Option<&ColumnType> {
        self.columns
            .get(&(table.to_string(), column.to_string()))
    }
}

/// Rewrite association shorthand to its implicit `_id` column name.
pub fn normalize_column_name(name: &str, kind: &ColumnType) -> String {
    match kind {
        ColumnType::Reference => format!("{}_id", name),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_fk_columns_inside_table_block() {
        let mut cols = MigrationColumns::new();
        cols.scan_lines(
            "class CreateUsers < ActiveRecord::Migration[7.0]\n\
             \x20 def change\n\
             \x20   create_table :users do |t|\n\
             \x20     t.bigint :company_id\n\
             \x20     t.string :email\n\
             \x20   end\n\
             \x20 end\n\
             end\n",
        );
        assert_eq!(cols.len(), 1);
        assert_eq!(cols.get("users", "company_id"), Some(&ColumnType::Bigint));
    }

    #[test]
    fn test_references_shorthand_rewritten_to_id_column() {
        let mut cols = MigrationColumns::new();
        cols.scan_lines(
            "create_table :posts do |t|\n\
             \x20 t.references :author\n\
             end\n",
        );
        assert_eq!(cols.get("posts", "author_id"), Some(&ColumnType::Reference));
    }

    #[test]
    fn test_non_id_columns_discarded() {
        let mut cols = MigrationColumns::new();
        cols.scan_lines(
            "create_table :users do |t|\n\
             \x20 t.bigint :login_count\n\
             end\n",
        );
        assert!(cols.is_empty());
    }

    #[test]
    fn test_add_column_outside_block_keyed_by_explicit_table() {
        let mut cols = MigrationColumns::new();
        cols.scan_lines("add_column :users, :company_id, :bigint\n");
        assert_eq!(cols.get("users", "company_id"), Some(&ColumnType::Bigint));
    }

    #[test]
    fn test_last_write_wins_across_statements() {
        let mut cols = MigrationColumns::new();
        cols.scan_lines("add_column :albums, :comment_id, :string\n");
        cols.scan_lines("change_column :albums, :comment_id, :bigint\n");
        assert_eq!(cols.len(), 1);
        assert_eq!(cols.get("albums", "comment_id"), Some(&ColumnType::Bigint));
    }

    #[test]
    fn test_string_column_inside_block_is_not_a_candidate() {
        // Plain `t.string :foo_id` is not a recognized FK declaration; only
        // the explicit-table statements record arbitrary types.
        let mut cols = MigrationColumns::new();
        cols.scan_lines(
            "create_table :albums do |t|\n\
             \x20 t.string :comment_id\n\
             end\n",
        );
        assert!(cols.is_empty());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let mut cols = MigrationColumns::new();
        cols.scan_lines("this is not a migration statement\nt.bigint\n");
        assert!(cols.is_empty());
    }

    #[test]
    fn test_scan_file_missing_is_fatal() {
        let mut cols = MigrationColumns::new();
        let result = cols.scan_file(Path::new("/nonexistent/migration.rb"));
        assert!(matches!(result, Err(CheckError::FileRead { .. })));
    }
}
