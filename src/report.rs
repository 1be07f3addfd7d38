//! Diagnostic reporting
//!
//! Turns coverage decisions into human-readable violation records. Plain
//! foreign-key columns get a single-column `add_index` suggestion; columns
//! participating in a polymorphic pair always get the composite
//! `[<base>_type, <base>_id]` form, even if the `_id` column alone happens
//! to be indexed elsewhere.

use crate::coverage;
use crate::extractor::{MigrationColumns, SchemaIndex};
use crate::parser::ColumnType;
use std::fmt::Write;

/// Human-readable description for a declared column type.
pub fn describe_type(kind: &ColumnType) -> &str {
    match kind {
        ColumnType::Bigint => "64-bit integer typically used for foreign keys",
        ColumnType::Integer => "32-bit integer commonly used for foreign keys",
        ColumnType::Reference => "ORM-level reference/association declaration",
        ColumnType::Uuid => "Universally Unique Identifier",
        other => other.token(),
    }
}

/// One uncovered foreign-key shaped column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub table: String,
    pub column: String,
    /// Literal declared type of the column
    pub kind: ColumnType,
    /// Association base name when the column is half of a polymorphic pair
    pub polymorphic: Option<String>,
}

impl Violation {
    /// The remedial migration statement to suggest.
    pub fn suggested_fix(&self) -> String {
        match &self.polymorphic {
            Some(base) => format!(
                "add_index :{}, [:{}_type, :{}_id]",
                self.table, base, base
            ),
            None => format!("add_index :{}, :{}", self.table, self.column),
        }
    }

    /// Render the full diagnostic block for this violation.
    pub fn render(&self) -> String {
        let mut out = String::new();
        match &self.polymorphic {
            Some(base) => {
                let _ = writeln!(
                    out,
                    "Missing index on polymorphic association `{}` (table `{}`, columns `{}_type` + `{}_id`)",
                    base, self.table, base, base
                );
                let _ = writeln!(
                    out,
                    "  Effective type: polymorphic (declared {})",
                    self.kind.token()
                );
                let _ = writeln!(
                    out,
                    "  Polymorphic associations are looked up by type and id together;"
                );
                let _ = writeln!(out, "  a single-column index does not serve those queries.");
            }
            None => {
                let _ = writeln!(
                    out,
                    "Missing index on `{}`.`{}`",
                    self.table, self.column
                );
                let _ = writeln!(
                    out,
                    "  Declared type: {} ({})",
                    self.kind.token(),
                    describe_type(&self.kind)
                );
            }
        }
        let _ = writeln!(out, "  Suggested fix:");
        let _ = writeln!(out, "    {}", self.suggested_fix());
        out
    }
}

/// Aggregated outcome of one check run.
#[derive(Debug, Default)]
pub struct Report {
    pub violations: Vec<Violation>,
    /// Total foreign-key columns inspected
    pub inspected: usize,
    /// How many of them were covered
    pub covered: usize,
    /// Whether this report walked the whole schema rather than changed files
    pub audit: bool,
}

impl Report {
    /// The run passes only when no violation was recorded.
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Fixed explanatory trailer, present whenever violations were recorded.
    pub fn trailer(&self) -> Option<&'static str> {
        if self.violations.is_empty() {
            return None;
        }
        Some(
            "Foreign-key columns without an index force full-table scans on joins\n\
             and lookups. Add the suggested index in a follow-up migration, or mark\n\
             the commit with `[skip index_check]` if this is intentional.",
        )
    }

    /// Audit-mode coverage summary line.
    pub fn summary(&self) -> Option<String> {
        if !self.audit {
            return None;
        }
        Some(format!(
            "Audit: {} foreign-key column(s) inspected, {} covered, {} missing an index",
            self.inspected,
            self.covered,
            self.inspected - self.covered
        ))
    }

    /// Render the full diagnostic text, one block per violation plus the
    /// fixed explanatory trailer and, in audit mode, the coverage summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for violation in &self.violations {
            out.push_str(&violation.render());
            out.push('\n');
        }
        if let Some(trailer) = self.trailer() {
            let _ = writeln!(out, "{}", trailer);
        }
        if let Some(summary) = self.summary() {
            let _ = writeln!(out, "{}", summary);
        }
        out
    }
}

/// Build the report for the changed-file path: every collected migration
/// column is checked against the snapshot's index declarations.
pub fn build_report(schema: &SchemaIndex, candidates: &MigrationColumns) -> Report {
    let mut report = Report::default();
    for (table, column, kind) in candidates.iter() {
        report.inspected += 1;
        let result = coverage::check(schema, table, column);
        if result.covered {
            report.covered += 1;
            continue;
        }
        let polymorphic = schema
            .column(table, column)
            .and_then(|decl| decl.polymorphic.clone());
        report.violations.push(Violation {
            table: table.to_string(),
            column: column.to_string(),
            kind: kind.clone(),
            polymorphic,
        });
    }
    report.violations.sort_by(|a, b| {
        (&a.table, &a.column).cmp(&(&b.table, &b.column))
    });
    report
}

/// Build the audit report over every retained snapshot column.
pub fn build_audit_report(schema: &SchemaIndex) -> Report {
    let mut report = Report {
        audit: true,
        ..Report::default()
    };
    for (table, column, decl) in schema.all_columns() {
        report.inspected += 1;
        if schema.covered(table, column) {
            report.covered += 1;
            continue;
        }
        report.violations.push(Violation {
            table: table.to_string(),
            column: column.to_string(),
            kind: decl.kind.clone(),
            polymorphic: decl.polymorphic.clone(),
        });
    }
    report
}
