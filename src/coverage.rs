//! Coverage checker
//!
//! Pure lookups against the [`SchemaIndex`] aggregate. A column is covered
//! when it appears, in any position, in at least one declared index on its
//! table. Any-position membership is a deliberate, documented relaxation:
//! a composite index whose leading column differs from the queried column
//! may not actually serve the lookup, but such schemas were accepted
//! intentionally and tightening the rule would newly fail them.

use crate::extractor::SchemaIndex;

/// Decision artifact for one `(table, column)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageResult {
    pub table: String,
    pub column: String,
    pub covered: bool,
}

/// Decide coverage for a single column. O(1) exact-membership lookup;
/// never substring matching.
pub fn check(schema: &SchemaIndex, table: &str, column: &str) -> CoverageResult {
    CoverageResult {
        table: table.to_string(),
        column: column.to_string(),
        covered: schema.covered(table, column),
    }
}

/// Decide coverage for every retained snapshot column (audit mode).
pub fn audit(schema: &SchemaIndex) -> Vec<CoverageResult> {
    schema
        .all_columns()
        .map(|(table, column, _)| check(schema, table, column))
        .collect()
}
