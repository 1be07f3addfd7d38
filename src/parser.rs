//! Line classifier for schema snapshots and migration files
//!
//! Both input formats are line-oriented Ruby DSL text. Rather than letting each
//! extractor carry its own patterns, every recognized line shape is classified
//! here into a typed [`Statement`], and the extractors consume that stream.
//! Lines that match no pattern classify to `None` and are skipped by callers.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Declared column type, parsed from the per-type declaration keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Bigint,
    Integer,
    Uuid,
    StringType,
    /// `references` / `belongs_to` association shorthand
    Reference,
    /// Any other declaration keyword, kept verbatim for diagnostics
    Other(String),
}

impl ColumnType {
    /// Map a declaration keyword to its type.
    pub fn from_token(token: &str) -> Self {
        match token {
            "bigint" => ColumnType::Bigint,
            "integer" => ColumnType::Integer,
            "uuid" => ColumnType::Uuid,
            "string" => ColumnType::StringType,
            "references" | "belongs_to" => ColumnType::Reference,
            other => ColumnType::Other(other.to_string()),
        }
    }

    /// The literal type token as it appears in declarations.
    pub fn token(&self) -> &str {
        match self {
            ColumnType::Bigint => "bigint",
            ColumnType::Integer => "integer",
            ColumnType::Uuid => "uuid",
            ColumnType::StringType => "string",
            ColumnType::Reference => "references",
            ColumnType::Other(token) => token,
        }
    }

    /// Whether this type alone marks a column as foreign-key shaped.
    pub fn is_foreign_key_type(&self) -> bool {
        matches!(
            self,
            ColumnType::Bigint | ColumnType::Integer | ColumnType::Uuid | ColumnType::Reference
        )
    }
}

/// One classified line of schema or migration text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `create_table :users do |t|` — opens a table block
    CreateTable { table: String },
    /// `t.bigint :company_id` — column declaration inside a table block
    Column { name: String, kind: ColumnType },
    /// `t.index ["company_id"], name: "..."` — index inside a table block
    InlineIndex { columns: Vec<String> },
    /// `add_index :users, :company_id` — standalone index with explicit table
    AddIndex { table: String, columns: Vec<String> },
    /// `end` — closes the innermost block
    EndTable,
    /// `add_column :users, :company_id, :bigint`
    AddColumn {
        table: String,
        column: String,
        kind: ColumnType,
    },
    /// `change_column :users, :company_id, :bigint`
    ChangeColumn {
        table: String,
        column: String,
        kind: ColumnType,
    },
}

// Name literals appear as `:symbol` or `"string"`; every pattern accepts both.
static CREATE_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*create_table[\s(]+(?::(\w+)|"([^"]+)")"#).unwrap());
static END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*end\s*$").unwrap());
static INLINE_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*t\.index[\s(]+(.+)$").unwrap());
static COLUMN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*t\.(\w+)[\s(]+(?::(\w+)|"([^"]+)")"#).unwrap());
static ADD_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*add_index[\s(]+(?::(\w+)|"([^"]+)")\s*,\s*(.+)$"#).unwrap());
static ADD_COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*add_column[\s(]+(?::(\w+)|"([^"]+)")\s*,\s*(?::(\w+)|"([^"]+)")\s*,\s*(?::(\w+)|"([^"]+)")"#,
    )
    .unwrap()
});
static CHANGE_COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*change_column[\s(]+(?::(\w+)|"([^"]+)")\s*,\s*(?::(\w+)|"([^"]+)")\s*,\s*(?::(\w+)|"([^"]+)")"#,
    )
    .unwrap()
});
static BRACKET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]").unwrap());
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#":(\w+)|"([^"]+)""#).unwrap());

/// Extract the name literal captured at group `i` (symbol) or `i + 1` (string).
fn name_at(caps: &Captures, i: usize) -> Option<String> {
    caps.get(i)
        .or_else(|| caps.get(i + 1))
        .map(|m| m.as_str().to_string())
}

/// Parse the column list of an index declaration.
///
/// Supports a bracketed list (`["a", "b"]` / `[:a, :b]`) for composite indexes
/// and a single bare literal (`:a` / `"a"`) for single-column indexes. Options
/// after the list (`name:`, `unique:`) are ignored; with a bracketed list they
/// are never scanned, so an index name cannot leak in as a column.
fn parse_index_columns(rest: &str) -> Vec<String> {
    if let Some(caps) = BRACKET_RE.captures(rest) {
        let inner = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        return NAME_RE
            .captures_iter(inner)
            .filter_map(|c| name_at(&c, 1))
            .collect();
    }
    NAME_RE
        .captures(rest)
        .and_then(|c| name_at(&c, 1))
        .into_iter()
        .collect()
}

/// Classify a single line, or `None` if it matches no recognized shape.
pub fn classify(line: &str) -> Option<Statement> {
    if let Some(caps) = CREATE_TABLE_RE.captures(line) {
        return Some(Statement::CreateTable {
            table: name_at(&caps, 1)?,
        });
    }
    if END_RE.is_match(line) {
        return Some(Statement::EndTable);
    }
    if let Some(caps) = INLINE_INDEX_RE.captures(line) {
        let columns = parse_index_columns(caps.get(1)?.as_str());
        if columns.is_empty() {
            return None;
        }
        return Some(Statement::InlineIndex { columns });
    }
    if let Some(caps) = ADD_INDEX_RE.captures(line) {
        let table = name_at(&caps, 1)?;
        let columns = parse_index_columns(caps.get(3)?.as_str());
        if columns.is_empty() {
            return None;
        }
        return Some(Statement::AddIndex { table, columns });
    }
    if let Some(caps) = ADD_COLUMN_RE.captures(line) {
        return Some(Statement::AddColumn {
            table: name_at(&caps, 1)?,
            column: name_at(&caps, 3)?,
            kind: ColumnType::from_token(&name_at(&caps, 5)?),
        });
    }
    if let Some(caps) = CHANGE_COLUMN_RE.captures(line) {
        return Some(Statement::ChangeColumn {
            table: name_at(&caps, 1)?,
            column: name_at(&caps, 3)?,
            kind: ColumnType::from_token(&name_at(&caps, 5)?),
        });
    }
    if let Some(caps) = COLUMN_RE.captures(line) {
        let keyword = caps.get(1)?.as_str();
        // `t.index` is handled above; anything else with a name argument is a column
        if keyword == "index" {
            return None;
        }
        return Some(Statement::Column {
            name: name_at(&caps, 2)?,
            kind: ColumnType::from_token(keyword),
        });
    }
    None
}

/// True when a line looks like an index declaration, whether or not it parsed.
///
/// Used by the schema extractor to emit a debug note for index lines whose
/// column list could not be extracted.
pub fn looks_like_index(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("add_index") || trimmed.starts_with("t.index")
}
