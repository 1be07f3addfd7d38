//! Check orchestration
//!
//! Linear state machine with three hard exit gates:
//! skip? → no changed files? → snapshot missing? (fatal) → extract, decide
//! coverage, report. Every aggregate is built once per run; re-running on
//! identical inputs yields identical output.

use crate::error::CheckError;
use crate::extractor::{MigrationColumns, SchemaIndex};
use crate::report::{self, Report};
use std::path::PathBuf;

/// Marker token that disables the check when present in a commit message.
pub const SKIP_MARKER: &str = "[skip index_check]";

/// The three skip-gate signals. Any one being present skips the run;
/// they are OR-combined and short-circuit in declaration order.
#[derive(Debug, Default)]
pub struct SkipSignals {
    /// Message of the most recent commit, when available
    pub head_message: Option<String>,
    /// Messages of the base..head range; `None` when no base ref is known
    pub range_messages: Option<Vec<String>>,
    /// Explicit override (flag or environment)
    pub override_flag: bool,
}

/// Why a run was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    HeadMessage,
    RangeMessage,
    OverrideFlag,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::HeadMessage => {
                write!(f, "skip marker found in the latest commit message")
            }
            SkipReason::RangeMessage => {
                write!(f, "skip marker found in a commit message in the change range")
            }
            SkipReason::OverrideFlag => write!(f, "check disabled by explicit override"),
        }
    }
}

impl SkipSignals {
    /// Evaluate the gate. Signals are checked in order and the first match
    /// short-circuits the rest.
    pub fn should_skip(&self) -> Option<SkipReason> {
        if let Some(message) = &self.head_message {
            if message.contains(SKIP_MARKER) {
                return Some(SkipReason::HeadMessage);
            }
        }
        if let Some(messages) = &self.range_messages {
            if messages.iter().any(|m| m.contains(SKIP_MARKER)) {
                return Some(SkipReason::RangeMessage);
            }
        }
        if self.override_flag {
            return Some(SkipReason::OverrideFlag);
        }
        None
    }
}

/// One check invocation: the snapshot, the already-resolved changed files,
/// and whether to audit the whole schema instead.
#[derive(Debug)]
pub struct CheckRequest {
    pub schema_path: PathBuf,
    pub changed_files: Vec<PathBuf>,
    pub audit: bool,
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum Outcome {
    /// The skip gate fired; treated as success
    Skipped(SkipReason),
    /// No changed migration files; nothing to check
    NoChanges,
    /// Extraction and coverage ran to completion
    Checked(Report),
}

impl Outcome {
    /// Whether this outcome maps to a zero exit status.
    pub fn passed(&self) -> bool {
        match self {
            Outcome::Skipped(_) | Outcome::NoChanges => true,
            Outcome::Checked(report) => report.passed(),
        }
    }
}

/// Run the check end to end.
pub fn run(request: &CheckRequest, signals: &SkipSignals) -> Result<Outcome, CheckError> {
    if let Some(reason) = signals.should_skip() {
        log::info!("check skipped: {}", reason);
        return Ok(Outcome::Skipped(reason));
    }

    if !request.audit && request.changed_files.is_empty() {
        log::info!("no changed migration files; nothing to check");
        return Ok(Outcome::NoChanges);
    }

    let schema = SchemaIndex::from_file(&request.schema_path)?;

    let report = if request.audit {
        report::build_audit_report(&schema)
    } else {
        let mut candidates = MigrationColumns::new();
        for path in &request.changed_files {
            candidates.scan_file(path)?;
        }
        log::debug!(
            "collected {} foreign-key column(s) from {} changed file(s)",
            candidates.len(),
            request.changed_files.len()
        );
        report::build_report(&schema, &candidates)
    };

    Ok(Outcome::Checked(report))
}
