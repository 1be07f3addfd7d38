//! # indexguard
//!
//! Static analysis for Rails-style schemas: finds foreign-key shaped columns
//! (suffix `_id`) touched by changed migrations that have no supporting index
//! in the consolidated schema snapshot.
//!
//! The core is a line classifier over the schema DSL ([`parser`]), two
//! extraction passes ([`extractor`]), an O(1) coverage lookup ([`coverage`]),
//! and a diagnostic reporter ([`report`]), wired together by [`runner`].
//! Git discovery, flags and colored output live in the `indexguard-cli`
//! workspace member.

pub mod config;
pub mod coverage;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod report;
pub mod runner;

pub use config::CheckConfig;
pub use error::CheckError;
pub use runner::{run, CheckRequest, Outcome, SkipReason, SkipSignals, SKIP_MARKER};
