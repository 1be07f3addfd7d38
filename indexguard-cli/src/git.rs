//! Git collaborators
//!
//! Thin wrappers around the `git` binary: changed-file discovery for the
//! migrations directory and commit-message retrieval for the skip gate.
//! The availability probe doubles as the unsupported-environment check;
//! a run that needs discovery but has no usable git aborts up front.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::process::Command;

/// Verify that the `git` binary can run at all.
pub fn ensure_available() -> Result<()> {
    match Command::new("git").arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => bail!(
            "`git --version` failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        Err(e) => bail!("git is not available in this environment: {}", e),
    }
}

/// Run a git command and capture stdout.
fn run_git(args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .output()
        .with_context(|| format!("failed to run git {}", args.join(" ")))?;
    if !output.status.success() {
        bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// List changed migration files between `base` and `head`.
///
/// With no base reference only the head commit's own files are listed.
/// Results are filtered to `.rb` files under the migrations directory.
pub fn changed_migration_files(
    base: Option<&str>,
    head: &str,
    migrations_dir: &str,
) -> Result<Vec<PathBuf>> {
    let stdout = match base {
        Some(base) => run_git(&["diff", "--name-only", &format!("{}...{}", base, head)])?,
        None => run_git(&["show", "--name-only", "--pretty=format:", head])?,
    };
    Ok(filter_migration_paths(&stdout, migrations_dir))
}

/// Keep only migration-shaped paths from a newline-separated file list.
fn filter_migration_paths(file_list: &str, migrations_dir: &str) -> Vec<PathBuf> {
    let prefix = format!("{}/", migrations_dir.trim_end_matches('/'));
    file_list
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(&prefix) && line.ends_with(".rb"))
        .map(PathBuf::from)
        .collect()
}

/// Full message of the head commit.
pub fn head_commit_message(head: &str) -> Result<String> {
    run_git(&["log", "-1", "--pretty=%B", head])
}

/// Full messages of every commit in `base..head`, one entry per commit.
pub fn range_commit_messages(base: &str, head: &str) -> Result<Vec<String>> {
    let hashes = run_git(&["rev-list", &format!("{}..{}", base, head)])?;
    let mut messages = Vec::new();
    for hash in hashes.lines().map(str::trim).filter(|h| !h.is_empty()) {
        messages.push(run_git(&["log", "-1", "--pretty=%B", hash])?);
    }
    Ok(messages)
}
