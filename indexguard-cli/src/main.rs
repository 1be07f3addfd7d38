//! indexguard CLI
//!
//! Command-line front end for the index check. Resolves configuration from
//! flags, environment and the optional config file, discovers changed
//! migration files through git, runs the core check and maps the outcome to
//! a process exit status: 0 for clean or skipped, 1 for violations or a
//! fatal precondition failure.

mod git;

use clap::Parser;
use colored::Colorize;
use indexguard::report::Report;
use indexguard::{CheckConfig, CheckRequest, Outcome, SkipSignals};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "indexguard")]
#[command(about = "Detect foreign-key columns without a supporting index")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the schema snapshot (overrides INDEXGUARD_SCHEMA_PATH)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Migrations directory used for changed-file filtering
    #[arg(long)]
    migrations_dir: Option<PathBuf>,

    /// Explicit changed migration files; bypasses git discovery
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Check every schema column instead of only changed ones
    #[arg(long)]
    audit: bool,

    /// Skip the check entirely (explicit override signal)
    #[arg(long)]
    skip: bool,

    /// Base reference of the change range (enables range skip-marker scan)
    #[arg(long)]
    base_ref: Option<String>,

    /// Head reference of the change range (default: HEAD)
    #[arg(long)]
    head_ref: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let config = match CheckConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "❌ Error:".red(), e);
            process::exit(1);
        }
    };

    // Initialize logging
    if cli.quiet {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();
    } else if cli.verbose || config.debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    // Flags override environment/file configuration
    let schema_path = cli
        .schema
        .unwrap_or_else(|| PathBuf::from(&config.schema_path));
    let migrations_dir = cli
        .migrations_dir
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| config.migrations_dir.clone());
    let skip_flag = cli.skip || config.skip;
    let base_ref = cli.base_ref.or_else(|| config.base_ref.clone());
    let head_ref = cli
        .head_ref
        .or_else(|| config.head_ref.clone())
        .unwrap_or_else(|| "HEAD".to_string());

    let (changed_files, signals) = match resolve_inputs(
        &cli.files,
        cli.audit,
        skip_flag,
        base_ref.as_deref(),
        &head_ref,
        &migrations_dir,
    ) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("{} {}", "❌ Error:".red(), e);
            process::exit(1);
        }
    };

    let request = CheckRequest {
        schema_path,
        changed_files,
        audit: cli.audit,
    };

    match indexguard::run(&request, &signals) {
        Ok(Outcome::Skipped(reason)) => {
            if !cli.quiet {
                println!("{} {}", "✅ Check skipped:".green(), reason);
            }
            process::exit(0);
        }
        Ok(Outcome::NoChanges) => {
            if !cli.quiet {
                println!("{}", "✅ No migration changes detected".green());
            }
            process::exit(0);
        }
        Ok(Outcome::Checked(report)) => {
            print_report(&report, cli.quiet);
            process::exit(if report.passed() { 0 } else { 1 });
        }
        Err(e) => {
            eprintln!("{} {}", "❌ Error:".red(), e);
            process::exit(1);
        }
    }
}

/// Resolve changed files and skip-gate signals.
///
/// Explicit file arguments bypass git entirely; otherwise git must be
/// runnable and supplies both the changed-file list and the commit messages
/// the skip gate inspects.
fn resolve_inputs(
    explicit_files: &[PathBuf],
    audit: bool,
    skip_flag: bool,
    base_ref: Option<&str>,
    head_ref: &str,
    migrations_dir: &str,
) -> anyhow::Result<(Vec<PathBuf>, SkipSignals)> {
    if !explicit_files.is_empty() {
        let signals = SkipSignals {
            override_flag: skip_flag,
            ..SkipSignals::default()
        };
        return Ok((explicit_files.to_vec(), signals));
    }

    if audit {
        // Audit walks the snapshot; no discovery needed
        let signals = SkipSignals {
            override_flag: skip_flag,
            ..SkipSignals::default()
        };
        return Ok((Vec::new(), signals));
    }

    git::ensure_available()?;

    let head_message = git::head_commit_message(head_ref)?;
    let range_messages = match base_ref {
        Some(base) => Some(git::range_commit_messages(base, head_ref)?),
        None => None,
    };
    let changed = git::changed_migration_files(base_ref, head_ref, migrations_dir)?;
    log::debug!("discovered {} changed migration file(s)", changed.len());

    let signals = SkipSignals {
        head_message: Some(head_message),
        range_messages,
        override_flag: skip_flag,
    };
    Ok((changed, signals))
}

/// Print the report with per-violation highlighting and the ✅/❌ summary.
fn print_report(report: &Report, quiet: bool) {
    for violation in &report.violations {
        let text = violation.render();
        let mut lines = text.lines();
        if let Some(headline) = lines.next() {
            println!("{}", headline.red().bold());
        }
        for line in lines {
            println!("{}", line);
        }
        println!();
    }

    if let Some(trailer) = report.trailer() {
        println!("{}", trailer.yellow());
        println!();
    }
    if let Some(summary) = report.summary() {
        println!("{}", summary);
    }

    if report.passed() {
        if !quiet {
            println!("{}", "✅ No missing indexes detected".green());
        }
    } else {
        println!(
            "{}",
            format!("❌ {} missing index(es) found", report.violations.len()).red()
        );
    }
}
