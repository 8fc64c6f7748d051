//! CLI argument parsing via `clap`.

use crate::models::Severity;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hookshift",
    version,
    about = "Migrate plugin hooks across API signature changes",
    long_about = "Hookshift compiles old → new hook signatures into match/replace rules, scans plugin sources for outdated hooks and rewrites them while keeping your parameter names.\n\nConfiguration precedence: CLI > hookshift.toml > defaults.",
    after_help = "Examples:\n  hookshift scan --rules hooks.toml\n  hookshift fix --rules hooks.json --diff\n  hookshift report --diagnostics analyzer.json --min-severity warning\n  hookshift rules --output json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Args, Clone, Default)]
/// Options shared by every command that loads rules.
pub struct Common {
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, help = "Hook file with old/new signatures (.toml|.yaml|.json)")]
    pub rules: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current hookshift version.")]
    Version,
    /// Scan sources for outdated hooks
    #[command(
        about = "Scan sources for outdated hooks",
        long_about = "Apply every compiled rule to the files matched by the configured patterns. Exits non-zero when any finding reaches --min-severity.",
        after_help = "Examples:\n  hookshift scan --rules hooks.toml\n  hookshift scan --pattern 'plugins/**/*.cs' --min-severity warning --output json"
    )]
    Scan {
        #[command(flatten)]
        common: Common,
        #[arg(long = "pattern", help = "Glob of files to scan, relative to the repo root (repeatable)")]
        patterns: Vec<String>,
        #[arg(long, help = "Lowest severity to report: error|warning|info (default: error)")]
        min_severity: Option<Severity>,
    },
    /// Rewrite outdated hooks
    #[command(
        about = "Rewrite outdated hooks",
        long_about = "Replace outdated hook signatures with their new form. When --diff or --check is set, write is disabled. Removed hooks are only stripped with --strip.",
        after_help = "Examples:\n  hookshift fix --diff\n  hookshift fix --write\n  hookshift fix --check"
    )]
    Fix {
        #[command(flatten)]
        common: Common,
        #[arg(long = "pattern", help = "Glob of files to fix, relative to the repo root (repeatable)")]
        patterns: Vec<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Write changes to files")]
        write: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Show diffs for changed files (implies write=false)")]
        diff: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if changes would occur (implies write=false)")]
        check: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Also delete matches of removed hooks")]
        strip: bool,
    },
    /// Map external analyzer diagnostics onto rules
    #[command(
        about = "Report external diagnostics",
        long_about = "Read a JSON array of analyzer diagnostics ({id, hook?, severity, message, file?, line, column}), attach rule messages and severities, and print the ones at or above --min-severity.",
        after_help = "Examples:\n  hookshift report --diagnostics build/analyzer.json"
    )]
    Report {
        #[command(flatten)]
        common: Common,
        #[arg(long, help = "Path to the diagnostics JSON file (required)")]
        diagnostics: String,
        #[arg(long, help = "Lowest severity to report: error|warning|info (default: error)")]
        min_severity: Option<Severity>,
    },
    /// List compiled rules
    #[command(
        about = "List compiled rules",
        long_about = "Compile the hook file and print each rule's id, pattern and replacement. Entries that fail to compile are listed on stderr."
    )]
    Rules {
        #[command(flatten)]
        common: Common,
    },
}
