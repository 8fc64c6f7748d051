//! Hookshift CLI binary entry point.
//! Delegates to library modules for scan/fix/report and prints results.

use clap::Parser;
use hookshift::cli::{Cli, Commands, Common};
use hookshift::config::{self, Effective, Overrides};
use hookshift::ruleset::RuleSet;
use hookshift::utils::{error_prefix, note_prefix};
use hookshift::{diagnostics, engine, fix, output, report, scan};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HOOKSHIFT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn overrides(common: &Common) -> Overrides {
    Overrides {
        repo_root: common.repo_root.clone(),
        rules: common.rules.clone(),
        output: common.output.clone(),
        ..Overrides::default()
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", error_prefix(), message);
    std::process::exit(2);
}

/// Load and compile the hook file; exits with code 2 if it cannot be read.
/// Malformed entries are returned alongside compile failures.
fn load_rules(eff: &Effective) -> (RuleSet, Vec<hookshift::error::RuleError>) {
    if config::load_config(&eff.repo_root).is_none() {
        eprintln!("{} No hookshift.toml found; using defaults.", note_prefix());
    }
    let path = eff.rules_path();
    let (entries, mut errors) = match config::load_hooks(&path) {
        Ok(loaded) => loaded,
        Err(e) => fail(format_error(&e)),
    };
    let (rules, compile_errors) = RuleSet::compile(&entries);
    errors.extend(compile_errors);
    (rules, errors)
}

fn format_error(e: &dyn std::error::Error) -> String {
    let mut msg = e.to_string();
    let mut cur = e.source();
    while let Some(s) = cur {
        msg.push_str(&format!(": {}", s));
        cur = s.source();
    }
    msg
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Scan {
            common,
            patterns,
            min_severity,
        } => {
            let eff = config::resolve_effective(&Overrides {
                patterns,
                min_severity,
                ..overrides(&common)
            });
            let (rules, errors) = load_rules(&eff);
            output::print_rule_errors(&errors);
            let scanned = match scan::run_scan(&eff.repo_root, &rules, &eff.patterns) {
                Ok(r) => r,
                Err(e) => fail(format_error(&e)),
            };
            output::print_scan(&scanned.to_result(eff.min_severity), &eff.output);
            if !scanned.errors(eff.min_severity).is_empty() {
                std::process::exit(1);
            }
        }
        Commands::Fix {
            common,
            patterns,
            write,
            diff,
            check,
            strip,
        } => {
            let eff = config::resolve_effective(&Overrides {
                patterns,
                write: write.then_some(true),
                diff: diff.then_some(true),
                check: check.then_some(true),
                strip: strip.then_some(true),
                ..overrides(&common)
            });
            let (rules, errors) = load_rules(&eff);
            output::print_rule_errors(&errors);
            // --diff and --check never write
            let eff_write = if eff.diff || eff.check { false } else { eff.write };
            let results = match fix::run_fix(
                &eff.repo_root,
                &rules,
                &eff.patterns,
                eff_write,
                eff.diff || eff.check,
                eff.strip,
            ) {
                Ok(r) => r,
                Err(e) => fail(format_error(&e)),
            };
            output::print_fix(&results, &eff.output, eff_write, eff.diff);
            if results.iter().any(|r| r.error.is_some()) {
                std::process::exit(2);
            }
            if eff.check && results.iter().any(|r| r.changed) {
                std::process::exit(1);
            }
        }
        Commands::Report {
            common,
            diagnostics: diag_path,
            min_severity,
        } => {
            let eff = config::resolve_effective(&Overrides {
                min_severity,
                ..overrides(&common)
            });
            let (rules, errors) = load_rules(&eff);
            output::print_rule_errors(&errors);
            let path = Path::new(&diag_path);
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                eff.repo_root.join(path)
            };
            let diags = match diagnostics::load_diagnostics(&path) {
                Ok(d) => d,
                Err(e) => fail(format_error(&e)),
            };
            let records = engine::apply_diagnostics(&rules, &diags);
            let errs = report::report(&records, eff.min_severity);
            output::print_report(&errs, &eff.output);
            if !errs.is_empty() {
                std::process::exit(1);
            }
        }
        Commands::Rules { common } => {
            let eff = config::resolve_effective(&overrides(&common));
            let (rules, errors) = load_rules(&eff);
            output::print_rules(&rules, &errors, &eff.output);
        }
    }
}
