//! Output rendering for scan, fix, report and rules commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-item fields and a top-level summary.

use crate::error::RuleError;
use crate::fix::FixResult;
use crate::models::{DiagnosticError, ScanResult, Severity};
use crate::ruleset::RuleSet;
use crate::utils::{use_colors, warn_prefix};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn severity_tag(sev: Severity, color: bool) -> (String, String) {
    let (tag, icon) = match sev {
        Severity::Error => ("⟦error⟧", "✖"),
        Severity::Warning => ("⟦warn⟧", "▲"),
        Severity::Info => ("⟦info⟧", "◆"),
    };
    if !color {
        return (tag.to_string(), icon.to_string());
    }
    match sev {
        Severity::Error => (tag.red().bold().to_string(), icon.red().to_string()),
        Severity::Warning => (tag.yellow().bold().to_string(), icon.yellow().to_string()),
        Severity::Info => (tag.blue().bold().to_string(), icon.blue().to_string()),
    }
}

fn print_json(value: &JsonVal) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{} {}", crate::utils::error_prefix(), e),
    }
}

/// Print scan results in the requested format.
pub fn print_scan(res: &ScanResult, output: &str) {
    match output {
        "json" => print_json(&compose_scan_json(res)),
        _ => {
            let color = use_colors(output);
            for is in &res.issues {
                let (sev, icon) = severity_tag(is.severity, color);
                let loc = format!("{}:{}:{}", is.file, is.line + 1, is.column + 1);
                let loc = if color { loc.bold().to_string() } else { loc };
                println!("{} {} {} ❲{}❳ — {}", icon, sev, loc, is.rule, is.message);
                if let (Some(matched), Some(replacement)) = (&is.matched, &is.replacement) {
                    if replacement.is_empty() {
                        println!("    - {}", matched);
                    } else {
                        println!("    - {}\n    + {}", matched, replacement);
                    }
                }
            }
            let summary = format!(
                "— Summary — errors={} warnings={} infos={} files={}",
                res.summary.errors, res.summary.warnings, res.summary.infos, res.summary.files
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Print fix results. When `write` is false, previews and diffs can be
/// emitted; otherwise only file statuses are shown.
pub fn print_fix(results: &[FixResult], output: &str, write: bool, diff: bool) {
    match output {
        "json" => print_json(&compose_fix_json(results, write, diff)),
        _ => {
            let color = use_colors(output);
            for r in results {
                if !r.changed {
                    if color {
                        println!("{} {}", "no changes:".bright_black(), r.file);
                    } else {
                        println!("no changes: {}", r.file);
                    }
                } else if let Some(err) = r.error.as_deref() {
                    eprintln!(
                        "{} failed to write {}: {}",
                        crate::utils::error_prefix(),
                        r.file,
                        err
                    );
                } else if write {
                    if color {
                        println!(
                            "{} {} ({} replacements)",
                            "✏️  fixed:".green().bold(),
                            r.file.bold(),
                            r.replacements
                        );
                    } else {
                        println!("✏️  fixed: {} ({} replacements)", r.file, r.replacements);
                    }
                } else {
                    let body = if diff {
                        build_line_diff(r.original.as_deref(), r.preview.as_deref())
                            .or_else(|| r.preview.clone())
                    } else {
                        r.preview.clone()
                    };
                    if let Some(body) = body {
                        if color {
                            println!("{} {}\n{}", "---".cyan().bold(), r.file.bold(), body);
                        } else {
                            println!("--- {}\n{}", r.file, body);
                        }
                    }
                }
            }
        }
    }
}

/// Print errors produced by the reporter.
pub fn print_report(errors: &[DiagnosticError], output: &str) {
    match output {
        "json" => print_json(&compose_report_json(errors)),
        _ => {
            let color = use_colors(output);
            for e in errors {
                let loc = e.location.to_string();
                let loc = if color { loc.bold().to_string() } else { loc };
                println!("{} — {}", loc, e.text);
            }
            let summary = format!("— {} error(s) —", errors.len());
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Print the compiled rules and any entries that failed to compile.
pub fn print_rules(rules: &RuleSet, errors: &[RuleError], output: &str) {
    match output {
        "json" => print_json(&compose_rules_json(rules, errors)),
        _ => {
            let color = use_colors(output);
            for r in rules.iter() {
                let (sev, _) = severity_tag(r.severity, color);
                let id = if color { r.id.bold().to_string() } else { r.id.clone() };
                println!("{} {} [{:?}] {}", sev, id, r.kind, r.title);
                println!("    pattern:  {}", r.pattern);
                if r.template.is_empty() {
                    println!("    replace:  (remove)");
                } else {
                    println!("    replace:  {}", r.template);
                }
            }
            print_rule_errors(errors);
        }
    }
}

/// Report skipped hook entries on stderr.
pub fn print_rule_errors(errors: &[RuleError]) {
    for e in errors {
        // The entry's own message already includes its direct source
        let mut msg = e.to_string();
        let mut cur = std::error::Error::source(e).and_then(|s| s.source());
        while let Some(s) = cur {
            msg.push_str(&format!(": {}", s));
            cur = s.source();
        }
        eprintln!("{} skipped {}", warn_prefix(), msg);
    }
}

/// Line-level diff: unchanged lines prefixed with two spaces, removed with
/// `-`, added with `+`. Only pairs of equal line counts are aligned; other
/// inputs fall back to whole-text before/after blocks.
fn build_line_diff(old: Option<&str>, new: Option<&str>) -> Option<String> {
    let old = old?;
    let new = new?;
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let mut out = String::new();
    if old_lines.len() != new_lines.len() {
        out.push_str("+++ new\n");
        out.push_str(new);
        out.push('\n');
        out.push_str("--- old\n");
        out.push_str(old);
        return Some(out);
    }
    for (o, n) in old_lines.iter().zip(new_lines.iter()) {
        if o == n {
            out.push_str(&format!("  {}\n", o));
        } else {
            out.push_str(&format!("- {}\n+ {}\n", o, n));
        }
    }
    Some(out)
}

/// Compose scan JSON object (pure) for testing/snapshot purposes.
pub fn compose_scan_json(res: &ScanResult) -> JsonVal {
    serde_json::to_value(res).unwrap_or(JsonVal::Null)
}

/// Compose fix JSON object (pure) for testing/snapshot purposes.
pub fn compose_fix_json(results: &[FixResult], write: bool, diff: bool) -> JsonVal {
    let items: Vec<_> = results
        .iter()
        .map(|r| {
            json!({
                "file": r.file,
                "changed": r.changed,
                "replacements": r.replacements,
                "wrote": r.wrote(write),
                "error": r.error,
                "preview": if !write { r.preview.as_ref() } else { None },
                "diff": if diff && !write { build_line_diff(r.original.as_deref(), r.preview.as_deref()) } else { None }
            })
        })
        .collect();
    let summary = json!({
        "changed": results.iter().filter(|r| r.changed).count(),
        "total": results.len(),
        "wrote": results.iter().filter(|r| r.wrote(write)).count(),
        "failed": results.iter().filter(|r| r.error.is_some()).count(),
    });
    json!({"results": items, "summary": summary})
}

/// Compose report JSON object (pure) for testing/snapshot purposes.
pub fn compose_report_json(errors: &[DiagnosticError]) -> JsonVal {
    json!({
        "errors": serde_json::to_value(errors).unwrap_or(JsonVal::Null),
        "summary": { "errors": errors.len() },
    })
}

/// Compose rules JSON object (pure) for testing/snapshot purposes.
pub fn compose_rules_json(rules: &RuleSet, errors: &[RuleError]) -> JsonVal {
    let items: Vec<_> = rules
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "hook": r.hook,
                "kind": r.kind,
                "severity": r.severity,
                "old": r.old_signature,
                "new": r.new_signature,
                "pattern": r.pattern.as_str(),
                "replacement": r.template.to_string(),
                "message": r.message,
            })
        })
        .collect();
    let skipped: Vec<_> = errors
        .iter()
        .map(|e| json!({"entry": e.entry(), "error": e.to_string()}))
        .collect();
    json!({"rules": items, "skipped": skipped})
}
