//! Fix runner: rewrites source files with each rule's replacement.
//!
//! Migration rules are applied one after another in rule set order, each
//! over the output of the previous one. Removal rules only run when
//! `strip` is set, since deleting a hook declaration usually leaves code that
//! needs a human to finish the job.

use crate::error::Result;
use crate::ruleset::RuleSet;
use crate::scan::{collect_targets, display_path};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub struct FixResult {
    pub file: String,
    pub changed: bool,
    pub replacements: usize,
    pub preview: Option<String>,
    pub original: Option<String>,
    /// Set when the fixed text could not be written back.
    pub error: Option<String>,
}

impl FixResult {
    pub fn wrote(&self, write: bool) -> bool {
        write && self.changed && self.error.is_none()
    }
}

/// Apply every eligible rule to `source`; returns the new text and the
/// number of replacements made.
pub fn fix_source(rules: &RuleSet, source: &str, strip: bool) -> (String, usize) {
    let mut text = source.to_string();
    let mut count = 0usize;
    for rule in rules.iter().filter(|r| strip || !r.is_removal()) {
        let hits = rule.pattern.find_iter(&text).count();
        if hits == 0 {
            continue;
        }
        debug!(rule = %rule.id, hits, "rewriting");
        text = rule.rewrite(&text).into_owned();
        count += hits;
    }
    (text, count)
}

/// Write `text` to `path`; returns the failure message, if any.
fn write_fixed(path: &Path, text: &str) -> Option<String> {
    match fs::write(path, text) {
        Ok(()) => None,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "failed to write fix");
            Some(e.to_string())
        }
    }
}

/// Fix files matched by `patterns` under `root`.
///
/// When `write` is false, changed files carry a `preview`; `capture_old`
/// additionally keeps the original text for diffs. Results are sorted by path.
pub fn run_fix(
    root: &Path,
    rules: &RuleSet,
    patterns: &[String],
    write: bool,
    capture_old: bool,
    strip: bool,
) -> Result<Vec<FixResult>> {
    let targets = collect_targets(root, patterns)?;
    let mut results: Vec<FixResult> = targets
        .par_iter()
        .filter_map(|path| {
            let data = match fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping file");
                    return None;
                }
            };
            let file = display_path(root, path);
            let (fixed, replacements) = fix_source(rules, &data, strip);
            let changed = fixed != data;
            let original = if capture_old { Some(data) } else { None };
            if !changed {
                return Some(FixResult {
                    file,
                    changed,
                    replacements,
                    preview: None,
                    original,
                    error: None,
                });
            }
            if write {
                return Some(FixResult {
                    file,
                    changed,
                    replacements,
                    preview: None,
                    original,
                    error: write_fixed(path, &fixed),
                });
            }
            Some(FixResult {
                file,
                changed,
                replacements,
                preview: Some(fixed),
                original,
                error: None,
            })
        })
        .collect();
    results.sort_by(|a, b| a.file.cmp(&b.file));
    Ok(results)
}
