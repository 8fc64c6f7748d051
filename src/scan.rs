//! Scan runner: applies a rule set to every file matched by the configured
//! glob patterns.
//!
//! Files are read and scanned in parallel, one worker per file. Results are
//! concatenated in file path order so output is deterministic.

use crate::engine;
use crate::error::Result;
use crate::models::{DiagnosticError, Issue, MatchRecord, ScanResult, Severity, Summary};
use crate::report;
use crate::ruleset::RuleSet;
use glob::glob;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Default)]
/// Raw scan output: every record of every severity.
pub struct ScanReport {
    pub files: usize,
    pub records: Vec<MatchRecord>,
}

impl ScanReport {
    /// Issues at or above `min_severity`; the summary counts all records.
    pub fn to_result(&self, min_severity: Severity) -> ScanResult {
        ScanResult {
            issues: self
                .records
                .iter()
                .filter(|m| m.severity >= min_severity)
                .cloned()
                .map(Issue::from)
                .collect(),
            summary: Summary::count(self.records.iter().map(|m| m.severity), self.files),
        }
    }

    pub fn errors(&self, min_severity: Severity) -> Vec<DiagnosticError> {
        report::report(&self.records, min_severity)
    }
}

/// Expand glob patterns relative to `root` into a sorted, de-duplicated file list.
pub fn collect_targets(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut targets = BTreeSet::new();
    for pat in patterns {
        let abs_glob = root.join(pat);
        let pattern = abs_glob.to_string_lossy().to_string();
        for entry in glob(&pattern)? {
            match entry {
                Ok(p) if p.is_file() => {
                    targets.insert(p);
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "skipping unreadable glob entry"),
            }
        }
    }
    Ok(targets.into_iter().collect())
}

/// Path shown in reports: relative to `root` when possible.
pub fn display_path(root: &Path, path: &Path) -> String {
    pathdiff::diff_paths(path, root)
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

/// Scan all files matched by `patterns` under `root`.
///
/// Unreadable or non-UTF-8 files are skipped with a warning and do not
/// count towards `files`.
pub fn run_scan(root: &Path, rules: &RuleSet, patterns: &[String]) -> Result<ScanReport> {
    let targets = collect_targets(root, patterns)?;
    debug!(files = targets.len(), rules = rules.len(), "scanning");

    let sources: Vec<(String, String)> = targets
        .par_iter()
        .filter_map(|path| match fs::read_to_string(path) {
            Ok(data) => Some((display_path(root, path), data)),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping file");
                None
            }
        })
        .collect();

    let files = sources.len();
    let records = engine::apply_sources(rules, &sources);
    debug!(files, matches = records.len(), "scan finished");
    Ok(ScanReport { files, records })
}
