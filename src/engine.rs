//! Match engine.
//!
//! Two ways of finding rule hits:
//! - scanning raw text: a global, non-overlapping regex scan per rule, with
//!   the replacement rendered right away so each record stands alone;
//! - consuming an external diagnostic stream: no text is scanned, each
//!   diagnostic is mapped to the rule for its hook (or id) and takes that
//!   rule's message and severity. Diagnostics no rule claims pass through.

use crate::diagnostics::ExternalDiagnostic;
use crate::models::{Location, MatchRecord};
use crate::rule::MigrationRule;
use crate::ruleset::RuleSet;
use rayon::prelude::*;

/// Maps byte offsets to 0-based line/column (columns count chars).
pub struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, starts }
    }

    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(l) => l,
            Err(l) => l - 1,
        };
        let start = self.starts[line];
        let column = self.text[start..offset].chars().count();
        (line, column)
    }
}

/// Every match of one rule in `source`.
pub fn apply(rule: &MigrationRule, source: &str) -> Vec<MatchRecord> {
    apply_in(rule, source, None, &LineIndex::new(source))
}

fn apply_in(
    rule: &MigrationRule,
    source: &str,
    file: Option<&str>,
    lines: &LineIndex<'_>,
) -> Vec<MatchRecord> {
    rule.pattern
        .captures_iter(source)
        .filter_map(|caps| {
            let m = caps.get(0)?;
            let (line, column) = lines.position(m.start());
            Some(MatchRecord {
                rule_id: rule.id.clone(),
                span: Some((m.start(), m.end())),
                location: Location::new(file.map(str::to_string), line, column),
                matched_text: Some(m.as_str().to_string()),
                suggested_replacement: Some(rule.replacement_for(&caps)),
                message: rule.message.clone(),
                severity: rule.severity,
            })
        })
        .collect()
}

/// Every match of every rule in `source`, in source order.
///
/// Hits at the same offset keep rule configuration order.
pub fn apply_rules(rules: &RuleSet, source: &str, file: Option<&str>) -> Vec<MatchRecord> {
    let lines = LineIndex::new(source);
    let mut out: Vec<MatchRecord> = rules
        .iter()
        .flat_map(|rule| apply_in(rule, source, file, &lines))
        .collect();
    out.sort_by_key(|m| m.span.map(|(start, _)| start).unwrap_or(0));
    out
}

/// Scan several named sources in parallel, one worker per source.
///
/// Results are concatenated in input order.
pub fn apply_sources(rules: &RuleSet, sources: &[(String, String)]) -> Vec<MatchRecord> {
    sources
        .par_iter()
        .map(|(name, text)| apply_rules(rules, text, Some(name.as_str())))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

/// Map diagnostics from an external analyzer onto rules.
pub fn apply_diagnostics<D: ExternalDiagnostic>(
    rules: &RuleSet,
    diagnostics: &[D],
) -> Vec<MatchRecord> {
    diagnostics
        .iter()
        .map(|d| {
            let rule = d
                .hook()
                .and_then(|h| rules.by_hook(h))
                .or_else(|| rules.get(d.id()));
            match rule {
                Some(rule) => MatchRecord {
                    rule_id: rule.id.clone(),
                    span: None,
                    location: d.location(),
                    matched_text: None,
                    suggested_replacement: None,
                    message: rule.message.clone(),
                    severity: rule.severity,
                },
                None => MatchRecord {
                    rule_id: d.id().to_string(),
                    span: None,
                    location: d.location(),
                    matched_text: None,
                    suggested_replacement: None,
                    message: d.message(),
                    severity: d.severity(),
                },
            }
        })
        .collect()
}
