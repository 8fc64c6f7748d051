//! Shared data models: severities, match records, reported errors and the
//! scan/report output structs.

pub mod hooks;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Diagnostic severity, ordered `Info < Warning < Error`.
pub enum Severity {
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" | "hidden" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(format!("unknown severity '{}' (expected error|warning|info)", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Source position, 0-based line and column. `file` is opaque to the core.
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(file: Option<String>, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

impl fmt::Display for Location {
    /// Human form is 1-based, `file:line:col`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line + 1, self.column + 1),
            None => write!(f, "{}:{}", self.line + 1, self.column + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One rule hit, either found by scanning text or mapped from an external
/// diagnostic. Text scans fill `span`, `matched_text` and
/// `suggested_replacement`; diagnostic-stream matches only carry a location.
pub struct MatchRecord {
    pub rule_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<(usize, usize)>,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_replacement: Option<String>,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A reported problem, ready for display or for blocking a build.
pub struct DiagnosticError {
    pub line: usize,
    pub column: usize,
    pub text: String,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize)]
/// A single scan finding with its file and suggested fix.
pub struct Issue {
    pub file: String,
    pub rule: String,
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

impl From<MatchRecord> for Issue {
    fn from(m: MatchRecord) -> Self {
        Issue {
            file: m.location.file.clone().unwrap_or_default(),
            rule: m.rule_id,
            severity: m.severity,
            line: m.location.line,
            column: m.location.column,
            message: m.message,
            matched: m.matched_text,
            replacement: m.suggested_replacement,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
/// Aggregated counts used by printers.
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub files: usize,
}

impl Summary {
    pub fn count(severities: impl IntoIterator<Item = Severity>, files: usize) -> Self {
        let mut s = Summary {
            files,
            ..Summary::default()
        };
        for sev in severities {
            match sev {
                Severity::Error => s.errors += 1,
                Severity::Warning => s.warnings += 1,
                Severity::Info => s.infos += 1,
            }
        }
        s
    }
}

#[derive(Debug, Clone, Default, Serialize)]
/// Scan results container.
pub struct ScanResult {
    pub issues: Vec<Issue>,
    pub summary: Summary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order_and_parse() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("ERROR".parse::<Severity>().unwrap(), Severity::Error);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_location_display_is_one_based() {
        let loc = Location::new(Some("Plugin.cs".into()), 0, 4);
        assert_eq!(loc.to_string(), "Plugin.cs:1:5");
        assert_eq!(Location::new(None, 2, 0).to_string(), "3:1");
    }

    #[test]
    fn test_summary_counts() {
        let s = Summary::count(
            vec![Severity::Error, Severity::Info, Severity::Error, Severity::Warning],
            2,
        );
        assert_eq!((s.errors, s.warnings, s.infos, s.files), (2, 1, 1, 2));
    }
}
