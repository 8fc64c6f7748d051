//! Diagnostic reporter: filters match records by severity and turns them
//! into location-tagged errors, keeping the order they arrived in.

use crate::models::{DiagnosticError, MatchRecord, Severity};

/// Records at or above `min_severity`, as `DiagnosticError`s.
///
/// Input order is preserved. Empty input gives empty output.
pub fn report(matches: &[MatchRecord], min_severity: Severity) -> Vec<DiagnosticError> {
    matches
        .iter()
        .filter(|m| m.severity >= min_severity)
        .map(|m| DiagnosticError {
            line: m.location.line,
            column: m.location.column,
            text: m.message.clone(),
            location: m.location.clone(),
        })
        .collect()
}
