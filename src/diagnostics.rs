//! External analyzer diagnostics.
//!
//! The compiler or analyzer that actually understands the plugin language is
//! outside this crate. Anything that can report an id, an optional hook name,
//! a message, a severity and a position can be fed to the engine through
//! `ExternalDiagnostic`. `CompilerDiagnostic` is the JSON form accepted by
//! the `report` command.

use crate::error::{Error, Result};
use crate::models::{Location, Severity};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub trait ExternalDiagnostic {
    /// Stable diagnostic id, e.g. `OnDoorKnockedError` or `CS0103`.
    fn id(&self) -> &str;
    /// Hook/method name the diagnostic is about, when known.
    fn hook(&self) -> Option<&str> {
        None
    }
    fn message(&self) -> String;
    fn severity(&self) -> Severity;
    fn location(&self) -> Location;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompilerDiagnostic {
    pub id: String,
    #[serde(default)]
    pub hook: Option<String>,
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub file: Option<String>,
    pub line: usize,
    pub column: usize,
}

impl ExternalDiagnostic for CompilerDiagnostic {
    fn id(&self) -> &str {
        &self.id
    }

    fn hook(&self) -> Option<&str> {
        self.hook.as_deref()
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn location(&self) -> Location {
        Location::new(self.file.clone(), self.line, self.column)
    }
}

/// Load a JSON array of diagnostics produced by an external analyzer.
pub fn load_diagnostics(path: &Path) -> Result<Vec<CompilerDiagnostic>> {
    let data = fs::read_to_string(path).map_err(|e| Error::DiagnosticSource {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    serde_json::from_str(&data).map_err(|e| Error::DiagnosticSource {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}
