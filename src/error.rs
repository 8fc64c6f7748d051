//! Error types shared by the rule compiler and the runners.
//!
//! Compile-time failures (`ParseError`, `RuleCompileError`) are isolated per
//! hook entry through `RuleError`; the crate-level `Error` covers loading
//! configuration, hook files and external diagnostic sources.

use std::path::PathBuf;
use thiserror::Error;

/// A method signature or one of its parameters could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}: '{offending_text}'")]
pub struct ParseError {
    pub reason: String,
    pub offending_text: String,
}

impl ParseError {
    pub fn new(reason: impl Into<String>, offending_text: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            offending_text: offending_text.into(),
        }
    }
}

/// The generated pattern for a rule was rejected by the regex engine.
#[derive(Debug, Error)]
#[error("rule '{rule_id}' produced an invalid pattern")]
pub struct RuleCompileError {
    pub rule_id: String,
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Failure to turn one hook entry into a rule. Other entries keep loading.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("hook '{old}': {source}")]
    Parse {
        old: String,
        #[source]
        source: ParseError,
    },
    #[error("hook '{old}': {source}")]
    Compile {
        old: String,
        #[source]
        source: RuleCompileError,
    },
    /// The entry itself is malformed in the hook file.
    #[error("hook '{old}' in {path}: {reason}")]
    Invalid {
        old: String,
        path: PathBuf,
        reason: String,
    },
}

impl RuleError {
    /// Old signature text of the entry that failed.
    pub fn entry(&self) -> &str {
        match self {
            RuleError::Parse { old, .. }
            | RuleError::Compile { old, .. }
            | RuleError::Invalid { old, .. } => old,
        }
    }
}

/// Errors raised while loading inputs for a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid YAML in {path}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported hook file format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    /// External analyzer output could not be consumed; passed through as-is.
    #[error("diagnostic source {path} could not be loaded")]
    DiagnosticSource {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
