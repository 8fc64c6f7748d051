//! Hook file schema: the ordered list of old → new signature pairs that
//! rules are compiled from.
//!
//! TOML uses `[[hook]]` tables, YAML a `hook:` list. JSON files are a plain
//! object map of old signature to new signature (or `null`), or an array of
//! entry objects.

use crate::models::Severity;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
/// Top-level hook file for TOML/YAML. Entries stay as raw format values so a
/// malformed one can be rejected without dropping its neighbours.
pub struct HookFile<T> {
    #[serde(default, rename = "hook")]
    pub hooks: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// One configured hook change. `new = None` marks the hook as removed.
pub struct HookEntry {
    pub old: String,
    #[serde(default)]
    pub new: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub message: Option<String>,
}

impl HookEntry {
    pub fn new(old: impl Into<String>, new: Option<&str>) -> Self {
        Self {
            old: old.into(),
            new: new.map(str::to_string),
            severity: None,
            message: None,
        }
    }
}
