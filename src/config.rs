//! Configuration discovery and effective settings resolution.
//!
//! Hookshift reads `hookshift.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `rules`: `hooks.toml`
//! - `patterns`: `["**/*.cs"]`
//! - `output`: `human`
//! - `minSeverity`: `error`
//! - `fix.write|diff|check|strip`: false
//!
//! Overrides precedence: CLI > config file > defaults.
//!
//! The hook file named by `rules` is the list of signature changes that rules
//! are compiled from; see `load_hooks` for the accepted formats.

use crate::error::{Error, Result, RuleError};
use crate::models::hooks::{HookEntry, HookFile};
use crate::models::Severity;
use serde::Deserialize;
use serde_json::Value as Json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_RULES: &str = "hooks.toml";
pub const DEFAULT_PATTERN: &str = "**/*.cs";

#[derive(Debug, Default, Deserialize, Clone)]
/// Fix-related configuration section under `[fix]`.
pub struct FixCfg {
    pub write: Option<bool>,
    pub diff: Option<bool>,
    pub check: Option<bool>,
    pub strip: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `hookshift.toml|yaml`.
pub struct HookshiftConfig {
    pub rules: Option<String>,
    pub patterns: Option<Vec<String>>,
    pub output: Option<String>,
    #[serde(rename = "minSeverity")]
    pub min_severity: Option<Severity>,
    pub fix: Option<FixCfg>,
}

#[derive(Debug, Default, Clone)]
/// Values given on the command line; `None` falls back to config/defaults.
pub struct Overrides {
    pub repo_root: Option<String>,
    pub rules: Option<String>,
    pub output: Option<String>,
    pub min_severity: Option<Severity>,
    pub patterns: Vec<String>,
    pub write: Option<bool>,
    pub diff: Option<bool>,
    pub check: Option<bool>,
    pub strip: Option<bool>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub rules: String,
    pub patterns: Vec<String>,
    pub output: String,
    pub min_severity: Severity,
    pub write: bool,
    pub diff: bool,
    pub check: bool,
    pub strip: bool,
}

impl Effective {
    /// Hook file path, resolved against the repository root.
    pub fn rules_path(&self) -> PathBuf {
        self.repo_root.join(&self.rules)
    }
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `hookshift.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join("hookshift.toml").exists()
            || cur.join("hookshift.yaml").exists()
            || cur.join("hookshift.yml").exists()
        {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `HookshiftConfig` from `hookshift.toml` or `hookshift.yaml|yml` if present.
///
/// A config file that fails to parse is reported and treated as absent.
pub fn load_config(root: &Path) -> Option<HookshiftConfig> {
    let toml_path = root.join("hookshift.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        return match toml::from_str(&s) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!(path = %toml_path.display(), error = %e, "ignoring invalid config");
                None
            }
        };
    }
    for yml in ["hookshift.yaml", "hookshift.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            return match serde_yaml::from_str(&s) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "ignoring invalid config");
                    None
                }
            };
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides) -> Effective {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root).unwrap_or_default();
    let fix = cfg.fix.unwrap_or_default();

    let rules = cli
        .rules
        .clone()
        .or(cfg.rules)
        .unwrap_or_else(|| DEFAULT_RULES.to_string());

    let patterns = if !cli.patterns.is_empty() {
        cli.patterns.clone()
    } else {
        cfg.patterns
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_PATTERN.to_string()])
    };

    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let min_severity = cli
        .min_severity
        .or(cfg.min_severity)
        .unwrap_or(Severity::Error);

    Effective {
        repo_root,
        rules,
        patterns,
        output,
        min_severity,
        write: cli.write.or(fix.write).unwrap_or(false),
        diff: cli.diff.or(fix.diff).unwrap_or(false),
        check: cli.check.or(fix.check).unwrap_or(false),
        strip: cli.strip.or(fix.strip).unwrap_or(false),
    }
}

/// Hook entries that loaded, plus one `RuleError` per entry that did not.
pub type HookLoad = (Vec<HookEntry>, Vec<RuleError>);

/// Load hook entries in configuration order.
///
/// - `.toml`: `[[hook]]` tables with `old`, `new`, `severity`, `message`;
/// - `.yaml|.yml`: a `hook:` list with the same fields;
/// - `.json`: either a map `{ "Old(sig)": "New(sig)" | null }` or an array
///   of entry objects.
///
/// Only an unreadable or unparsable file is an `Err`. A malformed entry is
/// returned as a `RuleError` and the remaining entries still load.
pub fn load_hooks(path: &Path) -> Result<HookLoad> {
    let data = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("toml") => {
            let file: HookFile<toml::Value> =
                toml::from_str(&data).map_err(|source| Error::Toml {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(collect_entries(path, file.hooks, |v| {
                let old = v.get("old").and_then(|o| o.as_str()).map(str::to_string);
                (old, v.try_into::<HookEntry>().map_err(|e| e.to_string()))
            }))
        }
        Some("yaml") | Some("yml") => {
            let file: HookFile<serde_yaml::Value> =
                serde_yaml::from_str(&data).map_err(|source| Error::Yaml {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(collect_entries(path, file.hooks, |v| {
                let old = v.get("old").and_then(|o| o.as_str()).map(str::to_string);
                (old, serde_yaml::from_value(v).map_err(|e| e.to_string()))
            }))
        }
        Some("json") => hooks_from_json(path, &data),
        _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Convert raw entries one by one. Entries without a readable `old` are
/// named by their 1-based position.
fn collect_entries<V>(
    path: &Path,
    items: Vec<V>,
    convert: impl Fn(V) -> (Option<String>, std::result::Result<HookEntry, String>),
) -> HookLoad {
    let mut entries = Vec::new();
    let mut errors = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        match convert(item) {
            (_, Ok(entry)) => entries.push(entry),
            (old, Err(reason)) => {
                let old = old.unwrap_or_else(|| format!("#{}", i + 1));
                warn!(hook = %old, file = %path.display(), %reason, "invalid hook entry");
                errors.push(RuleError::Invalid {
                    old,
                    path: path.to_path_buf(),
                    reason,
                });
            }
        }
    }
    (entries, errors)
}

fn hooks_from_json(path: &Path, data: &str) -> Result<HookLoad> {
    let value: Json = serde_json::from_str(data).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Json::Array(items) => Ok(collect_entries(path, items, |v| {
            let old = v.get("old").and_then(|o| o.as_str()).map(str::to_string);
            (old, serde_json::from_value(v).map_err(|e| e.to_string()))
        })),
        Json::Object(map) => {
            let items: Vec<(String, Json)> = map.into_iter().collect();
            Ok(collect_entries(path, items, |(old, new)| {
                let entry = match new {
                    Json::String(s) => Ok(HookEntry::new(old.as_str(), Some(s.as_str()))),
                    Json::Null => Ok(HookEntry::new(old.as_str(), None)),
                    _ => Err("must map to a signature string or null".to_string()),
                };
                (Some(old), entry)
            }))
        }
        _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("hookshift.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
rules = "conventions/rust-hooks.json"
patterns = ["plugins/**/*.cs"]
output = "json"
minSeverity = "warning"
[fix]
write = true
    "#
        )
        .unwrap();

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(&Overrides {
            repo_root: root.to_str().map(str::to_string),
            ..Overrides::default()
        });
        assert_eq!(eff.rules, "conventions/rust-hooks.json");
        assert_eq!(eff.patterns, vec!["plugins/**/*.cs".to_string()]);
        assert_eq!(eff.output, "json");
        assert_eq!(eff.min_severity, Severity::Warning);
        assert!(eff.write);
        assert!(!eff.strip);
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("hookshift.yaml"),
            "output: human\nfix:\n  strip: true\n",
        )
        .unwrap();

        let eff = resolve_effective(&Overrides {
            repo_root: root.to_str().map(str::to_string),
            ..Overrides::default()
        });
        assert_eq!(eff.rules, DEFAULT_RULES);
        assert_eq!(eff.patterns, vec![DEFAULT_PATTERN.to_string()]);
        assert_eq!(eff.min_severity, Severity::Error);
        assert!(eff.strip);
        assert_eq!(eff.rules_path(), root.join(DEFAULT_RULES));
    }

    #[test]
    fn test_cli_takes_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("hookshift.toml"),
            "rules = \"a.toml\"\nminSeverity = \"info\"\n[fix]\nwrite = true\n",
        )
        .unwrap();

        let eff = resolve_effective(&Overrides {
            repo_root: root.to_str().map(str::to_string),
            rules: Some("b.json".into()),
            min_severity: Some(Severity::Error),
            patterns: vec!["src/*.cs".into()],
            write: Some(false),
            ..Overrides::default()
        });
        assert_eq!(eff.rules, "b.json");
        assert_eq!(eff.min_severity, Severity::Error);
        assert_eq!(eff.patterns, vec!["src/*.cs".to_string()]);
        assert!(!eff.write);
    }

    #[test]
    fn test_repo_root_found_from_subdirectory() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("hookshift.toml"), "").unwrap();
        let nested = root.join("plugins/deep");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(detect_repo_root(&nested), root.to_path_buf());
    }

    #[test]
    fn test_invalid_config_is_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("hookshift.toml"), "minSeverity = \"fatal\"").unwrap();
        assert!(load_config(dir.path()).is_none());
    }

    #[test]
    fn test_load_hooks_toml_and_yaml() {
        let dir = tempdir().unwrap();
        let toml_path = dir.path().join("hooks.toml");
        fs::write(
            &toml_path,
            r#"
[[hook]]
old = "OnDoorKnocked(DoorKnocker knocker, BasePlayer player)"
new = "OnDoorKnock(DoorKnocker knocker, BasePlayer player)"

[[hook]]
old = "OnServerSave()"
severity = "warning"
message = "Use OnServerSaved instead"
"#,
        )
        .unwrap();
        let (hooks, errors) = load_hooks(&toml_path).unwrap();
        assert!(errors.is_empty());
        assert_eq!(hooks.len(), 2);
        assert_eq!(hooks[1].new, None);
        assert_eq!(hooks[1].severity, Some(Severity::Warning));

        let yaml_path = dir.path().join("hooks.yml");
        fs::write(&yaml_path, "hook:\n  - old: Reset()\n    new: Restart()\n").unwrap();
        let (hooks, _) = load_hooks(&yaml_path).unwrap();
        assert_eq!(hooks, vec![HookEntry::new("Reset()", Some("Restart()"))]);
    }

    #[test]
    fn test_load_hooks_json_map_keeps_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hooks.json");
        fs::write(
            &path,
            r#"{
  "OnTick(float dt)": "OnTick(double dt)",
  "OnAlpha()": null,
  "OnBeta(int a)": ""
}"#,
        )
        .unwrap();
        let (hooks, errors) = load_hooks(&path).unwrap();
        assert!(errors.is_empty());
        let olds: Vec<&str> = hooks.iter().map(|h| h.old.as_str()).collect();
        assert_eq!(olds, vec!["OnTick(float dt)", "OnAlpha()", "OnBeta(int a)"]);
        assert_eq!(hooks[1].new, None);
        assert_eq!(hooks[2].new.as_deref(), Some(""));
    }

    #[test]
    fn test_load_hooks_errors() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("hooks.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(load_hooks(&bad), Err(Error::Json { .. })));

        let txt = dir.path().join("hooks.txt");
        fs::write(&txt, "").unwrap();
        assert!(matches!(load_hooks(&txt), Err(Error::UnsupportedFormat(_))));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(load_hooks(&missing), Err(Error::Io { .. })));
    }

    #[test]
    fn test_bad_json_entry_does_not_drop_the_rest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hooks.json");
        fs::write(
            &path,
            r#"{"A(int a)": "A(int b)", "B()": 3, "C(string s)": null}"#,
        )
        .unwrap();
        let (hooks, errors) = load_hooks(&path).unwrap();
        let olds: Vec<&str> = hooks.iter().map(|h| h.old.as_str()).collect();
        assert_eq!(olds, vec!["A(int a)", "C(string s)"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].entry(), "B()");
        assert!(matches!(errors[0], RuleError::Invalid { .. }));
    }

    #[test]
    fn test_bad_array_and_toml_entries_are_isolated() {
        let dir = tempdir().unwrap();
        let json = dir.path().join("hooks.json");
        fs::write(
            &json,
            r#"[{"old": "A()", "severity": "fatal"}, {"new": "X()"}, {"old": "B()", "new": "C()"}]"#,
        )
        .unwrap();
        let (hooks, errors) = load_hooks(&json).unwrap();
        assert_eq!(hooks, vec![HookEntry::new("B()", Some("C()"))]);
        let bad: Vec<&str> = errors.iter().map(|e| e.entry()).collect();
        assert_eq!(bad, vec!["A()", "#2"]);

        let toml_path = dir.path().join("hooks.toml");
        fs::write(
            &toml_path,
            "[[hook]]\nold = \"A()\"\nseverity = \"fatal\"\n\n[[hook]]\nold = \"B()\"\n",
        )
        .unwrap();
        let (hooks, errors) = load_hooks(&toml_path).unwrap();
        assert_eq!(hooks, vec![HookEntry::new("B()", None)]);
        assert_eq!(errors[0].entry(), "A()");
    }
}
