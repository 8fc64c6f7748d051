//! Rule compiler: turns an old/new signature pair into a match pattern and a
//! replacement template.
//!
//! Two kinds of rules come out of here:
//! - removal rules (no new signature): the old signature text is escaped and
//!   made whitespace-tolerant around `(`, `)` and `,`; the replacement is empty.
//! - migration rules: the old signature becomes a pattern with one
//!   `type<N>`/`name<N>` capture pair per parameter, and the new signature
//!   becomes a template that reuses the captured text where it can.
//!
//! Template construction, per new parameter at 1-based position `c`:
//! 1. an old parameter with identical type and name reuses that old
//!    parameter's captured type and name;
//! 2. otherwise, if the old signature has at least `c` parameters, the new
//!    literal type is paired with the name captured at position `c`;
//! 3. otherwise the new literal type and name are emitted (a synthesized
//!    name is replaced by one derived from the type).
//!
//! Matching is case-sensitive.

use crate::error::{ParseError, RuleCompileError, RuleError};
use crate::models::hooks::HookEntry;
use crate::models::Severity;
use crate::signature::{self, MethodSignature, Parameter};
use crate::template::{CaptureKind, ReplacementTemplate};
use regex::{Captures, Regex};
use serde::Serialize;
use std::borrow::Cow;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Old signature maps to a new one.
    Migration,
    /// Hook was removed; matches are flagged and stripped.
    Removal,
}

#[derive(Debug, Clone)]
/// A compiled rule. Immutable once built.
pub struct MigrationRule {
    pub id: String,
    pub hook: String,
    pub kind: RuleKind,
    pub old_signature: String,
    pub new_signature: Option<String>,
    pub pattern: Regex,
    pub template: ReplacementTemplate,
    pub title: String,
    pub description: String,
    pub message: String,
    pub severity: Severity,
}

impl MigrationRule {
    pub fn is_removal(&self) -> bool {
        self.kind == RuleKind::Removal
    }

    /// Replacement text for one match.
    pub fn replacement_for(&self, caps: &Captures<'_>) -> String {
        self.template.render(caps)
    }

    /// Replace every non-overlapping match in `text`.
    pub fn rewrite<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern
            .replace_all(text, |caps: &Captures<'_>| self.template.render(caps))
    }

    pub(crate) fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }
}

/// Compile a rule from an old signature and an optional new one.
///
/// A blank new signature is the same as none: the result is a removal rule.
pub fn compile(old: &str, new: Option<&str>) -> Result<MigrationRule, RuleError> {
    let new = new.map(str::trim).filter(|s| !s.is_empty());
    match new {
        None => compile_removal(old),
        Some(new) => compile_migration(old, new),
    }
}

/// Compile a configured hook entry, applying its severity/message overrides.
pub fn compile_entry(entry: &HookEntry) -> Result<MigrationRule, RuleError> {
    let mut rule = compile(&entry.old, entry.new.as_deref())?;
    if let Some(sev) = entry.severity {
        rule.severity = sev;
    }
    if let Some(msg) = entry.message.as_ref() {
        rule.message = msg.clone();
    }
    Ok(rule)
}

fn compile_removal(old: &str) -> Result<MigrationRule, RuleError> {
    let old = old.trim();
    let hook = signature::hook_name(old);
    if hook.is_empty() {
        return Err(RuleError::Parse {
            old: old.to_string(),
            source: ParseError::new("missing hook name", old),
        });
    }
    let id = rule_id(hook);
    let pattern = build_regex(&id, old, removal_pattern(old))?;
    Ok(MigrationRule {
        title: format!("{} detected", hook),
        description: format!("The code should not contain '{}'", hook),
        message: format!("Hook '{}' is no longer supported; remove '{}'", hook, old),
        id,
        hook: hook.to_string(),
        kind: RuleKind::Removal,
        old_signature: old.to_string(),
        new_signature: None,
        pattern,
        template: ReplacementTemplate::new(),
        severity: Severity::Error,
    })
}

fn compile_migration(old: &str, new: &str) -> Result<MigrationRule, RuleError> {
    let parse = |text: &str| {
        signature::parse(text).map_err(|source| RuleError::Parse {
            old: old.trim().to_string(),
            source,
        })
    };
    let old_sig = parse(old)?;
    let new_sig = parse(new)?;

    let id = rule_id(&old_sig.name);
    let pattern = build_regex(&id, old, migration_pattern(&old_sig))?;
    let template = replacement_template(&old_sig, &new_sig);
    let hook = old_sig.name.clone();

    Ok(MigrationRule {
        title: format!("{} detected", hook),
        description: format!("The code should not contain '{}'", hook),
        message: format!(
            "Hook '{}' is from an older API version; replace '{}' with '{}'",
            hook,
            old.trim(),
            new
        ),
        id,
        hook,
        kind: RuleKind::Migration,
        old_signature: old.trim().to_string(),
        new_signature: Some(new.to_string()),
        pattern,
        template,
        severity: Severity::Error,
    })
}

fn rule_id(hook: &str) -> String {
    format!("{}Error", hook)
}

fn build_regex(id: &str, old: &str, pattern: String) -> Result<Regex, RuleError> {
    Regex::new(&pattern).map_err(|source| RuleError::Compile {
        old: old.trim().to_string(),
        source: RuleCompileError {
            rule_id: id.to_string(),
            pattern,
            source,
        },
    })
}

fn structural_ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*([(),])\s*").expect("structural whitespace regex"))
}

/// Escaped signature text, tolerant of whitespace before and inside the
/// parentheses and around commas. Everything else is matched literally.
pub fn removal_pattern(signature: &str) -> String {
    let compact = structural_ws_re().replace_all(signature.trim(), "$1");
    let escaped = regex::escape(&compact)
        .replace(r"\(", r"\s*\(\s*")
        .replace(r"\)", r"\s*\)")
        .replace(',', r"\s*,\s*");
    with_word_boundary(&compact, collapse_ws(escaped))
}

/// Pattern with `type<N>`/`name<N>` groups for each old parameter.
pub fn migration_pattern(sig: &MethodSignature) -> String {
    let mut p = regex::escape(&sig.name);
    p.push_str(r"\s*\(");
    for (i, param) in sig.parameters.iter().enumerate() {
        let n = i + 1;
        if i > 0 {
            p.push_str(r"\s*,");
        }
        p.push_str(&format!(
            r"\s*(?P<{}>{})\s+(?P<{}>\w+)",
            CaptureKind::Type.group_name(n),
            type_pattern(&param.ty),
            CaptureKind::Name.group_name(n)
        ));
    }
    p.push_str(r"\s*\)");
    with_word_boundary(&sig.name, p)
}

/// Literal type with optional whitespace around `<`, `>`, `,`, `[` and `]`.
fn type_pattern(ty: &str) -> String {
    let mut out = String::new();
    for ch in ty.chars() {
        match ch {
            c if c.is_whitespace() => {}
            '<' | '>' | ',' | '[' | ']' => {
                out.push_str(r"\s*");
                out.push_str(&regex::escape(&ch.to_string()));
                out.push_str(r"\s*");
            }
            _ => out.push_str(&regex::escape(&ch.to_string())),
        }
    }
    let out = collapse_ws(out);
    let out = out.strip_prefix(r"\s*").unwrap_or(&out);
    out.strip_suffix(r"\s*").unwrap_or(out).to_string()
}

fn collapse_ws(mut pattern: String) -> String {
    while pattern.contains(r"\s*\s*") {
        pattern = pattern.replace(r"\s*\s*", r"\s*");
    }
    pattern
}

fn with_word_boundary(text: &str, pattern: String) -> String {
    match text.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => format!(r"\b{}", pattern),
        _ => pattern,
    }
}

/// Build the replacement for `new` in terms of captures taken from `old`.
pub fn replacement_template(old: &MethodSignature, new: &MethodSignature) -> ReplacementTemplate {
    let mut t = ReplacementTemplate::new();
    t.push_literal(&new.name);
    t.push_literal("(");
    for (i, param) in new.parameters.iter().enumerate() {
        let position = i + 1;
        if i > 0 {
            t.push_literal(", ");
        }
        if let Some(j) = old.parameters.iter().position(|p| p.same_as(param)) {
            t.push_capture(j + 1, CaptureKind::Type);
            t.push_literal(" ");
            t.push_capture(j + 1, CaptureKind::Name);
            continue;
        }
        t.push_literal(&param.ty);
        t.push_literal(" ");
        // Parameters inserted mid-list borrow the name at their own position,
        // which can repeat a name already reused by an exact match.
        if old.parameters.len() >= position {
            t.push_capture(position, CaptureKind::Name);
        } else {
            t.push_literal(&literal_name(param, position));
        }
    }
    t.push_literal(")");
    t
}

fn literal_name(param: &Parameter, position: usize) -> String {
    if !param.synthesized {
        return param.name.clone();
    }
    let base: String = param
        .ty
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_lowercase();
    format!("{}{}", base, position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_replacement(rule: &MigrationRule, text: &str) -> Option<String> {
        rule.pattern
            .captures(text)
            .map(|caps| rule.replacement_for(&caps))
    }

    fn normalize_ws(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_identical_signatures_round_trip() {
        let sig = "OnPlayerInit(BasePlayer player, string reason)";
        let rule = compile(sig, Some(sig)).unwrap();
        let text = "void OnPlayerInit(BasePlayer player, string reason) { }";
        let out = first_replacement(&rule, text).unwrap();
        assert_eq!(normalize_ws(&out), normalize_ws(sig));
    }

    #[test]
    fn test_added_parameter_uses_literal_name() {
        let rule = compile("Foo(int a, string b)", Some("Foo(int a, string b, bool c)")).unwrap();
        assert_eq!(
            first_replacement(&rule, "Foo(int a, string b)").unwrap(),
            "Foo(int a, string b, bool c)"
        );
        // User-chosen names survive for matched parameters
        assert_eq!(
            first_replacement(&rule, "Foo(int count, string label)").unwrap(),
            "Foo(int count, string label, bool c)"
        );
    }

    #[test]
    fn test_renamed_parameter_reuses_positional_name() {
        let rule = compile("Bar(int x)", Some("Bar(int count)")).unwrap();
        assert_eq!(first_replacement(&rule, "Bar(int x)").unwrap(), "Bar(int x)");
        assert_eq!(first_replacement(&rule, "Bar(int y)").unwrap(), "Bar(int y)");
    }

    #[test]
    fn test_changed_type_keeps_captured_name() {
        let rule = compile(
            "OnHeal(BasePlayer player, float amount)",
            Some("OnHeal(BasePlayer player, double amount)"),
        )
        .unwrap();
        assert_eq!(rule.template.to_string(), "OnHeal(${type1} ${name1}, double ${name2})");
        assert_eq!(
            first_replacement(&rule, "OnHeal(BasePlayer p, float hp)").unwrap(),
            "OnHeal(BasePlayer p, double hp)"
        );
    }

    #[test]
    fn test_reordered_parameters_follow_exact_pairs() {
        let rule = compile("OnSwap(int a, string b)", Some("OnSwap(string b, int a)")).unwrap();
        assert_eq!(
            first_replacement(&rule, "OnSwap(int x, string y)").unwrap(),
            "OnSwap(string y, int x)"
        );
    }

    #[test]
    fn test_zero_parameter_migration_and_rename() {
        let rule = compile("Reset()", Some("Restart()")).unwrap();
        assert!(rule.template.segments().len() == 1);
        assert_eq!(rule.template.to_string(), "Restart()");
        assert_eq!(first_replacement(&rule, "Reset ( )").unwrap(), "Restart()");
    }

    #[test]
    fn test_anonymous_new_parameter_gets_type_derived_name() {
        let rule = compile("Baz(int, string)", Some("Baz(int, string, UnityEngine.Vector3)")).unwrap();
        assert_eq!(
            first_replacement(&rule, "Baz(int id, string tag)").unwrap(),
            "Baz(int id, string tag, UnityEngine.Vector3 unityenginevector33)"
        );
    }

    #[test]
    fn test_removal_rule_matches_loose_whitespace() {
        let rule = compile("Reset()", None).unwrap();
        assert!(rule.is_removal());
        assert!(rule.template.is_empty());
        assert!(rule.pattern.is_match("Reset ( )"));
        assert_eq!(first_replacement(&rule, "Reset ( )").unwrap(), "");
        assert_eq!(rule.id, "ResetError");
    }

    #[test]
    fn test_removal_rule_relaxes_commas() {
        let rule = compile("OnDoorKnocked(DoorKnocker knocker, BasePlayer player)", Some("  ")).unwrap();
        assert!(rule.is_removal());
        assert!(rule
            .pattern
            .is_match("OnDoorKnocked( DoorKnocker knocker,BasePlayer player )"));
        assert!(!rule.pattern.is_match("OnDoorKnocked(DoorKnocker k, BasePlayer player)"));
    }

    #[test]
    fn test_generic_types_match_with_any_spacing() {
        let rule = compile(
            "OnLoot(List<Item> items)",
            Some("OnLoot(List<Item> items, int count)"),
        )
        .unwrap();
        assert_eq!(
            first_replacement(&rule, "OnLoot(List< Item > loot)").unwrap(),
            "OnLoot(List< Item > loot, int count)"
        );
    }

    #[test]
    fn test_word_boundary_and_case_sensitivity() {
        let rule = compile("Reset()", Some("Restart()")).unwrap();
        assert!(!rule.pattern.is_match("HardReset()"));
        assert!(!rule.pattern.is_match("reset()"));
    }

    #[test]
    fn test_rewrite_replaces_every_occurrence() {
        let rule = compile("OnTick(float dt)", Some("OnTick(double dt)")).unwrap();
        let src = "void OnTick(float delta) {}\nvoid OnTick(float d2) {}";
        assert_eq!(
            rule.rewrite(src),
            "void OnTick(double delta) {}\nvoid OnTick(double d2) {}"
        );
    }

    #[test]
    fn test_entry_overrides_and_metadata() {
        let mut entry = HookEntry::new("OnDoorKnocked(DoorKnocker knocker)", Some("OnDoorKnock(DoorKnocker knocker)"));
        entry.severity = Some(Severity::Warning);
        let rule = compile_entry(&entry).unwrap();
        assert_eq!(rule.id, "OnDoorKnockedError");
        assert_eq!(rule.hook, "OnDoorKnocked");
        assert_eq!(rule.title, "OnDoorKnocked detected");
        assert_eq!(rule.severity, Severity::Warning);
        assert!(rule.message.contains("OnDoorKnock(DoorKnocker knocker)"));
    }

    #[test]
    fn test_invalid_signature_is_parse_error() {
        let err = compile("Broken(int", Some("Broken(int a)")).unwrap_err();
        assert!(matches!(err, RuleError::Parse { .. }));
        assert_eq!(err.entry(), "Broken(int");
        assert!(matches!(compile("(int a)", None), Err(RuleError::Parse { .. })));
    }
}
