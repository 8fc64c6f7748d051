//! Compiled rule collection.
//!
//! Built once from the configured hook entries and read-only afterwards, so
//! a single `RuleSet` can be shared across scanning threads. Entries that
//! fail to parse or compile are skipped and returned alongside the set.

use crate::error::RuleError;
use crate::models::hooks::HookEntry;
use crate::rule::{self, MigrationRule};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<MigrationRule>,
    by_id: HashMap<String, usize>,
    by_hook: HashMap<String, usize>,
}

impl RuleSet {
    /// Compile every entry, keeping configuration order.
    ///
    /// Rules sharing a hook name (overloads) get unique ids by suffixing
    /// `_2`, `_3`, ... to the later ones.
    pub fn compile(entries: &[HookEntry]) -> (RuleSet, Vec<RuleError>) {
        let mut set = RuleSet::default();
        let mut errors = Vec::new();
        for entry in entries {
            match rule::compile_entry(entry) {
                Ok(rule) => set.insert(rule),
                Err(err) => {
                    warn!(entry = %entry.old, error = %err, "skipping hook entry");
                    errors.push(err);
                }
            }
        }
        debug!(rules = set.len(), skipped = errors.len(), "rule set compiled");
        (set, errors)
    }

    fn insert(&mut self, rule: MigrationRule) {
        let id = self.unique_id(&rule.id);
        let rule = rule.with_id(id.clone());
        let idx = self.rules.len();
        debug!(rule = %id, pattern = %rule.pattern, template = %rule.template, "compiled rule");
        self.by_hook.entry(rule.hook.clone()).or_insert(idx);
        self.by_id.insert(id, idx);
        self.rules.push(rule);
    }

    fn unique_id(&self, base: &str) -> String {
        if !self.by_id.contains_key(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}_{}", base, n))
            .find(|candidate| !self.by_id.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &MigrationRule> {
        self.rules.iter()
    }

    pub fn get(&self, id: &str) -> Option<&MigrationRule> {
        self.by_id.get(id).map(|&i| &self.rules[i])
    }

    /// First rule configured for `hook`.
    pub fn by_hook(&self, hook: &str) -> Option<&MigrationRule> {
        self.by_hook.get(hook).map(|&i| &self.rules[i])
    }
}
