//! Display names for terminals and rules.

use rustc_hash::FxHashMap;

use crate::id::next_raw;
use crate::{RuleId, TerminalId};

/// Names of a grammar's terminals and rules, indexed by id.
///
/// Only used for rendering; the walker works purely on ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "VocabularyNames", into = "VocabularyNames")
)]
pub struct Vocabulary {
    terminals: Vec<String>,
    rules: Vec<String>,
    /// Name lookups; the first id registered under a name wins.
    terminal_index: FxHashMap<String, TerminalId>,
    rule_index: FxHashMap<String, RuleId>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_terminal(&mut self, name: String) -> TerminalId {
        let id = TerminalId::new(next_raw(self.terminals.len()));
        self.terminal_index.entry(name.clone()).or_insert(id);
        self.terminals.push(name);
        id
    }

    pub(crate) fn add_rule(&mut self, name: String) -> RuleId {
        let id = RuleId::new(next_raw(self.rules.len()));
        self.rule_index.entry(name.clone()).or_insert(id);
        self.rules.push(name);
        id
    }

    /// Number of registered terminals (the wildcard sentinel excluded).
    #[inline]
    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    /// Number of registered rules.
    #[inline]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Display name of a terminal; `"<any>"` for the wildcard sentinel.
    pub fn terminal_name(&self, terminal: TerminalId) -> Option<&str> {
        if terminal.is_wildcard() {
            return Some("<any>");
        }
        self.terminals.get(terminal.index()).map(String::as_str)
    }

    pub fn rule_name(&self, rule: RuleId) -> Option<&str> {
        self.rules.get(rule.index()).map(String::as_str)
    }

    /// Look up a terminal by display name.
    pub fn terminal_by_name(&self, name: &str) -> Option<TerminalId> {
        self.terminal_index.get(name).copied()
    }

    /// Look up a rule by name.
    pub fn rule_by_name(&self, name: &str) -> Option<RuleId> {
        self.rule_index.get(name).copied()
    }

    /// Iterate all real terminals in id order.
    pub fn terminals(&self) -> impl Iterator<Item = TerminalId> + '_ {
        (0..self.terminals.len()).map(|i| TerminalId::new(next_raw(i)))
    }
}

/// Serialized form: names only. Lookup indices are rebuilt on load.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct VocabularyNames {
    terminals: Vec<String>,
    rules: Vec<String>,
}

#[cfg(feature = "serde")]
impl From<Vocabulary> for VocabularyNames {
    fn from(vocabulary: Vocabulary) -> Self {
        Self {
            terminals: vocabulary.terminals,
            rules: vocabulary.rules,
        }
    }
}

#[cfg(feature = "serde")]
impl From<VocabularyNames> for Vocabulary {
    fn from(names: VocabularyNames) -> Self {
        let mut vocabulary = Vocabulary::new();
        for name in names.terminals {
            vocabulary.add_terminal(name);
        }
        for name in names.rules {
            vocabulary.add_rule(name);
        }
        vocabulary
    }
}
