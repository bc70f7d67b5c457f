//! Per-request completion options.

use c3_network::{PredicateId, RuleId, TerminalId};
use rustc_hash::FxHashSet;

/// Default ceiling on rule-invocation nesting.
///
/// Only rule invocations count. Epsilon chains and consumed tokens do not,
/// so long inputs never hit the ceiling.
pub const DEFAULT_RECURSION_DEPTH_LIMIT: usize = 4096;

/// Options recognised by the candidate walker.
///
/// # Example
///
/// ```text
/// let config = CompletionConfig::new()
///     .with_ignored_tokens([semicolon])
///     .with_preferred_rules([identifier])
///     .with_recursion_depth_limit(512);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionConfig {
    /// Terminals never reported, regardless of reachability.
    pub(crate) ignored_tokens: FxHashSet<TerminalId>,
    /// Rules reported as a single candidate instead of being expanded.
    pub(crate) preferred_rules: FxHashSet<RuleId>,
    /// Terminals that may be consumed from the input after the caret.
    pub(crate) preloaded_tokens: FxHashSet<TerminalId>,
    pub(crate) recursion_depth_limit: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            ignored_tokens: FxHashSet::default(),
            preferred_rules: FxHashSet::default(),
            preloaded_tokens: FxHashSet::default(),
            recursion_depth_limit: DEFAULT_RECURSION_DEPTH_LIMIT,
        }
    }
}

impl CompletionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never report these terminals.
    #[must_use]
    pub fn with_ignored_tokens(mut self, tokens: impl IntoIterator<Item = TerminalId>) -> Self {
        self.ignored_tokens.extend(tokens);
        self
    }

    /// Report these rules as opaque candidates instead of expanding them.
    #[must_use]
    pub fn with_preferred_rules(mut self, rules: impl IntoIterator<Item = RuleId>) -> Self {
        self.preferred_rules.extend(rules);
        self
    }

    /// Allow the walker to step over these terminals when they already
    /// follow the caret in the token stream.
    ///
    /// Empty by default, which disables preloading entirely.
    #[must_use]
    pub fn with_preloaded_tokens(mut self, tokens: impl IntoIterator<Item = TerminalId>) -> Self {
        self.preloaded_tokens.extend(tokens);
        self
    }

    /// Abandon rule invocations that would nest more than `limit` rules.
    ///
    /// A limit of zero is raised to one so the start rule is still explored.
    #[must_use]
    pub fn with_recursion_depth_limit(mut self, limit: usize) -> Self {
        self.recursion_depth_limit = limit.max(1);
        self
    }

    #[inline]
    pub fn is_ignored(&self, terminal: TerminalId) -> bool {
        self.ignored_tokens.contains(&terminal)
    }

    #[inline]
    pub fn is_preferred(&self, rule: RuleId) -> bool {
        self.preferred_rules.contains(&rule)
    }

    #[inline]
    pub(crate) fn has_preferred_rules(&self) -> bool {
        !self.preferred_rules.is_empty()
    }

    #[inline]
    pub fn is_preloaded(&self, terminal: TerminalId) -> bool {
        self.preloaded_tokens.contains(&terminal)
    }

    #[inline]
    pub fn recursion_depth_limit(&self) -> usize {
        self.recursion_depth_limit
    }

    /// Preferred rules in ascending id order.
    pub fn preferred_rules(&self) -> impl Iterator<Item = RuleId> + '_ {
        let mut rules: Vec<RuleId> = self.preferred_rules.iter().copied().collect();
        rules.sort_unstable();
        rules.into_iter()
    }
}

/// Decides semantic predicates on `Predicate` edges at completion time.
///
/// Grammars gate syntax behind host state this way (for example, syntax
/// only available in development builds). Closures `Fn(PredicateId) -> bool`
/// implement it directly.
pub trait PredicateEvaluator {
    fn evaluate(&self, predicate: PredicateId) -> bool;
}

/// Accepts every predicate.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl PredicateEvaluator for AcceptAll {
    #[inline]
    fn evaluate(&self, _predicate: PredicateId) -> bool {
        true
    }
}

impl<F> PredicateEvaluator for F
where
    F: Fn(PredicateId) -> bool,
{
    #[inline]
    fn evaluate(&self, predicate: PredicateId) -> bool {
        self(predicate)
    }
}
