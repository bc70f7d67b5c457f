//! Candidate aggregation and the immutable result snapshot.
//!
//! The walker emits three kinds of facts:
//!
//! - `(terminal, rule path)`: a terminal valid as the next token
//! - `(preferred rule, rule path, start token)`: an opaque rule candidate
//! - `(rule, start token)`: a rule active at the cursor
//!
//! [`CandidateAggregator`] folds them into a [`CandidateCollection`]. Ordered
//! maps keep the output deterministic regardless of exploration order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use c3_network::{Network, RuleId, TerminalId};
use smallvec::SmallVec;

/// The rules invoked, outermost first, on the way to a candidate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RulePath(SmallVec<[RuleId; 8]>);

impl RulePath {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn rules(&self) -> &[RuleId] {
        &self.0
    }

    /// The most specific (innermost) rule of the path.
    #[inline]
    pub fn innermost(&self) -> Option<RuleId> {
        self.0.last().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<SmallVec<[RuleId; 8]>> for RulePath {
    fn from(rules: SmallVec<[RuleId; 8]>) -> Self {
        Self(rules)
    }
}

impl FromIterator<RuleId> for RulePath {
    fn from_iter<I: IntoIterator<Item = RuleId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A preferred rule reported in place of its terminals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleCandidate {
    start_token: usize,
    paths: BTreeSet<RulePath>,
}

impl RuleCandidate {
    /// Token index where the innermost reported instance of the rule starts.
    #[inline]
    pub fn start_token(&self) -> usize {
        self.start_token
    }

    /// Paths of the rules enclosing the candidate (the rule itself excluded).
    #[inline]
    pub fn paths(&self) -> &BTreeSet<RulePath> {
        &self.paths
    }
}

/// Accumulates walker facts. Consumed by [`CandidateAggregator::finish`].
#[derive(Debug, Default)]
pub struct CandidateAggregator {
    tokens: BTreeMap<TerminalId, BTreeSet<RulePath>>,
    rules: BTreeMap<RuleId, RuleCandidate>,
    rule_starts: BTreeMap<RuleId, usize>,
}

impl CandidateAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a terminal reachable via `path`. Returns `false` for a
    /// duplicate terminal-and-path pair.
    pub fn add_token(&mut self, terminal: TerminalId, path: &RulePath) -> bool {
        let paths = self.tokens.entry(terminal).or_default();
        if paths.contains(path) {
            return false;
        }
        paths.insert(path.clone())
    }

    /// Record a preferred rule reached via `path` (its enclosing rules).
    pub fn add_rule(&mut self, rule: RuleId, start_token: usize, path: &RulePath) -> bool {
        let candidate = self.rules.entry(rule).or_insert_with(|| RuleCandidate {
            start_token,
            paths: BTreeSet::new(),
        });
        candidate.start_token = candidate.start_token.max(start_token);
        if candidate.paths.contains(path) {
            return false;
        }
        candidate.paths.insert(path.clone())
    }

    /// Note that `rule` is active at the cursor, starting at `start_token`.
    ///
    /// Innermost instances start at or after the instances enclosing them,
    /// so the largest index seen is kept.
    pub fn note_rule_start(&mut self, rule: RuleId, start_token: usize) {
        self.rule_starts
            .entry(rule)
            .and_modify(|start| *start = (*start).max(start_token))
            .or_insert(start_token);
    }

    /// Freeze into the read-only result.
    pub fn finish(self) -> CandidateCollection {
        CandidateCollection {
            tokens: self.tokens,
            rules: self.rules,
            rule_starts: self.rule_starts,
        }
    }
}

/// The result of one completion request.
///
/// Read-only: nothing can be added once the walker has finished.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateCollection {
    tokens: BTreeMap<TerminalId, BTreeSet<RulePath>>,
    rules: BTreeMap<RuleId, RuleCandidate>,
    rule_starts: BTreeMap<RuleId, usize>,
}

impl CandidateCollection {
    /// Every candidate terminal with the rule paths reaching it.
    #[inline]
    pub fn tokens(&self) -> &BTreeMap<TerminalId, BTreeSet<RulePath>> {
        &self.tokens
    }

    /// Candidate terminals only, in id order.
    pub fn terminals(&self) -> BTreeSet<TerminalId> {
        self.tokens.keys().copied().collect()
    }

    #[inline]
    pub fn contains_token(&self, terminal: TerminalId) -> bool {
        self.tokens.contains_key(&terminal)
    }

    /// Rule paths reaching `terminal`, if it is a candidate.
    pub fn paths(&self, terminal: TerminalId) -> Option<&BTreeSet<RulePath>> {
        self.tokens.get(&terminal)
    }

    /// Preferred rules reported as candidates.
    #[inline]
    pub fn rules(&self) -> &BTreeMap<RuleId, RuleCandidate> {
        &self.rules
    }

    /// Rules active at the cursor with the start token of their innermost
    /// instance.
    #[inline]
    pub fn rule_starts(&self) -> &BTreeMap<RuleId, usize> {
        &self.rule_starts
    }

    pub fn rule_start(&self, rule: RuleId) -> Option<usize> {
        self.rule_starts.get(&rule).copied()
    }

    /// `true` when neither terminals nor rules were found.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.rules.is_empty()
    }

    /// Render with vocabulary names from `network`.
    pub fn display<'a>(&'a self, network: &'a Network) -> DisplayCandidates<'a> {
        DisplayCandidates {
            collection: self,
            network,
        }
    }
}

/// [`fmt::Display`] adapter returned by [`CandidateCollection::display`].
///
/// One line per candidate, `NAME: [outer > inner]`, paths separated by `|`.
pub struct DisplayCandidates<'a> {
    collection: &'a CandidateCollection,
    network: &'a Network,
}

impl DisplayCandidates<'_> {
    fn write_paths<'p>(
        &self,
        f: &mut fmt::Formatter<'_>,
        paths: impl Iterator<Item = &'p RulePath>,
    ) -> fmt::Result {
        let vocab = self.network.vocabulary();
        for (i, path) in paths.enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            f.write_str("[")?;
            for (j, rule) in path.rules().iter().enumerate() {
                if j > 0 {
                    f.write_str(" > ")?;
                }
                match vocab.rule_name(*rule) {
                    Some(name) => f.write_str(name)?,
                    None => write!(f, "{rule:?}")?,
                }
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl fmt::Display for DisplayCandidates<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vocab = self.network.vocabulary();
        for (terminal, paths) in &self.collection.tokens {
            match vocab.terminal_name(*terminal) {
                Some(name) => f.write_str(name)?,
                None => write!(f, "{terminal:?}")?,
            }
            f.write_str(": ")?;
            self.write_paths(f, paths.iter())?;
            f.write_str("\n")?;
        }
        for (rule, candidate) in &self.collection.rules {
            match vocab.rule_name(*rule) {
                Some(name) => write!(f, "<{name}>")?,
                None => write!(f, "<{rule:?}>")?,
            }
            write!(f, " @{}: ", candidate.start_token)?;
            self.write_paths(f, candidate.paths.iter())?;
            f.write_str("\n")?;
        }
        Ok(())
    }
}
