//! Transition kinds between network states.

use smallvec::SmallVec;

use crate::{PredicateId, RuleId, StateId, TerminalId};

/// A fixed set of terminals, kept sorted and deduplicated.
///
/// Most sets in real grammars are small (a handful of alternatives like
/// `'+' | '-'`), so they stay inline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerminalSet(SmallVec<[TerminalId; 4]>);

impl TerminalSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Insert a terminal. Returns `true` if it was not already present.
    pub fn insert(&mut self, terminal: TerminalId) -> bool {
        match self.0.binary_search(&terminal) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, terminal);
                true
            }
        }
    }

    /// O(log n) membership test.
    #[inline]
    pub fn contains(&self, terminal: TerminalId) -> bool {
        self.0.binary_search(&terminal).is_ok()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = TerminalId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<TerminalId> for TerminalSet {
    fn from_iter<I: IntoIterator<Item = TerminalId>>(iter: I) -> Self {
        let mut items: SmallVec<[TerminalId; 4]> = iter.into_iter().collect();
        items.sort_unstable();
        items.dedup();
        Self(items)
    }
}

/// An edge leaving a state.
///
/// The completion walker classifies each edge as consuming a terminal
/// (`Atom`, `Set`, `NotSet`, `Wildcard`), entering another rule
/// (`RuleInvoke`), or moving without consumption (`Epsilon`, `Predicate`).
/// Returning from a rule is not an edge: it happens at a rule's stop state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transition {
    /// Move without consuming input.
    Epsilon { target: StateId },
    /// Consume exactly one specific terminal.
    Atom { terminal: TerminalId, target: StateId },
    /// Consume one terminal from the set.
    Set { set: TerminalSet, target: StateId },
    /// Consume one terminal that is not in the set.
    NotSet { set: TerminalSet, target: StateId },
    /// Consume any terminal.
    Wildcard { target: StateId },
    /// Enter `rule` at its entry state; resume at `follow` once it finishes.
    RuleInvoke { rule: RuleId, follow: StateId },
    /// Move without consuming input if the host accepts `predicate`.
    Predicate { predicate: PredicateId, target: StateId },
}

impl Transition {
    /// The state this edge leads to within the current rule.
    ///
    /// For `RuleInvoke` this is the return (follow) state, not the invoked
    /// rule's entry.
    pub fn target(&self) -> StateId {
        match self {
            Transition::Epsilon { target }
            | Transition::Atom { target, .. }
            | Transition::Set { target, .. }
            | Transition::NotSet { target, .. }
            | Transition::Wildcard { target }
            | Transition::Predicate { target, .. } => *target,
            Transition::RuleInvoke { follow, .. } => *follow,
        }
    }

    /// Returns `true` if taking this edge consumes one token.
    pub fn consumes(&self) -> bool {
        matches!(
            self,
            Transition::Atom { .. }
                | Transition::Set { .. }
                | Transition::NotSet { .. }
                | Transition::Wildcard { .. }
        )
    }

    /// Check whether this edge can consume `token`.
    ///
    /// Always `false` for non-consuming edges.
    pub fn matches(&self, token: TerminalId) -> bool {
        match self {
            Transition::Atom { terminal, .. } => *terminal == token,
            Transition::Set { set, .. } => set.contains(token),
            Transition::NotSet { set, .. } => !token.is_wildcard() && !set.contains(token),
            Transition::Wildcard { .. } => true,
            Transition::Epsilon { .. }
            | Transition::RuleInvoke { .. }
            | Transition::Predicate { .. } => false,
        }
    }
}
