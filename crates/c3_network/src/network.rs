//! The validated transition network.

use smallvec::SmallVec;

use crate::{RuleId, StateId, TerminalId, Transition, Vocabulary};

/// Role of a state within its rule's sub-network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateKind {
    /// The single entry state of a rule.
    RuleEntry,
    /// An interior state.
    Basic,
    /// An exit state; reaching it means the rule has been fully matched.
    RuleStop,
}

/// A node of the network.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    pub(crate) rule: RuleId,
    pub(crate) kind: StateKind,
    pub(crate) transitions: SmallVec<[Transition; 2]>,
}

impl State {
    /// The rule whose sub-network owns this state.
    #[inline]
    pub fn rule(&self) -> RuleId {
        self.rule
    }

    #[inline]
    pub fn kind(&self) -> StateKind {
        self.kind
    }

    #[inline]
    pub fn is_stop(&self) -> bool {
        self.kind == StateKind::RuleStop
    }

    /// Outgoing edges, in the order they were added.
    #[inline]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

/// A rule's sub-network boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    pub(crate) entry: StateId,
    pub(crate) stops: SmallVec<[StateId; 1]>,
}

impl Rule {
    #[inline]
    pub fn entry(&self) -> StateId {
        self.entry
    }

    /// Exit states. Never empty.
    #[inline]
    pub fn stops(&self) -> &[StateId] {
        &self.stops
    }
}

/// A compiled grammar: one sub-network per rule, linked by `RuleInvoke` edges.
///
/// Immutable once built. Every transition target, invoked rule and follow
/// state is guaranteed to exist, so lookups by ids taken from the network
/// itself never fail. Ids supplied from outside should go through the
/// checked accessors ([`Network::state`], [`Network::rule`]).
///
/// Deserialization goes through [`NetworkBuilder::build`](crate::NetworkBuilder::build),
/// so a persisted network is checked exactly like a freshly built one.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "NetworkParts")
)]
pub struct Network {
    pub(crate) states: Vec<State>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) vocabulary: Vocabulary,
    /// Per rule: can it finish without consuming input? Derived in `build`.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) nullable: Vec<bool>,
}

/// Unvalidated serialized form of a [`Network`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct NetworkParts {
    states: Vec<State>,
    rules: Vec<Rule>,
    vocabulary: Vocabulary,
}

#[cfg(feature = "serde")]
impl TryFrom<NetworkParts> for Network {
    type Error = crate::NetworkError;

    fn try_from(parts: NetworkParts) -> Result<Self, Self::Error> {
        crate::NetworkBuilder::from_parts(parts.states, parts.rules, parts.vocabulary).build()
    }
}

impl Network {
    /// Look up a state; `None` if the id does not belong to this network.
    #[inline]
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.index())
    }

    /// Look up a rule; `None` if the id does not belong to this network.
    #[inline]
    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.index())
    }

    #[inline]
    pub fn contains_state(&self, id: StateId) -> bool {
        id.index() < self.states.len()
    }

    #[inline]
    pub fn contains_rule(&self, id: RuleId) -> bool {
        id.index() < self.rules.len()
    }

    #[inline]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Whether `rule` can reach a stop state without consuming a terminal.
    ///
    /// Predicate edges count as passable. Unknown rules are not nullable.
    #[inline]
    pub fn is_nullable(&self, rule: RuleId) -> bool {
        self.nullable.get(rule.index()).copied().unwrap_or(false)
    }

    /// Entry state of `rule`, if the rule exists.
    pub fn entry_of(&self, rule: RuleId) -> Option<StateId> {
        self.rule(rule).map(Rule::entry)
    }

    #[inline]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// All real terminals of the grammar, used to expand `NotSet` edges.
    pub fn terminals(&self) -> impl Iterator<Item = TerminalId> + '_ {
        self.vocabulary.terminals()
    }

    /// Iterate `(id, state)` pairs in id order.
    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (StateId::new(crate::id::next_raw(i)), s))
    }
}
