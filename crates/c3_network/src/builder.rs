//! Network construction and validation.
//!
//! The grammar compiler is an external collaborator; whatever it is, it
//! talks to the completion core through this builder. Two levels are
//! offered:
//!
//! - **Raw**: [`NetworkBuilder::add_state`], [`NetworkBuilder::add_transition`]
//!   for arbitrary graphs (loops, shared tails, multiple stop states).
//! - **Alternatives**: [`NetworkBuilder::alternative`] chains a sequence of
//!   [`Element`]s from a rule's entry to its stop state, which covers most
//!   hand-written grammars.
//!
//! [`NetworkBuilder::build`] checks every structural invariant the walker
//! relies on, so a [`Network`] is always well-formed.

use rustc_hash::FxHashSet;
use smallvec::{smallvec, SmallVec};
use tracing::debug;

use crate::id::next_raw;
use crate::network::{Network, Rule, State, StateKind};
use crate::{PredicateId, RuleId, StateId, TerminalId, Transition, Vocabulary};

/// Structural defects found while building a network.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("transition from {from:?} targets unknown state {target:?}")]
    UnknownTarget { from: StateId, target: StateId },

    #[error("transition added to unknown state {0:?}")]
    UnknownSource(StateId),

    #[error("transition from {from:?} invokes unknown rule {rule:?}")]
    UnknownRule { from: StateId, rule: RuleId },

    #[error("state {0:?} is a rule stop state and cannot have outgoing transitions")]
    TransitionFromStop(StateId),

    #[error("transition from {from:?} (rule {from_rule:?}) leaves its rule for {target:?} (rule {target_rule:?})")]
    CrossRuleTransition {
        from: StateId,
        from_rule: RuleId,
        target: StateId,
        target_rule: RuleId,
    },

    #[error("terminal set on transition from {0:?} is empty")]
    EmptySet(StateId),

    #[error("state {state:?} belongs to unknown rule {rule:?}")]
    OrphanState { state: StateId, rule: RuleId },

    #[error("rule {0:?} needs an entry state and at least one stop state of its own")]
    MalformedRule(RuleId),

    #[error("network has {rules} rules but {names} rule names")]
    RuleNamesMismatch { rules: usize, names: usize },
}

/// One step of an [`NetworkBuilder::alternative`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element {
    /// A single terminal.
    Token(TerminalId),
    /// Any terminal of the set.
    OneOf(Vec<TerminalId>),
    /// Any terminal outside the set.
    NoneOf(Vec<TerminalId>),
    /// Any terminal at all.
    Any,
    /// A nested rule.
    Rule(RuleId),
    /// A semantic predicate the host decides at completion time.
    Guard(PredicateId),
}

/// States created for one alternative.
///
/// `positions[0]` is the state right after the rule entry; `positions[i]`
/// is the state reached after element `i - 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alternative {
    positions: SmallVec<[StateId; 8]>,
}

impl Alternative {
    /// The state before the first element.
    pub fn start(&self) -> StateId {
        self.positions[0]
    }

    /// The state reached after element `index` has been matched.
    ///
    /// Panics if `index` is out of range for this alternative.
    pub fn after(&self, index: usize) -> StateId {
        self.positions[index + 1]
    }

    /// The state after the last element (linked to the rule's stop state).
    pub fn end(&self) -> StateId {
        self.positions[self.positions.len() - 1]
    }
}

/// Incrementally assembles a [`Network`].
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    states: Vec<State>,
    rules: Vec<Rule>,
    vocabulary: Vocabulary,
    /// Raw edges recorded in insertion order and validated in `build`.
    pending: Vec<(StateId, Transition)>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a terminal symbol.
    pub fn terminal(&mut self, name: impl Into<String>) -> TerminalId {
        self.vocabulary.add_terminal(name.into())
    }

    /// Register a rule, creating its entry state and one stop state.
    pub fn rule(&mut self, name: impl Into<String>) -> RuleId {
        let rule = self.vocabulary.add_rule(name.into());
        let entry = self.push_state(rule, StateKind::RuleEntry);
        let stop = self.push_state(rule, StateKind::RuleStop);
        self.rules.push(Rule {
            entry,
            stops: smallvec![stop],
        });
        rule
    }

    /// Entry state of a rule registered on this builder.
    pub fn entry(&self, rule: RuleId) -> Option<StateId> {
        self.rules.get(rule.index()).map(|r| r.entry)
    }

    /// First stop state of a rule registered on this builder.
    pub fn stop(&self, rule: RuleId) -> Option<StateId> {
        self.rules.get(rule.index()).map(|r| r.stops[0])
    }

    /// Add an interior state to `rule`.
    pub fn add_state(&mut self, rule: RuleId) -> StateId {
        self.push_state(rule, StateKind::Basic)
    }

    /// Add an additional stop state to `rule`.
    pub fn add_stop_state(&mut self, rule: RuleId) -> StateId {
        let stop = self.push_state(rule, StateKind::RuleStop);
        if let Some(r) = self.rules.get_mut(rule.index()) {
            r.stops.push(stop);
        }
        stop
    }

    /// Add an edge. Validation is deferred to [`NetworkBuilder::build`].
    pub fn add_transition(&mut self, from: StateId, transition: Transition) -> &mut Self {
        self.pending.push((from, transition));
        self
    }

    /// Chain `elements` from `rule`'s entry to its stop state.
    ///
    /// Produces `entry -ε-> s0 -e0-> s1 ... -eN-> sN+1 -ε-> stop`. An empty
    /// element list yields an epsilon alternative (the rule may match
    /// nothing).
    pub fn alternative(
        &mut self,
        rule: RuleId,
        elements: impl IntoIterator<Item = Element>,
    ) -> Alternative {
        let mut positions: SmallVec<[StateId; 8]> = SmallVec::new();
        let first = self.add_state(rule);
        positions.push(first);
        if let Some(entry) = self.entry(rule) {
            self.add_transition(entry, Transition::Epsilon { target: first });
        }

        let mut current = first;
        for element in elements {
            let next = self.add_state(rule);
            let transition = match element {
                Element::Token(terminal) => Transition::Atom {
                    terminal,
                    target: next,
                },
                Element::OneOf(terminals) => Transition::Set {
                    set: terminals.into_iter().collect(),
                    target: next,
                },
                Element::NoneOf(terminals) => Transition::NotSet {
                    set: terminals.into_iter().collect(),
                    target: next,
                },
                Element::Any => Transition::Wildcard { target: next },
                Element::Rule(invoked) => Transition::RuleInvoke {
                    rule: invoked,
                    follow: next,
                },
                Element::Guard(predicate) => Transition::Predicate {
                    predicate,
                    target: next,
                },
            };
            self.add_transition(current, transition);
            positions.push(next);
            current = next;
        }

        if let Some(stop) = self.stop(rule) {
            self.add_transition(current, Transition::Epsilon { target: stop });
        }
        Alternative { positions }
    }

    /// Reopen the parts of a network for validation. Edges move back into
    /// the pending list so `build` checks every one of them.
    #[cfg(any(test, feature = "serde"))]
    pub(crate) fn from_parts(mut states: Vec<State>, rules: Vec<Rule>, vocabulary: Vocabulary) -> Self {
        let mut pending = Vec::new();
        for (index, state) in states.iter_mut().enumerate() {
            let from = StateId::new(next_raw(index));
            pending.extend(state.transitions.drain(..).map(|t| (from, t)));
        }
        Self {
            states,
            rules,
            vocabulary,
            pending,
        }
    }

    /// Validate all edges and freeze the network.
    pub fn build(mut self) -> Result<Network, NetworkError> {
        for (index, state) in self.states.iter().enumerate() {
            if state.rule.index() >= self.rules.len() {
                return Err(NetworkError::OrphanState {
                    state: StateId::new(next_raw(index)),
                    rule: state.rule,
                });
            }
        }
        if self.vocabulary.rule_count() != self.rules.len() {
            return Err(NetworkError::RuleNamesMismatch {
                rules: self.rules.len(),
                names: self.vocabulary.rule_count(),
            });
        }
        for (index, rule) in self.rules.iter().enumerate() {
            let id = RuleId::new(next_raw(index));
            let owned = |state: StateId, kind: StateKind| {
                self.states
                    .get(state.index())
                    .is_some_and(|s| s.rule == id && s.kind == kind)
            };
            if !owned(rule.entry, StateKind::RuleEntry)
                || rule.stops.is_empty()
                || !rule.stops.iter().all(|&stop| owned(stop, StateKind::RuleStop))
            {
                return Err(NetworkError::MalformedRule(id));
            }
        }

        let pending = std::mem::take(&mut self.pending);
        for (from, transition) in pending {
            self.validate(from, &transition)?;
            self.states[from.index()].transitions.push(transition);
        }

        let nullable = nullable_rules(&self.states, &self.rules);
        debug!(
            states = self.states.len(),
            rules = self.rules.len(),
            terminals = self.vocabulary.terminal_count(),
            nullable = nullable.iter().filter(|&&n| n).count(),
            "network built"
        );

        Ok(Network {
            states: self.states,
            rules: self.rules,
            vocabulary: self.vocabulary,
            nullable,
        })
    }

    fn push_state(&mut self, rule: RuleId, kind: StateKind) -> StateId {
        let id = StateId::new(next_raw(self.states.len()));
        self.states.push(State {
            rule,
            kind,
            transitions: SmallVec::new(),
        });
        id
    }

    fn validate(&self, from: StateId, transition: &Transition) -> Result<(), NetworkError> {
        let source = self
            .states
            .get(from.index())
            .ok_or(NetworkError::UnknownSource(from))?;
        if source.kind == StateKind::RuleStop {
            return Err(NetworkError::TransitionFromStop(from));
        }

        // The follow state of a rule invocation also lives in the invoking
        // rule, so every edge's `target()` must stay inside `source.rule`.
        let target = transition.target();
        let target_state = self
            .states
            .get(target.index())
            .ok_or(NetworkError::UnknownTarget { from, target })?;
        if target_state.rule != source.rule {
            return Err(NetworkError::CrossRuleTransition {
                from,
                from_rule: source.rule,
                target,
                target_rule: target_state.rule,
            });
        }

        match transition {
            Transition::RuleInvoke { rule, .. } if rule.index() >= self.rules.len() => {
                Err(NetworkError::UnknownRule { from, rule: *rule })
            }
            Transition::Set { set, .. } | Transition::NotSet { set, .. } if set.is_empty() => {
                Err(NetworkError::EmptySet(from))
            }
            _ => Ok(()),
        }
    }
}

/// Fixpoint over rules: a rule is nullable once its entry reaches a stop
/// state through epsilon, predicate and nullable-rule edges only.
fn nullable_rules(states: &[State], rules: &[Rule]) -> Vec<bool> {
    let mut nullable = vec![false; rules.len()];
    let mut changed = true;
    while changed {
        changed = false;
        for (index, rule) in rules.iter().enumerate() {
            if !nullable[index] && reaches_stop_silently(states, rule.entry, &nullable) {
                nullable[index] = true;
                changed = true;
            }
        }
    }
    nullable
}

fn reaches_stop_silently(states: &[State], entry: StateId, nullable: &[bool]) -> bool {
    let mut visited: FxHashSet<StateId> = FxHashSet::default();
    let mut stack = vec![entry];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(state) = states.get(id.index()) else {
            continue;
        };
        if state.kind == StateKind::RuleStop {
            return true;
        }
        for transition in &state.transitions {
            match transition {
                Transition::Epsilon { target } | Transition::Predicate { target, .. } => {
                    stack.push(*target);
                }
                Transition::RuleInvoke { rule, follow }
                    if nullable.get(rule.index()).copied().unwrap_or(false) =>
                {
                    stack.push(*follow);
                }
                _ => {}
            }
        }
    }
    false
}

#[cfg(test)]
mod tests;
