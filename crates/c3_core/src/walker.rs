//! Network walker: candidate collection by simulated continuation.
//!
//! Starting from the network state the parser reached at the cursor, the
//! walker explores every continuation that consumes no real input past the
//! caret and records the first terminal-consuming edges it meets.
//!
//! # Algorithm
//!
//! Depth-first over an explicit stack of frames, each carrying the
//! current state, token index and call context. For each frame:
//!
//! 1. `(state, token index, context)` triples already explored are dropped.
//!    Contexts are hash-consed, so identical stacks compare equal.
//! 2. At a rule stop state the innermost frame returns: exploration resumes
//!    at its return state in the caller, or the path ends for the outermost
//!    frame.
//! 3. Otherwise each outgoing edge is classified:
//!    - epsilon and accepted predicates continue in place
//!    - rule invocations push a frame, unless that would nest rules deeper
//!      than the configured ceiling, the rule is left-recursively open more
//!      often than the input before the caret can feed, or the rule is
//!      preferred at the caret
//!    - terminal edges before the caret replay the real token stream; at the
//!      caret they are recorded as candidates
//!
//! Every extra level of left recursion has to consume at least one token
//! before the caret, so a rule may be open at most `remaining + 1` times at
//! the same start token. At the caret that is once: re-entry is cut. A cut
//! invocation of a nullable rule continues at its follow state as if the
//! rule had matched nothing. With step 1 this bounds the number of
//! contexts, so the walk terminates on any network. The depth ceiling is a second, independent bound on rule
//! nesting.

use c3_network::{Network, RuleId, StateId, TerminalId, TokenStream, Transition};
use rustc_hash::FxHashSet;
use smallvec::{smallvec, SmallVec};
use tracing::{debug, trace};

use crate::candidates::{CandidateAggregator, CandidateCollection, RulePath};
use crate::config::{AcceptAll, CompletionConfig, PredicateEvaluator};
use crate::context::{ContextArena, ContextId, RuleFrame};
use crate::error::ConfigurationError;

/// One pending exploration step.
#[derive(Clone, Copy, Debug)]
struct Frame {
    state: StateId,
    token_index: usize,
    context: ContextId,
}

impl Frame {
    /// Move to `state` without consuming input.
    #[inline]
    fn to(self, state: StateId) -> Self {
        Self { state, ..self }
    }

    /// Move to `state` after consuming the current token.
    #[inline]
    fn consume(self, state: StateId) -> Self {
        Self {
            state,
            token_index: self.token_index + 1,
            ..self
        }
    }

    /// Move to `state` under a different call context.
    #[inline]
    fn within(self, state: StateId, context: ContextId) -> Self {
        Self {
            state,
            context,
            ..self
        }
    }
}

/// Counters reported once a walk finishes.
#[derive(Debug, Default)]
struct WalkStats {
    explored: usize,
    revisited: usize,
    depth_pruned: usize,
    recursion_cut: usize,
    predicates_rejected: usize,
}

/// Everything owned by a single request.
struct Walk {
    caret: usize,
    arena: ContextArena,
    aggregator: CandidateAggregator,
    visited: FxHashSet<(StateId, usize, ContextId)>,
    pending: Vec<Frame>,
    stats: WalkStats,
}

/// Collects next-token candidates over a shared, read-only network.
///
/// The walker borrows the network, token stream and configuration; every
/// piece of mutable bookkeeping is created per call and dropped before the
/// call returns. Any number of walkers may run concurrently over the same
/// network.
pub struct CandidateWalker<'a, T: TokenStream + ?Sized> {
    network: &'a Network,
    tokens: &'a T,
    config: &'a CompletionConfig,
    predicates: &'a dyn PredicateEvaluator,
}

impl<'a, T: TokenStream + ?Sized> CandidateWalker<'a, T> {
    /// Create a walker that accepts every semantic predicate.
    pub fn new(network: &'a Network, tokens: &'a T, config: &'a CompletionConfig) -> Self {
        Self {
            network,
            tokens,
            config,
            predicates: &AcceptAll,
        }
    }

    /// Decide `Predicate` edges with `predicates` instead of accepting all.
    #[must_use]
    pub fn with_predicates(mut self, predicates: &'a dyn PredicateEvaluator) -> Self {
        self.predicates = predicates;
        self
    }

    /// Collect candidates from the state the parser reached at `token_index`.
    ///
    /// `rule_stack` lists the open rule invocations, outermost first; its
    /// innermost frame must be the rule owning `start_state`. An empty stack
    /// stands for a single frame of that rule starting at token 0.
    #[tracing::instrument(level = "debug", skip_all, fields(start = ?start_state, token_index))]
    pub fn collect(
        &self,
        start_state: StateId,
        rule_stack: &[RuleFrame],
        token_index: usize,
    ) -> Result<CandidateCollection, ConfigurationError> {
        self.check_token_index(token_index)?;
        self.check_preferred_rules()?;
        let start_rule = self
            .network
            .state(start_state)
            .ok_or(ConfigurationError::UnknownState(start_state))?
            .rule();

        let mut arena = ContextArena::new();
        let context = self.seed_context(&mut arena, start_state, start_rule, rule_stack)?;
        Ok(self.walk(arena, start_state, context, token_index, token_index))
    }

    /// Collect candidates at `caret` by replaying the real tokens from
    /// `start_token` through `rule`'s sub-network.
    ///
    /// Terminal edges before the caret are only taken when the token in the
    /// stream matches, which reconstructs every parse of the prefix that the
    /// grammar allows.
    #[tracing::instrument(level = "debug", skip_all, fields(rule = ?rule, start_token, caret))]
    pub fn collect_from_rule(
        &self,
        rule: RuleId,
        start_token: usize,
        caret: usize,
    ) -> Result<CandidateCollection, ConfigurationError> {
        self.check_token_index(caret)?;
        if start_token > caret {
            return Err(ConfigurationError::StartAfterCaret {
                start: start_token,
                caret,
            });
        }
        self.check_preferred_rules()?;
        let entry = self
            .network
            .entry_of(rule)
            .ok_or(ConfigurationError::UnknownRule(rule))?;

        let mut arena = ContextArena::new();
        let context = arena.push(None, RuleFrame::new(rule, start_token));
        Ok(self.walk(arena, entry, context, start_token, caret))
    }

    fn check_token_index(&self, index: usize) -> Result<(), ConfigurationError> {
        let len = self.tokens.len();
        if index > len {
            return Err(ConfigurationError::TokenIndexOutOfRange { index, len });
        }
        Ok(())
    }

    fn check_preferred_rules(&self) -> Result<(), ConfigurationError> {
        match self
            .config
            .preferred_rules()
            .find(|rule| !self.network.contains_rule(*rule))
        {
            Some(rule) => Err(ConfigurationError::UnknownRule(rule)),
            None => Ok(()),
        }
    }

    /// Intern the caller's rule stack, validating it against the network.
    fn seed_context(
        &self,
        arena: &mut ContextArena,
        start_state: StateId,
        start_rule: RuleId,
        rule_stack: &[RuleFrame],
    ) -> Result<ContextId, ConfigurationError> {
        let mut context: Option<ContextId> = None;
        let mut caller: Option<RuleId> = None;

        for &frame in rule_stack {
            if !self.network.contains_rule(frame.rule) {
                return Err(ConfigurationError::UnknownRule(frame.rule));
            }
            let mut frame = frame;
            match caller {
                None => frame.return_state = None,
                Some(caller_rule) => {
                    let state = frame
                        .return_state
                        .ok_or(ConfigurationError::MissingReturnState { rule: frame.rule })?;
                    let owner = self
                        .network
                        .state(state)
                        .ok_or(ConfigurationError::UnknownState(state))?
                        .rule();
                    if owner != caller_rule {
                        return Err(ConfigurationError::ReturnStateOutsideCaller {
                            rule: frame.rule,
                            state,
                            caller: caller_rule,
                        });
                    }
                }
            }
            context = Some(arena.push(context, frame));
            caller = Some(frame.rule);
        }

        match (context, caller) {
            (Some(context), Some(innermost)) if innermost == start_rule => Ok(context),
            (_, Some(innermost)) => Err(ConfigurationError::StartStateOutsideFrame {
                state: start_state,
                state_rule: start_rule,
                frame_rule: innermost,
            }),
            _ => Ok(arena.push(None, RuleFrame::new(start_rule, 0))),
        }
    }

    fn walk(
        &self,
        arena: ContextArena,
        start: StateId,
        context: ContextId,
        token_index: usize,
        caret: usize,
    ) -> CandidateCollection {
        let mut walk = Walk {
            caret,
            arena,
            aggregator: CandidateAggregator::new(),
            visited: FxHashSet::default(),
            pending: vec![Frame {
                state: start,
                token_index,
                context,
            }],
            stats: WalkStats::default(),
        };

        while let Some(frame) = walk.pending.pop() {
            if !walk
                .visited
                .insert((frame.state, frame.token_index, frame.context))
            {
                walk.stats.revisited += 1;
                continue;
            }
            walk.stats.explored += 1;
            self.step(&mut walk, frame);
        }

        debug!(
            explored = walk.stats.explored,
            revisited = walk.stats.revisited,
            depth_pruned = walk.stats.depth_pruned,
            recursion_cut = walk.stats.recursion_cut,
            predicates_rejected = walk.stats.predicates_rejected,
            contexts = walk.arena.len(),
            "walk finished"
        );
        let result = walk.aggregator.finish();
        trace!(candidates = %result.display(self.network), "collected");
        result
    }

    fn step(&self, walk: &mut Walk, frame: Frame) {
        // Edge targets were validated when the network was built.
        let Some(state) = self.network.state(frame.state) else {
            return;
        };

        if state.is_stop() {
            let current = walk.arena.frame(frame.context);
            match (walk.arena.parent(frame.context), current.return_state) {
                (Some(caller), Some(resume)) => walk.pending.push(frame.within(resume, caller)),
                _ => trace!(rule = ?current.rule, "outermost rule finished"),
            }
            return;
        }

        // Reversed so the first edge is explored first.
        for transition in state.transitions().iter().rev() {
            match transition {
                Transition::Epsilon { target } => walk.pending.push(frame.to(*target)),
                Transition::Predicate { predicate, target } => {
                    if self.predicates.evaluate(*predicate) {
                        walk.pending.push(frame.to(*target));
                    } else {
                        walk.stats.predicates_rejected += 1;
                        trace!(predicate = ?predicate, "predicate rejected");
                    }
                }
                Transition::RuleInvoke { rule, follow } => {
                    self.invoke(walk, frame, *rule, *follow);
                }
                Transition::Atom { target, .. }
                | Transition::Set { target, .. }
                | Transition::NotSet { target, .. }
                | Transition::Wildcard { target } => {
                    self.consume(walk, frame, transition, *target);
                }
            }
        }
    }

    fn invoke(&self, walk: &mut Walk, frame: Frame, rule: RuleId, follow: StateId) {
        let Some(entry) = self.network.entry_of(rule) else {
            return;
        };
        let at_caret = frame.token_index >= walk.caret;

        if at_caret && self.config.is_preferred(rule) {
            if !self.report_enclosing_preferred(walk, frame.context) {
                let path = walk.arena.path(frame.context);
                if walk.aggregator.add_rule(rule, frame.token_index, &path) {
                    self.note_rule_starts(walk, frame.context);
                }
            }
            return;
        }

        let depth = walk.arena.depth(frame.context) + 1;
        if depth > self.config.recursion_depth_limit() {
            walk.stats.depth_pruned += 1;
            trace!(rule = ?rule, depth, "depth limit reached");
            return;
        }

        let remaining = walk.caret.saturating_sub(frame.token_index);
        if walk.arena.open_count(frame.context, rule, frame.token_index) > remaining {
            walk.stats.recursion_cut += 1;
            trace!(rule = ?rule, token_index = frame.token_index, "left recursion cut");
            // The cut level could still have matched nothing.
            if self.network.is_nullable(rule) {
                walk.pending.push(frame.to(follow));
            }
            return;
        }

        let callee = walk.arena.push(
            Some(frame.context),
            RuleFrame::new(rule, frame.token_index).returning_to(follow),
        );
        walk.pending.push(frame.within(entry, callee));
    }

    fn consume(&self, walk: &mut Walk, frame: Frame, transition: &Transition, target: StateId) {
        let token = self.tokens.get(frame.token_index);
        let matches = token.is_some_and(|token| transition.matches(token));

        if frame.token_index < walk.caret {
            if matches {
                walk.pending.push(frame.consume(target));
            }
            return;
        }

        if matches && token.is_some_and(|token| self.config.is_preloaded(token)) {
            trace!(token = ?token, token_index = frame.token_index, "stepping over preloaded token");
            walk.pending.push(frame.consume(target));
            return;
        }

        self.record_terminals(walk, frame, transition);
    }

    fn record_terminals(&self, walk: &mut Walk, frame: Frame, transition: &Transition) {
        if self.report_enclosing_preferred(walk, frame.context) {
            return;
        }

        let terminals: SmallVec<[TerminalId; 8]> = match transition {
            Transition::Atom { terminal, .. } => smallvec![*terminal],
            Transition::Set { set, .. } => set.iter().collect(),
            Transition::NotSet { set, .. } => self
                .network
                .terminals()
                .filter(|terminal| !set.contains(*terminal))
                .collect(),
            Transition::Wildcard { .. } => smallvec![TerminalId::WILDCARD],
            Transition::Epsilon { .. }
            | Transition::RuleInvoke { .. }
            | Transition::Predicate { .. } => SmallVec::new(),
        };

        let path = walk.arena.path(frame.context);
        let mut added = false;
        for terminal in terminals {
            if !self.config.is_ignored(terminal) {
                added |= walk.aggregator.add_token(terminal, &path);
            }
        }
        if added {
            self.note_rule_starts(walk, frame.context);
        }
    }

    /// Report the outermost preferred rule of `context`, if any.
    ///
    /// When the caret sits inside a preferred rule, that rule is the
    /// candidate and the terminals beneath it are not.
    fn report_enclosing_preferred(&self, walk: &mut Walk, context: ContextId) -> bool {
        if !self.config.has_preferred_rules() {
            return false;
        }
        // Frames run innermost first, so the last match is the outermost.
        let Some((outer, preferred)) = walk
            .arena
            .frames(context)
            .enumerate()
            .filter(|(_, frame)| self.config.is_preferred(frame.rule))
            .last()
        else {
            return false;
        };

        let mut enclosing: SmallVec<[RuleId; 8]> = walk
            .arena
            .frames(context)
            .skip(outer + 1)
            .map(|frame| frame.rule)
            .collect();
        enclosing.reverse();
        let path = RulePath::from(enclosing);
        if walk
            .aggregator
            .add_rule(preferred.rule, preferred.start_token, &path)
        {
            for frame in walk.arena.frames(context).skip(outer) {
                walk.aggregator.note_rule_start(frame.rule, frame.start_token);
            }
        }
        true
    }

    fn note_rule_starts(&self, walk: &mut Walk, context: ContextId) {
        for frame in walk.arena.frames(context) {
            walk.aggregator.note_rule_start(frame.rule, frame.start_token);
        }
    }
}
