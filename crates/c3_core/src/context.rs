//! Rule-invocation frames and the walker's call-context arena.
//!
//! The parser hands the walker a stack of [`RuleFrame`]s describing the
//! rules open at the cursor. While walking, every `RuleInvoke` edge pushes a
//! new frame on a *local copy* of that stack. Copies are expensive and most
//! branches share long prefixes, so stacks are stored as parent-linked nodes
//! in a [`ContextArena`] and hash-consed: two branches that reach the same
//! stack shape get the same [`ContextId`]. That makes the id usable as part
//! of the visited-set key.

use c3_network::{RuleId, StateId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::RulePath;

/// One open rule invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RuleFrame {
    /// The invoked rule.
    pub rule: RuleId,
    /// Index of the first token the invocation covers.
    pub start_token: usize,
    /// State in the *calling* rule where matching resumes once `rule`
    /// finishes. Ignored for the outermost frame: finishing it ends the path.
    pub return_state: Option<StateId>,
}

impl RuleFrame {
    /// A frame with no return state (an outermost rule).
    pub fn new(rule: RuleId, start_token: usize) -> Self {
        Self {
            rule,
            start_token,
            return_state: None,
        }
    }

    /// Set the state the caller resumes at.
    #[must_use]
    pub fn returning_to(mut self, state: StateId) -> Self {
        self.return_state = Some(state);
        self
    }
}

/// Handle to an interned call context (a full frame stack).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ContextId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ContextNode {
    parent: Option<ContextId>,
    frame: RuleFrame,
    /// Number of frames in the stack, this one included.
    depth: usize,
}

/// Hash-consed storage for call contexts, owned by one walk.
#[derive(Debug, Default)]
pub(crate) struct ContextArena {
    nodes: Vec<ContextNode>,
    interned: FxHashMap<ContextNode, ContextId>,
}

impl ContextArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Push `frame` on top of `parent`, reusing an identical existing stack.
    pub(crate) fn push(&mut self, parent: Option<ContextId>, frame: RuleFrame) -> ContextId {
        let depth = parent.map_or(0, |p| self.depth(p)) + 1;
        let node = ContextNode {
            parent,
            frame,
            depth,
        };
        if let Some(&id) = self.interned.get(&node) {
            return id;
        }
        let id = ContextId(self.nodes.len());
        self.nodes.push(node);
        self.interned.insert(node, id);
        id
    }

    /// The innermost frame of a context.
    #[inline]
    pub(crate) fn frame(&self, id: ContextId) -> RuleFrame {
        self.nodes[id.0].frame
    }

    /// The context left after the innermost frame returns.
    #[inline]
    pub(crate) fn parent(&self, id: ContextId) -> Option<ContextId> {
        self.nodes[id.0].parent
    }

    /// Number of open rule invocations in a context.
    #[inline]
    pub(crate) fn depth(&self, id: ContextId) -> usize {
        self.nodes[id.0].depth
    }

    /// Frames from innermost to outermost.
    pub(crate) fn frames(&self, id: ContextId) -> impl Iterator<Item = RuleFrame> + '_ {
        std::iter::successors(Some(id), |&current| self.parent(current))
            .map(|current| self.frame(current))
    }

    /// How many invocations of `rule` starting at `start_token` are open in
    /// this context (left-recursive nesting).
    pub(crate) fn open_count(&self, id: ContextId, rule: RuleId, start_token: usize) -> usize {
        self.frames(id)
            .filter(|frame| frame.rule == rule && frame.start_token == start_token)
            .count()
    }

    /// Rule path of a context, outermost rule first.
    pub(crate) fn path(&self, id: ContextId) -> RulePath {
        let mut rules: SmallVec<[RuleId; 8]> = self.frames(id).map(|frame| frame.rule).collect();
        rules.reverse();
        RulePath::from(rules)
    }

    /// Number of distinct stacks interned so far.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests;
