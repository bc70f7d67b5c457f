//! Caller errors detected before walking.

use c3_network::{RuleId, StateId};

/// The request does not fit the network it was issued against.
///
/// These are programming errors on the caller's side (a stale rule stack, a
/// state id from another network) and are never retried internally. Dead-end
/// cursor positions are not errors: they produce an empty collection.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("state {0:?} does not belong to the network")]
    UnknownState(StateId),

    #[error("rule {0:?} does not belong to the network")]
    UnknownRule(RuleId),

    #[error("token index {index} is outside the token stream (length {len})")]
    TokenIndexOutOfRange { index: usize, len: usize },

    #[error("start token {start} lies after the caret at {caret}")]
    StartAfterCaret { start: usize, caret: usize },

    #[error("start state {state:?} belongs to rule {state_rule:?}, but the innermost frame is rule {frame_rule:?}")]
    StartStateOutsideFrame {
        state: StateId,
        state_rule: RuleId,
        frame_rule: RuleId,
    },

    #[error("frame for rule {rule:?} has no return state into its caller")]
    MissingReturnState { rule: RuleId },

    #[error("return state {state:?} of rule {rule:?} is not inside calling rule {caller:?}")]
    ReturnStateOutsideCaller {
        rule: RuleId,
        state: StateId,
        caller: RuleId,
    },
}
