//! Grammar-driven code completion.
//!
//! Answers "what may be typed at this cursor position?" for any grammar
//! compiled into a transition network. The work is split across two crates
//! that are re-exported here:
//!
//! - [`c3_network`]: the network model and its builder
//! - [`c3_core`]: the candidate walker and result aggregation
//!
//! # Usage
//!
//! ```text
//! let config = CompletionConfig::new().with_ignored_tokens([semicolon]);
//! let candidates = c3::completions_with_context(&network, &tokens, stmt, tokens.len(), &config)?;
//! for terminal in candidates.terminals() { ... }
//! ```
//!
//! # Debugging
//!
//! Call [`init_tracing`] once and run with `RUST_LOG=c3_core=trace` to see
//! every pruning decision. Set `C3_LOG_TREE=1` for hierarchical output that
//! nests events under the request span.

use std::collections::BTreeSet;
use std::sync::Once;

pub use c3_core::{
    AcceptAll, CandidateAggregator, CandidateCollection, CandidateWalker, CompletionConfig,
    ConfigurationError, DisplayCandidates, PredicateEvaluator, RuleCandidate, RuleFrame, RulePath,
    DEFAULT_RECURSION_DEPTH_LIMIT,
};
pub use c3_network::{
    Alternative, Element, Network, NetworkBuilder, NetworkError, PredicateId, Rule, RuleId, State,
    StateId, StateKind, TerminalId, TerminalSet, TokenStream, Transition, Vocabulary,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=c3_core=debug` or `RUST_LOG=c3_core=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        use tracing_tree::HierarchicalLayer;

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let tree = std::env::var_os("C3_LOG_TREE").is_some();
        tracing_subscriber::registry()
            .with((!tree).then(|| fmt::layer().with_target(true).with_level(true)))
            .with(tree.then(|| HierarchicalLayer::new(2).with_targets(true)))
            .with(EnvFilter::from_default_env())
            .init();
    });
}

/// Candidates at `caret`, found by replaying `tokens` from the first token
/// through `start_rule`.
///
/// Use `tokens.len()` as the caret to complete at the end of the input.
pub fn completions_with_context<T: TokenStream + ?Sized>(
    network: &Network,
    tokens: &T,
    start_rule: RuleId,
    caret: usize,
    config: &CompletionConfig,
) -> Result<CandidateCollection, ConfigurationError> {
    CandidateWalker::new(network, tokens, config).collect_from_rule(start_rule, 0, caret)
}

/// Like [`completions_with_context`] with semantic predicates decided by
/// `predicates`.
pub fn completions_with_predicates<T: TokenStream + ?Sized>(
    network: &Network,
    tokens: &T,
    start_rule: RuleId,
    caret: usize,
    config: &CompletionConfig,
    predicates: &dyn PredicateEvaluator,
) -> Result<CandidateCollection, ConfigurationError> {
    CandidateWalker::new(network, tokens, config)
        .with_predicates(predicates)
        .collect_from_rule(start_rule, 0, caret)
}

/// Candidate terminals only, in id order.
pub fn completions<T: TokenStream + ?Sized>(
    network: &Network,
    tokens: &T,
    start_rule: RuleId,
    caret: usize,
    config: &CompletionConfig,
) -> Result<BTreeSet<TerminalId>, ConfigurationError> {
    completions_with_context(network, tokens, start_rule, caret, config)
        .map(|candidates| candidates.terminals())
}
