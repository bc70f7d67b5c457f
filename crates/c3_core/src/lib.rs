//! Candidate collection for grammar-driven code completion.
//!
//! Given a compiled grammar ([`c3_network::Network`]), a token stream and the
//! parser state reached at the cursor, compute every terminal that may be
//! typed next together with the rule path that makes it valid.
//!
//! - **Walker** ([`CandidateWalker`]): bounded depth-first exploration of the
//!   network from the cursor state, with a hash-consed call context standing
//!   in for the parser's rule stack
//! - **Aggregator** ([`CandidateAggregator`], [`CandidateCollection`]):
//!   deduplicated, deterministic result model
//! - **Configuration** ([`CompletionConfig`]): ignored tokens, preferred
//!   (opaque) rules, preloaded tokens and the depth ceiling
//!
//! # Requests are independent
//!
//! All mutable state (visited set, context arena, aggregator) lives inside a
//! single call to [`CandidateWalker::collect`] or
//! [`CandidateWalker::collect_from_rule`]. The network and token stream are
//! only read, so concurrent requests need no locking.

mod candidates;
mod config;
mod context;
mod error;
mod walker;

#[cfg(test)]
mod test_helpers;

pub use candidates::{
    CandidateAggregator, CandidateCollection, DisplayCandidates, RuleCandidate, RulePath,
};
pub use config::{AcceptAll, CompletionConfig, PredicateEvaluator, DEFAULT_RECURSION_DEPTH_LIMIT};
pub use context::RuleFrame;
pub use error::ConfigurationError;
pub use walker::CandidateWalker;
