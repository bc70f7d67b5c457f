//! Transition network model for grammar-driven code completion.
//!
//! A grammar compiled for completion is a set of small automata, one per
//! rule, linked by rule-invocation edges. This crate holds that model and
//! nothing else:
//!
//! - **Identifiers** ([`StateId`], [`RuleId`], [`TerminalId`], [`PredicateId`]):
//!   compact `u32` indices into the network's arenas
//! - **Transitions** ([`Transition`], [`TerminalSet`]): the edge kinds the
//!   completion walker classifies
//! - **Network** ([`Network`], [`State`], [`Rule`]): validated, immutable,
//!   shareable across threads without locking
//! - **Builder** ([`NetworkBuilder`]): assembles and validates a network
//! - **Token streams** ([`TokenStream`]): the read-only view of lexer output
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: states and rules live in `Vec`s addressed by id,
//!   transitions reference targets by id, nothing is boxed or shared.
//! - **Validate Once**: [`NetworkBuilder::build`] rejects malformed graphs so
//!   consumers can index without re-checking edge targets.

mod builder;
mod id;
mod network;
mod token;
mod transition;
mod vocabulary;

pub use builder::{Alternative, Element, NetworkBuilder, NetworkError};
pub use id::{PredicateId, RuleId, StateId, TerminalId};
pub use network::{Network, Rule, State, StateKind};
pub use token::TokenStream;
pub use transition::{TerminalSet, Transition};
pub use vocabulary::Vocabulary;
