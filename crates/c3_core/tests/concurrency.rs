//! Concurrent requests over one shared network.
//!
//! The network and configuration are only borrowed by the walker, so many
//! requests can run in parallel without any locking and must agree with
//! their sequential counterparts.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::collections::BTreeSet;

use c3_core::{CandidateCollection, CandidateWalker, CompletionConfig};
use c3_network::{Element, Network, NetworkBuilder, RuleId, TerminalId};
use pretty_assertions::assert_eq;
use rayon::prelude::*;

struct Fixture {
    net: Network,
    stmt: RuleId,
    /// Token prefixes with the terminals expected right after them.
    inputs: Vec<(Vec<TerminalId>, BTreeSet<TerminalId>)>,
}

/// `stmt := 'IF' expr 'THEN' stmt | 'PRINT' expr`, `expr := IDENT ('+' IDENT)*`
fn fixture() -> Fixture {
    let mut b = NetworkBuilder::new();
    let if_ = b.terminal("IF");
    let then = b.terminal("THEN");
    let print = b.terminal("PRINT");
    let ident = b.terminal("IDENT");
    let plus = b.terminal("+");
    let stmt = b.rule("stmt");
    let expr = b.rule("expr");
    b.alternative(
        stmt,
        [
            Element::Token(if_),
            Element::Rule(expr),
            Element::Token(then),
            Element::Rule(stmt),
        ],
    );
    b.alternative(stmt, [Element::Token(print), Element::Rule(expr)]);
    b.alternative(expr, [Element::Token(ident)]);
    b.alternative(
        expr,
        [Element::Rule(expr), Element::Token(plus), Element::Token(ident)],
    );

    let inputs = vec![
        (vec![], BTreeSet::from([if_, print])),
        (vec![if_], BTreeSet::from([ident])),
        (vec![if_, ident], BTreeSet::from([then, plus])),
        (vec![if_, ident, plus], BTreeSet::from([ident])),
        (vec![if_, ident, then], BTreeSet::from([if_, print])),
        (vec![if_, ident, then, print, ident], BTreeSet::from([plus])),
        (vec![print, ident, plus, ident], BTreeSet::from([plus])),
        (vec![then], BTreeSet::new()),
    ];
    Fixture {
        net: b.build().unwrap(),
        stmt,
        inputs,
    }
}

fn complete(f: &Fixture, config: &CompletionConfig, tokens: &[TerminalId]) -> CandidateCollection {
    CandidateWalker::new(&f.net, tokens, config)
        .collect_from_rule(f.stmt, 0, tokens.len())
        .unwrap()
}

#[test]
fn sequential_requests_find_expected_terminals() {
    let f = fixture();
    let config = CompletionConfig::default();

    for (tokens, expected) in &f.inputs {
        assert_eq!(&complete(&f, &config, tokens).terminals(), expected);
    }
}

#[test]
fn parallel_requests_match_sequential() {
    let f = fixture();
    let config = CompletionConfig::default();

    let sequential: Vec<CandidateCollection> = f
        .inputs
        .iter()
        .map(|(tokens, _)| complete(&f, &config, tokens))
        .collect();

    for _ in 0..8 {
        let parallel: Vec<CandidateCollection> = f
            .inputs
            .par_iter()
            .map(|(tokens, _)| complete(&f, &config, tokens))
            .collect();
        assert_eq!(parallel, sequential);
    }
}

#[test]
fn repeated_request_from_many_threads() {
    let f = fixture();
    let config = CompletionConfig::default();
    let tokens = &f.inputs[6].0;
    let expected = complete(&f, &config, tokens);

    let results: Vec<CandidateCollection> = (0..64)
        .into_par_iter()
        .map(|_| complete(&f, &config, tokens))
        .collect();
    assert!(results.iter().all(|result| *result == expected));
    assert!(!expected.is_empty());
}
