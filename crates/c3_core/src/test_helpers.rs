//! Shared fixtures for walker and aggregator tests. Only compiled in test
//! builds.

#![allow(clippy::unwrap_used, reason = "fixtures are known to be well-formed")]

use c3_network::{Alternative, Element, Network, NetworkBuilder, RuleId, TerminalId};

use crate::RulePath;

/// `stmt := 'IF' expr 'THEN' stmt | 'PRINT' expr` and `expr := IDENT`.
pub(crate) struct StmtGrammar {
    pub(crate) net: Network,
    pub(crate) stmt: RuleId,
    pub(crate) expr: RuleId,
    pub(crate) if_: TerminalId,
    pub(crate) then: TerminalId,
    pub(crate) print: TerminalId,
    pub(crate) ident: TerminalId,
    /// `'IF' expr 'THEN' stmt`
    pub(crate) if_alt: Alternative,
    /// `'PRINT' expr`
    pub(crate) print_alt: Alternative,
    /// `IDENT`
    pub(crate) expr_alt: Alternative,
}

pub(crate) fn stmt_grammar() -> StmtGrammar {
    let mut b = NetworkBuilder::new();
    let if_ = b.terminal("IF");
    let then = b.terminal("THEN");
    let print = b.terminal("PRINT");
    let ident = b.terminal("IDENT");
    let stmt = b.rule("stmt");
    let expr = b.rule("expr");
    let if_alt = b.alternative(
        stmt,
        [
            Element::Token(if_),
            Element::Rule(expr),
            Element::Token(then),
            Element::Rule(stmt),
        ],
    );
    let print_alt = b.alternative(stmt, [Element::Token(print), Element::Rule(expr)]);
    let expr_alt = b.alternative(expr, [Element::Token(ident)]);

    StmtGrammar {
        net: b.build().unwrap(),
        stmt,
        expr,
        if_,
        then,
        print,
        ident,
        if_alt,
        print_alt,
        expr_alt,
    }
}

/// Build a rule path from outermost to innermost.
pub(crate) fn path(rules: &[RuleId]) -> RulePath {
    rules.iter().copied().collect()
}
