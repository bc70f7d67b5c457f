#![allow(clippy::unwrap_used, reason = "fixtures are known to be well-formed")]

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn rule_gets_entry_and_stop() {
    let mut b = NetworkBuilder::new();
    let stmt = b.rule("stmt");
    let net = b.build().unwrap();

    let rule = net.rule(stmt).unwrap();
    assert_eq!(net.state(rule.entry()).unwrap().kind(), StateKind::RuleEntry);
    assert_eq!(rule.stops().len(), 1);
    assert!(net.state(rule.stops()[0]).unwrap().is_stop());
}

#[test]
fn alternative_chains_elements() {
    let mut b = NetworkBuilder::new();
    let print = b.terminal("PRINT");
    let ident = b.terminal("IDENT");
    let stmt = b.rule("stmt");
    let alt = b.alternative(stmt, [Element::Token(print), Element::Token(ident)]);
    let net = b.build().unwrap();

    let entry = net.entry_of(stmt).unwrap();
    assert_eq!(
        net.state(entry).unwrap().transitions(),
        &[Transition::Epsilon {
            target: alt.start()
        }]
    );
    assert_eq!(
        net.state(alt.start()).unwrap().transitions(),
        &[Transition::Atom {
            terminal: print,
            target: alt.after(0)
        }]
    );
    assert_eq!(alt.after(1), alt.end());

    let stop = net.rule(stmt).unwrap().stops()[0];
    assert_eq!(
        net.state(alt.end()).unwrap().transitions(),
        &[Transition::Epsilon { target: stop }]
    );
}

#[test]
fn empty_alternative_links_entry_to_stop() {
    let mut b = NetworkBuilder::new();
    let opt = b.rule("opt");
    let alt = b.alternative(opt, std::iter::empty());
    assert_eq!(alt.start(), alt.end());
    let net = b.build().unwrap();

    let stop = net.rule(opt).unwrap().stops()[0];
    assert_eq!(
        net.state(alt.end()).unwrap().transitions(),
        &[Transition::Epsilon { target: stop }]
    );
}

#[test]
fn rule_element_records_follow_state() {
    let mut b = NetworkBuilder::new();
    let ident = b.terminal("IDENT");
    let stmt = b.rule("stmt");
    let expr = b.rule("expr");
    let alt = b.alternative(stmt, [Element::Rule(expr)]);
    b.alternative(expr, [Element::Token(ident)]);
    let net = b.build().unwrap();

    assert_eq!(
        net.state(alt.start()).unwrap().transitions(),
        &[Transition::RuleInvoke {
            rule: expr,
            follow: alt.after(0)
        }]
    );
}

#[test]
fn set_elements_are_sorted_and_deduplicated() {
    let mut b = NetworkBuilder::new();
    let plus = b.terminal("+");
    let minus = b.terminal("-");
    let op = b.rule("op");
    let alt = b.alternative(op, [Element::OneOf(vec![minus, plus, minus])]);
    let net = b.build().unwrap();

    let Transition::Set { set, .. } = &net.state(alt.start()).unwrap().transitions()[0] else {
        panic!("expected a set transition");
    };
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![plus, minus]);
}

#[test]
fn rejects_unknown_target() {
    let mut b = NetworkBuilder::new();
    let stmt = b.rule("stmt");
    let entry = b.entry(stmt).unwrap();
    b.add_transition(
        entry,
        Transition::Epsilon {
            target: StateId::new(99),
        },
    );
    assert_eq!(
        b.build(),
        Err(NetworkError::UnknownTarget {
            from: entry,
            target: StateId::new(99)
        })
    );
}

#[test]
fn rejects_unknown_invoked_rule() {
    let mut b = NetworkBuilder::new();
    let stmt = b.rule("stmt");
    let alt = b.alternative(stmt, [Element::Rule(RuleId::new(7))]);
    assert_eq!(
        b.build(),
        Err(NetworkError::UnknownRule {
            from: alt.start(),
            rule: RuleId::new(7)
        })
    );
}

#[test]
fn rejects_transition_from_stop() {
    let mut b = NetworkBuilder::new();
    let stmt = b.rule("stmt");
    let entry = b.entry(stmt).unwrap();
    let stop = b.stop(stmt).unwrap();
    b.add_transition(stop, Transition::Epsilon { target: entry });
    assert_eq!(b.build(), Err(NetworkError::TransitionFromStop(stop)));
}

#[test]
fn rejects_cross_rule_edges() {
    let mut b = NetworkBuilder::new();
    let a = b.rule("a");
    let c = b.rule("c");
    let a_entry = b.entry(a).unwrap();
    let c_inner = b.add_state(c);
    b.add_transition(a_entry, Transition::Epsilon { target: c_inner });
    assert_eq!(
        b.build(),
        Err(NetworkError::CrossRuleTransition {
            from: a_entry,
            from_rule: a,
            target: c_inner,
            target_rule: c,
        })
    );
}

#[test]
fn rejects_empty_sets() {
    let mut b = NetworkBuilder::new();
    let stmt = b.rule("stmt");
    let alt = b.alternative(stmt, [Element::OneOf(vec![])]);
    assert_eq!(b.build(), Err(NetworkError::EmptySet(alt.start())));
}

#[test]
fn rejects_states_of_unknown_rules() {
    let mut b = NetworkBuilder::new();
    b.rule("stmt");
    let orphan = b.add_state(RuleId::new(3));
    assert_eq!(
        b.build(),
        Err(NetworkError::OrphanState {
            state: orphan,
            rule: RuleId::new(3)
        })
    );
}

#[test]
fn extra_stop_states_are_registered() {
    let mut b = NetworkBuilder::new();
    let semi = b.terminal(";");
    let stmt = b.rule("stmt");
    let entry = b.entry(stmt).unwrap();
    let early = b.add_stop_state(stmt);
    b.add_transition(
        entry,
        Transition::Atom {
            terminal: semi,
            target: early,
        },
    );
    let net = b.build().unwrap();

    assert_eq!(net.rule(stmt).unwrap().stops().len(), 2);
    assert!(net.state(early).unwrap().is_stop());
}

#[test]
fn error_messages_name_the_states() {
    let err = NetworkError::UnknownTarget {
        from: StateId::new(1),
        target: StateId::new(42),
    };
    assert_eq!(
        err.to_string(),
        "transition from s1 targets unknown state s42"
    );
}

// -- Rebuilding from parts --

fn sample() -> (Network, RuleId) {
    let mut b = NetworkBuilder::new();
    let ident = b.terminal("IDENT");
    let expr = b.rule("expr");
    b.alternative(expr, [Element::Token(ident)]);
    (b.build().unwrap(), expr)
}

#[test]
fn parts_of_a_valid_network_rebuild_unchanged() {
    let (net, _) = sample();
    let rebuilt = NetworkBuilder::from_parts(
        net.states.clone(),
        net.rules.clone(),
        net.vocabulary.clone(),
    )
    .build()
    .unwrap();
    assert_eq!(rebuilt, net);
}

#[test]
fn rule_entry_must_be_an_entry_state() {
    let (net, expr) = sample();
    let mut rules = net.rules.clone();
    // Point the entry at the alternative's first interior state.
    rules[expr.index()].entry = StateId::new(2);

    let rebuilt =
        NetworkBuilder::from_parts(net.states.clone(), rules, net.vocabulary.clone()).build();
    assert_eq!(rebuilt, Err(NetworkError::MalformedRule(expr)));
}

#[test]
fn rule_needs_a_stop_state() {
    let (net, expr) = sample();
    let mut rules = net.rules.clone();
    rules[expr.index()].stops.clear();

    let rebuilt =
        NetworkBuilder::from_parts(net.states.clone(), rules, net.vocabulary.clone()).build();
    assert_eq!(rebuilt, Err(NetworkError::MalformedRule(expr)));
}

#[test]
fn every_rule_needs_a_name() {
    let (net, _) = sample();
    let rebuilt =
        NetworkBuilder::from_parts(net.states.clone(), net.rules.clone(), Vocabulary::new())
            .build();
    assert_eq!(
        rebuilt,
        Err(NetworkError::RuleNamesMismatch { rules: 1, names: 0 })
    );
}

#[test]
fn rebuilt_edges_are_revalidated() {
    let (net, _) = sample();
    let mut states = net.states.clone();
    states[2].transitions.push(Transition::Epsilon {
        target: StateId::new(99),
    });

    let rebuilt = NetworkBuilder::from_parts(states, net.rules.clone(), net.vocabulary.clone())
        .build();
    assert_eq!(
        rebuilt,
        Err(NetworkError::UnknownTarget {
            from: StateId::new(2),
            target: StateId::new(99),
        })
    );
}

#[test]
fn nullable_rules_are_derived() {
    let mut b = NetworkBuilder::new();
    let k = b.terminal("K");
    let opt = b.rule("opt");
    let wrapper = b.rule("wrapper");
    let solid = b.rule("solid");
    b.alternative(opt, [Element::Token(k)]);
    b.alternative(opt, std::iter::empty());
    b.alternative(wrapper, [Element::Rule(opt), Element::Rule(opt)]);
    b.alternative(solid, [Element::Rule(opt), Element::Token(k)]);
    let net = b.build().unwrap();

    assert!(net.is_nullable(opt));
    assert!(net.is_nullable(wrapper));
    assert!(!net.is_nullable(solid));
    assert!(!net.is_nullable(RuleId::new(9)));
}
