use pretty_assertions::assert_eq;

use super::*;

fn r(n: u32) -> RuleId {
    RuleId::new(n)
}

#[test]
fn identical_stacks_share_an_id() {
    let mut arena = ContextArena::new();
    let root = arena.push(None, RuleFrame::new(r(0), 0));
    let a = arena.push(Some(root), RuleFrame::new(r(1), 2).returning_to(StateId::new(5)));
    let b = arena.push(Some(root), RuleFrame::new(r(1), 2).returning_to(StateId::new(5)));
    assert_eq!(a, b);
    assert_eq!(arena.len(), 2);
}

#[test]
fn return_state_distinguishes_stacks() {
    let mut arena = ContextArena::new();
    let root = arena.push(None, RuleFrame::new(r(0), 0));
    let a = arena.push(Some(root), RuleFrame::new(r(1), 0).returning_to(StateId::new(5)));
    let b = arena.push(Some(root), RuleFrame::new(r(1), 0).returning_to(StateId::new(9)));
    assert_ne!(a, b);
}

#[test]
fn path_is_outermost_first() {
    let mut arena = ContextArena::new();
    let root = arena.push(None, RuleFrame::new(r(0), 0));
    let mid = arena.push(Some(root), RuleFrame::new(r(3), 1));
    let inner = arena.push(Some(mid), RuleFrame::new(r(7), 1));

    assert_eq!(arena.path(inner).rules(), &[r(0), r(3), r(7)]);
    assert_eq!(arena.frame(inner).rule, r(7));
    assert_eq!(arena.parent(inner), Some(mid));
    assert_eq!(arena.parent(root), None);
}

#[test]
fn open_invocations_are_keyed_by_start_token() {
    let mut arena = ContextArena::new();
    let root = arena.push(None, RuleFrame::new(r(0), 0));
    let inner = arena.push(Some(root), RuleFrame::new(r(1), 3));

    assert_eq!(arena.open_count(inner, r(0), 0), 1);
    assert_eq!(arena.open_count(inner, r(1), 3), 1);
    assert_eq!(arena.open_count(inner, r(1), 4), 0);
    assert_eq!(arena.open_count(root, r(1), 3), 0);
}

#[test]
fn left_recursive_nesting_is_counted() {
    let mut arena = ContextArena::new();
    let root = arena.push(None, RuleFrame::new(r(0), 0));
    let again = arena.push(Some(root), RuleFrame::new(r(0), 0).returning_to(StateId::new(2)));
    let third = arena.push(Some(again), RuleFrame::new(r(0), 0).returning_to(StateId::new(2)));

    assert_eq!(arena.open_count(third, r(0), 0), 3);
    assert_eq!(arena.depth(root), 1);
    assert_eq!(arena.depth(third), 3);
}
