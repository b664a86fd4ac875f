use super::*;
use crate::StringInterner;

#[test]
fn test_free_vars_default_empty() {
    let node = Node::new(LocationRange::default(), ExprKind::Null);
    assert!(!node.has_free_vars());
    assert!(node.free_vars().is_empty());
}

#[test]
fn test_free_vars_sorted_and_deduped() {
    let interner = StringInterner::new();
    let a = interner.intern("a");
    let b = interner.intern("b");
    let node = Node::new(LocationRange::default(), ExprKind::Var(b));
    node.set_free_vars(vec![b, a, b]);
    assert_eq!(node.free_vars(), &[a, b]);
}

#[test]
fn test_free_vars_set_once() {
    let interner = StringInterner::new();
    let a = interner.intern("a");
    let node = Node::new(LocationRange::default(), ExprKind::Var(a));
    node.set_free_vars(vec![a]);
    node.set_free_vars(Vec::new());
    assert_eq!(node.free_vars(), &[a]);
}
