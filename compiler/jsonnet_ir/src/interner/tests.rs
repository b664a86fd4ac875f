use super::*;

#[test]
fn test_intern_is_stable() {
    let interner = StringInterner::new();
    let a = interner.intern("field");
    let b = interner.intern("field");
    let c = interner.intern("other");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.lookup(a), "field");
    assert_eq!(interner.lookup(c), "other");
}

#[test]
fn test_empty_is_preinterned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
    assert_eq!(interner.len(), 1);
}

#[test]
fn test_get_does_not_insert() {
    let interner = StringInterner::new();
    assert_eq!(interner.get("x"), None);
    let x = interner.intern("x");
    assert_eq!(interner.get("x"), Some(x));
    assert_eq!(interner.len(), 2);
}

#[test]
fn test_unicode_names() {
    let interner = StringInterner::new();
    let n = interner.intern("ключ");
    assert_eq!(interner.lookup(n), "ключ");
}
