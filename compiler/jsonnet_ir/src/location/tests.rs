use super::*;
use pretty_assertions::assert_eq;

fn range(interner: &StringInterner, b: (u32, u32), e: (u32, u32)) -> LocationRange {
    LocationRange::new(
        interner.intern("main.jsonnet"),
        Location::new(b.0, b.1),
        Location::new(e.0, e.1),
    )
}

#[test]
fn test_single_line_range() {
    let interner = StringInterner::new();
    let r = range(&interner, (3, 5), (3, 12));
    assert_eq!(r.display(&interner).to_string(), "main.jsonnet:3:5-12");
}

#[test]
fn test_single_column_range() {
    let interner = StringInterner::new();
    let r = range(&interner, (1, 7), (1, 8));
    assert_eq!(r.display(&interner).to_string(), "main.jsonnet:1:7");
}

#[test]
fn test_multi_line_range() {
    let interner = StringInterner::new();
    let r = range(&interner, (2, 1), (4, 2));
    assert_eq!(r.display(&interner).to_string(), "main.jsonnet:(2:1)-(4:2)");
}

#[test]
fn test_label_only() {
    let interner = StringInterner::new();
    let r = LocationRange::label(interner.intern("During manifestation"));
    assert!(!r.is_set());
    assert_eq!(r.display(&interner).to_string(), "During manifestation");
}

#[test]
fn test_to_spans_both() {
    let interner = StringInterner::new();
    let a = range(&interner, (1, 1), (1, 3));
    let b = range(&interner, (2, 4), (2, 9));
    let merged = a.to(b);
    assert_eq!(merged.begin, Location::new(1, 1));
    assert_eq!(merged.end, Location::new(2, 9));
}
