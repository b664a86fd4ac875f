use super::dir_name;
use pretty_assertions::assert_eq;

#[test]
fn dir_name_keeps_trailing_slash() {
    assert_eq!(dir_name("a/b/c.jsonnet"), "a/b/");
    assert_eq!(dir_name("/c.jsonnet"), "/");
    assert_eq!(dir_name("c.jsonnet"), "");
}
