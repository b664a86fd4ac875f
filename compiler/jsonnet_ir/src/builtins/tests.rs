use super::*;

#[test]
fn test_names_resolve() {
    for b in Builtin::ALL {
        assert_eq!(Builtin::from_name(b.name()), Some(b));
    }
    assert_eq!(Builtin::from_name("md5"), Some(Builtin::Md5));
    assert_eq!(Builtin::from_name("sha1"), None);
}

#[test]
fn test_params() {
    assert_eq!(Builtin::MakeArray.params().as_slice(), &["sz", "func"]);
    assert_eq!(
        Builtin::ObjectHasEx.params().as_slice(),
        &["obj", "f", "inc_hidden"]
    );
    assert_eq!(Builtin::Char.params().len(), 1);
}
