use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn render(n: f64) -> String {
    let mut out = String::new();
    unparse(n, &mut out);
    out
}

#[test]
fn integral_values_have_no_decimal_point() {
    assert_eq!(render(3.0), "3");
    assert_eq!(render(-42.0), "-42");
    assert_eq!(render(1e21), "1000000000000000000000");
}

#[test]
fn fractions_use_shortest_form() {
    assert_eq!(render(0.5), "0.5");
    assert_eq!(render(0.1 + 0.2), "0.30000000000000004");
    assert_eq!(render(-1.25), "-1.25");
}

#[test]
fn frexp_splits_powers_of_two() {
    assert_eq!(frexp(8.0), (0.5, 4));
    assert_eq!(frexp(1.0), (0.5, 1));
    assert_eq!(frexp(-3.0), (-0.75, 2));
    assert_eq!(frexp(0.0), (0.0, 0));
}

#[test]
fn frexp_handles_subnormals() {
    let tiny = f64::from_bits(1);
    let (m, e) = frexp(tiny);
    assert_eq!(m, 0.5);
    assert_eq!(e, -1073);
}

#[test]
fn truncate_drops_fraction() {
    assert_eq!(truncate(2.9), 2);
    assert_eq!(truncate(-2.9), -2);
}

proptest! {
    #[test]
    fn rendering_round_trips(n in proptest::num::f64::NORMAL | proptest::num::f64::SUBNORMAL) {
        let parsed: f64 = render(n).parse().unwrap();
        prop_assert_eq!(parsed, n);
    }

    #[test]
    fn frexp_reconstructs(n in (-1e300f64..1e300).prop_filter("nonzero", |n| *n != 0.0)) {
        let (m, e) = frexp(n);
        prop_assert!((0.5..1.0).contains(&m.abs()));
        prop_assert_eq!(m * 2f64.powi(e), n);
    }
}
