//! Conversions between Jsonnet numbers and integers, and number rendering.

/// Integer part of `n`, saturating at the `i64` range.
#[expect(
    clippy::cast_possible_truncation,
    reason = "bitwise operators and indexing act on the integer part"
)]
pub(crate) fn truncate(n: f64) -> i64 {
    n as i64
}

#[expect(clippy::cast_precision_loss, reason = "Jsonnet numbers are doubles")]
pub(crate) fn from_i64(n: i64) -> f64 {
    n as f64
}

#[expect(clippy::cast_precision_loss, reason = "Jsonnet numbers are doubles")]
pub(crate) fn from_usize(n: usize) -> f64 {
    n as f64
}

/// Render for JSON output: integral values without a decimal point, others
/// in the shortest form that parses back to the same double.
pub(crate) fn unparse(n: f64, out: &mut String) {
    use std::fmt::Write;
    // Writing to a String cannot fail.
    let _ = if n == n.floor() {
        write!(out, "{n:.0}")
    } else {
        write!(out, "{n}")
    };
}

/// Split `x` into a mantissa in `[0.5, 1)` and a power of two.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    reason = "the biased exponent is 11 bits"
)]
pub(crate) fn frexp(x: f64) -> (f64, i32) {
    const EXP_MASK: u64 = 0x7ff << 52;
    if x == 0.0 || !x.is_finite() {
        return (x, 0);
    }
    let bits = x.to_bits();
    let biased = ((bits & EXP_MASK) >> 52) as i32;
    if biased == 0 {
        // Subnormal: scale into the normal range first.
        let (m, e) = frexp(x * 2f64.powi(64));
        return (m, e - 64);
    }
    let mantissa = f64::from_bits((bits & !EXP_MASK) | (1022 << 52));
    (mantissa, biased - 1022)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
