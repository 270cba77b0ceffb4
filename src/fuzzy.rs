//! Tolerant float comparisons.
//!
//! Delays are sums of many interpolated table values, so exact equality is
//! meaningless once rounding accumulates. Every comparison in the crate goes
//! through these helpers.

/// Stand-in for infinity in min/max searches. Finite so that it survives arithmetic.
pub const INF: f32 = 1.0e30;

const RELATIVE_TOLERANCE: f32 = 1.0e-6;
const ABSOLUTE_TOLERANCE: f32 = 1.0e-15;

#[inline]
fn tolerance(v1: f32, v2: f32) -> f32 {
    (RELATIVE_TOLERANCE * v1.abs().max(v2.abs())).max(ABSOLUTE_TOLERANCE)
}

pub fn fuzzy_equal(v1: f32, v2: f32) -> bool {
    if v1 == v2 {
        true
    } else if fuzzy_inf(v1) || fuzzy_inf(v2) {
        fuzzy_inf(v1) && fuzzy_inf(v2) && v1.signum() == v2.signum()
    } else {
        (v1 - v2).abs() < tolerance(v1, v2)
    }
}

pub fn fuzzy_zero(v: f32) -> bool {
    v == 0.0 || v.abs() < ABSOLUTE_TOLERANCE
}

pub fn fuzzy_less(v1: f32, v2: f32) -> bool {
    v1 < v2 && !fuzzy_equal(v1, v2)
}

pub fn fuzzy_less_equal(v1: f32, v2: f32) -> bool {
    v1 < v2 || fuzzy_equal(v1, v2)
}

pub fn fuzzy_greater(v1: f32, v2: f32) -> bool {
    v1 > v2 && !fuzzy_equal(v1, v2)
}

pub fn fuzzy_greater_equal(v1: f32, v2: f32) -> bool {
    v1 > v2 || fuzzy_equal(v1, v2)
}

/// True for values at or beyond [`INF`] in magnitude (including real infinities).
pub fn fuzzy_inf(v: f32) -> bool {
    v.abs() >= INF * (1.0 - RELATIVE_TOLERANCE)
}
