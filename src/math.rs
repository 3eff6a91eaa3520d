// src/math.rs
//! Floating-point comparison helpers shared by the pool and the arbitrage search.
//!
//! Every "close enough" decision in the crate goes through [`approx_eq`] or
//! [`approx_eq_with`], so the tolerance used for ratio-K comparison and for
//! bisection termination is the same number everywhere.

/// Relative tolerance for ratio-K comparison and search termination.
pub const REL_EPSILON: f64 = 1e-9;

/// Relative tolerance for the liquidity proportion check.
pub const PROPORTION_TOLERANCE: f64 = 1e-5;

/// Upper bound on bisection steps in the arbitrage search.
pub const MAX_SEARCH_ITERATIONS: usize = 200;

/// `|a - b| <= max(rel_tol * max(|a|, |b|), abs_tol)`.
///
/// Equal values (including two infinities of the same sign) always compare equal.
pub fn approx_eq_with(a: f64, b: f64, rel_tol: f64, abs_tol: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    let diff = (a - b).abs();
    diff <= (rel_tol * a.abs().max(b.abs())).max(abs_tol)
}

/// Relative comparison with [`REL_EPSILON`] and no absolute floor.
pub fn approx_eq(a: f64, b: f64) -> bool {
    approx_eq_with(a, b, REL_EPSILON, 0.0)
}

/// Spread between two prices in basis points, measured against the lower one.
pub fn spread_bps(price_a: f64, price_b: f64) -> Option<f64> {
    if price_a <= 0.0 || price_b <= 0.0 {
        return None;
    }

    let spread = if price_a > price_b {
        (price_a - price_b) / price_b
    } else {
        (price_b - price_a) / price_a
    };

    Some(spread * 10_000.0)
}
