//! Interpolating B-splines over unit spaced samples.
//!
//! Knots are placed the way FITPACK places them for an interpolating
//! (smoothing factor zero) fit: `k + 1` coincident knots at each end
//! and interior knots at the data sites (odd degree) or midway
//! between them (even degree).

use super::solve::solve;
use crate::C;

/// Returns weights `w` such that the interpolating spline through
/// samples `z[0..n]` at sites `0..n` evaluates to `Σ w[i] * z[i]` at
/// `x`.
///
/// The degree is `min(n - 1, 3)`. `x` is clamped to `[0, n - 1]`.
/// Returns `None` for fewer than two samples.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn spline_weights(n: usize, x: C) -> Option<Vec<C>> {
    if n < 2 {
        return None;
    }
    let k = (n - 1).min(3);
    let knots = knots(n, k);
    let x = x.clamp(0.0, (n - 1) as C);

    // Collocation matrix transposed: at[i][p] = B_i(site p).
    let mut at = vec![0.0; n * n];
    for site in 0..n {
        for (i, b) in basis(&knots, n, k, site as C) {
            at[i * n + site] = b;
        }
    }

    let mut rhs = vec![0.0; n];
    for (i, b) in basis(&knots, n, k, x) {
        rhs[i] = b;
    }
    solve(at, rhs)
}

#[allow(clippy::cast_precision_loss)]
fn knots(n: usize, k: usize) -> Vec<C> {
    let last = (n - 1) as C;
    let mut knots = Vec::with_capacity(n + k + 1);
    knots.extend(std::iter::repeat(0.0).take(k + 1));
    for j in 0..n - k - 1 {
        let site = if k % 2 == 1 {
            (j + (k + 1) / 2) as C
        } else {
            (j + k / 2) as C + 0.5
        };
        knots.push(site);
    }
    knots.extend(std::iter::repeat(last).take(k + 1));
    knots
}

/// Returns the `k + 1` nonzero basis functions at `x` as
/// `(index, value)` pairs.
fn basis(knots: &[C], n: usize, k: usize, x: C) -> impl Iterator<Item = (usize, C)> {
    // Knot span with knots[span] <= x < knots[span + 1], the last
    // nonempty span taking the right endpoint.
    let span = (k..n).rev().find(|&l| knots[l] <= x).unwrap_or(k);

    let mut values = vec![0.0; k + 1];
    let mut left = vec![0.0; k + 1];
    let mut right = vec![0.0; k + 1];
    values[0] = 1.0;
    for j in 1..=k {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = values[r] / (right[r + 1] + left[j - r]);
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }
    (span - k..=span).zip(values)
}
