//! Numerical core of the admission-parameter search.
//
// For each candidate c the capacity constraint
//
//   sum_i P_in(r_i, mu, s_i, c) * s_i = K
//
// is solved for the characteristic time mu, then the candidate is scored by
// its modeled object hit ratio. The resident-byte sum is monotone
// decreasing in mu, so a bracketed binary search applies.

/// Per-key modeling input: object size and smoothed request rate.
#[derive(Clone, Copy)]
pub struct RateItem {
    pub s: i64,
    pub r: f64,
}

const MU_BRACKET_DOUBLINGS: usize = 40;
const MU_BISECTIONS: usize = 60;

/// Closed-form probability that an object is resident in the cache.
///
/// Defined as x*e / (1 + x*e) with x = exp(r/mu) - 1 and e = exp(-s/c),
/// and 0 for non-positive rates. When x*e is not finite the x -> inf limit
/// of 1.0 is returned, so a very hot key never sinks an otherwise good
/// candidate through overflow.
pub fn pin_closed_form(r: f64, mu: f64, s: f64, c: f64) -> f64 {
    if r <= 0.0 {
        return 0.0;
    }
    let x = (r / mu).exp() - 1.0;
    let e = (-s / c).exp();
    let num = x * e;
    if num.is_finite() {
        num / (1.0 + num)
    } else {
        1.0
    }
}

/// Modeled resident bytes under characteristic time `mu`.
pub fn cap_bytes(items: &[RateItem], mu: f64, c: f64) -> f64 {
    let mut sum = 0.0;
    for it in items {
        sum += pin_closed_form(it.r, mu, it.s as f64, c) * it.s as f64;
    }
    sum
}

/// Solves the capacity constraint for mu.
///
/// The bracket starts at [1e-6, 1] and the high end doubles until the
/// modeled bytes drop below the capacity; a bracket that never closes
/// discards the candidate. Returns None for a non-finite or non-positive
/// result.
pub fn solve_mu(items: &[RateItem], c: f64, capacity: i64) -> Option<f64> {
    if capacity <= 0 {
        return None;
    }
    let k = capacity as f64;

    let mut mu_lo = 1e-6;
    let mut mu_hi = 1.0;
    let mut doublings = 0;
    while cap_bytes(items, mu_hi, c) >= k {
        if doublings == MU_BRACKET_DOUBLINGS {
            return None;
        }
        mu_hi *= 2.0;
        doublings += 1;
    }

    for _ in 0..MU_BISECTIONS {
        let mid = 0.5 * (mu_lo + mu_hi);
        if cap_bytes(items, mid, c) > k {
            mu_lo = mid;
        } else {
            mu_hi = mid;
        }
    }

    let mu = 0.5 * (mu_lo + mu_hi);
    if mu.is_finite() && mu > 0.0 {
        Some(mu)
    } else {
        None
    }
}

/// Log-spaced candidate grid over [grid_min, grid_max], endpoints included.
pub fn candidate_grid(grid_min: i64, grid_max: i64, steps: usize) -> Vec<f64> {
    let log_min = (grid_min as f64).ln();
    let log_max = (grid_max as f64).ln();
    let mut grid = Vec::with_capacity(steps);
    for i in 0..steps {
        let t = i as f64 / (steps - 1) as f64;
        grid.push((log_min + t * (log_max - log_min)).exp());
    }
    grid
}
