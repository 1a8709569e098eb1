//! Reference scalar kernel: no SIMD, no alignment requirement.

use super::Distance;

#[must_use]
pub fn distance(a: &[f64], b: &[f64]) -> Distance {
    debug_assert_eq!(a.len(), b.len());
    let sum_sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    Distance(sum_sq.sqrt())
}
