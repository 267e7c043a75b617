//! Weak-filter analysis
//!
//! How many checksums slip through a constraint set. Any two values that
//! differ by a multiple of the LCM of the moduli are indistinguishable to the
//! validator.

use crate::constraints::ConstraintSet;

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// LCM of all moduli. Solutions of a consistent set repeat with this period.
pub fn solution_period(set: &ConstraintSet) -> u128 {
    set.moduli()
        .map(|m| m as u128)
        .fold(1, |acc, m| acc / gcd(acc, m) * m)
}

/// Every checksum in `[start, end)` that the set accepts, ascending.
///
/// Walks the residue class of the largest modulus, so the cost is
/// `(end - start) / max_modulus` rather than the full range.
pub fn satisfying_checksums(
    set: &ConstraintSet,
    start: u32,
    end: u64,
) -> impl Iterator<Item = u32> + '_ {
    let end = end.min(1 << 32);
    let (step, residue) = set
        .pairs()
        .iter()
        .max_by_key(|p| p.modulus())
        .map(|p| (p.modulus() as u64, p.residue() as u64))
        .unwrap_or((1, 0));

    let start = start as u64;
    let first = start + (residue + step - start % step) % step;

    (0u64..)
        .map(move |k| first + k * step)
        .take_while(move |&x| x < end)
        .map(|x| x as u32)
        .filter(move |&x| set.accepts(x))
}
