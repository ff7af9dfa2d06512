//! Tools for optimizing fractions as musical lengths.

use fraction::Fraction;

/// Shorthand for non-negative fraction construction.
pub fn frac(numerator: u64, denominator: u64) -> Fraction {
    Fraction::new(numerator, denominator)
}

/// Closest fraction to `frac` with denominator not bigger than `limit`.
///
/// Uses continued fractions, so the result is the best rational
/// approximation, not just a rounding to `1/limit` grid. Fractions that
/// already fit the limit are returned untouched.
///
/// # Example
///
/// ```
/// # use fraction::Fraction;
/// # use score_rhythm::primitives::limit_denominator;
/// assert_eq!(
///     limit_denominator(Fraction::from(3.141592653589793), 100),
///     Fraction::new(311u64, 99u64)
/// );
/// assert_eq!(
///     limit_denominator(Fraction::new(1u64, 3u64), 1000),
///     Fraction::new(1u64, 3u64)
/// );
/// ```
pub fn limit_denominator(frac: Fraction, limit: u64) -> Fraction {
    let (num, den) = match (frac.numer(), frac.denom()) {
        (Some(num), Some(den)) => (*num, *den),
        _ => return frac,
    };
    if limit < 1 || den <= limit {
        return frac;
    }
    let (mut p0, mut q0, mut p1, mut q1) = (0_u64, 1_u64, 1_u64, 0_u64);
    let (mut n, mut d) = (num, den);
    while d != 0 {
        let a = n / d;
        let q2 = q0.saturating_add(a.saturating_mul(q1));
        if q2 > limit {
            break;
        }
        (p0, q0, p1, q1) = (p1, q1, p0.saturating_add(a.saturating_mul(p1)), q2);
        (n, d) = (d, n - a * d);
    }
    let k = (limit - q0) / q1;
    let bound1 = Fraction::new(p0 + k * p1, q0 + k * q1);
    let bound2 = Fraction::new(p1, q1);
    let absolute = Fraction::new(num, den);
    let closest = match (bound2 - absolute).abs() <= (bound1 - absolute).abs()
    {
        true => bound2,
        false => bound1,
    };
    match frac.is_sign_negative() {
        true => -closest,
        false => closest,
    }
}

/// Largest power of two, that is not bigger than `num`.
///
/// Returns None for zero.
pub fn power_of_two(num: u64) -> Option<u64> {
    match num {
        0 => None,
        x => Some(1 << (63 - x.leading_zeros())),
    }
}

pub fn is_power_of_two(num: u64) -> bool {
    num != 0 && num & (num - 1) == 0
}

pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

pub fn lcm(a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 {
        return 0;
    }
    a / gcd(a, b) * b
}

/// Numerator and denominator of fraction, as if it is non-negative.
///
/// NaN and infinite fractions are reported as `(0, 1)`, which is never
/// reached for values that passed [crate::primitives::Duration] checks.
pub fn ratio(frac: &Fraction) -> (u64, u64) {
    match (frac.numer(), frac.denom()) {
        (Some(num), Some(den)) if *den != 0 => (*num, *den),
        _ => (0, 1),
    }
}

/// True if fraction is a whole number.
pub fn is_integer(frac: &Fraction) -> bool {
    ratio(frac).1 == 1
}
