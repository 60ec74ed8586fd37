//! Numeric guards and small integer helpers shared by every recurrence.
//!
//! Recursive filters and feedback delay lines decay toward zero forever. Left
//! alone, their state drifts into the subnormal range (slow on most CPUs) or,
//! after a single bad input, holds a NaN that never leaves. The helpers here
//! replace such values with an exact zero before they are stored.
//!
//! # Guards
//!
//! - [`zap_gremlins`] / [`zap_gremlins_f64`] - zero anything outside `(1e-15, 1e15)` in magnitude
//! - [`flush_to_zero`] - cheap exponent-bit test for very small `f32` values
//!
//! # Sizing
//!
//! - [`round_ties_even`] - round-half-to-even, used to size diffusers and delay lines
//! - [`nearest_prime`] - nearest prime within a relative search window

/// Smallest magnitude that survives [`zap_gremlins`].
pub const GREMLIN_FLOOR: f32 = 1e-15;

/// Largest magnitude that survives [`zap_gremlins`].
pub const GREMLIN_CEILING: f32 = 1e15;

/// Replace vanishingly small, huge or non-finite values with exact zero.
///
/// Returns `x` unchanged when `1e-15 < |x| < 1e15`, otherwise `0.0`.
/// NaN fails both comparisons and is zeroed too.
///
/// # Example
/// ```rust
/// use ugenkit_core::zap_gremlins;
///
/// assert_eq!(zap_gremlins(0.5), 0.5);
/// assert_eq!(zap_gremlins(1e-30), 0.0);
/// assert_eq!(zap_gremlins(f32::NAN), 0.0);
/// ```
#[inline]
pub fn zap_gremlins(x: f32) -> f32 {
    let abs = x.abs();
    if abs > GREMLIN_FLOOR && abs < GREMLIN_CEILING {
        x
    } else {
        0.0
    }
}

/// Double-precision [`zap_gremlins`], for smoother and filter state.
#[inline]
pub fn zap_gremlins_f64(x: f64) -> f64 {
    let abs = x.abs();
    if abs > f64::from(GREMLIN_FLOOR) && abs < f64::from(GREMLIN_CEILING) {
        x
    } else {
        0.0
    }
}

/// Zero an `f32` whose biased exponent is below 16.
///
/// Inspects the exponent bits directly instead of comparing magnitudes, which
/// catches subnormals and values a few octaves above them (`|x| < ~2^-111`).
/// Infinities and NaN are passed through; pair with [`zap_gremlins`] where
/// those must be removed as well.
#[inline]
pub fn flush_to_zero(x: f32) -> f32 {
    if x.to_bits() & 0x7f80_0000 < 0x0800_0000 {
        0.0
    } else {
        x
    }
}

/// Round to the nearest integer, ties to even.
///
/// Matches the behavior of adding `1.5 * 2^23` to a float and reading back
/// the mantissa, for inputs well inside the `i32` range.
///
/// # Example
/// ```rust
/// use ugenkit_core::round_ties_even;
///
/// assert_eq!(round_ties_even(2.5), 2);
/// assert_eq!(round_ties_even(3.5), 4);
/// assert_eq!(round_ties_even(-1.2), -1);
/// ```
#[inline]
pub fn round_ties_even(x: f32) -> i32 {
    let floor = libm::floorf(x);
    let diff = x - floor;
    let base = floor as i32;
    if diff > 0.5 {
        base + 1
    } else if diff < 0.5 {
        base
    } else if base % 2 == 0 {
        base
    } else {
        base + 1
    }
}

/// Trial-division primality test.
pub fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    if n == 2 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut i = 3;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// Find the prime closest to `n`, searching at most `n * relative_error` away.
///
/// Candidates above `n` are tried before candidates below at each distance.
/// Returns `None` when no prime lies inside the window.
///
/// # Example
/// ```rust
/// use ugenkit_core::nearest_prime;
///
/// assert_eq!(nearest_prime(1423, 0.5), Some(1423));
/// assert_eq!(nearest_prime(1410, 0.5), Some(1409));
/// assert_eq!(nearest_prime(0, 0.5), None);
/// ```
pub fn nearest_prime(n: i64, relative_error: f32) -> Option<i64> {
    if is_prime(n) {
        return Some(n);
    }
    let bound = (n as f32 * relative_error) as i64;
    (1..=bound).find_map(|k| {
        if is_prime(n + k) {
            Some(n + k)
        } else if is_prime(n - k) {
            Some(n - k)
        } else {
            None
        }
    })
}
