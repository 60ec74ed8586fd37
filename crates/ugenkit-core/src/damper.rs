//! One-pole damping lowpass used inside the FDN reverb.
//!
//! ```text
//! y[n] = (1 - d) * x[n] + d * y[n-1]
//! ```
//!
//! `d = 0` passes the input untouched, `d` close to 1 darkens it heavily.
//! The coefficient is set directly rather than from a cutoff frequency: the
//! reverb exposes "damping" and "input bandwidth" as unitless amounts.

use crate::zap_gremlins;

/// One-pole lowpass with a direct damping coefficient and one memory cell.
///
/// # Example
///
/// ```rust
/// use ugenkit_core::Damper;
///
/// let mut damper = Damper::new(0.5);
/// assert_eq!(damper.process(1.0), 0.5);
/// assert_eq!(damper.process(1.0), 0.75);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Damper {
    damping: f32,
    memory: f32,
}

impl Damper {
    /// Create a damper with the given coefficient.
    pub fn new(damping: f32) -> Self {
        Self {
            damping,
            memory: 0.0,
        }
    }

    /// Change the coefficient; takes effect on the next sample.
    #[inline]
    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping;
    }

    /// Current coefficient.
    #[inline]
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Process one sample. The stored memory is guarded, the output is not.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let y = input * (1.0 - self.damping) + self.memory * self.damping;
        self.memory = zap_gremlins(y);
        y
    }

    /// Reset the memory cell to zero.
    pub fn reset(&mut self) {
        self.memory = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_damping_is_identity() {
        let mut damper = Damper::new(0.0);
        for x in [0.3, -0.7, 1.0, 0.0] {
            assert_eq!(damper.process(x), x);
        }
    }

    #[test]
    fn passes_dc() {
        let mut damper = Damper::new(0.9);
        let mut out = 0.0;
        for _ in 0..2000 {
            out = damper.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-4, "DC should settle at 1, got {out}");
    }

    #[test]
    fn attenuates_nyquist() {
        let mut damper = Damper::new(0.9);
        let mut sum = 0.0f32;
        for i in 0..4800 {
            let input = if i % 2 == 0 { 1.0 } else { -1.0 };
            sum += damper.process(input).abs();
        }
        let avg = sum / 4800.0;
        assert!(avg < 0.1, "alternating signal should be damped, avg = {avg}");
    }

    #[test]
    fn full_damping_holds_memory() {
        let mut damper = Damper::new(0.5);
        damper.process(1.0);
        damper.set_damping(1.0);
        assert_eq!(damper.process(100.0), 0.5);
    }

    #[test]
    fn nan_is_not_stored() {
        let mut damper = Damper::new(0.5);
        assert!(damper.process(f32::NAN).is_nan());
        assert_eq!(damper.process(0.0), 0.0);
    }

    #[test]
    fn reset_clears_state() {
        let mut damper = Damper::new(0.5);
        damper.process(1.0);
        damper.reset();
        assert_eq!(damper.process(0.0), 0.0);
    }
}
