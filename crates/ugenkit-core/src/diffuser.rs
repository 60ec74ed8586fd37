//! Allpass diffuser for echo-density build-up.
//!
//! A lattice allpass over a [`DelayLine`]: flat magnitude response, smeared
//! phase. Chained diffusers turn a click into a dense burst without colouring
//! its spectrum, which is what the FDN reverb needs at its input and outputs.
//!
//! ```text
//! w[n] = x[n] - c * w[n-N]
//! y[n] = w[n-N] + c * w[n]
//! ```

use crate::{DelayLine, flush_to_zero, zap_gremlins};

/// Allpass scattering stage with a single feedback coefficient.
///
/// # Example
///
/// ```rust
/// use ugenkit_core::Diffuser;
///
/// let mut diffuser = Diffuser::new(142, 0.75);
/// let first = diffuser.process(1.0);
/// assert_eq!(first, 0.75);
/// ```
#[derive(Debug, Clone)]
pub struct Diffuser {
    line: DelayLine,
    coef: f32,
}

impl Diffuser {
    /// Create a diffuser with `size` samples of delay (at least 1).
    pub fn new(size: usize, coef: f32) -> Self {
        Self {
            line: DelayLine::new(size),
            coef,
        }
    }

    /// Process one sample.
    ///
    /// The internal state is flushed with [`flush_to_zero`] before it feeds
    /// the output and guarded with [`zap_gremlins`] before it is stored.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let held = self.line.oldest();
        let w = flush_to_zero(input - held * self.coef);
        let output = held + w * self.coef;
        self.line.write(zap_gremlins(w));
        output
    }

    /// Delay length in samples.
    pub fn size(&self) -> usize {
        self.line.len()
    }

    /// Feedback coefficient.
    pub fn coef(&self) -> f32 {
        self.coef
    }

    /// Zero the internal buffer.
    pub fn clear(&mut self) {
        self.line.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diffuser_impulse_response() {
        let mut diffuser = Diffuser::new(10, 0.75);
        let response: Vec<f32> = (0..21)
            .map(|i| diffuser.process(if i == 0 { 1.0 } else { 0.0 }))
            .collect();

        assert_eq!(response[0], 0.75);
        assert!(response[1..10].iter().all(|&y| y == 0.0));
        assert!((response[10] - (1.0 - 0.75 * 0.75)).abs() < 1e-6);
        assert!((response[20] - (-0.75 * (1.0 - 0.75 * 0.75))).abs() < 1e-6);
    }

    #[test]
    fn test_diffuser_energy_conservation() {
        let mut diffuser = Diffuser::new(37, 0.625);
        let mut energy = 0.0f64;
        for i in 0..20_000 {
            let y = diffuser.process(if i == 0 { 1.0 } else { 0.0 });
            energy += f64::from(y * y);
        }
        assert!(
            (energy - 1.0).abs() < 1e-3,
            "allpass should preserve impulse energy, got {energy}"
        );
    }

    #[test]
    fn test_diffuser_clears_to_silence() {
        let mut diffuser = Diffuser::new(8, 0.75);
        for _ in 0..20 {
            diffuser.process(1.0);
        }
        diffuser.clear();
        assert_eq!(diffuser.process(0.0), 0.0);
    }

    #[test]
    fn test_no_denormals_after_silence() {
        let mut diffuser = Diffuser::new(5, 0.75);
        diffuser.process(1.0);
        let mut last = 1.0;
        for _ in 0..100_000 {
            last = diffuser.process(0.0);
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn test_nan_input_does_not_persist() {
        let mut diffuser = Diffuser::new(4, 0.75);
        diffuser.process(f32::NAN);
        for _ in 0..8 {
            diffuser.process(0.0);
        }
        assert_eq!(diffuser.process(0.0), 0.0);
    }
}
