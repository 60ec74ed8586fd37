//! Control-rate smoothers: linear [`Ramp`] and exponential [`Lag`].
//!
//! Both turn a stream of target values plus a glide time into a click-free
//! trajectory. They run either one value per call ([`Ramp::next`],
//! [`Lag::next`], the control-rate mode) or over a block of audio-rate
//! samples ([`Processor::process`]).
//!
//! Glide times are measured in seconds and converted with
//! `sample_rate / block_size` "control units" per second. For audio-rate use
//! construct with `block_size = 1`.
//!
//! ## Usage
//!
//! ```rust
//! use ugenkit_core::Ramp;
//!
//! // 100 control periods per second.
//! let mut ramp = Ramp::new(48000, 480).unwrap();
//! ramp.next(0.0, 0.1).unwrap();
//! // A new target is picked up at the next segment boundary and reached
//! // linearly over 10 calls.
//! let values: Vec<f64> = (0..25).map(|_| ramp.next(1.0, 0.1).unwrap()).collect();
//! assert_eq!(values[24], 1.0);
//! ```

use libm::{exp, round};

use crate::{ChannelLayout, Error, Processor, check_buffers, ensure_finite, zap_gremlins_f64};

/// `ln(0.001)`: a lag time is the time to fall 60 dB toward the target.
pub const LOG001: f64 = -6.907_755_278_982_137;

fn control_rate(sample_rate: u32, block_size: usize) -> Result<f64, Error> {
    if sample_rate == 0 {
        return Err(Error::invalid_config("sample_rate", "must be positive"));
    }
    if block_size == 0 {
        return Err(Error::invalid_config("block_size", "must be positive"));
    }
    Ok(f64::from(sample_rate) / block_size as f64)
}

/// Linear segment generator.
///
/// Each segment lasts `max(1, round(glide * rate / block_size))` steps and
/// ends exactly on its target. A new segment starts from the input present
/// at the boundary, so a target that keeps changing is followed segment by
/// segment.
///
/// # Invariants
///
/// - `counter >= 1` between calls once a segment has started
/// - at every segment boundary `level == target` exactly
#[derive(Debug, Clone)]
pub struct Ramp {
    level: f64,
    slope: f64,
    target: f64,
    counter: i64,
    units_per_second: f64,
    initialized: bool,
}

impl Ramp {
    /// Create a ramp for `sample_rate` with `block_size` samples per control unit.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] when either argument is zero.
    pub fn new(sample_rate: u32, block_size: usize) -> Result<Self, Error> {
        Ok(Self {
            level: 0.0,
            slope: 0.0,
            target: 0.0,
            counter: 1,
            units_per_second: control_rate(sample_rate, block_size)?,
            initialized: false,
        })
    }

    /// Current output level.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Target of the segment in progress.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Steps left in the segment in progress.
    pub fn remaining(&self) -> i64 {
        self.counter.max(0)
    }

    /// Segment length in steps for a glide time.
    pub fn segment_len(&self, glide: f64) -> i64 {
        let steps = round(glide * self.units_per_second);
        if steps >= 1.0 { steps as i64 } else { 1 }
    }

    /// Produce one control-rate value.
    ///
    /// Returns the level *before* advancing. When the segment in progress
    /// runs out, a new one toward `input` begins.
    ///
    /// # Errors
    ///
    /// [`Error::NonFinite`] if `glide` is NaN or infinite.
    pub fn next(&mut self, input: f64, glide: f64) -> Result<f64, Error> {
        ensure_finite("glide", glide)?;
        let input = finite_or_zero(input);
        self.seed(input);

        let out = self.level;
        self.level += self.slope;
        self.counter -= 1;
        if self.counter <= 0 {
            self.begin_segment(input, glide);
        }
        Ok(out)
    }

    fn seed(&mut self, input: f64) {
        if !self.initialized {
            self.level = input;
            self.target = input;
            self.initialized = true;
        }
    }

    fn begin_segment(&mut self, target: f64, glide: f64) {
        self.level = self.target;
        self.counter = self.segment_len(glide);
        self.slope = (target - self.level) / self.counter as f64;
        self.target = target;
    }

    fn run_block(&mut self, input: &[f32], output: &mut [f32], glide: f64) {
        let Some(&first) = input.first() else {
            return;
        };
        self.seed(finite_or_zero(f64::from(first)));

        let mut pos = 0;
        while pos < input.len() {
            if self.counter <= 0 {
                self.begin_segment(finite_or_zero(f64::from(input[pos])), glide);
            }
            let n = (input.len() - pos).min(self.counter as usize);
            for out in &mut output[pos..pos + n] {
                *out = self.level as f32;
                self.level += self.slope;
            }
            pos += n;
            self.counter -= n as i64;
        }
    }
}

impl Processor for Ramp {
    /// Glide time in seconds.
    type Params = f64;

    fn layout(&self) -> ChannelLayout {
        ChannelLayout::Mono
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        glide: &f64,
    ) -> Result<(), Error> {
        check_buffers(self.layout(), inputs, outputs)?;
        ensure_finite("glide", *glide)?;
        self.run_block(inputs[0], outputs[0], *glide);
        Ok(())
    }

    fn reset(&mut self) {
        self.level = 0.0;
        self.slope = 0.0;
        self.target = 0.0;
        self.counter = 1;
        self.initialized = false;
    }
}

/// Exponential one-pole smoother.
///
/// `y[n] = x[n] + b1 * (y[n-1] - x[n])` with
/// `b1 = exp(block_size * ln(0.001) / (lag * sample_rate))`, so the output
/// covers 60 dB of the distance to a constant target in `lag` seconds.
///
/// When the lag time changes between calls the coefficient glides to its new
/// value over the samples of that call instead of jumping.
///
/// # Invariants
///
/// - `b1` is in `[0, 1)`; it is exactly `0` when the lag time is `<= 0`
/// - the stored output is passed through [`zap_gremlins_f64`]
#[derive(Debug, Clone)]
pub struct Lag {
    y1: f64,
    b1: f64,
    lag: Option<f64>,
    sample_rate: f64,
    block_size: f64,
    initialized: bool,
}

impl Lag {
    /// Create a lag for `sample_rate` with `block_size` samples per control unit.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] when either argument is zero.
    pub fn new(sample_rate: u32, block_size: usize) -> Result<Self, Error> {
        control_rate(sample_rate, block_size)?;
        Ok(Self {
            y1: 0.0,
            b1: 0.0,
            lag: None,
            sample_rate: f64::from(sample_rate),
            block_size: block_size as f64,
            initialized: false,
        })
    }

    /// Smoothing coefficient currently in use.
    pub fn coefficient(&self) -> f64 {
        self.b1
    }

    /// Last stored output.
    pub fn value(&self) -> f64 {
        self.y1
    }

    /// Coefficient reached for a lag time in seconds.
    pub fn coefficient_for(&self, lag: f64) -> f64 {
        if lag <= 0.0 {
            0.0
        } else {
            exp(self.block_size * LOG001 / (lag * self.sample_rate))
        }
    }

    /// Produce one control-rate value.
    ///
    /// A changed lag time takes effect immediately in this mode.
    ///
    /// # Errors
    ///
    /// [`Error::NonFinite`] if `lag` is NaN or infinite.
    pub fn next(&mut self, input: f64, lag: f64) -> Result<f64, Error> {
        ensure_finite("lag", lag)?;
        self.seed(input);
        if self.lag != Some(lag) {
            self.b1 = self.coefficient_for(lag);
            self.lag = Some(lag);
        }
        let y = input + self.b1 * (self.y1 - input);
        self.y1 = zap_gremlins_f64(y);
        Ok(y)
    }

    fn seed(&mut self, input: f64) {
        if !self.initialized {
            self.y1 = input;
            self.initialized = true;
        }
    }

    fn run_block(&mut self, input: &[f32], output: &mut [f32], lag: f64) {
        let Some(&first) = input.first() else {
            return;
        };
        self.seed(f64::from(first));

        let mut y1 = self.y1;
        if self.lag == Some(lag) {
            let b1 = self.b1;
            for (x, out) in input.iter().zip(output.iter_mut()) {
                let y0 = f64::from(*x);
                y1 = y0 + b1 * (y1 - y0);
                *out = y1 as f32;
            }
        } else {
            let target = self.coefficient_for(lag);
            let slope = (target - self.b1) / input.len() as f64;
            let mut b1 = self.b1;
            for (x, out) in input.iter().zip(output.iter_mut()) {
                b1 += slope;
                let y0 = f64::from(*x);
                y1 = y0 + b1 * (y1 - y0);
                *out = y1 as f32;
            }
            self.b1 = target;
            self.lag = Some(lag);
        }
        self.y1 = zap_gremlins_f64(y1);
    }
}

impl Processor for Lag {
    /// Lag time in seconds.
    type Params = f64;

    fn layout(&self) -> ChannelLayout {
        ChannelLayout::Mono
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        lag: &f64,
    ) -> Result<(), Error> {
        check_buffers(self.layout(), inputs, outputs)?;
        ensure_finite("lag", *lag)?;
        self.run_block(inputs[0], outputs[0], *lag);
        Ok(())
    }

    fn reset(&mut self) {
        self.y1 = 0.0;
        self.b1 = 0.0;
        self.lag = None;
        self.initialized = false;
    }
}

/// Smoother variant selected by identifier.
#[derive(Debug, Clone)]
pub enum ControlSmoother {
    /// Linear segments.
    Ramp(Ramp),
    /// Exponential approach.
    Lag(Lag),
}

impl ControlSmoother {
    /// Build from an identifier: `"ramp"` or `"lag"`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownVariant`] for other identifiers, [`Error::InvalidConfig`]
    /// for a zero sample rate or block size.
    pub fn from_id(id: &str, sample_rate: u32, block_size: usize) -> Result<Self, Error> {
        match id {
            "ramp" => Ok(Self::Ramp(Ramp::new(sample_rate, block_size)?)),
            "lag" => Ok(Self::Lag(Lag::new(sample_rate, block_size)?)),
            other => Err(Error::UnknownVariant(other.into())),
        }
    }

    /// Identifier of the active variant.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Ramp(_) => "ramp",
            Self::Lag(_) => "lag",
        }
    }

    /// Produce one control-rate value; `glide` is in seconds.
    pub fn next(&mut self, input: f64, glide: f64) -> Result<f64, Error> {
        match self {
            Self::Ramp(ramp) => ramp.next(input, glide),
            Self::Lag(lag) => lag.next(input, glide),
        }
    }
}

impl Processor for ControlSmoother {
    /// Glide or lag time in seconds.
    type Params = f64;

    fn layout(&self) -> ChannelLayout {
        ChannelLayout::Mono
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        glide: &f64,
    ) -> Result<(), Error> {
        match self {
            Self::Ramp(ramp) => ramp.process(inputs, outputs, glide),
            Self::Lag(lag) => lag.process(inputs, outputs, glide),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Ramp(ramp) => ramp.reset(),
            Self::Lag(lag) => lag.reset(),
        }
    }
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_seeds_from_first_input() {
        let mut ramp = Ramp::new(48000, 480).unwrap();
        assert_eq!(ramp.next(0.7, 0.05).unwrap(), 0.7);
        assert_eq!(ramp.next(0.7, 0.05).unwrap(), 0.7);
    }

    #[test]
    fn ramp_segment_length_rounds() {
        let ramp = Ramp::new(48000, 480).unwrap();
        assert_eq!(ramp.segment_len(0.1), 10);
        assert_eq!(ramp.segment_len(0.126), 13);
        assert_eq!(ramp.segment_len(0.0), 1);
        assert_eq!(ramp.segment_len(-3.0), 1);
    }

    #[test]
    fn ramp_scalar_is_linear_and_exact() {
        let mut ramp = Ramp::new(100, 1).unwrap();
        // Segment of 4 steps toward the seed, then 4 toward 1.0.
        ramp.next(0.0, 0.04).unwrap();
        let values: Vec<f64> = (0..12).map(|_| ramp.next(1.0, 0.04).unwrap()).collect();
        assert_eq!(&values[..4], &[0.0, 0.0, 0.0, 0.0]);
        for (i, v) in values[4..8].iter().enumerate() {
            assert!((v - i as f64 * 0.25).abs() < 1e-12, "step {i}: {v}");
        }
        assert!(values[8..].iter().all(|&v| v == 1.0));
    }

    #[test]
    fn ramp_block_tracks_changing_target() {
        let mut ramp = Ramp::new(1000, 1).unwrap();
        let input = [0.0f32; 1]
            .iter()
            .chain([2.0f32; 15].iter())
            .copied()
            .collect::<Vec<_>>();
        let mut output = vec![0.0f32; input.len()];
        // 4-sample segments.
        ramp.process_mono(&input, &mut output, &0.004).unwrap();
        assert_eq!(output[0], 0.0);
        // Segment starting at sample 1 ramps 0 -> 2 over 4 samples.
        assert_eq!(&output[1..5], &[0.0, 0.5, 1.0, 1.5]);
        assert!(output[5..].iter().all(|&v| v == 2.0));
        assert_eq!(ramp.level(), 2.0);
    }

    #[test]
    fn ramp_boundary_at_block_end_uses_next_block() {
        let mut whole = Ramp::new(1000, 1).unwrap();
        let mut split = Ramp::new(1000, 1).unwrap();
        let input: Vec<f32> = (0..12).map(|i| i as f32).collect();
        let mut out_whole = vec![0.0; 12];
        let mut out_split = vec![0.0; 12];

        whole.process_mono(&input, &mut out_whole, &0.003).unwrap();
        let (a, b) = out_split.split_at_mut(4);
        split.process_mono(&input[..4], a, &0.003).unwrap();
        split.process_mono(&input[4..], b, &0.003).unwrap();

        assert_eq!(out_whole, out_split);
    }

    #[test]
    fn ramp_rejects_non_finite_glide() {
        let mut ramp = Ramp::new(48000, 64).unwrap();
        assert_eq!(
            ramp.next(1.0, f64::NAN),
            Err(Error::NonFinite { name: "glide" })
        );
        // Rejected call did not seed the ramp.
        assert_eq!(ramp.next(0.25, 0.0).unwrap(), 0.25);
    }

    #[test]
    fn ramp_rejects_zero_rate_or_block() {
        assert!(Ramp::new(0, 64).is_err());
        assert!(Ramp::new(48000, 0).is_err());
    }

    #[test]
    fn lag_zero_is_identity() {
        let mut lag = Lag::new(48000, 64).unwrap();
        for x in [0.3, -1.5, 7.0, 0.0, 1e-3] {
            assert_eq!(lag.next(x, 0.0).unwrap(), x);
        }
        assert_eq!(lag.coefficient(), 0.0);
    }

    #[test]
    fn lag_reaches_sixty_db_in_lag_time() {
        // block_size 1: one call per sample, 100 samples per 0.1 s at 1 kHz.
        let mut lag = Lag::new(1000, 1).unwrap();
        lag.next(0.0, 0.1).unwrap();
        let mut y = 0.0;
        for _ in 0..100 {
            y = lag.next(1.0, 0.1).unwrap();
        }
        assert!((y - 0.999).abs() < 1e-9, "expected 60 dB approach, got {y}");
    }

    #[test]
    fn lag_coefficient_in_unit_interval() {
        let lag = Lag::new(48000, 64).unwrap();
        for t in [1e-6, 0.001, 0.1, 1.0, 100.0] {
            let b1 = lag.coefficient_for(t);
            assert!((0.0..1.0).contains(&b1), "b1 = {b1} for lag {t}");
        }
        assert_eq!(lag.coefficient_for(-1.0), 0.0);
    }

    #[test]
    fn lag_block_glides_coefficient() {
        let mut lag = Lag::new(48000, 4).unwrap();
        let input = [1.0f32; 4];
        let mut output = [0.0f32; 4];
        lag.process_mono(&[0.0; 4], &mut output, &0.0).unwrap();
        lag.process_mono(&input, &mut output, &0.01).unwrap();
        let target = lag.coefficient_for(0.01);
        assert_eq!(lag.coefficient(), target);
        // Coefficient rises within the block, so the approach slows down.
        let steps: Vec<f32> = output.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(output.iter().all(|&y| y > 0.0 && y <= 1.0));
        assert!(steps.iter().all(|&s| s >= 0.0));
    }

    #[test]
    fn lag_short_block_glides_over_call_length() {
        let mut lag = Lag::new(48000, 64).unwrap();
        let mut output = [0.0f32; 16];
        lag.process_mono(&[0.0; 16], &mut output, &0.0).unwrap();

        let input = [1.0f32; 16];
        lag.process_mono(&input, &mut output, &0.1).unwrap();
        let target = lag.coefficient_for(0.1);
        assert_eq!(lag.coefficient(), target);

        // The glide spans the 16 samples actually supplied, not the 64-sample
        // control block, so the last sample already runs at the target.
        let slope = target / 16.0;
        let (mut b1, mut y1) = (0.0f64, 0.0f64);
        for (i, &y) in output.iter().enumerate() {
            b1 += slope;
            assert!(b1 < 1.0);
            y1 = 1.0 + b1 * (y1 - 1.0);
            assert!((f64::from(y) - y1).abs() < 1e-6, "sample {i}: {y} vs {y1}");
            assert!(y > 0.0 && y <= 1.0);
        }
        assert!((b1 - target).abs() < 1e-12);
    }

    #[test]
    fn lag_stores_guarded_value() {
        let mut lag = Lag::new(48000, 1).unwrap();
        lag.next(1e-20, 0.5).unwrap();
        assert_eq!(lag.value(), 0.0);
        let mut out = [0.0f32; 2];
        lag.process_mono(&[f32::NAN, f32::NAN], &mut out, &0.5).unwrap();
        assert_eq!(lag.value(), 0.0);
    }

    #[test]
    fn lag_rejects_non_finite_time() {
        let mut lag = Lag::new(48000, 64).unwrap();
        let mut out = [0.0f32; 4];
        assert!(lag.process_mono(&[1.0; 4], &mut out, &f64::INFINITY).is_err());
        assert!(lag.next(1.0, f64::NAN).is_err());
    }

    #[test]
    fn control_smoother_from_id() {
        assert_eq!(
            ControlSmoother::from_id("ramp", 48000, 64).unwrap().id(),
            "ramp"
        );
        assert_eq!(ControlSmoother::from_id("lag", 48000, 64).unwrap().id(), "lag");
        assert!(matches!(
            ControlSmoother::from_id("slew", 48000, 64),
            Err(Error::UnknownVariant(_))
        ));
    }

    #[test]
    fn reset_restores_seeding() {
        let mut smoother = ControlSmoother::from_id("lag", 48000, 64).unwrap();
        smoother.next(5.0, 1.0).unwrap();
        smoother.reset();
        assert_eq!(smoother.next(-2.0, 1.0).unwrap(), -2.0);
    }
}
