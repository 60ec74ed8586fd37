//! Two-pole filter bank: low-pass, high-pass, band-pass and band-reject.
//!
//! All four responses share one state layout (`y1`, `y2`, four coefficients)
//! and one update discipline:
//!
//! - Coefficients are recomputed only when the frequency (or bandwidth, for
//!   the band responses) differs from the cached value.
//! - In block mode the new coefficients are reached by a linear glide over
//!   the block, stepped once per group of three samples. Samples left over
//!   after the last full group use the final glide values.
//! - The very first block is preceded by a one-sample priming pass so the
//!   recurrence does not start from an all-zero state.
//! - `y1` and `y2` go through [`zap_gremlins_f64`] after every call.
//!
//! # Coefficients
//!
//! With `w = 2π / rate`, the closed forms are:
//!
//! | Response | Setup | Output |
//! |----------|-------|--------|
//! | Low-pass | `C = 1/tan(f·w/2)`, `a0 = 1/(1+√2C+C²)`, `b1 = -2(1-C²)a0`, `b2 = -(1-√2C+C²)a0` | `a0(y0 + 2y1 + y2)` |
//! | High-pass | `C = tan(f·w/2)`, `b1 = 2(1-C²)a0`, same `a0`, `b2` | `a0(y0 - 2y1 + y2)` |
//! | Band-pass | `C = 1/tan(bw·f·w/2)`, `D = 2cos(f·w)`, `a0 = 1/(1+C)`, `b1 = C·D·a0`, `b2 = (1-C)a0` | `a0(y0 - y2)` |
//! | Band-reject | `C = tan(bw·f·w/2)`, `a1 = -D·a0`, `b2 = (1-C)a0` | `a0(y0 + y2) + a1·y1` |
//!
//! where `y0 = x + b1·y1 + b2·y2` (band-reject: `y0 = x - a1·y1 - b2·y2`).

use core::f64::consts::{PI, SQRT_2};
use core::str::FromStr;

use libm::{cos, tan};

use crate::{ChannelLayout, Error, Processor, check_buffers, ensure_finite, zap_gremlins_f64};

/// Filter response selected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterResponse {
    /// Second-order Butterworth low-pass (`"lpf"`).
    LowPass,
    /// Second-order Butterworth high-pass (`"hpf"`).
    HighPass,
    /// Constant-skirt band-pass (`"bpf"`).
    BandPass,
    /// Band-reject / notch (`"brf"`).
    BandReject,
}

impl FilterResponse {
    /// All responses, in identifier order.
    pub const ALL: [Self; 4] = [
        Self::LowPass,
        Self::HighPass,
        Self::BandPass,
        Self::BandReject,
    ];

    /// Short identifier.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::LowPass => "lpf",
            Self::HighPass => "hpf",
            Self::BandPass => "bpf",
            Self::BandReject => "brf",
        }
    }

    /// Whether a bandwidth parameter is required.
    pub const fn uses_bandwidth(&self) -> bool {
        matches!(self, Self::BandPass | Self::BandReject)
    }

    /// Closed-form coefficients for `frequency` Hz at `radians_per_sample`.
    ///
    /// `bandwidth` is ignored by the low-pass and high-pass responses.
    /// `frequency` must lie strictly between 0 and Nyquist and a band
    /// `bandwidth` must be positive; otherwise `tan` hits a pole or zero and
    /// the coefficients come out NaN.
    pub fn coefficients(
        &self,
        frequency: f64,
        bandwidth: f64,
        radians_per_sample: f64,
    ) -> Coefficients {
        match self {
            Self::LowPass | Self::HighPass => {
                let pfreq = frequency * radians_per_sample * 0.5;
                let (c, sign) = if *self == Self::LowPass {
                    (1.0 / tan(pfreq), -1.0)
                } else {
                    (tan(pfreq), 1.0)
                };
                let c2 = c * c;
                let sqrt2c = c * SQRT_2;
                let a0 = 1.0 / (1.0 + sqrt2c + c2);
                Coefficients {
                    a0,
                    a1: 0.0,
                    b1: sign * 2.0 * (1.0 - c2) * a0,
                    b2: -(1.0 - sqrt2c + c2) * a0,
                }
            }
            Self::BandPass => {
                let pfreq = frequency * radians_per_sample;
                let c = 1.0 / tan(bandwidth * pfreq * 0.5);
                let d = 2.0 * cos(pfreq);
                let a0 = 1.0 / (1.0 + c);
                Coefficients {
                    a0,
                    a1: 0.0,
                    b1: c * d * a0,
                    b2: (1.0 - c) * a0,
                }
            }
            Self::BandReject => {
                let pfreq = frequency * radians_per_sample;
                let c = tan(bandwidth * pfreq * 0.5);
                let d = 2.0 * cos(pfreq);
                let a0 = 1.0 / (1.0 + c);
                Coefficients {
                    a0,
                    a1: -d * a0,
                    b1: 0.0,
                    b2: (1.0 - c) * a0,
                }
            }
        }
    }

    /// Advance the recurrence by one sample.
    #[inline]
    fn tick(&self, c: &Coefficients, y1: &mut f64, y2: &mut f64, x: f64) -> f64 {
        let (y0, out) = match self {
            Self::LowPass => {
                let y0 = x + c.b1 * *y1 + c.b2 * *y2;
                (y0, c.a0 * (y0 + 2.0 * *y1 + *y2))
            }
            Self::HighPass => {
                let y0 = x + c.b1 * *y1 + c.b2 * *y2;
                (y0, c.a0 * (y0 - 2.0 * *y1 + *y2))
            }
            Self::BandPass => {
                let y0 = x + c.b1 * *y1 + c.b2 * *y2;
                (y0, c.a0 * (y0 - *y2))
            }
            Self::BandReject => {
                let ay = c.a1 * *y1;
                let y0 = x - ay - c.b2 * *y2;
                (y0, c.a0 * (y0 + *y2) + ay)
            }
        };
        *y2 = *y1;
        *y1 = y0;
        out
    }
}

impl FromStr for FilterResponse {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.id() == s)
            .ok_or_else(|| Error::UnknownVariant(s.into()))
    }
}

/// One coefficient set. Unused coefficients stay at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coefficients {
    /// Output gain.
    pub a0: f64,
    /// First-order feed term (band-reject only).
    pub a1: f64,
    /// First-order feedback term.
    pub b1: f64,
    /// Second-order feedback term.
    pub b2: f64,
}

impl Coefficients {
    fn scaled_delta(&self, target: &Self, scale: f64) -> Self {
        Self {
            a0: (target.a0 - self.a0) * scale,
            a1: (target.a1 - self.a1) * scale,
            b1: (target.b1 - self.b1) * scale,
            b2: (target.b2 - self.b2) * scale,
        }
    }

    fn add(&mut self, delta: &Self) {
        self.a0 += delta.a0;
        self.a1 += delta.a1;
        self.b1 += delta.b1;
        self.b2 += delta.b2;
    }
}

/// Linear coefficient trajectory from one set to another.
///
/// # Example
///
/// ```rust
/// use ugenkit_core::{CoefficientGlide, FilterResponse};
///
/// let w = core::f64::consts::TAU / 48000.0;
/// let from = FilterResponse::LowPass.coefficients(500.0, 0.0, w);
/// let to = FilterResponse::LowPass.coefficients(2000.0, 0.0, w);
///
/// let mut glide = CoefficientGlide::new(from, to, 4);
/// for _ in 0..4 {
///     glide.advance();
/// }
/// assert!((glide.current().a0 - to.a0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CoefficientGlide {
    current: Coefficients,
    slope: Coefficients,
}

impl CoefficientGlide {
    /// Glide from `from` to `to` in `steps` increments; `steps == 0` holds `from`.
    pub fn new(from: Coefficients, to: Coefficients, steps: usize) -> Self {
        let scale = if steps == 0 { 0.0 } else { 1.0 / steps as f64 };
        Self {
            current: from,
            slope: from.scaled_delta(&to, scale),
        }
    }

    /// A glide that never moves.
    pub fn hold(at: Coefficients) -> Self {
        Self {
            current: at,
            slope: Coefficients::default(),
        }
    }

    /// Coefficients for the current step.
    #[inline]
    pub fn current(&self) -> Coefficients {
        self.current
    }

    /// Move one step along the trajectory.
    #[inline]
    pub fn advance(&mut self) {
        self.current.add(&self.slope);
    }
}

/// Per-call filter parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Cutoff or centre frequency in Hz, strictly between 0 and Nyquist.
    pub frequency: f64,
    /// Bandwidth, required by the band responses; must be positive.
    pub bandwidth: Option<f64>,
}

impl FilterParams {
    /// Parameters for the low-pass and high-pass responses.
    pub fn new(frequency: f64) -> Self {
        Self {
            frequency,
            bandwidth: None,
        }
    }

    /// Parameters for the band responses.
    pub fn band(frequency: f64, bandwidth: f64) -> Self {
        Self {
            frequency,
            bandwidth: Some(bandwidth),
        }
    }
}

/// Biquad filter with cached, glided coefficients.
///
/// # Example
///
/// ```rust
/// use ugenkit_core::{BiquadFilter, FilterParams, Processor};
///
/// let mut lpf = BiquadFilter::from_id("lpf", 48000, 64).unwrap();
/// let input = [1.0f32; 64];
/// let mut output = [0.0f32; 64];
/// lpf.process_mono(&input, &mut output, &FilterParams::new(1000.0)).unwrap();
/// assert!(output.iter().all(|y| y.is_finite()));
/// ```
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    response: FilterResponse,
    sample_rate: f64,
    block_size: f64,
    frequency: Option<f64>,
    bandwidth: Option<f64>,
    coefficients: Coefficients,
    y1: f64,
    y2: f64,
    primed: bool,
}

impl BiquadFilter {
    /// Create a filter for `sample_rate` Hz; `block_size` sets the control
    /// rate used by [`next`](Self::next).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] when either argument is zero.
    pub fn new(
        response: FilterResponse,
        sample_rate: u32,
        block_size: usize,
    ) -> Result<Self, Error> {
        if sample_rate == 0 {
            return Err(Error::invalid_config("sample_rate", "must be positive"));
        }
        if block_size == 0 {
            return Err(Error::invalid_config("block_size", "must be positive"));
        }
        Ok(Self {
            response,
            sample_rate: f64::from(sample_rate),
            block_size: block_size as f64,
            frequency: None,
            bandwidth: None,
            coefficients: Coefficients::default(),
            y1: 0.0,
            y2: 0.0,
            primed: false,
        })
    }

    /// Create a filter from an identifier: `lpf`, `hpf`, `bpf` or `brf`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownVariant`] for other identifiers.
    pub fn from_id(id: &str, sample_rate: u32, block_size: usize) -> Result<Self, Error> {
        Self::new(id.parse()?, sample_rate, block_size)
    }

    /// Selected response.
    pub fn response(&self) -> FilterResponse {
        self.response
    }

    /// Coefficients in use after the last call.
    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    /// Filter one control-rate value.
    ///
    /// Frequencies are normalized to the control rate `sample_rate / block_size`
    /// and new coefficients apply immediately. The first call runs twice to
    /// prime the recurrence.
    ///
    /// # Errors
    ///
    /// Argument errors for a non-finite frequency, a frequency outside
    /// `(0, control_rate / 2)`, or a missing, non-finite or non-positive
    /// bandwidth. State is unchanged on error.
    pub fn next(&mut self, input: f64, params: &FilterParams) -> Result<f64, Error> {
        let control_rate = self.sample_rate / self.block_size;
        let bandwidth = self.validate(params, control_rate)?;
        let w = 2.0 * PI / control_rate;
        if !self.primed {
            self.step(input, params.frequency, bandwidth, w);
            self.primed = true;
        }
        Ok(self.step(input, params.frequency, bandwidth, w))
    }

    fn validate(&self, params: &FilterParams, rate: f64) -> Result<f64, Error> {
        let frequency = ensure_finite("frequency", params.frequency)?;
        if !(frequency > 0.0 && frequency < rate * 0.5) {
            return Err(Error::OutOfRange { name: "frequency" });
        }
        if !self.response.uses_bandwidth() {
            return Ok(0.0);
        }
        let bandwidth = params
            .bandwidth
            .ok_or(Error::MissingParam { name: "bandwidth" })?;
        if ensure_finite("bandwidth", bandwidth)? <= 0.0 {
            return Err(Error::OutOfRange { name: "bandwidth" });
        }
        Ok(bandwidth)
    }

    fn changed(&self, frequency: f64, bandwidth: f64) -> bool {
        self.frequency != Some(frequency)
            || (self.response.uses_bandwidth() && self.bandwidth != Some(bandwidth))
    }

    fn store_target(&mut self, frequency: f64, bandwidth: f64, target: Coefficients) {
        self.coefficients = target;
        self.frequency = Some(frequency);
        self.bandwidth = Some(bandwidth);
    }

    fn step(&mut self, input: f64, frequency: f64, bandwidth: f64, w: f64) -> f64 {
        if self.changed(frequency, bandwidth) {
            let target = self.response.coefficients(frequency, bandwidth, w);
            self.store_target(frequency, bandwidth, target);
        }
        let (mut y1, mut y2) = (self.y1, self.y2);
        let out = self
            .response
            .tick(&self.coefficients, &mut y1, &mut y2, input);
        self.y1 = zap_gremlins_f64(y1);
        self.y2 = zap_gremlins_f64(y2);
        out
    }

    /// Run a block. `groups` full 3-sample groups are processed with the
    /// gliding coefficients, then `remain` single samples.
    fn run(
        &mut self,
        input: &[f32],
        output: &mut [f32],
        groups: usize,
        remain: usize,
        frequency: f64,
        bandwidth: f64,
    ) {
        let target = self.changed(frequency, bandwidth).then(|| {
            let w = 2.0 * PI / self.sample_rate;
            self.response.coefficients(frequency, bandwidth, w)
        });
        let mut glide = match target {
            Some(target) => CoefficientGlide::new(self.coefficients, target, groups),
            None => CoefficientGlide::hold(self.coefficients),
        };

        let response = self.response;
        let (mut y1, mut y2) = (self.y1, self.y2);
        let split = groups * 3;
        for (xs, ys) in input[..split]
            .chunks_exact(3)
            .zip(output[..split].chunks_exact_mut(3))
        {
            let c = glide.current();
            for (x, y) in xs.iter().zip(ys.iter_mut()) {
                *y = response.tick(&c, &mut y1, &mut y2, f64::from(*x)) as f32;
            }
            glide.advance();
        }
        let c = glide.current();
        for (x, y) in input[split..split + remain]
            .iter()
            .zip(output[split..split + remain].iter_mut())
        {
            *y = response.tick(&c, &mut y1, &mut y2, f64::from(*x)) as f32;
        }

        if let Some(target) = target {
            self.store_target(frequency, bandwidth, target);
        }
        self.y1 = zap_gremlins_f64(y1);
        self.y2 = zap_gremlins_f64(y2);
    }
}

impl Processor for BiquadFilter {
    type Params = FilterParams;

    fn layout(&self) -> ChannelLayout {
        ChannelLayout::Mono
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &FilterParams,
    ) -> Result<(), Error> {
        let frames = check_buffers(self.layout(), inputs, outputs)?;
        let bandwidth = self.validate(params, self.sample_rate)?;
        if frames == 0 {
            return Ok(());
        }
        let (input, output) = (inputs[0], &mut *outputs[0]);

        if !self.primed {
            let mut scratch = [0.0f32; 1];
            self.run(&input[..1], &mut scratch, 0, 1, params.frequency, bandwidth);
            self.primed = true;
            #[cfg(feature = "tracing")]
            tracing::debug!(
                response = self.response.id(),
                frequency = params.frequency,
                "primed filter"
            );
        }
        self.run(
            input,
            output,
            frames / 3,
            frames % 3,
            params.frequency,
            bandwidth,
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.frequency = None;
        self.bandwidth = None;
        self.coefficients = Coefficients::default();
        self.y1 = 0.0;
        self.y2 = 0.0;
        self.primed = false;
    }
}
