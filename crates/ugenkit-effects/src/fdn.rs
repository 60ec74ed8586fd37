//! Feedback delay network reverberator.
//!
//! Four damped delay lines are cross-coupled through an orthogonal 4x4
//! matrix. A tapped delay line supplies early reflections, which are mixed
//! into the output and injected into the network. Allpass diffusers smear
//! the input and decorrelate the two output channels.
//!
//! ```text
//! x -> damper -> diffuser -> tap line -> u[0..4] ---------------+
//!                                                               v
//!      +-> line[j] -> gain[j] -> damper[j] -> d[j] -> matrix -> (+) -+
//!      |                                                             |
//!      +-------------------------------------------------------------+
//!
//! sum = Σ ±(tail·d[j] + early·u[j]) + early·x
//! left  = diffusers L1..L3(sum) + dry·x
//! right = diffusers R1..R3(sum) + dry·x
//! ```
//!
//! # Sizing
//!
//! With `largest = rate * room / 340` (the room's longest dimension in
//! samples, at the speed of sound), the feedback lines are the nearest prime
//! to `largest` followed by `0.81649`, `0.7071` and `0.63245` of it. Every
//! line gain is `-alpha^length` where `alpha = 0.001^(1 / (rate * decay))`,
//! so a sample circulating for `decay` seconds loses 60 dB.
//!
//! Feedback line lengths are fixed at construction.

use libm::{pow, powf};
use ugenkit_core::{
    ChannelLayout, Damper, DelayLine, Diffuser, Error, Processor, check_buffers, ensure_finite,
    nearest_prime, round_ties_even, zap_gremlins,
};

/// Metres per second.
const SPEED_OF_SOUND: f32 = 340.0;

/// Feedback line lengths relative to the largest.
const LINE_RATIOS: [f32; 4] = [1.0, 0.81649, 0.7071, 0.63245];

/// Early-reflection tap positions relative to the largest line.
const TAP_RATIOS: [f64; 3] = [0.41, 0.3, 0.155];

/// Minimum tap delay in samples.
const TAP_OFFSET: usize = 5;

/// Minimum tapped line length.
const TAP_LINE_LEN: usize = 44000;

/// Capacity added on top of the longest admissible feedback line.
const LINE_HEADROOM: usize = 1000;

const MIN_DECAY_TIME: f64 = 0.01;

const MAX_SPREAD: f64 = 100.0;
const MIN_MAX_ROOM_SIZE: f64 = 3.0;
const MAX_MAX_ROOM_SIZE: f64 = 1000.0;

/// Longest feedback line the constructor will allocate, in samples.
const MAX_LINE_LEN: usize = 1 << 24;

/// Diffuser segment lengths at unit scale; they sum to `DIFFUSER_SPAN`.
const DIFFUSER_SEGMENTS: [i32; 3] = [210, 159, 562];
const DIFFUSER_SPAN: i32 = 1341;
const DIFFUSER_COEFS: [f32; 4] = [0.75, 0.75, 0.625, 0.625];

/// Spread multipliers moving the diffuser boundaries per channel.
const LEFT_SPREAD: [f32; 2] = [0.125541, 0.854046];
const RIGHT_SPREAD: [f32; 2] = [-0.568366, -0.126815];

/// Construction-time options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FdnConfig {
    /// Room size in metres; sets the feedback line lengths.
    pub room_size: f64,
    /// Initial 60 dB decay time in seconds.
    pub decay_time: f64,
    /// Initial high-frequency damping in the feedback lines, `[0, 1]`.
    pub damping: f64,
    /// Left/right diffuser detuning, `[0, 100]`.
    pub spread: f64,
    /// Largest room size accepted at run time, in metres, `[3, 1000]`.
    pub max_room_size: f64,
}

impl Default for FdnConfig {
    fn default() -> Self {
        Self {
            room_size: 10.0,
            decay_time: 3.0,
            damping: 0.5,
            spread: 15.0,
            max_room_size: 300.0,
        }
    }
}

impl FdnConfig {
    /// Check the options that cannot be clamped into range.
    ///
    /// `room_size` is not checked; it is clamped to `[1, max_room_size - 1]`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] naming the first offending option.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.decay_time.is_finite() && self.decay_time > 0.0) {
            return Err(Error::invalid_config("decay_time", "must be a positive number"));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(Error::invalid_config("damping", "must be within [0, 1]"));
        }
        if !(0.0..=MAX_SPREAD).contains(&self.spread) {
            return Err(Error::invalid_config("spread", "must be within [0, 100]"));
        }
        if !(MIN_MAX_ROOM_SIZE..=MAX_MAX_ROOM_SIZE).contains(&self.max_room_size) {
            return Err(Error::invalid_config("max_room_size", "must be within [3, 1000]"));
        }
        Ok(())
    }
}

/// Per-call parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FdnParams {
    /// Room size in metres; moves the early-reflection taps.
    pub room_size: f64,
    /// 60 dB decay time in seconds, at least 0.01.
    pub decay_time: f64,
    /// High-frequency damping in the feedback lines, `[0, 1]`.
    pub damping: f64,
    /// Input low-pass amount, `[0, 1]`; 1 passes the input unfiltered.
    pub input_bandwidth: f64,
    /// Direct signal level.
    pub dry_level: f64,
    /// Early reflection level.
    pub early_level: f64,
    /// Late tail level.
    pub tail_level: f64,
}

impl Default for FdnParams {
    fn default() -> Self {
        Self {
            room_size: 10.0,
            decay_time: 3.0,
            damping: 0.5,
            input_bandwidth: 0.5,
            dry_level: 1.0,
            early_level: 0.7,
            tail_level: 0.5,
        }
    }
}

impl FdnParams {
    fn validate(&self) -> Result<(), Error> {
        ensure_finite("room_size", self.room_size)?;
        ensure_finite("decay_time", self.decay_time)?;
        ensure_finite("damping", self.damping)?;
        ensure_finite("input_bandwidth", self.input_bandwidth)?;
        ensure_finite("dry_level", self.dry_level)?;
        ensure_finite("early_level", self.early_level)?;
        ensure_finite("tail_level", self.tail_level)?;
        Ok(())
    }
}

/// Linear ramp toward a target, one step per sample.
#[derive(Debug, Clone, Copy, Default)]
struct Slew {
    value: f32,
    target: f32,
    step: f32,
}

impl Slew {
    fn at(value: f32) -> Self {
        Self {
            value,
            target: value,
            step: 0.0,
        }
    }

    fn retarget(&mut self, target: f32, frames: usize) {
        self.target = target;
        self.step = (target - self.value) / frames as f32;
    }

    #[inline]
    fn advance(&mut self) {
        self.value += self.step;
    }

    fn settle(&mut self) {
        self.value = self.target;
        self.step = 0.0;
    }
}

/// `0.001^(1 / (rate * decay))`.
fn decay_alpha(sample_rate: f64, decay_time: f64) -> f64 {
    pow(0.001, 1.0 / (sample_rate * decay_time.max(MIN_DECAY_TIME)))
}

fn line_gain(alpha: f64, length: usize) -> f32 {
    -powf(alpha as f32, length as f32)
}

fn tap_gain(alpha: f64, tap: usize) -> f32 {
    pow(alpha, tap as f64) as f32
}

fn largest_delay(sample_rate: f32, room_size: f64) -> f32 {
    sample_rate * room_size as f32 / SPEED_OF_SOUND
}

fn tap_positions(largest: f32) -> [usize; 4] {
    let largest = f64::from(largest);
    [
        TAP_OFFSET + (TAP_RATIOS[0] * largest) as usize,
        TAP_OFFSET + (TAP_RATIOS[1] * largest) as usize,
        TAP_OFFSET + (TAP_RATIOS[2] * largest) as usize,
        TAP_OFFSET,
    ]
}

fn line_lengths(largest: f32) -> [usize; 4] {
    core::array::from_fn(|i| {
        if i == 0 {
            let n = largest as i64;
            nearest_prime(n, 0.5).unwrap_or(n).max(1) as usize
        } else {
            round_ties_even(LINE_RATIOS[i] * largest).max(1) as usize
        }
    })
}

fn diffuser_sizes(scale: f32, spread: f32, factors: [f32; 2]) -> [usize; 4] {
    let [b, c, d] = DIFFUSER_SEGMENTS;
    let first = (b + c).saturating_add((spread * factors[0]) as i32);
    let second = (b + c + d).saturating_add((3.0 * spread * factors[1]) as i32);
    let segments = [
        b,
        first.saturating_sub(b),
        second.saturating_sub(first),
        DIFFUSER_SPAN.saturating_sub(second),
    ];
    segments.map(|s| round_ties_even(scale * s as f32).max(1) as usize)
}

/// Orthogonal mixing step: `f = M d` with `M` a scaled Hadamard-like matrix.
#[inline]
fn mix_matrix(d: &[f32; 4]) -> [f32; 4] {
    let [d0, d1, d2, d3] = *d;
    [
        0.5 * (d0 + d1 - d2 - d3),
        0.5 * (d0 - d1 - d2 + d3),
        0.5 * (-d0 + d1 - d2 + d3),
        0.5 * (d0 + d1 + d2 + d3),
    ]
}

/// Feedback delay network reverberator.
///
/// Accepts one or two input channels and produces as many outputs. The
/// network is fed from channel 0; a second channel only selects stereo
/// output.
///
/// Gains, tap gains and the three output levels ramp linearly across the
/// call in which a parameter changes and land on their targets when it ends.
/// Damping and input bandwidth switch immediately.
///
/// # Example
///
/// ```rust
/// use ugenkit_core::Processor;
/// use ugenkit_effects::{FdnConfig, FdnParams, FdnReverb};
///
/// let mut reverb = FdnReverb::new(48000, FdnConfig::default()).unwrap();
/// let input = [0.1f32; 256];
/// let mut output = [0.0f32; 256];
/// reverb.process_mono(&input, &mut output, &FdnParams::default()).unwrap();
/// assert!(output.iter().all(|y| y.is_finite()));
/// ```
#[derive(Debug, Clone)]
pub struct FdnReverb {
    config: FdnConfig,
    sample_rate: f32,
    room_size: f64,
    lines: [DelayLine; 4],
    dampers: [Damper; 4],
    gains: [Slew; 4],
    taps: [usize; 4],
    tap_gains: [Slew; 4],
    tap_line: DelayLine,
    input_damper: Damper,
    left: [Diffuser; 4],
    right: [Diffuser; 4],
    dry: Slew,
    early: Slew,
    tail: Slew,
    cached: Option<FdnParams>,
    primed: bool,
}

impl FdnReverb {
    /// Build a reverberator and allocate every buffer it will use.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for a zero sample rate, an option rejected
    /// by [`FdnConfig::validate`], or a `max_room_size` whose feedback lines
    /// would exceed 2^24 samples at `sample_rate`.
    pub fn new(sample_rate: u32, config: FdnConfig) -> Result<Self, Error> {
        if sample_rate == 0 {
            return Err(Error::invalid_config("sample_rate", "must be positive"));
        }
        config.validate()?;

        let rate = sample_rate as f32;
        let room_size = clamp_room(config.room_size, config.max_room_size);
        let largest = largest_delay(rate, room_size);
        let max_delay = largest_delay(rate, config.max_room_size);

        let capacity = (max_delay as usize).saturating_add(LINE_HEADROOM);
        if capacity > MAX_LINE_LEN {
            return Err(Error::invalid_config(
                "max_room_size",
                "too large for the sample rate",
            ));
        }
        let lengths = line_lengths(largest);
        let tap_capacity = TAP_LINE_LEN.max(tap_positions(max_delay)[0] + 1);

        let scale = lengths[3] as f32 / DIFFUSER_SPAN as f32;
        let spread = config.spread as f32;
        let left_sizes = diffuser_sizes(scale, spread, LEFT_SPREAD);
        let right_sizes = diffuser_sizes(scale, spread, RIGHT_SPREAD);

        let mut reverb = Self {
            config,
            sample_rate: rate,
            room_size,
            lines: lengths.map(|len| DelayLine::with_capacity(capacity, len)),
            dampers: core::array::from_fn(|_| Damper::default()),
            gains: [Slew::default(); 4],
            taps: tap_positions(largest),
            tap_gains: [Slew::default(); 4],
            tap_line: DelayLine::new(tap_capacity),
            input_damper: Damper::default(),
            left: core::array::from_fn(|i| Diffuser::new(left_sizes[i], DIFFUSER_COEFS[i])),
            right: core::array::from_fn(|i| Diffuser::new(right_sizes[i], DIFFUSER_COEFS[i])),
            dry: Slew::default(),
            early: Slew::default(),
            tail: Slew::default(),
            cached: None,
            primed: false,
        };
        reverb.restore();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate,
            room_size,
            lines = ?reverb.line_lengths(),
            taps = ?reverb.taps,
            "built feedback delay network"
        );

        Ok(reverb)
    }

    /// Construction options.
    pub fn config(&self) -> &FdnConfig {
        &self.config
    }

    /// Room size in effect after clamping.
    pub fn room_size(&self) -> f64 {
        self.room_size
    }

    /// Feedback line lengths in samples.
    pub fn line_lengths(&self) -> [usize; 4] {
        core::array::from_fn(|i| self.lines[i].len())
    }

    /// Current feedback line gains.
    pub fn line_gains(&self) -> [f32; 4] {
        self.gains.map(|g| g.value)
    }

    /// Early-reflection tap delays in samples.
    pub fn taps(&self) -> [usize; 4] {
        self.taps
    }

    /// Left and right diffuser lengths, input diffuser first.
    pub fn diffuser_sizes(&self) -> ([usize; 4], [usize; 4]) {
        (
            core::array::from_fn(|i| self.left[i].size()),
            core::array::from_fn(|i| self.right[i].size()),
        )
    }

    fn clamp_room(&self, room_size: f64) -> f64 {
        clamp_room(room_size, self.config.max_room_size)
    }

    /// Set every value back to what construction produced and clear buffers.
    fn restore(&mut self) {
        let config = self.config;
        self.room_size = self.clamp_room(config.room_size);
        self.taps = tap_positions(largest_delay(self.sample_rate, self.room_size));

        let alpha = decay_alpha(f64::from(self.sample_rate), config.decay_time);
        for (gain, line) in self.gains.iter_mut().zip(&self.lines) {
            *gain = Slew::at(line_gain(alpha, line.len()));
        }
        for (gain, &tap) in self.tap_gains.iter_mut().zip(&self.taps) {
            *gain = Slew::at(tap_gain(alpha, tap));
        }
        for damper in &mut self.dampers {
            damper.reset();
            damper.set_damping(config.damping as f32);
        }
        self.input_damper.reset();
        self.input_damper.set_damping(1.0);

        self.lines.iter_mut().for_each(DelayLine::clear);
        self.tap_line.clear();
        self.left.iter_mut().for_each(Diffuser::clear);
        self.right.iter_mut().for_each(Diffuser::clear);

        self.dry = Slew::at(0.0);
        self.early = Slew::at(0.0);
        self.tail = Slew::at(0.0);
        self.cached = None;
        self.primed = false;
    }

    /// Recompute derived values for new parameters; ramps span `frames`.
    fn retarget(&mut self, params: &FdnParams, frames: usize) {
        let room_size = self.clamp_room(params.room_size);
        if room_size != self.room_size {
            self.room_size = room_size;
            self.taps = tap_positions(largest_delay(self.sample_rate, room_size));
        }

        let alpha = decay_alpha(f64::from(self.sample_rate), params.decay_time);
        for (gain, line) in self.gains.iter_mut().zip(&self.lines) {
            gain.retarget(line_gain(alpha, line.len()), frames);
        }
        for (gain, &tap) in self.tap_gains.iter_mut().zip(&self.taps) {
            gain.retarget(tap_gain(alpha, tap), frames);
        }

        let damping = params.damping.clamp(0.0, 1.0) as f32;
        for damper in &mut self.dampers {
            damper.set_damping(damping);
        }
        let bandwidth = params.input_bandwidth.clamp(0.0, 1.0) as f32;
        self.input_damper.set_damping(1.0 - bandwidth);

        self.dry.retarget(params.dry_level as f32, frames);
        self.early.retarget(params.early_level as f32, frames);
        self.tail.retarget(params.tail_level as f32, frames);
        self.cached = Some(*params);

        #[cfg(feature = "tracing")]
        tracing::trace!(
            room_size,
            decay_time = params.decay_time,
            alpha,
            frames,
            "retargeted feedback delay network"
        );
    }

    /// One sample through the network; returns `(left, right)`.
    #[inline]
    fn tick(&mut self, x: f32) -> (f32, f32) {
        let z = self.input_damper.process(x);
        let z = self.left[0].process(z);

        let u: [f32; 4] =
            core::array::from_fn(|j| self.tap_gains[j].value * self.tap_line.read(self.taps[j]));
        self.tap_line.write(zap_gremlins(z));

        let d: [f32; 4] = core::array::from_fn(|j| {
            self.dampers[j].process(self.gains[j].value * self.lines[j].oldest())
        });

        let (tail, early) = (self.tail.value, self.early.value);
        let mut sum = 0.0;
        let mut sign = 1.0;
        for (dj, uj) in d.iter().zip(&u) {
            sum += sign * (tail * dj + early * uj);
            sign = -sign;
        }
        sum += x * early;

        let f = mix_matrix(&d);
        for ((line, uj), fj) in self.lines.iter_mut().zip(&u).zip(&f) {
            line.write(zap_gremlins(uj + fj));
        }

        let l = self.left[1..].iter_mut().fold(sum, |acc, d| d.process(acc));
        let r = self.right[1..].iter_mut().fold(sum, |acc, d| d.process(acc));
        let dry = x * self.dry.value;
        (l + dry, r + dry)
    }

    fn advance(&mut self) {
        for slew in self.gains.iter_mut().chain(self.tap_gains.iter_mut()) {
            slew.advance();
        }
        self.dry.advance();
        self.early.advance();
        self.tail.advance();
    }

    fn settle(&mut self) {
        for slew in self.gains.iter_mut().chain(self.tap_gains.iter_mut()) {
            slew.settle();
        }
        self.dry.settle();
        self.early.settle();
        self.tail.settle();
    }

    fn run(
        &mut self,
        input: &[f32],
        left: &mut [f32],
        mut right: Option<&mut [f32]>,
        params: &FdnParams,
    ) {
        if self.cached != Some(*params) {
            self.retarget(params, input.len());
        }
        for (i, &x) in input.iter().enumerate() {
            let x = if x.is_finite() { x } else { 0.0 };
            let (l, r) = self.tick(x);
            left[i] = l;
            if let Some(right) = right.as_deref_mut() {
                right[i] = r;
            }
            self.advance();
        }
        self.settle();
    }
}

fn clamp_room(room_size: f64, max_room_size: f64) -> f64 {
    if room_size.is_nan() || room_size <= 1.0 {
        1.0
    } else if room_size >= max_room_size {
        max_room_size - 1.0
    } else {
        room_size
    }
}

impl Processor for FdnReverb {
    type Params = FdnParams;

    fn layout(&self) -> ChannelLayout {
        ChannelLayout::MonoOrStereo
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &FdnParams,
    ) -> Result<(), Error> {
        let frames = check_buffers(self.layout(), inputs, outputs)?;
        params.validate()?;
        if frames == 0 {
            return Ok(());
        }

        if !self.primed {
            let (mut l, mut r) = ([0.0f32], [0.0f32]);
            self.run(&[0.0], &mut l, Some(&mut r[..]), params);
            self.primed = true;
        }

        let (left, rest) = outputs.split_at_mut(1);
        let right = rest.first_mut().map(|r| &mut **r);
        self.run(inputs[0], left[0], right, params);
        Ok(())
    }

    fn reset(&mut self) {
        self.restore();
    }
}
