//! Comb/allpass reverberator in mono and stereo form.
//!
//! Eight damped feedback combs run in parallel; their sum feeds four
//! allpass stages in series. The stereo form runs a second network whose
//! lines are 23 samples longer, fed by the same summed input, for a
//! decorrelated right channel.
//!
//! Line lengths are fixed sample counts and do not scale with sample rate.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::boxed::Box;

use ugenkit_core::{ChannelLayout, DelayLine, Error, Processor, check_buffers, zap_gremlins};

/// Comb line lengths, longest first in processing order.
const COMB_LENGTHS: [usize; 8] = [1617, 1557, 1491, 1422, 1277, 1116, 1188, 1356];

/// Allpass line lengths in processing order.
const ALLPASS_LENGTHS: [usize; 4] = [556, 441, 341, 225];

/// Extra samples on every right-channel line.
const STEREO_SPREAD: usize = 23;

/// Input attenuation ahead of the combs.
const INPUT_GAIN: f32 = 0.015;

/// Per-call parameters. Values are clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombAllpassParams {
    /// Wet/dry balance: 0 = dry only, 1 = wet only.
    pub mix: f64,
    /// Room size; sets comb feedback `0.7 + 0.28 * room`.
    pub room: f64,
    /// High-frequency damping inside the comb feedback paths.
    pub damp: f64,
}

impl Default for CombAllpassParams {
    fn default() -> Self {
        Self {
            mix: 0.33,
            room: 0.5,
            damp: 0.5,
        }
    }
}

/// Constants derived from one parameter set.
#[derive(Debug, Clone, Copy)]
struct Derived {
    wet: f32,
    dry: f32,
    feedback: f32,
    damp1: f32,
    damp2: f32,
}

impl Derived {
    fn from_params(params: &CombAllpassParams) -> Self {
        let wet = params.mix.clamp(0.0, 1.0) as f32;
        let room = params.room.clamp(0.0, 1.0) as f32;
        let damp1 = 0.4 * params.damp.clamp(0.0, 1.0) as f32;
        Self {
            wet,
            dry: 1.0 - wet,
            feedback: 0.7 + 0.28 * room,
            damp1,
            damp2: 1.0 - damp1,
        }
    }
}

#[derive(Debug, Clone)]
struct CombStage {
    line: DelayLine,
    filter: f32,
    last: f32,
}

impl CombStage {
    fn new(length: usize) -> Self {
        Self {
            line: DelayLine::new(length),
            filter: 0.0,
            last: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32, d: &Derived) {
        let t = self.line.oldest();
        self.filter = zap_gremlins(d.damp2 * self.last + d.damp1 * self.filter);
        self.line.write(input + d.feedback * self.filter);
        self.last = t;
    }

    fn clear(&mut self) {
        self.line.clear();
        self.filter = 0.0;
        self.last = 0.0;
    }
}

#[derive(Debug, Clone)]
struct AllpassStage {
    line: DelayLine,
    last: f32,
}

impl AllpassStage {
    fn new(length: usize) -> Self {
        Self {
            line: DelayLine::new(length),
            last: 0.0,
        }
    }

    /// Store `value`, returning the sample it displaced.
    #[inline]
    fn feed(&mut self, value: f32) -> f32 {
        let t = self.line.oldest();
        self.line.write(value);
        self.last = t;
        t
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        self.feed(0.5 * self.last + x) - x
    }

    fn clear(&mut self) {
        self.line.clear();
        self.last = 0.0;
    }
}

/// One channel's combs and allpasses.
#[derive(Debug, Clone)]
struct Network {
    combs: [CombStage; 8],
    allpasses: [AllpassStage; 4],
}

impl Network {
    fn new(extra: usize) -> Self {
        Self {
            combs: core::array::from_fn(|i| CombStage::new(COMB_LENGTHS[i] + extra)),
            allpasses: core::array::from_fn(|i| AllpassStage::new(ALLPASS_LENGTHS[i] + extra)),
        }
    }

    /// Run one sample of already attenuated input; returns the wet signal.
    #[inline]
    fn process(&mut self, input: f32, d: &Derived) -> f32 {
        for comb in &mut self.combs {
            comb.process(input, d);
        }
        let c: [f32; 8] = core::array::from_fn(|i| self.combs[i].last);

        // The first allpass writes and subtracts the comb sum with two
        // different groupings; keep both as written.
        let [first, rest @ ..] = &mut self.allpasses;
        let write = ((0.5 * first.last + c[0]) + (c[1] + c[2]))
            + ((c[3] + c[4]) + (c[5] + (c[6] + c[7])));
        let sum = ((c[0] + c[1]) + (c[2] + c[3])) + ((c[4] + c[5]) + (c[6] + c[7]));
        let mut y = first.feed(write) - sum;

        for stage in rest {
            y = stage.process(y);
        }
        y
    }

    fn clear(&mut self) {
        self.combs.iter_mut().for_each(CombStage::clear);
        self.allpasses.iter_mut().for_each(AllpassStage::clear);
    }
}

/// Comb/allpass reverberator.
///
/// The mono form takes exactly one channel; the stereo form exactly two.
///
/// # Example
///
/// ```rust
/// use ugenkit_core::Processor;
/// use ugenkit_effects::{CombAllpassParams, CombAllpassReverb};
///
/// let mut reverb = CombAllpassReverb::stereo();
/// let (left, right) = ([0.5f32; 64], [0.25f32; 64]);
/// let (mut out_l, mut out_r) = ([0.0f32; 64], [0.0f32; 64]);
/// reverb
///     .process(
///         &[&left, &right],
///         &mut [&mut out_l, &mut out_r],
///         &CombAllpassParams::default(),
///     )
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CombAllpassReverb {
    left: Box<Network>,
    right: Option<Box<Network>>,
}

impl CombAllpassReverb {
    /// Single input, single output.
    pub fn mono() -> Self {
        Self {
            left: Box::new(Network::new(0)),
            right: None,
        }
    }

    /// Two inputs, two outputs.
    pub fn stereo() -> Self {
        Self {
            left: Box::new(Network::new(0)),
            right: Some(Box::new(Network::new(STEREO_SPREAD))),
        }
    }

    /// Whether this is the two-channel form.
    pub fn is_stereo(&self) -> bool {
        self.right.is_some()
    }

    fn validate(params: &CombAllpassParams) -> Result<Derived, Error> {
        ugenkit_core::ensure_finite("mix", params.mix)?;
        ugenkit_core::ensure_finite("room", params.room)?;
        ugenkit_core::ensure_finite("damp", params.damp)?;
        Ok(Derived::from_params(params))
    }
}

#[inline]
fn finite_or_zero(x: f32) -> f32 {
    if x.is_finite() { x } else { 0.0 }
}

impl Processor for CombAllpassReverb {
    type Params = CombAllpassParams;

    fn layout(&self) -> ChannelLayout {
        if self.is_stereo() {
            ChannelLayout::Stereo
        } else {
            ChannelLayout::Mono
        }
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &CombAllpassParams,
    ) -> Result<(), Error> {
        check_buffers(self.layout(), inputs, outputs)?;
        let d = Self::validate(params)?;

        match &mut self.right {
            None => {
                for (x, y) in inputs[0].iter().zip(outputs[0].iter_mut()) {
                    let x = finite_or_zero(*x);
                    let wet = self.left.process(INPUT_GAIN * x, &d);
                    *y = d.dry * x + d.wet * wet;
                }
            }
            Some(right) => {
                let (out_l, out_r) = outputs.split_at_mut(1);
                let frames = inputs[0].iter().zip(inputs[1].iter());
                let outs = out_l[0].iter_mut().zip(out_r[0].iter_mut());
                for ((l, r), (y_l, y_r)) in frames.zip(outs) {
                    let (l, r) = (finite_or_zero(*l), finite_or_zero(*r));
                    let input = INPUT_GAIN * (l + r);
                    let wet_l = self.left.process(input, &d);
                    let wet_r = right.process(input, &d);
                    *y_l = d.dry * l + d.wet * wet_l;
                    *y_r = d.dry * r + d.wet * wet_r;
                }
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.left.clear();
        if let Some(right) = &mut self.right {
            right.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    fn impulse(len: usize) -> Vec<f32> {
        let mut v = vec![0.0; len];
        v[0] = 1.0;
        v
    }

    fn params(mix: f64, room: f64, damp: f64) -> CombAllpassParams {
        CombAllpassParams { mix, room, damp }
    }

    #[test]
    fn test_mix_zero_is_bypass() {
        let mut reverb = CombAllpassReverb::mono();
        let input: Vec<f32> = (0..4000).map(|i| libm::sinf(i as f32 * 0.01)).collect();
        let mut output = vec![0.0; input.len()];
        reverb
            .process_mono(&input, &mut output, &params(0.0, 0.9, 0.1))
            .unwrap();
        assert_eq!(input, output);
    }

    #[test]
    fn test_full_wet_has_no_direct_path() {
        let mut reverb = CombAllpassReverb::mono();
        let input = impulse(2000);
        let mut output = vec![0.0; 2000];
        reverb
            .process_mono(&input, &mut output, &params(1.0, 0.5, 0.5))
            .unwrap();
        assert_eq!(output[0], 0.0);
        // Nothing arrives before the shortest comb plus the allpass chain.
        assert!(output[..1116].iter().all(|&y| y == 0.0));
        assert!(output.iter().any(|&y| y != 0.0));
    }

    #[test]
    fn test_parameters_are_clamped() {
        let mut a = CombAllpassReverb::mono();
        let mut b = CombAllpassReverb::mono();
        let input = impulse(4000);
        let mut out_a = vec![0.0; 4000];
        let mut out_b = vec![0.0; 4000];
        a.process_mono(&input, &mut out_a, &params(3.0, 7.0, -2.0))
            .unwrap();
        b.process_mono(&input, &mut out_b, &params(1.0, 1.0, 0.0))
            .unwrap();
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_tail_decays() {
        let mut reverb = CombAllpassReverb::mono();
        let input = impulse(48000);
        let mut output = vec![0.0; 48000];
        reverb
            .process_mono(&input, &mut output, &params(1.0, 0.5, 0.5))
            .unwrap();
        let energy = |s: &[f32]| s.iter().map(|x| x * x).sum::<f32>();
        assert!(energy(&output[40000..]) < energy(&output[..8000]) * 0.01);
    }

    #[test]
    fn test_stereo_channels_decorrelate() {
        let mut reverb = CombAllpassReverb::stereo();
        let input = impulse(6000);
        let silence = vec![0.0; 6000];
        let mut out_l = vec![0.0; 6000];
        let mut out_r = vec![0.0; 6000];
        reverb
            .process(
                &[&input, &silence],
                &mut [&mut out_l, &mut out_r],
                &params(1.0, 0.5, 0.5),
            )
            .unwrap();
        assert_ne!(out_l, out_r);
        assert!(out_r.iter().any(|&y| y != 0.0));
    }

    #[test]
    fn test_channel_count_is_exact() {
        let mut mono = CombAllpassReverb::mono();
        let x = [0.0f32; 8];
        let (mut a, mut b) = ([0.0f32; 8], [0.0f32; 8]);
        assert!(matches!(
            mono.process(&[&x, &x], &mut [&mut a, &mut b], &CombAllpassParams::default()),
            Err(Error::ChannelCount { found: 2, .. })
        ));

        let mut stereo = CombAllpassReverb::stereo();
        assert!(matches!(
            stereo.process(&[&x], &mut [&mut a], &CombAllpassParams::default()),
            Err(Error::ChannelCount { found: 1, .. })
        ));
    }

    #[test]
    fn test_non_finite_param_rejected_without_side_effects() {
        let mut reverb = CombAllpassReverb::mono();
        let mut fresh = reverb.clone();
        let input = impulse(512);
        let mut output = vec![0.0; 512];
        assert_eq!(
            reverb.process_mono(&input, &mut output, &params(0.5, f64::NAN, 0.5)),
            Err(Error::NonFinite { name: "room" })
        );

        let mut expected = vec![0.0; 512];
        reverb
            .process_mono(&input, &mut output, &CombAllpassParams::default())
            .unwrap();
        fresh
            .process_mono(&input, &mut expected, &CombAllpassParams::default())
            .unwrap();
        assert_eq!(output, expected);
    }

    #[test]
    fn test_nan_input_does_not_persist() {
        let mut reverb = CombAllpassReverb::mono();
        let mut output = vec![0.0; 64];
        reverb
            .process_mono(&[f32::NAN; 64], &mut output, &CombAllpassParams::default())
            .unwrap();
        assert!(output.iter().all(|y| y.is_finite()));
        reverb
            .process_mono(&[0.0; 64], &mut output, &CombAllpassParams::default())
            .unwrap();
        assert!(output.iter().all(|&y| y == 0.0));
    }

    #[test]
    fn test_reset_clears_tail() {
        let mut reverb = CombAllpassReverb::stereo();
        let input = impulse(3000);
        let (mut out_l, mut out_r) = (vec![0.0; 3000], vec![0.0; 3000]);
        reverb
            .process(
                &[&input, &input],
                &mut [&mut out_l, &mut out_r],
                &params(1.0, 0.8, 0.2),
            )
            .unwrap();
        reverb.reset();
        let silence = vec![0.0; 3000];
        reverb
            .process(
                &[&silence, &silence],
                &mut [&mut out_l, &mut out_r],
                &params(1.0, 0.8, 0.2),
            )
            .unwrap();
        assert!(out_l.iter().chain(out_r.iter()).all(|&y| y == 0.0));
    }
}
