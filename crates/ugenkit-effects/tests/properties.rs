//! Property-based tests for the reverbs.
//!
//! Uses proptest to check the invariants every engine must hold: block
//! splitting does not change the output for steady parameters, output stays
//! finite whatever the input carries, and reset returns to the fresh state.

use proptest::prelude::*;
use ugenkit_core::Processor;
use ugenkit_effects::{
    CombAllpassParams, CombAllpassReverb, FdnConfig, FdnParams, FdnReverb, Reverb, ReverbKind,
    ReverbParams,
};

const SAMPLE_RATE: u32 = 48000;

fn comb_params() -> impl Strategy<Value = CombAllpassParams> {
    (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0).prop_map(|(mix, room, damp)| CombAllpassParams {
        mix,
        room,
        damp,
    })
}

fn fdn_params() -> impl Strategy<Value = FdnParams> {
    (
        1.0f64..50.0,
        0.1f64..10.0,
        0.0f64..=1.0,
        0.0f64..=1.0,
        0.0f64..=1.0,
        0.0f64..=1.0,
        0.0f64..=1.0,
    )
        .prop_map(
            |(room_size, decay_time, damping, input_bandwidth, dry, early, tail)| FdnParams {
                room_size,
                decay_time,
                damping,
                input_bandwidth,
                dry_level: dry,
                early_level: early,
                tail_level: tail,
            },
        )
}

fn reverb_with_params() -> impl Strategy<Value = (ReverbKind, ReverbParams)> {
    prop_oneof![
        comb_params().prop_map(|p| (ReverbKind::FreeVerb, p.into())),
        comb_params().prop_map(|p| (ReverbKind::FreeVerb2, p.into())),
        fdn_params().prop_map(|p| (ReverbKind::GVerb, p.into())),
    ]
}

/// Run `input` through `reverb` in blocks split at `split`, on every channel
/// the layout needs, returning the first output channel.
fn run_split(reverb: &mut Reverb, input: &[f32], split: usize, params: &ReverbParams) -> Vec<f32> {
    let channels = reverb.layout().max_channels();
    let mut out = vec![vec![0.0f32; input.len()]; channels];
    let (head, tail) = input.split_at(split);
    for (range, block) in [(0..split, head), (split..input.len(), tail)] {
        let inputs: Vec<&[f32]> = (0..channels).map(|_| block).collect();
        let mut outputs: Vec<&mut [f32]> = out.iter_mut().map(|o| &mut o[range.clone()]).collect();
        reverb.process(&inputs, &mut outputs, params).unwrap();
    }
    out.swap_remove(0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// With steady parameters, one long call equals the same samples split
    /// across two calls.
    #[test]
    fn block_split_invariance(
        (kind, params) in reverb_with_params(),
        input in prop::collection::vec(-1.0f32..=1.0, 1..600),
        split in 0usize..600,
    ) {
        let split = split % (input.len() + 1);
        let mut whole = Reverb::new(kind, SAMPLE_RATE, FdnConfig::default()).unwrap();
        let mut parts = whole.clone();

        let expected = run_split(&mut whole, &input, input.len(), &params);
        let actual = run_split(&mut parts, &input, split, &params);
        prop_assert_eq!(expected, actual);
    }

    /// NaN and infinite samples never reach the output.
    #[test]
    fn output_is_finite_for_any_input(
        (kind, params) in reverb_with_params(),
        mut input in prop::collection::vec(-1.0f32..=1.0, 256),
        poison in prop::collection::vec((0usize..256, 0usize..3), 0..8),
    ) {
        for (index, which) in poison {
            input[index] = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY][which];
        }
        let mut reverb = Reverb::new(kind, SAMPLE_RATE, FdnConfig::default()).unwrap();
        let output = run_split(&mut reverb, &input, 128, &params);
        prop_assert!(output.iter().all(|y| y.is_finite()), "{:?} produced non-finite output", kind);
    }

    /// After reset an instance reproduces a fresh instance's output.
    #[test]
    fn reset_matches_fresh_instance(
        (kind, params) in reverb_with_params(),
        warmup in prop::collection::vec(-1.0f32..=1.0, 64..256),
        input in prop::collection::vec(-1.0f32..=1.0, 64..256),
    ) {
        let mut fresh = Reverb::new(kind, SAMPLE_RATE, FdnConfig::default()).unwrap();
        let mut used = fresh.clone();
        run_split(&mut used, &warmup, warmup.len() / 2, &params);
        used.reset();

        let expected = run_split(&mut fresh, &input, input.len(), &params);
        let actual = run_split(&mut used, &input, input.len(), &params);
        prop_assert_eq!(expected, actual);
    }

    /// The comb/allpass reverb's left channel does not depend on whether
    /// the right network exists when both inputs carry the same signal.
    #[test]
    fn stereo_left_matches_mono_with_doubled_input(
        params in comb_params(),
        input in prop::collection::vec(-0.5f32..=0.5, 1..400),
    ) {
        let mut mono = CombAllpassReverb::mono();
        let mut stereo = CombAllpassReverb::stereo();

        // Stereo feeds l + r into each network; mono feeds x alone.
        let doubled: Vec<f32> = input.iter().map(|x| 2.0 * x).collect();
        let mut wet_params = params;
        wet_params.mix = 1.0;

        let mut mono_out = vec![0.0f32; input.len()];
        mono.process_mono(&doubled, &mut mono_out, &wet_params).unwrap();

        let (mut l, mut r) = (vec![0.0f32; input.len()], vec![0.0f32; input.len()]);
        stereo
            .process(&[&input[..], &input[..]], &mut [&mut l[..], &mut r[..]], &wet_params)
            .unwrap();
        prop_assert_eq!(mono_out, l);
    }

    /// Feedback line lengths never change after construction.
    #[test]
    fn fdn_line_lengths_fixed(params in fdn_params()) {
        let mut reverb = FdnReverb::new(SAMPLE_RATE, FdnConfig::default()).unwrap();
        let before = reverb.line_lengths();
        let mut out = [0.0f32; 32];
        reverb.process_mono(&[0.1; 32], &mut out, &params).unwrap();
        prop_assert_eq!(before, reverb.line_lengths());
    }
}
