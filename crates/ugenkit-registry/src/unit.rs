//! Every processor behind one interface with positional parameters.

use ugenkit_core::{BiquadFilter, ChannelLayout, ControlSmoother, Error, FilterParams, Processor};
use ugenkit_effects::{CombAllpassParams, FdnParams, Reverb, ReverbParams};

/// A constructed processor of any kind.
///
/// Parameters are passed as a slice of `f64` in the order of the unit's
/// [`ParamSpec`](crate::ParamSpec) list, so hosts can drive every unit the
/// same way.
#[derive(Debug, Clone)]
pub enum Unit {
    /// `ramp` with params `[glide_time]` or `lag` with `[lag_time]`.
    Smoother(ControlSmoother),
    /// `lpf`/`hpf` with params `[frequency]`, `bpf`/`brf` with
    /// `[frequency, bandwidth]`.
    Filter(BiquadFilter),
    /// `freeverb`, `freeverb2` or `gverb`.
    Reverb(Reverb),
}

/// Positional argument `index`, or [`Error::MissingParam`].
fn arg(params: &[f64], index: usize, name: &'static str) -> Result<f64, Error> {
    params
        .get(index)
        .copied()
        .ok_or(Error::MissingParam { name })
}

impl Unit {
    /// Identifier this unit was created from.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Smoother(s) => s.id(),
            Self::Filter(f) => f.response().id(),
            Self::Reverb(r) => r.kind().id(),
        }
    }

    /// Number of positional parameters [`process`](Processor::process) takes.
    pub fn param_count(&self) -> usize {
        match self {
            Self::Smoother(_) => 1,
            Self::Filter(f) if f.response().uses_bandwidth() => 2,
            Self::Filter(_) => 1,
            Self::Reverb(Reverb::CombAllpass(_)) => 3,
            Self::Reverb(Reverb::Fdn(_)) => 7,
        }
    }

    fn check_arity(&self, params: &[f64]) -> Result<(), Error> {
        if params.len() > self.param_count() {
            return Err(Error::ParamMismatch {
                expected: self.id(),
            });
        }
        Ok(())
    }
}

impl Processor for Unit {
    type Params = [f64];

    fn layout(&self) -> ChannelLayout {
        match self {
            Self::Smoother(s) => s.layout(),
            Self::Filter(f) => f.layout(),
            Self::Reverb(r) => r.layout(),
        }
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &[f64],
    ) -> Result<(), Error> {
        self.check_arity(params)?;
        match self {
            Self::Smoother(s) => {
                let name = match s {
                    ControlSmoother::Ramp(_) => "glide_time",
                    ControlSmoother::Lag(_) => "lag_time",
                };
                s.process(inputs, outputs, &arg(params, 0, name)?)
            }
            Self::Filter(f) => {
                let frequency = arg(params, 0, "frequency")?;
                let filter_params = if f.response().uses_bandwidth() {
                    FilterParams::band(frequency, arg(params, 1, "bandwidth")?)
                } else {
                    FilterParams::new(frequency)
                };
                f.process(inputs, outputs, &filter_params)
            }
            Self::Reverb(r) => {
                let reverb_params = match r {
                    Reverb::CombAllpass(_) => ReverbParams::CombAllpass(CombAllpassParams {
                        mix: arg(params, 0, "mix")?,
                        room: arg(params, 1, "room")?,
                        damp: arg(params, 2, "damp")?,
                    }),
                    Reverb::Fdn(_) => ReverbParams::Fdn(FdnParams {
                        room_size: arg(params, 0, "room_size")?,
                        decay_time: arg(params, 1, "decay_time")?,
                        damping: arg(params, 2, "damping")?,
                        input_bandwidth: arg(params, 3, "input_bandwidth")?,
                        dry_level: arg(params, 4, "dry_level")?,
                        early_level: arg(params, 5, "early_level")?,
                        tail_level: arg(params, 6, "tail_level")?,
                    }),
                };
                r.process(inputs, outputs, &reverb_params)
            }
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Smoother(s) => s.reset(),
            Self::Filter(f) => f.reset(),
            Self::Reverb(r) => r.reset(),
        }
    }
}

impl From<ControlSmoother> for Unit {
    fn from(smoother: ControlSmoother) -> Self {
        Self::Smoother(smoother)
    }
}

impl From<BiquadFilter> for Unit {
    fn from(filter: BiquadFilter) -> Self {
        Self::Filter(filter)
    }
}

impl From<Reverb> for Unit {
    fn from(reverb: Reverb) -> Self {
        Self::Reverb(reverb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ugenkit_core::FilterResponse;

    #[test]
    fn test_filter_params_by_position() {
        let mut unit: Unit = BiquadFilter::new(FilterResponse::BandPass, 48000, 64)
            .unwrap()
            .into();
        let mut out = [0.0f32; 8];
        assert_eq!(
            unit.process_mono(&[0.0; 8], &mut out, &[1000.0]),
            Err(Error::MissingParam { name: "bandwidth" })
        );
        assert!(unit.process_mono(&[0.0; 8], &mut out, &[1000.0, 1.0]).is_ok());
        assert_eq!(
            unit.process_mono(&[0.0; 8], &mut out, &[1000.0, 1.0, 3.0]),
            Err(Error::ParamMismatch { expected: "bpf" })
        );
    }

    #[test]
    fn test_positional_matches_direct() {
        let params = FdnParams::default();
        let positional = [
            params.room_size,
            params.decay_time,
            params.damping,
            params.input_bandwidth,
            params.dry_level,
            params.early_level,
            params.tail_level,
        ];
        let mut impulse = [0.0f32; 512];
        impulse[0] = 1.0;

        let mut direct = Reverb::from_id("gverb", 48000).unwrap();
        let mut unit = Unit::from(direct.clone());
        let mut expected = [0.0f32; 512];
        let mut actual = [0.0f32; 512];
        direct
            .process_mono(&impulse, &mut expected, &params.into())
            .unwrap();
        unit.process_mono(&impulse, &mut actual, &positional).unwrap();
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_ids_and_counts() {
        let smoother = Unit::from(ControlSmoother::from_id("lag", 48000, 1).unwrap());
        assert_eq!(smoother.id(), "lag");
        assert_eq!(smoother.param_count(), 1);

        let reverb = Unit::from(Reverb::from_id("freeverb2", 48000).unwrap());
        assert_eq!(reverb.id(), "freeverb2");
        assert_eq!(reverb.param_count(), 3);
        assert_eq!(reverb.layout(), ChannelLayout::Stereo);
    }
}
