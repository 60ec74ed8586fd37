//! Reverb selection by identifier.
//!
//! [`Reverb`] holds either topology behind one [`Processor`] impl, so hosts
//! can pick an engine from a string at run time and keep a single type.

use core::str::FromStr;

use ugenkit_core::{ChannelLayout, Error, Processor};

use crate::{CombAllpassParams, CombAllpassReverb, FdnConfig, FdnParams, FdnReverb};

/// Reverb engines by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReverbKind {
    /// Mono comb/allpass (`"freeverb"`).
    FreeVerb,
    /// Stereo comb/allpass (`"freeverb2"`).
    FreeVerb2,
    /// Feedback delay network (`"gverb"`).
    GVerb,
}

impl ReverbKind {
    /// All kinds, in identifier order.
    pub const ALL: [Self; 3] = [Self::FreeVerb, Self::FreeVerb2, Self::GVerb];

    /// Short identifier.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::FreeVerb => "freeverb",
            Self::FreeVerb2 => "freeverb2",
            Self::GVerb => "gverb",
        }
    }
}

impl FromStr for ReverbKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == s)
            .ok_or_else(|| Error::UnknownVariant(s.into()))
    }
}

/// Parameters for either engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReverbParams {
    /// For [`Reverb::CombAllpass`].
    CombAllpass(CombAllpassParams),
    /// For [`Reverb::Fdn`].
    Fdn(FdnParams),
}

impl From<CombAllpassParams> for ReverbParams {
    fn from(params: CombAllpassParams) -> Self {
        Self::CombAllpass(params)
    }
}

impl From<FdnParams> for ReverbParams {
    fn from(params: FdnParams) -> Self {
        Self::Fdn(params)
    }
}

/// One of the reverb engines.
///
/// # Example
///
/// ```rust
/// use ugenkit_core::Processor;
/// use ugenkit_effects::{FdnParams, Reverb};
///
/// let mut reverb = Reverb::from_id("gverb", 48000).unwrap();
/// let input = [0.0f32; 128];
/// let (mut l, mut r) = ([0.0f32; 128], [0.0f32; 128]);
/// reverb
///     .process(&[&input, &input], &mut [&mut l, &mut r], &FdnParams::default().into())
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub enum Reverb {
    /// Comb/allpass network, mono or stereo.
    CombAllpass(CombAllpassReverb),
    /// Feedback delay network.
    Fdn(FdnReverb),
}

impl Reverb {
    /// Build `kind`; `fdn` only applies to [`ReverbKind::GVerb`].
    ///
    /// # Errors
    ///
    /// Configuration errors from [`FdnReverb::new`].
    pub fn new(kind: ReverbKind, sample_rate: u32, fdn: FdnConfig) -> Result<Self, Error> {
        Ok(match kind {
            ReverbKind::FreeVerb => Self::CombAllpass(CombAllpassReverb::mono()),
            ReverbKind::FreeVerb2 => Self::CombAllpass(CombAllpassReverb::stereo()),
            ReverbKind::GVerb => Self::Fdn(FdnReverb::new(sample_rate, fdn)?),
        })
    }

    /// Build from an identifier with default options.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownVariant`] for identifiers other than `freeverb`,
    /// `freeverb2` and `gverb`.
    pub fn from_id(id: &str, sample_rate: u32) -> Result<Self, Error> {
        Self::new(id.parse()?, sample_rate, FdnConfig::default())
    }

    /// Engine identifier.
    pub fn kind(&self) -> ReverbKind {
        match self {
            Self::CombAllpass(r) if r.is_stereo() => ReverbKind::FreeVerb2,
            Self::CombAllpass(_) => ReverbKind::FreeVerb,
            Self::Fdn(_) => ReverbKind::GVerb,
        }
    }

    /// Default parameters for this engine.
    pub fn default_params(&self) -> ReverbParams {
        match self {
            Self::CombAllpass(_) => CombAllpassParams::default().into(),
            Self::Fdn(_) => FdnParams::default().into(),
        }
    }
}

impl Processor for Reverb {
    type Params = ReverbParams;

    fn layout(&self) -> ChannelLayout {
        match self {
            Self::CombAllpass(r) => r.layout(),
            Self::Fdn(r) => r.layout(),
        }
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &ReverbParams,
    ) -> Result<(), Error> {
        match (self, params) {
            (Self::CombAllpass(r), ReverbParams::CombAllpass(p)) => r.process(inputs, outputs, p),
            (Self::Fdn(r), ReverbParams::Fdn(p)) => r.process(inputs, outputs, p),
            (Self::CombAllpass(_), _) => Err(Error::ParamMismatch {
                expected: "comb/allpass",
            }),
            (Self::Fdn(_), _) => Err(Error::ParamMismatch {
                expected: "feedback delay network",
            }),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::CombAllpass(r) => r.reset(),
            Self::Fdn(r) => r.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in ReverbKind::ALL {
            let reverb = Reverb::from_id(kind.id(), 44100).unwrap();
            assert_eq!(reverb.kind(), kind);
        }
        assert_eq!(
            Reverb::from_id("plate", 44100).unwrap_err(),
            Error::UnknownVariant("plate".into())
        );
    }

    #[test]
    fn test_layouts() {
        let layout = |id| Reverb::from_id(id, 48000).unwrap().layout();
        assert_eq!(layout("freeverb"), ChannelLayout::Mono);
        assert_eq!(layout("freeverb2"), ChannelLayout::Stereo);
        assert_eq!(layout("gverb"), ChannelLayout::MonoOrStereo);
    }

    #[test]
    fn test_param_mismatch() {
        let mut reverb = Reverb::from_id("freeverb", 48000).unwrap();
        let mut out = [0.0f32; 4];
        let err = reverb
            .process_mono(&[0.0; 4], &mut out, &FdnParams::default().into())
            .unwrap_err();
        assert!(matches!(err, Error::ParamMismatch { .. }));

        let params = reverb.default_params();
        assert!(reverb.process_mono(&[0.0; 4], &mut out, &params).is_ok());
    }

    #[test]
    fn test_gverb_config_errors_surface() {
        let config = FdnConfig {
            decay_time: -1.0,
            ..FdnConfig::default()
        };
        assert!(Reverb::new(ReverbKind::GVerb, 48000, config).is_err());
        // Comb/allpass ignores FDN options.
        assert!(Reverb::new(ReverbKind::FreeVerb, 48000, config).is_ok());
    }
}
