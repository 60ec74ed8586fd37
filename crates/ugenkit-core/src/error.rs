//! Error taxonomy shared by every processor.
//!
//! Two kinds of failure are reported:
//!
//! - **Configuration** errors happen while building an instance: unknown
//!   variant identifiers, unusable sample rates or block sizes, out-of-range
//!   construction options.
//! - **Argument** errors happen per call: non-finite or unusable parameters,
//!   missing parameters, channel counts or buffer lengths that don't match. A call
//!   that returns an argument error leaves the instance exactly as it was.
//!
//! NaN and denormal values reaching recurrence state are not errors; they
//! are coerced to zero where they enter state (see [`crate::math`]).

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::string::String;

use crate::ChannelLayout;

/// Which side of the API an [`Error`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Raised while constructing an instance.
    Configuration,
    /// Raised by a processing call; the instance is unchanged.
    Argument,
}

/// Errors raised by construction and processing calls.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The variant identifier does not name a known processor.
    UnknownVariant(String),
    /// A construction option name is not recognized by the processor.
    UnknownOption(String),
    /// A construction argument is outside its usable range.
    InvalidConfig {
        /// Argument name.
        name: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// A per-call parameter or sample is NaN or infinite where a number is required.
    NonFinite {
        /// Parameter name.
        name: &'static str,
    },
    /// A per-call parameter is finite but the processor cannot use it.
    OutOfRange {
        /// Parameter name.
        name: &'static str,
    },
    /// A required per-call parameter was not supplied.
    MissingParam {
        /// Parameter name.
        name: &'static str,
    },
    /// The parameter set belongs to a different processor variant.
    ParamMismatch {
        /// Variant the parameters were meant for.
        expected: &'static str,
    },
    /// The number of input or output channels is not accepted.
    ChannelCount {
        /// Layout the processor accepts.
        expected: ChannelLayout,
        /// Number of channels supplied.
        found: usize,
    },
    /// A buffer length differs from the first input channel.
    LengthMismatch {
        /// Length of the first input channel.
        expected: usize,
        /// Length of the offending buffer.
        found: usize,
    },
}

impl Error {
    /// Configuration or argument error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownVariant(_) | Self::UnknownOption(_) | Self::InvalidConfig { .. } => {
                ErrorKind::Configuration
            }
            Self::NonFinite { .. }
            | Self::OutOfRange { .. }
            | Self::MissingParam { .. }
            | Self::ParamMismatch { .. }
            | Self::ChannelCount { .. }
            | Self::LengthMismatch { .. } => ErrorKind::Argument,
        }
    }

    /// Shorthand for [`Error::InvalidConfig`].
    pub fn invalid_config(name: &'static str, reason: &'static str) -> Self {
        Self::InvalidConfig { name, reason }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownVariant(id) => write!(f, "unknown variant '{id}'"),
            Self::UnknownOption(name) => write!(f, "unknown option '{name}'"),
            Self::InvalidConfig { name, reason } => write!(f, "invalid {name}: {reason}"),
            Self::NonFinite { name } => write!(f, "{name} is not a finite number"),
            Self::OutOfRange { name } => write!(f, "{name} is outside the usable range"),
            Self::MissingParam { name } => write!(f, "missing parameter '{name}'"),
            Self::ParamMismatch { expected } => {
                write!(f, "parameters do not match variant, expected {expected}")
            }
            Self::ChannelCount { expected, found } => {
                write!(f, "expected {} input, found {found} channel(s)", expected.name())
            }
            Self::LengthMismatch { expected, found } => {
                write!(f, "buffer length {found} does not match input length {expected}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Reject NaN and infinities for the named parameter.
#[inline]
pub fn ensure_finite(name: &'static str, value: f64) -> Result<f64, Error> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::NonFinite { name })
    }
}
