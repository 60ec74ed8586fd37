//! UgenKit Core - control smoothers, filters and numeric guards
//!
//! This crate holds the building blocks every unit generator in the workspace
//! is made of. Everything here allocates at construction only and is safe to
//! call from a real-time audio thread afterwards.
//!
//! # Core Abstractions
//!
//! ## Processing
//!
//! - [`Processor`] - Block processing over slices of channel slices
//! - [`ChannelLayout`] - Accepted channel counts
//! - [`check_buffers`] - Shared channel and length validation
//!
//! ## Control Smoothing
//!
//! - [`Ramp`] - Linear segments with exact landing on each target
//! - [`Lag`] - One-pole exponential lag with a 60 dB glide time
//! - [`ControlSmoother`] - Tagged choice between the two
//!
//! ## Filters
//!
//! - [`BiquadFilter`] - Low-pass, high-pass, band-pass and band-reject with
//!   glided coefficient updates
//! - [`Damper`] - One-pole damping used inside reverb feedback paths
//!
//! ## Delay Structures
//!
//! - [`DelayLine`] - Circular buffer with fixed capacity
//! - [`Diffuser`] - Schroeder allpass diffuser
//!
//! ## Numeric Guards
//!
//! - [`zap_gremlins`], [`zap_gremlins_f64`], [`flush_to_zero`] - keep
//!   recurrence state free of denormals, infinities and NaN
//! - [`round_ties_even`], [`nearest_prime`] - delay sizing helpers
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! ugenkit-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use ugenkit_core::{ControlSmoother, Processor};
//!
//! let mut lag = ControlSmoother::from_id("lag", 48000, 1).unwrap();
//! let input = [1.0f32; 480];
//! let mut output = [0.0f32; 480];
//! lag.process_mono(&input, &mut output, &0.01).unwrap();
//! assert!(output[479] > 0.99);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod damper;
pub mod delay;
pub mod diffuser;
pub mod error;
pub mod math;
pub mod processor;
pub mod smoother;

pub use biquad::{BiquadFilter, CoefficientGlide, Coefficients, FilterParams, FilterResponse};
pub use damper::Damper;
pub use delay::DelayLine;
pub use diffuser::Diffuser;
pub use error::{Error, ErrorKind, ensure_finite};
pub use math::{
    GREMLIN_CEILING, GREMLIN_FLOOR, flush_to_zero, is_prime, nearest_prime, round_ties_even,
    zap_gremlins, zap_gremlins_f64,
};
pub use processor::{ChannelLayout, Processor, check_buffers};
pub use smoother::{ControlSmoother, LOG001, Lag, Ramp};
