//! ugenkit Effects - reverberators built on ugenkit-core
//!
//! - [`CombAllpassReverb`] - eight damped combs into four allpasses, mono
//!   (`freeverb`) or stereo (`freeverb2`)
//! - [`FdnReverb`] - four-line feedback delay network with early
//!   reflections and diffused stereo output (`gverb`)
//! - [`Reverb`] - either of the above, chosen by identifier
//!
//! ## Example
//!
//! ```rust
//! use ugenkit_core::Processor;
//! use ugenkit_effects::{CombAllpassParams, CombAllpassReverb};
//!
//! let mut reverb = CombAllpassReverb::mono();
//! let mut impulse = [0.0f32; 2048];
//! impulse[0] = 1.0;
//! let mut output = [0.0f32; 2048];
//! let params = CombAllpassParams { mix: 1.0, room: 0.8, damp: 0.2 };
//! reverb.process_mono(&impulse, &mut output, &params).unwrap();
//! assert_eq!(output[0], 0.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod comb_allpass;
pub mod fdn;
pub mod reverb;

// Re-export main types at crate root
pub use comb_allpass::{CombAllpassParams, CombAllpassReverb};
pub use fdn::{FdnConfig, FdnParams, FdnReverb};
pub use reverb::{Reverb, ReverbKind, ReverbParams};
