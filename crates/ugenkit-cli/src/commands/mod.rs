//! CLI command implementations.

pub mod common;
pub mod impulse;
pub mod presets;
pub mod process;
pub mod units;
