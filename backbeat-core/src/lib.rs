#![cfg_attr(not(feature = "std"), no_std)]
//! Backbeat Core — no_std-ready DSP primitives with optional fast-math hooks.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and use `libm`/`micromath` math backends
//! - `fast-math`: enable polynomial approximations for trig
//!
//! Modules
//! - [`dsp`]       : math backend, utils (clamp, phase wrap, exponential step ratios)
//! - [`envelopes`] : one-shot exponential and linear ramps
//! - [`filters`]   : TPT state-variable filter
//!
//! Design
//! - No heap allocations; pure sample-by-sample primitives
//! - Friendly to real-time audio callbacks

pub mod dsp;
pub mod envelopes;
pub mod filters;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::dsp::{clamp, fast_sin, kill_denormals, secs_to_samples, wrap_phase01, TAU};
    pub use crate::envelopes::{ExpRamp, LinearRamp};
    pub use crate::filters::{SvfMode, SvfTpt};
}
