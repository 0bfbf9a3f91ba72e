//! Generic DSP utilities and math helpers.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Optional `fast-math` approximations for hot paths
//! - Clean, side-effect free helpers that are easy to test
//!
//! Conventions:
//! - All functions are `#[inline]` where useful to help the optimizer.
//! - Argument and return domains are documented per function.

#![allow(clippy::excessive_precision)]

use core::f32::consts::PI;

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // micromath preferred if explicitly requested (works in no_std)
    if #[cfg(feature = "micromath")] {
        use micromath::F32Ext as _;
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
        #[inline] fn m_ln(x: f32) -> f32 { x.ln() }
        #[inline] fn m_tan(x: f32) -> f32 { (x.sin()) / (x.cos()) }
        #[inline] fn m_floor(x: f32) -> f32 { x.floor() }
    // libm (C math) in no_std
    } else if #[cfg(feature = "no-std")] {
        #[inline] fn m_sin(x: f32) -> f32 { libm::sinf(x) }
        #[inline] fn m_exp(x: f32) -> f32 { libm::expf(x) }
        #[inline] fn m_ln(x: f32) -> f32 { libm::logf(x) }
        #[inline] fn m_tan(x: f32) -> f32 { libm::tanf(x) }
        #[inline] fn m_floor(x: f32) -> f32 { libm::floorf(x) }
    // std backend
    } else {
        #[inline] fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] fn m_exp(x: f32) -> f32 { x.exp() }
        #[inline] fn m_ln(x: f32) -> f32 { x.ln() }
        #[inline] fn m_tan(x: f32) -> f32 { x.tan() }
        #[inline] fn m_floor(x: f32) -> f32 { x.floor() }
    }
}

// --------------------------------- Constants -------------------------------------

/// 2π (commonly useful)
pub const TAU: f32 = 2.0 * PI;

/// A very small epsilon used in denormal handling and safe divisions.
pub const EPS_SMALL: f32 = 1.0e-20;

// --------------------------------- Utilities -------------------------------------

#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    if x < lo { lo } else if x > hi { hi } else { x }
}

/// Wrap phase into [0, 1).
#[inline]
pub fn wrap_phase01(p: f32) -> f32 {
    let w = p - m_floor(p);
    if w >= 1.0 { w - 1.0 } else { w }
}

/// Kill denormal/subnormal values. Returns 0.0 if |x| < EPS_SMALL.
#[inline]
pub fn kill_denormals(x: f32) -> f32 {
    if x > -EPS_SMALL && x < EPS_SMALL { 0.0 } else { x }
}

/// Samples covering `secs` at `sr`, rounded to the nearest frame. Never negative.
#[inline]
pub fn secs_to_samples(secs: f32, sr: f32) -> u32 {
    let n = secs * sr + 0.5;
    if n.is_finite() && n > 0.0 { n as u32 } else { 0 }
}

// --------------------------------- Fast trig -------------------------------------

/// Fast sine with range reduction into [-π, π] and 5th-order minimax-style poly.
/// Max abs error ~1e-3 for musical uses when `fast-math` is enabled; falls back to exact otherwise.
#[inline]
pub fn fast_sin(x: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            let k = m_floor(x / TAU + 0.5);
            let xr = x - k * TAU;
            let x2 = xr * xr;
            xr * (0.999_979_313_3 + x2 * (-0.166_624_432_0 + x2 * 0.008_308_978_98))
        } else {
            m_sin(x)
        }
    }
}

// --------------------------------- Exponentials ----------------------------------

/// Per-sample multiplier that takes a value from `from` to `to` in `samples` steps.
///
/// `from * ratio^samples == to`. Both endpoints must be strictly positive; anything
/// else yields `1.0` (a flat line), mirroring how an exponential ramp cannot cross zero.
#[inline]
pub fn exp_step_ratio(from: f32, to: f32, samples: u32) -> f32 {
    if samples == 0 || from <= 0.0 || to <= 0.0 || !from.is_finite() || !to.is_finite() {
        return 1.0;
    }
    m_exp(m_ln(to / from) / samples as f32)
}

/// TPT (Topology-Preserving Transform) `g = tan(π fc / sr)` helper for state-variable filters.
///
/// The cutoff is held below Nyquist (0.49 · sr) so the warp never reaches the pole of `tan`.
#[inline]
pub fn tpt_g(cut_hz: f32, sr: f32) -> f32 {
    let fc = clamp(cut_hz, 0.0, 0.49 * sr);
    m_tan(PI * (fc / sr))
}

// --------------------------------- Tests (std only) ------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_respects_bounds() {
        assert_eq!(clamp(2.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-2.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.25, 0.0, 1.0), 0.25);
    }

    #[test]
    fn exp_ratio_lands_on_target() {
        let r = exp_step_ratio(0.8, 0.01, 24_000);
        let mut v = 0.8_f32;
        for _ in 0..24_000 { v *= r; }
        assert!((v - 0.01).abs() < 1e-3, "v={v}");
    }

    #[test]
    fn exp_ratio_is_flat_for_non_positive_endpoints() {
        assert_eq!(exp_step_ratio(0.0, 0.01, 100), 1.0);
        assert_eq!(exp_step_ratio(0.5, 0.0, 100), 1.0);
        assert_eq!(exp_step_ratio(0.5, 0.01, 0), 1.0);
    }

    #[test]
    fn tpt_g_stays_finite_above_nyquist() {
        let g = tpt_g(10_000.0, 16_000.0);
        assert!(g.is_finite() && g > 0.0, "g={g}");
    }

    #[test]
    fn wrap_phase_stays_in_unit_interval() {
        for p in [-1.25, -0.5, 0.0, 0.5, 1.0, 3.75] {
            let w = wrap_phase01(p);
            assert!((0.0..1.0).contains(&w), "p={p} w={w}");
        }
    }
}
