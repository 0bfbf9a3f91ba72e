//! Filters: a TPT state-variable filter.
//!
//! Goals
//! - `no_std`-friendly, allocation free
//! - Stable under the sharp transients of noise bursts
//!
//! `SvfTpt` uses the “g = tan(π fc / sr)” formulation with `R = 1/(2Q)`.
//! It is robust to high resonance and parameter modulation.

use crate::dsp::{kill_denormals, tpt_g};
use core::fmt::Debug;

/// SVF output tap selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SvfMode {
    Lowpass,
    Highpass,
    Bandpass,
}

/// Topology-Preserving Transform SVF (State-Variable Filter).
///
/// Parameters:
/// - `cut_hz`  : cutoff / center frequency in Hz (held below Nyquist)
/// - `q`       : quality factor (>= ~0.5 typical; lower increases damping)
///
/// Internals:
/// - `g = tan(π fc / sr)`
/// - `R = 1 / (2Q)`
#[derive(Copy, Clone, Debug)]
pub struct SvfTpt {
    sr: f32,
    cut: f32,
    q: f32,
    mode: SvfMode,
    // derived
    g: f32,
    r: f32,
    // states
    ic1eq: f32,
    ic2eq: f32,
}

impl SvfTpt {
    #[inline]
    pub fn new(mode: SvfMode, cut_hz: f32, q: f32, sr: f32) -> Self {
        let mut s = Self {
            sr: sr.max(1.0),
            cut: cut_hz.max(0.0),
            q: q.max(1e-4),
            mode,
            g: 0.0,
            r: 0.0,
            ic1eq: 0.0,
            ic2eq: 0.0,
        };
        s.recalc();
        s
    }

    /// High-pass with a Butterworth-ish Q.
    #[inline]
    pub fn highpass(cut_hz: f32, sr: f32) -> Self {
        Self::new(SvfMode::Highpass, cut_hz, core::f32::consts::FRAC_1_SQRT_2, sr)
    }

    #[inline] pub fn set_sample_rate(&mut self, sr: f32) { self.sr = sr.max(1.0); self.recalc(); }
    #[inline] pub fn set_cutoff_hz(&mut self, cut_hz: f32) { self.cut = cut_hz.max(0.0); self.recalc(); }

    #[inline]
    fn recalc(&mut self) {
        self.g = tpt_g(self.cut, self.sr);
        self.r = 1.0 / (2.0 * self.q);
    }

    /// Process one sample, returning the configured tap.
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        // Zavalishin TPT SVF, solved for the highpass node first:
        // hp = (x - (2R + g) s1 - s2) / (1 + 2Rg + g²)
        let g = self.g;
        let hp = (x - (2.0 * self.r + g) * self.ic1eq - self.ic2eq) / (1.0 + 2.0 * self.r * g + g * g);
        let bp = g * hp + self.ic1eq;
        let lp = g * bp + self.ic2eq;
        self.ic1eq = kill_denormals(g * hp + bp);
        self.ic2eq = kill_denormals(g * bp + lp);

        match self.mode {
            SvfMode::Lowpass => lp,
            SvfMode::Highpass => hp,
            SvfMode::Bandpass => bp,
        }
    }

    /// Clear the integrator state.
    #[inline]
    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

// ------------------------------------ Tests --------------------------------------
