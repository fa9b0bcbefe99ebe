//! CORDIC-style rotating oscillator
//!
//! Generates a unit-amplitude complex sinusoid by applying a fixed rotation
//! to a 2-vector every sample, so no trigonometric call is needed per step.
//! Changing the frequency only changes the rotation, never the current
//! phase, which gives phase-continuous retuning.

use std::f64::consts::TAU;

use crate::domain::wrap_phase;

/// Rotating-vector oscillator.
///
/// `real()` is `sin θ` and `imag()` is `cos θ` where θ advances by
/// `2π·freq` per call to `advance()`; θ starts at zero.
#[derive(Debug, Clone)]
pub struct Oscillator {
    x: f64,
    y: f64,
    cs: f64,
    sn: f64,
}

impl Oscillator {
    /// Create an oscillator at `freq` cycles per sample (i.e. Hz / fs)
    pub fn new(freq: f64) -> Self {
        let mut osc = Self {
            x: 0.0,
            y: 1.0,
            cs: 1.0,
            sn: 0.0,
        };
        osc.set_freq(freq);
        osc
    }

    /// Re-initialise at `freq`, resetting the phase to zero
    pub fn init(&mut self, freq: f64) {
        self.set_freq(freq);
        self.x = 0.0;
        self.y = 1.0;
    }

    /// Change the rotation increment without touching the current phase
    pub fn set_freq(&mut self, freq: f64) {
        let w = TAU * freq;
        self.cs = w.cos();
        self.sn = w.sin();
    }

    /// Jump to an absolute phase (radians)
    pub fn set_phase(&mut self, phase: f64) {
        self.x = phase.sin();
        self.y = phase.cos();
    }

    /// Rotate by one step
    #[inline]
    pub fn advance(&mut self) {
        let x = self.x * self.cs + self.y * self.sn;
        let y = self.y * self.cs - self.x * self.sn;
        self.x = x;
        self.y = y;
    }

    #[inline]
    pub fn real(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn imag(&self) -> f64 {
        self.y
    }

    /// Current phase in `[0, 2π)`
    pub fn phase(&self) -> f64 {
        wrap_phase(self.x.atan2(self.y))
    }

    /// Magnitude of the rotating vector; drifts slowly away from 1
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Pull the vector back onto the unit circle.
    ///
    /// The rotation is never re-orthonormalized, so long runs accumulate
    /// magnitude drift; callers that run indefinitely renormalize periodically.
    pub fn renormalize(&mut self) {
        let mag = self.magnitude();
        if mag > 0.0 {
            self.x /= mag;
            self.y /= mag;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase_error(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn test_phase_tracks_rotation_count() {
        let freq = 1000.0 / 48000.0;
        let mut osc = Oscillator::new(freq);
        for n in 1..=50_000u64 {
            osc.advance();
            if n % 9973 == 0 {
                let expected = (TAU * freq * n as f64).rem_euclid(TAU);
                let err = phase_error(osc.phase(), expected);
                assert!(err < 1e-6, "phase error {err} after {n} steps");
            }
        }
    }

    #[test]
    fn test_first_samples_are_sine_and_cosine() {
        let freq = 0.01;
        let mut osc = Oscillator::new(freq);
        assert_eq!(osc.real(), 0.0);
        assert_eq!(osc.imag(), 1.0);
        osc.advance();
        assert!((osc.real() - (TAU * freq).sin()).abs() < 1e-12);
        assert!((osc.imag() - (TAU * freq).cos()).abs() < 1e-12);
    }

    #[test]
    fn test_set_freq_keeps_phase_continuous() {
        let mut osc = Oscillator::new(0.02);
        for _ in 0..37 {
            osc.advance();
        }
        let before = osc.phase();
        osc.set_freq(0.05);
        assert!(phase_error(osc.phase(), before) < 1e-15, "retuning must not move the phase");
        osc.advance();
        assert!(phase_error(osc.phase(), before + TAU * 0.05) < 1e-9);
    }

    #[test]
    fn test_set_phase_and_init() {
        let mut osc = Oscillator::new(0.1);
        osc.set_phase(1.25);
        assert!((osc.phase() - 1.25).abs() < 1e-12);
        osc.init(0.2);
        assert_eq!(osc.phase(), 0.0);
    }

    #[test]
    fn test_renormalize_restores_unit_magnitude() {
        let mut osc = Oscillator::new(0.013);
        osc.x *= 1.01;
        osc.y *= 1.01;
        osc.renormalize();
        assert!((osc.magnitude() - 1.0).abs() < 1e-12);
    }
}
