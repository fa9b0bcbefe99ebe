//! Carrier lock detector
//!
//! Once a Costas loop has settled, almost all signal power sits on the
//! in-phase arm. The detector smooths the squared arm outputs and reports
//! lock while in-phase energy is above the threshold and quadrature energy
//! is below it.

use std::f64::consts::FRAC_1_SQRT_2;

use super::filter::BiquadLowPass;

/// Default energy threshold for both arms
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Squared-envelope lock comparator
#[derive(Debug, Clone)]
pub struct LockDetector {
    in_phase: BiquadLowPass,
    quadrature: BiquadLowPass,
    threshold: f64,
}

impl LockDetector {
    /// - `cutoff`: smoothing low-pass cutoff in Hz (~10 Hz, or a fraction of the carrier)
    /// - `sample_rate`: Hz
    pub fn new(cutoff: f64, sample_rate: f64) -> Self {
        Self::with_threshold(cutoff, sample_rate, DEFAULT_THRESHOLD)
    }

    pub fn with_threshold(cutoff: f64, sample_rate: f64, threshold: f64) -> Self {
        Self {
            in_phase: BiquadLowPass::new(FRAC_1_SQRT_2, cutoff, sample_rate),
            quadrature: BiquadLowPass::new(FRAC_1_SQRT_2, cutoff, sample_rate),
            threshold,
        }
    }

    /// Feed one pair of arm outputs; returns true while locked
    pub fn add(&mut self, in_phase: f64, qu_phase: f64) -> bool {
        let i = self.in_phase.add(in_phase * in_phase);
        let q = self.quadrature.add(qu_phase * qu_phase);
        i > self.threshold && q < self.threshold
    }

    /// Smoothed in-phase energy
    pub fn in_phase_energy(&self) -> f64 {
        self.in_phase.value()
    }

    /// Smoothed quadrature energy
    pub fn quadrature_energy(&self) -> f64 {
        self.quadrature.value()
    }

    pub fn reset(&mut self) {
        self.in_phase.reset();
        self.quadrature.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locks_when_power_is_in_phase() {
        let mut det = LockDetector::new(10.0, 48000.0);
        let mut locked = false;
        for _ in 0..48000 {
            locked = det.add(1.0, 0.05);
        }
        assert!(locked, "I energy {} Q energy {}", det.in_phase_energy(), det.quadrature_energy());
    }

    #[test]
    fn test_unlocked_when_power_is_in_quadrature() {
        let mut det = LockDetector::new(10.0, 48000.0);
        let mut locked = true;
        for _ in 0..48000 {
            locked = det.add(0.1, 1.0);
        }
        assert!(!locked);
    }

    #[test]
    fn test_single_spike_does_not_lock() {
        let mut det = LockDetector::new(10.0, 48000.0);
        assert!(!det.add(5.0, 0.0), "smoothing should absorb a one-sample spike");
    }

    #[test]
    fn test_reset_clears_energy() {
        let mut det = LockDetector::new(10.0, 48000.0);
        for _ in 0..1000 {
            det.add(1.0, 1.0);
        }
        det.reset();
        assert_eq!(det.in_phase_energy(), 0.0);
        assert_eq!(det.quadrature_energy(), 0.0);
    }
}
