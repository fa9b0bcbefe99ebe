//! Costas loop for carrier tracking
//!
//! Mixes the input against a software VCO, low-passes the two arms with
//! biquads, and drives the VCO from the `I·Q` phase error through a
//! proportional-plus-integral loop filter. Gains come from the desired
//! natural frequency and damping ratio:
//!
//! - `G = 4π·ζ·fnat` (proportional)
//! - `a = π·fnat/ζ` (integral, applied to the proportional term)
//!
//! Alongside the baseband output the loop reports a smoothed frequency
//! estimate, a 0..1 lock metric and the phase offset from an ideal
//! free-running oscillator at the nominal carrier.

use std::f64::consts::{FRAC_1_SQRT_2, PI, TAU};

use super::filter::{BiquadLowPass, RcLowPass};
use super::integrator::LoopIntegrator;
use super::lock_detector::LockDetector;

/// Loop design parameters. All frequencies in Hz.
#[derive(Debug, Clone, PartialEq)]
pub struct CostasParams {
    /// Nominal carrier
    pub carrier: f64,
    pub sample_rate: f64,
    /// Quality factor of the arm and frequency filters
    pub q: f64,
    /// Arm low-pass cutoff
    pub arm_cutoff: f64,
    /// Loop natural frequency
    pub natural_freq: f64,
    /// Frequency-estimate smoothing cutoff
    pub freq_cutoff: f64,
    /// Loop damping ratio
    pub damping: f64,
    /// Lock detector smoothing cutoff
    pub lock_cutoff: f64,
    /// Time constant of the lock metric RC filter, seconds
    pub lock_tau: f64,
}

impl CostasParams {
    /// Defaults scaled to the carrier frequency
    pub fn new(carrier: f64, sample_rate: f64) -> Self {
        Self {
            carrier,
            sample_rate,
            q: FRAC_1_SQRT_2,
            arm_cutoff: 0.6 * carrier,
            natural_freq: 0.2 * carrier,
            freq_cutoff: 0.1 * carrier,
            damping: FRAC_1_SQRT_2,
            lock_cutoff: 0.05 * carrier,
            lock_tau: 20.0 / carrier,
        }
    }
}

/// Costas phase-locked loop
pub struct CostasLoop {
    params: CostasParams,
    /// Proportional gain
    gain: f64,
    /// Integral gain
    alpha: f64,
    /// Nominal VCO increment, rad/s
    increment: f64,

    i_lpf: BiquadLowPass,
    q_lpf: BiquadLowPass,
    freq_lpf: BiquadLowPass,
    lock_detector: LockDetector,
    lock_lpf: RcLowPass,
    vco: LoopIntegrator,
    amplitude: LoopIntegrator,

    last_vco_phase: f64,
    free_phase: f64,

    error: f64,
    phase: f64,
}

impl CostasLoop {
    /// Loop with default parameters for `carrier` Hz at `sample_rate`
    pub fn new(carrier: f64, sample_rate: f64) -> Self {
        Self::with_params(CostasParams::new(carrier, sample_rate))
    }

    pub fn with_params(params: CostasParams) -> Self {
        let fs = params.sample_rate;
        let gain = 4.0 * PI * params.damping * params.natural_freq;
        let alpha = PI * params.natural_freq / params.damping;
        let increment = TAU * params.carrier;

        Self {
            gain,
            alpha,
            increment,
            i_lpf: BiquadLowPass::new(params.q, params.arm_cutoff, fs),
            q_lpf: BiquadLowPass::new(params.q, params.arm_cutoff, fs),
            freq_lpf: BiquadLowPass::new(params.q, params.freq_cutoff, fs),
            lock_detector: LockDetector::new(params.lock_cutoff, fs),
            lock_lpf: RcLowPass::new(params.lock_tau, fs),
            vco: LoopIntegrator::new(fs),
            amplitude: LoopIntegrator::new(fs),
            last_vco_phase: 0.0,
            free_phase: 0.0,
            error: 0.0,
            phase: 0.0,
            params,
        }
    }

    /// Process one sample; returns the in-phase (demodulated) arm output
    pub fn add(&mut self, sample: f64) -> f64 {
        let fs = self.params.sample_rate;
        let vco_phase = self.vco.value();

        // Mix with the local oscillator; the low-pass filters drop the 2×carrier
        // term and the factor 2 restores unit gain for a matched carrier
        let cos_vco = vco_phase.cos();
        let sin_vco = -vco_phase.sin();
        let in_phase = 2.0 * self.i_lpf.add(sample * cos_vco);
        let qu_phase = 2.0 * self.q_lpf.add(sample * sin_vco);

        // Phase detector: I·Q is zero when locked and its sign says which way
        // the oscillator is off. It is blind to a 180° flip, so BPSK-style
        // phase changes in the input do not disturb the loop.
        let s2 = in_phase * qu_phase;
        let s3 = self.gain * s2;
        // PI loop filter: the extended-precision integrator holds the
        // frequency correction, the proportional path reacts at once
        let s5 = self.amplitude.add(self.alpha * s3);
        let s6 = s3 + s5;
        self.vco.add(self.increment + s6);

        // Offset from a free-running oscillator at the nominal frequency.
        // When the offset leaves [-π, π) the loop has slipped whole cycles;
        // the slips are folded into the free-running phase so the reported
        // offset stays wrapped and the next sample starts from it.
        let mut phase = vco_phase - self.free_phase;
        let slips = ((phase + PI) / TAU).floor();
        phase -= slips * TAU;
        self.free_phase += slips * TAU + self.increment / fs;
        self.phase = phase;
        self.error = s2;

        // Smoothed lock and frequency outputs
        let locked = self.lock_detector.add(in_phase, qu_phase);
        self.lock_lpf.add(if locked { 1.0 } else { 0.0 });
        self.freq_lpf.add((vco_phase - self.last_vco_phase) * fs / TAU);
        self.last_vco_phase = vco_phase;

        // Keep the phase ramps small; whole turns leave every output unchanged
        if self.free_phase >= TAU {
            let turns = (self.free_phase / TAU).floor() * TAU;
            self.free_phase -= turns;
            self.last_vco_phase -= turns;
            self.vco.offset(-turns);
        }

        in_phase
    }

    /// Phase detector output of the last sample
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Smoothed lock metric in `[0, 1]`
    pub fn lock(&self) -> f64 {
        self.lock_lpf.value()
    }

    /// Smoothed VCO frequency estimate, Hz
    pub fn freq(&self) -> f64 {
        self.freq_lpf.value()
    }

    /// VCO phase relative to a free-running oscillator at the nominal carrier, `[-π, π)`
    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn params(&self) -> &CostasParams {
        &self.params
    }

    /// Reset all filters, integrators and phase history
    pub fn reset(&mut self) {
        self.i_lpf.reset();
        self.q_lpf.reset();
        self.freq_lpf.reset();
        self.lock_detector.reset();
        self.lock_lpf.reset();
        self.vco.reset();
        self.amplitude.reset();
        self.last_vco_phase = 0.0;
        self.free_phase = 0.0;
        self.error = 0.0;
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f64 = 48000.0;

    fn run(costas: &mut CostasLoop, freq: f64, phase: f64, samples: usize) {
        for n in 0..samples {
            let x = (TAU * freq * n as f64 / FS + phase).cos();
            costas.add(x);
        }
    }

    #[test]
    fn test_tracks_one_percent_high() {
        let mut costas = CostasLoop::new(1000.0, FS);
        run(&mut costas, 1010.0, 0.0, 48000);
        let err = (costas.freq() - 1010.0).abs() / 1010.0;
        assert!(err < 0.01, "frequency {} not within 1% of 1010 Hz", costas.freq());
        assert!(costas.lock() > 0.5, "lock metric {}", costas.lock());
    }

    #[test]
    fn test_tracks_one_percent_low_with_phase_offset() {
        let mut costas = CostasLoop::new(1000.0, FS);
        run(&mut costas, 990.0, 1.0, 48000);
        assert!((costas.freq() - 990.0).abs() < 9.9, "frequency {}", costas.freq());
        assert!(costas.lock() > 0.5, "lock metric {}", costas.lock());
    }

    #[test]
    fn test_phase_stays_wrapped() {
        let mut costas = CostasLoop::new(1000.0, FS);
        for n in 0..96000 {
            costas.add((TAU * 1007.0 * n as f64 / FS).cos());
            let p = costas.phase();
            assert!((-PI..PI).contains(&p), "phase {p} escaped [-π, π) at sample {n}");
        }
    }

    #[test]
    fn test_silence_never_locks() {
        let mut costas = CostasLoop::new(1000.0, FS);
        for _ in 0..48000 {
            costas.add(0.0);
        }
        assert_eq!(costas.lock(), 0.0);
        assert!((costas.freq() - 1000.0).abs() < 1.0, "free-running VCO should sit at the carrier");
    }

    #[test]
    fn test_gains_follow_design_equations() {
        let costas = CostasLoop::new(1000.0, FS);
        let p = costas.params();
        assert!((costas.gain - 4.0 * PI * p.damping * p.natural_freq).abs() < 1e-9);
        assert!((costas.alpha - PI * p.natural_freq / p.damping).abs() < 1e-9);
        assert!((costas.increment - TAU * 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut costas = CostasLoop::new(1000.0, FS);
        run(&mut costas, 1000.0, 0.0, 10000);
        costas.reset();
        assert_eq!(costas.vco.value(), 0.0);
        assert_eq!(costas.lock(), 0.0);
        assert_eq!(costas.freq(), 0.0);
        assert_eq!(costas.phase(), 0.0);
        assert_eq!(costas.error(), 0.0);
    }
}
