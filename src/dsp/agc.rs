//! Automatic Gain Control
//!
//! Normalizes the filtered carrier before it reaches the Costas loop, whose
//! phase detector gain scales with the square of the input amplitude.
//! Attack and decay are time constants, so the loop behaves the same at
//! every sample rate.

/// Time for the gain to fall by a factor of e while the output is too loud, seconds
const ATTACK_TIME: f64 = 1.0 / 480.0;
/// Time for the gain to rise by a factor of e while the output is too quiet, seconds
const DECAY_TIME: f64 = 1.0 / 48.0;

const MAX_GAIN: f64 = 100.0;
const MIN_GAIN: f64 = 0.01;

/// Peak-tracking AGC with exponential attack/decay.
///
/// The output is hard-limited to `±target`.
#[derive(Debug, Clone)]
pub struct Agc {
    target: f64,
    attack: f64,
    decay: f64,
    gain: f64,
}

impl Agc {
    /// - `target`: output peak level
    /// - `sample_rate`: Hz
    pub fn new(target: f64, sample_rate: f64) -> Self {
        Self {
            target,
            attack: 1.0 - 1.0 / (ATTACK_TIME * sample_rate),
            decay: 1.0 + 1.0 / (DECAY_TIME * sample_rate),
            gain: 1.0,
        }
    }

    pub fn process(&mut self, sample: f64) -> f64 {
        let output = sample * self.gain;
        let step = if output.abs() > self.target { self.attack } else { self.decay };
        self.gain = (self.gain * step).clamp(MIN_GAIN, MAX_GAIN);
        output.clamp(-self.target, self.target)
    }

    /// Current gain (inverse of the input level once settled)
    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn reset(&mut self) {
        self.gain = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn settle(agc: &mut Agc, amplitude: f64) -> f64 {
        let mut peak = 0.0f64;
        for n in 0..48000 {
            let y = agc.process(amplitude * (TAU * 1000.0 * n as f64 / 48000.0).sin());
            if n > 40000 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn test_quiet_tone_is_raised_to_target() {
        let mut agc = Agc::new(1.0, 48000.0);
        let peak = settle(&mut agc, 0.3);
        assert!(peak > 0.9, "peak {peak} should approach the target");
        assert!(agc.gain() > 3.0, "gain {}", agc.gain());
    }

    #[test]
    fn test_loud_tone_is_limited() {
        let mut agc = Agc::new(0.5, 48000.0);
        let peak = settle(&mut agc, 4.0);
        assert!(peak <= 0.5 + 1e-12, "output {peak} must not exceed target");
        assert!(agc.gain() < 0.2);
    }

    #[test]
    fn test_gain_bounded_on_silence() {
        let mut agc = Agc::new(1.0, 48000.0);
        for _ in 0..100_000 {
            agc.process(0.0);
        }
        assert_eq!(agc.gain(), MAX_GAIN);
        agc.reset();
        assert_eq!(agc.gain(), 1.0);
    }

    #[test]
    fn test_rates_scale_with_sample_rate() {
        let fast = Agc::new(1.0, 48000.0);
        let slow = Agc::new(1.0, 96000.0);
        assert!((fast.attack - 0.99).abs() < 1e-12);
        assert!((fast.decay - 1.001).abs() < 1e-12);
        // twice the samples per time constant, half the step
        assert!(((1.0 - slow.attack) - (1.0 - fast.attack) / 2.0).abs() < 1e-12);
    }
}
