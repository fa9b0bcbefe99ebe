//! Waveform generator
//!
//! A single generic driver produces every transmitted tone. It holds a
//! CORDIC oscillator at a nominal frequency and moves between numeric
//! targets (phase, amplitude, duration) supplied by a [`TargetSource`].
//!
//! Phase changes are made by briefly detuning the oscillator so that the
//! extra phase accumulates linearly over the glide. The waveform therefore
//! never jumps, and the amplitude ramps linearly alongside.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use crate::dsp::Oscillator;

/// Where the generator should be at the end of a stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// Phase offset from the nominal oscillator, radians
    pub phase: f64,
    pub amplitude: f64,
    /// Stage length in samples; zero holds forever
    pub steps: u32,
}

impl Target {
    /// Hold this phase and amplitude indefinitely
    pub fn hold(phase: f64, amplitude: f64) -> Self {
        Self {
            phase,
            amplitude,
            steps: 0,
        }
    }

    /// Reach this phase and amplitude after `steps` samples
    pub fn glide(phase: f64, amplitude: f64, steps: u32) -> Self {
        Self {
            phase,
            amplitude,
            steps,
        }
    }
}

/// Supplies the generator's next target once the current stage ends
pub trait TargetSource {
    /// `current` is the target just reached
    fn next_target(&mut self, current: &Target) -> Target;
}

impl<F> TargetSource for F
where
    F: FnMut(&Target) -> Target,
{
    fn next_target(&mut self, current: &Target) -> Target {
        self(current)
    }
}

/// Current generator stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Stage finished; the next sample pulls a new target
    Expired,
    /// Moving towards the target, `remaining` samples left
    Glide { remaining: u32 },
    /// Parked at the target
    Hold,
}

/// Tone generator parameterized by its target source
pub struct WaveGenerator<S> {
    source: S,
    freq: f64,
    osc: Oscillator,
    target: Target,
    stage: Stage,
    amplitude: f64,
    amplitude_step: f64,
}

impl<S: TargetSource> WaveGenerator<S> {
    /// - `freq`: nominal frequency in cycles per sample (Hz / fs)
    /// - `source`: target supplier; its first target sets the starting phase and amplitude
    pub fn new(freq: f64, mut source: S) -> Self {
        let target = source.next_target(&Target::hold(0.0, 0.0));
        let mut osc = Oscillator::new(freq);
        osc.set_phase(target.phase);
        Self {
            source,
            freq,
            osc,
            amplitude: target.amplitude,
            target,
            stage: Stage::Expired,
            amplitude_step: 0.0,
        }
    }

    /// Produce one sample
    pub fn step(&mut self) -> f64 {
        if self.stage == Stage::Expired {
            self.recalc();
        }
        let value = self.amplitude * self.osc.real();
        self.advance();
        value
    }

    fn advance(&mut self) {
        if let Stage::Glide { remaining } = self.stage {
            self.stage = if remaining <= 1 {
                Stage::Expired
            } else {
                Stage::Glide {
                    remaining: remaining - 1,
                }
            };
        }
        self.osc.advance();
        self.amplitude += self.amplitude_step;
    }

    fn recalc(&mut self) {
        let previous = self.target;
        self.target = self.source.next_target(&previous);

        if self.target.steps == 0 {
            self.stage = Stage::Hold;
            self.amplitude_step = 0.0;
            self.osc.set_freq(self.freq);
        } else {
            let steps = self.target.steps as f64;
            let extra = (self.target.phase - previous.phase) / steps;
            self.stage = Stage::Glide {
                remaining: self.target.steps,
            };
            self.amplitude_step = (self.target.amplitude - self.amplitude) / steps;
            self.osc.set_freq(self.freq + extra / TAU);
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }
}

/// A sequence of symbols for one tone, each a `(phase, amplitude)` pair.
///
/// The first symbol is held for a whole symbol period; every later symbol
/// glides in over `transition` samples and then holds for `hold` samples.
/// Once exhausted the track parks at the last symbol.
pub struct SymbolTrack {
    targets: VecDeque<Target>,
}

impl SymbolTrack {
    pub fn new(symbols: &[(f64, f64)], transition: u32, hold: u32) -> Self {
        let mut targets = VecDeque::with_capacity(symbols.len() * 2 + 1);
        if let Some(&(phase, amplitude)) = symbols.first() {
            targets.push_back(Target::hold(phase, amplitude));
            targets.push_back(Target::glide(phase, amplitude, transition + hold));
        }
        for &(phase, amplitude) in symbols.iter().skip(1) {
            targets.push_back(Target::glide(phase, amplitude, transition));
            targets.push_back(Target::glide(phase, amplitude, hold));
        }
        Self { targets }
    }
}

impl TargetSource for SymbolTrack {
    fn next_target(&mut self, current: &Target) -> Target {
        self.targets
            .pop_front()
            .unwrap_or_else(|| Target::hold(current.phase, current.amplitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::QueueCorrelator;
    use std::f64::consts::PI;

    #[test]
    fn test_constant_source_is_a_pure_tone() {
        let freq = 1000.0 / 48000.0;
        let mut gen = WaveGenerator::new(freq, |_: &Target| Target::hold(0.0, 0.5));
        for n in 0..1000 {
            let expected = 0.5 * (TAU * freq * n as f64).sin();
            let got = gen.step();
            assert!((got - expected).abs() < 1e-9, "sample {n}: {got} vs {expected}");
        }
        assert_eq!(gen.stage(), Stage::Hold);
    }

    #[test]
    fn test_glide_reaches_target_phase_and_amplitude() {
        let freq = 1000.0 / 48000.0;
        let track = SymbolTrack::new(&[(0.0, 0.2), (PI, 0.4)], 480, 1440);
        let mut gen = WaveGenerator::new(freq, track);

        // first symbol: 1920 samples at phase 0
        let mut corr = QueueCorrelator::new(480, freq);
        for _ in 0..1920 {
            corr.add(gen.step());
        }
        assert!((gen.amplitude() - 0.2).abs() < 1e-12);
        let first = corr.phase();

        // transition, then the steady part of the second symbol
        for _ in 0..480 {
            gen.step();
        }
        assert!((gen.amplitude() - 0.4).abs() < 1e-9, "amplitude {}", gen.amplitude());
        let mut corr = QueueCorrelator::new(480, freq);
        // keep the reference oscillator aligned with stream time
        for _ in 0..2400 {
            corr.add(0.0);
        }
        for _ in 0..480 {
            corr.add(gen.step());
        }
        let d = (first - corr.phase()).rem_euclid(TAU);
        assert!((d - PI).abs() < 0.01, "phase moved by {d}, expected π");
    }

    #[test]
    fn test_glide_is_continuous() {
        let freq = 1000.0 / 48000.0;
        let track = SymbolTrack::new(&[(0.0, 0.3), (PI, 0.3)], 480, 100);
        let mut gen = WaveGenerator::new(freq, track);
        let mut last = gen.step();
        // largest possible step of a 0.3 tone near 1 kHz is well under 0.05
        for n in 1..3000 {
            let x = gen.step();
            assert!((x - last).abs() < 0.05, "jump at sample {n}: {last} -> {x}");
            last = x;
        }
    }

    #[test]
    fn test_exhausted_track_parks_at_last_symbol() {
        let track = SymbolTrack::new(&[(0.0, 0.3), (1.0, 0.0)], 10, 10);
        let mut gen = WaveGenerator::new(0.01, track);
        for _ in 0..100 {
            gen.step();
        }
        assert_eq!(gen.stage(), Stage::Hold);
        assert!(gen.amplitude().abs() < 1e-12);
        assert!(gen.step().abs() < 1e-12);
    }

    #[test]
    fn test_empty_track_is_silent_hold() {
        let mut track = SymbolTrack::new(&[], 10, 10);
        let current = Target::hold(0.5, 0.0);
        assert_eq!(track.next_target(&current), current);
    }
}
