//! Core domain types

/// Audio sample type (nominal range -1.0 to 1.0)
pub type Sample = f64;

/// A mono recording at a known sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub sample_rate: u32,
    pub samples: Vec<Sample>,
}

impl Recording {
    pub fn new(sample_rate: u32, samples: Vec<Sample>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.samples.len() as f64 / self.sample_rate as f64
        }
    }
}

/// One of the three tones the modem transmits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// Phase reference, always present at constant phase
    Carrier,
    /// Alternates between two phases, one flip per symbol
    Clock,
    /// Carries the constellation symbol as a phase offset
    Data,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Carrier, Band::Clock, Band::Data];

    /// Position of this band in per-band arrays
    pub fn index(self) -> usize {
        match self {
            Band::Carrier => 0,
            Band::Clock => 1,
            Band::Data => 2,
        }
    }
}

/// Coarse clock-band state, read from the carrier/clock phase difference
/// relative to the transmission's first symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// Clock in phase with the first symbol's clock
    Low,
    /// Clock flipped by π
    High,
    /// Phase difference near a quadrature point; no decision possible
    Invalid,
}

impl ClockState {
    /// Quantize a clock phase offset (radians) into four bins
    pub fn from_phase_difference(diff: f64) -> Self {
        match quantize_phase(diff, 4) {
            0 => ClockState::Low,
            2 => ClockState::High,
            _ => ClockState::Invalid,
        }
    }

    pub fn is_valid(self) -> bool {
        self != ClockState::Invalid
    }
}

/// Acquisition lock state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Locked,
}

/// A demapped constellation symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Symbol {
    /// Constellation index in `[0, num_phases)`
    pub value: u32,
    /// False when the phase landed between two constellation points
    pub valid: bool,
    /// Data phase relative to the carrier, `[0, 2π)`
    pub phase: f64,
    /// Number of samples integrated for this symbol
    pub samples: u64,
}

/// Uniformly quantize a phase (radians) into `bins` bins, wrapped into `[0, bins)`.
///
/// Bin `k` is centred on `k·2π/bins`.
pub fn quantize_phase(phase: f64, bins: u32) -> u32 {
    let step = std::f64::consts::TAU / bins as f64;
    let index = (phase / step).round() as i64;
    index.rem_euclid(bins as i64) as u32
}

/// Wrap a phase into `[0, 2π)`
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(std::f64::consts::TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= std::f64::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_quantize_wraps_negative_and_full_turn() {
        assert_eq!(quantize_phase(0.0, 4), 0);
        assert_eq!(quantize_phase(-0.1, 4), 0);
        assert_eq!(quantize_phase(2.0 * PI - 0.1, 4), 0);
        assert_eq!(quantize_phase(PI / 2.0, 4), 1);
        assert_eq!(quantize_phase(PI + 0.3, 4), 2);
    }

    #[test]
    fn test_clock_state_bins() {
        assert_eq!(ClockState::from_phase_difference(0.2), ClockState::Low);
        assert_eq!(ClockState::from_phase_difference(PI - 0.2), ClockState::High);
        assert_eq!(ClockState::from_phase_difference(PI / 2.0), ClockState::Invalid);
        assert_eq!(ClockState::from_phase_difference(3.0 * PI / 2.0), ClockState::Invalid);
        assert!(!ClockState::Invalid.is_valid());
    }

    #[test]
    fn test_wrap_phase_range() {
        for &p in &[-7.0, -1e-18, 0.0, 3.0, 2.0 * PI, 13.0] {
            let w = wrap_phase(p);
            assert!((0.0..2.0 * PI).contains(&w), "{p} wrapped to {w}");
        }
    }

    #[test]
    fn test_recording_duration() {
        assert_eq!(Recording::new(48000, vec![0.0; 24000]).duration(), 0.5);
        assert_eq!(Recording::new(0, vec![0.0; 10]).duration(), 0.0);
    }

    #[test]
    fn test_band_indices_are_distinct() {
        let idx: Vec<usize> = Band::ALL.iter().map(|b| b.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }
}
