//! Modem configuration
//!
//! All timing is expressed in carrier cycles so that a configuration keeps
//! its meaning when the sample rate changes. Derived sample counts are
//! computed on demand.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ModemError, ModemResult};
use super::types::Band;

/// Highest band-pass order the pole table covers
pub const MAX_FILTER_ORDER: usize = 16;

/// Constellation sizes whose bits pack evenly into bytes
pub const SUPPORTED_PHASES: [u32; 3] = [2, 4, 16];

/// Shortest transition the band-pass filters settle within
pub const MIN_TRANSITION_CYCLES: u32 = 4;

/// Modem configuration shared by the encoder and the decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModemConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Carrier tone in Hz
    pub carrier_hz: f64,
    /// Distance between carrier, clock and data tones in Hz
    pub tone_spacing_hz: f64,
    /// Length of a phase transition, in carrier cycles
    pub transition_cycles: u32,
    /// Length of the steady part of a symbol, in carrier cycles
    pub data_cycles: u32,
    /// Number of data constellation points
    pub num_phases: u32,
    /// Peak amplitude of each tone
    pub amplitude: f64,
    /// Band-pass bandwidth around each tone in Hz
    pub band_width_hz: f64,
    /// Number of second-order sections per band-pass filter
    pub filter_order: usize,
    /// Combined lock metric needed to acquire
    pub lock_high: f64,
    /// Combined lock metric below which acquisition re-arms
    pub lock_low: f64,
    /// Fraction of the best lock seen below which lock is lost
    pub unlock_fraction: f64,
    /// Minimum clock and data band energy, relative to the carrier band, to acquire
    pub squelch_ratio: f64,
    /// Idle symbols sent before and after the payload
    pub lead_symbols: u32,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            carrier_hz: 1000.0,
            tone_spacing_hz: 400.0,
            transition_cycles: 10,
            data_cycles: 30,
            num_phases: 2,
            amplitude: 0.3,
            band_width_hz: 200.0,
            filter_order: 4,
            lock_high: 0.9,
            lock_low: 0.75,
            unlock_fraction: 0.9,
            squelch_ratio: 0.25,
            lead_symbols: 1,
        }
    }
}

impl ModemConfig {
    /// Load a JSON configuration file and validate it
    pub fn load(path: &Path) -> ModemResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ModemError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ModemConfig = serde_json::from_str(&json)
            .map_err(|e| ModemError::Config(format!("failed to parse '{}': {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the modem cannot run with
    pub fn validate(&self) -> ModemResult<()> {
        let fail = |msg: String| Err(ModemError::Config(msg));

        if self.sample_rate == 0 {
            return fail("sample rate must be positive".into());
        }
        if !(self.carrier_hz > 0.0) || !(self.tone_spacing_hz > 0.0) {
            return fail(format!(
                "carrier ({}) and tone spacing ({}) must be positive",
                self.carrier_hz, self.tone_spacing_hz
            ));
        }
        let nyquist = self.sample_rate as f64 / 2.0;
        let top = self.band_frequency(Band::Data) + self.band_width_hz / 2.0;
        if top >= nyquist {
            return fail(format!("data band reaches {top} Hz, at or above Nyquist ({nyquist} Hz)"));
        }
        if !(self.band_width_hz > 0.0) || self.band_width_hz / 2.0 >= self.carrier_hz {
            return fail(format!("band width {} Hz does not fit below the carrier", self.band_width_hz));
        }
        if self.transition_cycles < MIN_TRANSITION_CYCLES {
            return fail(format!(
                "transition of {} cycles is shorter than the minimum of {MIN_TRANSITION_CYCLES}",
                self.transition_cycles
            ));
        }
        // the slow correlator spans a transition and must fit inside the steady hold
        if self.data_samples() < self.transition_samples() {
            return fail(format!(
                "data hold of {} cycles is shorter than the {}-cycle transition",
                self.data_cycles, self.transition_cycles
            ));
        }
        if self.transition_samples() < 2 {
            return fail("transition must span at least two samples".into());
        }
        if self.filter_order < 2 || self.filter_order % 2 != 0 || self.filter_order > MAX_FILTER_ORDER {
            return fail(format!(
                "filter order {} must be even and within 2..={MAX_FILTER_ORDER}",
                self.filter_order
            ));
        }
        if !SUPPORTED_PHASES.contains(&self.num_phases) {
            return fail(format!(
                "num_phases {} not supported (expected one of {SUPPORTED_PHASES:?})",
                self.num_phases
            ));
        }
        if !(self.amplitude > 0.0) || self.amplitude * 3.0 > 1.0 {
            return fail(format!("amplitude {} must be in (0, 1/3]", self.amplitude));
        }
        if !(0.0 < self.lock_low && self.lock_low < self.lock_high) {
            return fail(format!(
                "lock thresholds must satisfy 0 < low ({}) < high ({})",
                self.lock_low, self.lock_high
            ));
        }
        if !(self.unlock_fraction > 0.0 && self.unlock_fraction <= 1.0) {
            return fail(format!("unlock fraction {} must be in (0, 1]", self.unlock_fraction));
        }
        if !(0.0..=1.0).contains(&self.squelch_ratio) {
            return fail(format!("squelch ratio {} must be in [0, 1]", self.squelch_ratio));
        }
        if self.lead_symbols == 0 {
            return fail("at least one lead symbol is needed to establish the carrier".into());
        }
        Ok(())
    }

    /// Centre frequency of a band in Hz
    pub fn band_frequency(&self, band: Band) -> f64 {
        self.carrier_hz + self.tone_spacing_hz * band.index() as f64
    }

    /// Samples per carrier cycle
    fn samples_per_cycle(&self) -> f64 {
        self.sample_rate as f64 / self.carrier_hz
    }

    /// Length of a symbol transition in samples; also the slow correlator window
    pub fn transition_samples(&self) -> usize {
        (self.transition_cycles as f64 * self.samples_per_cycle()).round() as usize
    }

    /// Length of the steady part of a symbol in samples
    pub fn data_samples(&self) -> usize {
        (self.data_cycles as f64 * self.samples_per_cycle()).round() as usize
    }

    /// Total samples per symbol
    pub fn symbol_samples(&self) -> usize {
        self.transition_samples() + self.data_samples()
    }

    /// Fast correlator window: half a transition
    pub fn fast_window(&self) -> usize {
        (self.transition_samples() / 2).max(1)
    }

    pub fn bits_per_symbol(&self) -> u32 {
        self.num_phases.trailing_zeros()
    }
}
