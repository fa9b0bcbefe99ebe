//! Modem encoder: converts bytes to audio samples
//!
//! Pipeline: bytes → constellation symbols → three tone generators → samples
//!
//! Three tones are summed:
//! - carrier: constant phase reference
//! - clock: flips between 0 and π once per symbol, so every symbol boundary
//!   is visible even when the data repeats; silent during lead-in/out
//! - data: carries the symbol as a phase offset from the carrier
//!
//! Lead symbols before and after the payload give the receiver a stretch
//! of steady carrier to settle on.

use std::f64::consts::PI;

use crate::domain::{Band, ModemConfig, ModemResult, Sample};
use crate::modem::constellation::{bytes_to_symbols, Constellation};
use crate::modem::generator::{SymbolTrack, Target, WaveGenerator};

/// Bytes in, audio samples out
pub struct ModemEncoder {
    config: ModemConfig,
    constellation: Constellation,
}

impl ModemEncoder {
    /// Fails on a configuration the decoder could not undo, e.g. a
    /// constellation whose symbols do not pack into whole bytes
    pub fn new(config: &ModemConfig) -> ModemResult<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            constellation: Constellation::new(config.num_phases),
        })
    }

    /// Encode a payload into samples at the configured sample rate
    pub fn encode(&self, payload: &[u8]) -> Vec<Sample> {
        let symbols = bytes_to_symbols(payload, self.config.bits_per_symbol());
        self.encode_symbols(&symbols)
    }

    /// Number of samples `encode` produces for a payload of `len` bytes
    pub fn encoded_len(&self, len: usize) -> usize {
        let symbols = len * (8 / self.config.bits_per_symbol().max(1)) as usize;
        (symbols + 2 * self.config.lead_symbols as usize) * self.config.symbol_samples()
    }

    /// Encode raw constellation symbols
    pub fn encode_symbols(&self, symbols: &[u32]) -> Vec<Sample> {
        let amp = self.config.amplitude;
        let lead = self.config.lead_symbols as usize;

        let clock_phase = |i: usize| if i % 2 == 0 { 0.0 } else { PI };
        let last_clock = symbols.len().checked_sub(1).map_or(0.0, clock_phase);

        let mut clock_track = vec![(0.0, 0.0); lead];
        clock_track.extend((0..symbols.len()).map(|i| (clock_phase(i), amp)));
        clock_track.extend(std::iter::repeat((last_clock, 0.0)).take(lead));

        let mut data_track = vec![(0.0, amp); lead];
        data_track.extend(symbols.iter().map(|&v| (self.constellation.phase_of(v), amp)));
        data_track.extend(std::iter::repeat((0.0, amp)).take(lead));

        let total = clock_track.len() * self.config.symbol_samples();
        let transition = self.config.transition_samples() as u32;
        let hold = self.config.data_samples() as u32;
        let fs = self.config.sample_rate as f64;

        let mut carrier = WaveGenerator::new(
            self.config.band_frequency(Band::Carrier) / fs,
            move |_: &Target| Target::hold(0.0, amp),
        );
        let mut clock = WaveGenerator::new(
            self.config.band_frequency(Band::Clock) / fs,
            SymbolTrack::new(&clock_track, transition, hold),
        );
        let mut data = WaveGenerator::new(
            self.config.band_frequency(Band::Data) / fs,
            SymbolTrack::new(&data_track, transition, hold),
        );

        log::debug!(
            "Encoding {} symbols ({} lead) into {} samples",
            symbols.len(),
            lead,
            total
        );

        (0..total)
            .map(|_| carrier.step() + clock.step() + data.step())
            .collect()
    }
}
