//! Modem decoder: converts audio samples back to bytes
//!
//! Pipeline: samples → symbol acquisition (band-pass → correlators →
//!           lock state machine) → constellation symbols → bytes
//!
//! A carrier monitor runs alongside: the filtered carrier band goes through
//! AGC into a Costas loop, which reports the carrier's actual frequency and
//! whether it is clean enough to lock to. Symbols do not depend on it, but a
//! recording whose carrier never locks is worth a warning.

use crate::domain::{Band, ModemConfig, ModemResult, Sample, Symbol};
use crate::dsp::agc::Agc;
use crate::dsp::CostasLoop;
use crate::modem::acquisition::{AcquisitionStats, SymbolAcquisition};
use crate::modem::constellation::symbols_to_bytes;

/// Lock metric above which the carrier counts as tracked
const CARRIER_LOCK_THRESHOLD: f64 = 0.5;

/// Everything learned from decoding a recording
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeReport {
    pub symbols: Vec<Symbol>,
    pub bytes: Vec<u8>,
    /// Symbols whose phase fell between constellation points
    pub invalid_symbols: usize,
    /// Trailing symbols that did not complete a byte
    pub leftover_symbols: usize,
    /// Carrier frequency estimate from the Costas loop, Hz
    pub carrier_hz: f64,
    /// Best carrier lock metric seen
    pub carrier_lock: f64,
    pub stats: AcquisitionStats,
}

/// Samples in, symbols out
pub struct ModemDecoder {
    bits_per_symbol: u32,
    acquisition: SymbolAcquisition,
    agc: Agc,
    costas_loop: CostasLoop,
    best_lock: f64,
    symbols: Vec<Symbol>,
}

impl ModemDecoder {
    pub fn new(config: &ModemConfig) -> ModemResult<Self> {
        Ok(Self {
            bits_per_symbol: config.bits_per_symbol(),
            acquisition: SymbolAcquisition::new(config)?,
            agc: Agc::new(1.0, config.sample_rate as f64),
            costas_loop: CostasLoop::new(config.carrier_hz, config.sample_rate as f64),
            best_lock: 0.0,
            symbols: Vec::new(),
        })
    }

    /// Process a single sample. Returns `Some(symbol)` at each clock edge.
    pub fn process(&mut self, sample: Sample) -> Option<Symbol> {
        let symbol = self.acquisition.add(sample);

        let carrier = self.agc.process(self.acquisition.band_output(Band::Carrier));
        self.costas_loop.add(carrier);
        self.best_lock = self.best_lock.max(self.costas_loop.lock());

        if let Some(s) = symbol {
            self.symbols.push(s);
        }
        symbol
    }

    /// Estimated carrier frequency, Hz
    pub fn carrier_frequency(&self) -> f64 {
        self.costas_loop.freq()
    }

    /// Current carrier lock metric, 0..1
    pub fn carrier_lock(&self) -> f64 {
        self.costas_loop.lock()
    }

    /// Flush the last symbol and assemble the report
    pub fn finish(mut self) -> DecodeReport {
        if let Some(s) = self.acquisition.finish() {
            self.symbols.push(s);
        }

        let values: Vec<u32> = self.symbols.iter().map(|s| s.value).collect();
        let (bytes, leftover_symbols) = symbols_to_bytes(&values, self.bits_per_symbol);
        let invalid_symbols = self.symbols.iter().filter(|s| !s.valid).count();

        if invalid_symbols > 0 {
            log::warn!("{invalid_symbols} of {} symbols fell between constellation points", values.len());
        }
        if !self.symbols.is_empty() && self.best_lock < CARRIER_LOCK_THRESHOLD {
            log::warn!(
                "Carrier never locked (best {:.2}); symbols may be unreliable",
                self.best_lock
            );
        }
        log::info!(
            "Decoded {} symbols into {} bytes, carrier {:.1} Hz",
            values.len(),
            bytes.len(),
            self.costas_loop.freq()
        );

        DecodeReport {
            bytes,
            invalid_symbols,
            leftover_symbols,
            carrier_hz: self.costas_loop.freq(),
            carrier_lock: self.best_lock,
            stats: self.acquisition.stats(),
            symbols: self.symbols,
        }
    }

    /// Decode a complete recording
    pub fn decode(config: &ModemConfig, samples: &[Sample]) -> ModemResult<DecodeReport> {
        let mut decoder = Self::new(config)?;
        for &sample in samples {
            decoder.process(sample);
        }
        Ok(decoder.finish())
    }
}
