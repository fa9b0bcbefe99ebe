//! Symbol acquisition state machine
//!
//! Each band (carrier, clock, data) is isolated with a band-pass filter and
//! watched by two sliding correlators: a slow one spanning a full symbol
//! transition and a fast one spanning half of it. While the tones are
//! steady both windows see clean sinusoids; during a transition the phase
//! glide smears the correlation and the fast window notices first.
//!
//! The combined metric `min(level(clock), level(data)) / level(carrier)`
//! drives a two-state machine with hysteresis:
//!
//! - UNLOCKED → LOCKED once the slow metric clears `lock_high`, the fast
//!   metric agrees without overshooting it, the clock and data bands carry
//!   real energy, and the carrier has been steady for a whole symbol. After
//!   every loss of lock the slow metric must first fall below `lock_low`.
//! - LOCKED → UNLOCKED when the fast metric drops below `unlock_fraction` of
//!   the best lock seen, or of the metric over the whole locked stretch.
//!
//! While locked, full-history integrators collect each band. Their input
//! runs through a delay line one fast window long, so the stretch they
//! integrate ends before the glide that triggered the unlock.
//!
//! # Phase references
//!
//! Every correlator's oscillator counts from the first sample of the
//! stream, so a recording that starts `D` samples late shifts each band's
//! phase by `2π·f·D/fs`. Two readings cancel that shift:
//!
//! - Data: the tones are equally spaced, so `2·clock − carrier − data` has
//!   zero net frequency. Its phase is the data phase (the clock's 0/π flip
//!   doubles to a whole turn) no matter where the stream started.
//! - Clock: the carrier/clock difference is read relative to a reference.
//!   The first lock of a transmission defines LOW (the first payload symbol
//!   always has clock phase 0) and every readable lock re-anchors the
//!   reference, which follows slow drift between the two sound cards.
//!
//! The clock state is read only at lock-in. Every symbol boundary glides
//! the clock by π, which dips the fast metric and forces an unlock, so each
//! symbol is a fresh lock and no edge can pass inside a locked stretch.

use std::f64::consts::PI;

use ringbuf::traits::*;
use ringbuf::HeapRb;

use crate::domain::{
    wrap_phase, Band, ClockState, LockState, ModemConfig, ModemResult, Sample, Symbol,
};
use crate::dsp::{BandPassFilter, CordicIntegrator, QueueCorrelator};
use crate::modem::constellation::Constellation;

/// Lock-in is refused when the fast metric overshoots the slow one by more than this
const FAST_CEILING: f64 = 1.1;

/// Per-band signal chain
struct BandTracker {
    filter: BandPassFilter,
    slow: QueueCorrelator,
    fast: QueueCorrelator,
    history: CordicIntegrator,
}

impl BandTracker {
    fn new(config: &ModemConfig, band: Band) -> Self {
        let fs = config.sample_rate as f64;
        let freq = config.band_frequency(band);
        let norm = freq / fs;
        Self {
            filter: BandPassFilter::new(fs, freq, config.band_width_hz, config.filter_order),
            slow: QueueCorrelator::new(config.transition_samples(), norm),
            fast: QueueCorrelator::new(config.fast_window(), norm),
            history: CordicIntegrator::new(norm),
        }
    }
}

/// `min(clock, data) / carrier`, zero without carrier
fn combined(carrier: f64, clock: f64, data: f64) -> f64 {
    if carrier > 0.0 {
        clock.min(data) / carrier
    } else {
        0.0
    }
}

/// Counters describing an acquisition run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcquisitionStats {
    /// UNLOCKED → LOCKED transitions
    pub lock_events: u64,
    /// Symbols emitted
    pub symbols: u64,
    /// Stretches discarded because the clock state was unreadable
    pub dropped: u64,
}

/// Turns a sample stream into constellation symbols
pub struct SymbolAcquisition {
    bands: [BandTracker; 3],
    /// Symbol-long carrier correlator; gates acquisition on a steady carrier
    presence: QueueCorrelator,
    /// Filtered samples on their way to the history integrators
    history_delay: HeapRb<[Sample; 3]>,
    constellation: Constellation,
    lock_high: f64,
    lock_low: f64,
    unlock_fraction: f64,
    squelch_ratio: f64,
    fast_window: u64,

    state: LockState,
    armed: bool,
    max_lock: f64,
    lock_started: u64,
    pending: Option<ClockState>,
    /// Carrier/clock difference that reads as LOW
    clock_reference: Option<f64>,
    sample_index: u64,
    stats: AcquisitionStats,
}

impl SymbolAcquisition {
    pub fn new(config: &ModemConfig) -> ModemResult<Self> {
        config.validate()?;
        let fs = config.sample_rate as f64;
        Ok(Self {
            bands: Band::ALL.map(|band| BandTracker::new(config, band)),
            presence: QueueCorrelator::new(
                config.symbol_samples(),
                config.band_frequency(Band::Carrier) / fs,
            ),
            history_delay: HeapRb::new(config.fast_window()),
            constellation: Constellation::new(config.num_phases),
            lock_high: config.lock_high,
            lock_low: config.lock_low,
            unlock_fraction: config.unlock_fraction,
            squelch_ratio: config.squelch_ratio,
            fast_window: config.fast_window() as u64,
            state: LockState::Unlocked,
            armed: true,
            max_lock: 0.0,
            lock_started: 0,
            pending: None,
            clock_reference: None,
            sample_index: 0,
            stats: AcquisitionStats::default(),
        })
    }

    fn band(&self, band: Band) -> &BandTracker {
        &self.bands[band.index()]
    }

    fn slow_metric(&self) -> f64 {
        let [c, k, d] = &self.bands;
        combined(c.slow.level(), k.slow.level(), d.slow.level())
    }

    fn fast_metric(&self) -> f64 {
        let [c, k, d] = &self.bands;
        combined(c.fast.level(), k.fast.level(), d.fast.level())
    }

    fn history_metric(&self) -> f64 {
        let [c, k, d] = &self.bands;
        combined(c.history.level(), k.history.level(), d.history.level())
    }

    /// Clock and data band energy relative to the carrier band
    fn energy_ratio(&self) -> f64 {
        let [c, k, d] = &self.bands;
        let carrier = c.slow.energy();
        if carrier > 0.0 {
            k.slow.energy().min(d.slow.energy()) / carrier
        } else {
            0.0
        }
    }

    /// Process one sample; returns a symbol when a clock edge completes one
    pub fn add(&mut self, sample: Sample) -> Option<Symbol> {
        let index = self.sample_index;
        self.sample_index += 1;

        let mut filtered = [0.0; 3];
        for (tracker, out) in self.bands.iter_mut().zip(filtered.iter_mut()) {
            *out = tracker.filter.add(sample);
            tracker.slow.add(*out);
            tracker.fast.add(*out);
        }
        self.presence.add(filtered[Band::Carrier.index()]);
        // zeros until the line has filled once
        let delayed = self.history_delay.push_overwrite(filtered).unwrap_or_default();

        // metrics are meaningless until the slow windows hold a full transition
        let mut emitted = None;
        if self.band(Band::Carrier).slow.ready() {
            let slow = self.slow_metric();
            let fast = self.fast_metric();
            emitted = match self.state {
                LockState::Unlocked => self.try_lock(index, slow, fast),
                LockState::Locked => {
                    self.track_lock(index, slow, fast);
                    None
                }
            };
        }

        // unlocked integrators still tick so their phase stays referenced to the stream
        let locked = self.state == LockState::Locked;
        for (tracker, &out) in self.bands.iter_mut().zip(delayed.iter()) {
            if locked {
                tracker.history.add(out);
            } else {
                tracker.history.tick();
            }
        }

        emitted
    }

    fn try_lock(&mut self, index: u64, slow: f64, fast: f64) -> Option<Symbol> {
        // after an unlock the metric has to fall back through lock_low first,
        // otherwise the tail of one symbol would re-lock on its own glide
        if !self.armed {
            if slow < self.lock_low {
                self.armed = true;
            }
            return None;
        }
        if slow <= self.lock_high || fast < slow || fast >= FAST_CEILING * slow {
            return None;
        }
        // squelch: clock and data must carry energy comparable to the carrier
        if self.energy_ratio() < self.squelch_ratio {
            return None;
        }
        // band-limited noise can look tone-like over a transition window, but
        // never holds a steady carrier for a whole symbol
        if self.presence.level() <= self.lock_high {
            return None;
        }

        self.state = LockState::Locked;
        self.max_lock = slow;
        self.lock_started = index;
        self.stats.lock_events += 1;

        let diff = self.band(Band::Carrier).slow.phase() - self.band(Band::Clock).slow.phase();
        let clock = match self.clock_reference {
            Some(reference) => ClockState::from_phase_difference(wrap_phase(diff - reference)),
            None => ClockState::Low,
        };
        log::debug!("Lock at sample {index}: metric {slow:.3}, clock {clock:?}");

        // re-anchor so slow drift never accumulates across symbols
        match clock {
            ClockState::Low => self.clock_reference = Some(wrap_phase(diff)),
            ClockState::High => self.clock_reference = Some(wrap_phase(diff - PI)),
            ClockState::Invalid => {}
        }

        // same clock state: the previous lock was a dropout inside one symbol
        if self.pending == Some(clock) {
            return None;
        }
        let symbol = self.commit();
        self.pending = Some(clock);
        symbol
    }

    fn track_lock(&mut self, index: u64, slow: f64, fast: f64) {
        self.max_lock = self.max_lock.max(slow);
        let mut reference = self.unlock_fraction * self.max_lock;
        // the whole-stretch metric is noisy until it has seen a fast window
        if self.band(Band::Carrier).history.count() >= self.fast_window {
            reference = reference.max(self.unlock_fraction * self.history_metric());
        }
        if fast < reference {
            log::debug!(
                "Unlock at sample {index} after {} samples: fast {fast:.3} < {reference:.3}",
                index - self.lock_started
            );
            self.state = LockState::Unlocked;
            self.armed = false;
        }
    }

    /// Read out the accumulated symbol (if any) and restart the integrators
    fn commit(&mut self) -> Option<Symbol> {
        let samples = self.band(Band::Carrier).history.count();
        let symbol = match self.pending {
            Some(clock) if clock.is_valid() && samples > 0 => {
                let [c, k, d] = &self.bands;
                let phase =
                    wrap_phase(2.0 * k.history.phase() - c.history.phase() - d.history.phase());
                let (value, valid) = self.constellation.demap(phase);
                self.stats.symbols += 1;
                log::debug!(
                    "Symbol {value} ({:.1}°, {samples} samples){}",
                    phase.to_degrees(),
                    if valid { "" } else { " marked invalid" }
                );
                Some(Symbol {
                    value,
                    valid,
                    phase,
                    samples,
                })
            }
            Some(_) if samples > 0 => {
                self.stats.dropped += 1;
                log::debug!("Dropping {samples} samples accumulated without a readable clock");
                None
            }
            _ => None,
        };
        for tracker in self.bands.iter_mut() {
            tracker.history.reset();
        }
        symbol
    }

    /// Flush the symbol still being accumulated at end of stream.
    ///
    /// The next lock starts a new transmission with a fresh clock reference.
    pub fn finish(&mut self) -> Option<Symbol> {
        let symbol = self.commit();
        self.pending = None;
        self.clock_reference = None;
        symbol
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn stats(&self) -> AcquisitionStats {
        self.stats
    }

    /// Latest band-pass output for a band
    pub fn band_output(&self, band: Band) -> f64 {
        self.band(band).filter.value()
    }
}
