//! Quadrature correlators
//!
//! Both correlators multiply the input by a locally generated sine/cosine
//! pair and accumulate the products. The phase of the accumulated vector is
//! the input's phase relative to the local oscillator; its magnitude,
//! normalized by the input energy, says how much of the input is a tone at
//! the tuned frequency.
//!
//! - [`QueueCorrelator`] keeps a sliding window of the last `N` products
//!   in a ring buffer (box-car matched filter, O(1) per sample).
//! - [`CordicIntegrator`] accumulates everything since its last reset.

use ringbuf::traits::*;
use ringbuf::HeapRb;

use super::oscillator::Oscillator;
use crate::domain::wrap_phase;

/// Normalized correlation strength: `2·(S² + C²) / (n·E)`
fn correlation_level(sin_sum: f64, cos_sum: f64, sq_sum: f64, n: f64) -> f64 {
    if n <= 0.0 || sq_sum <= f64::EPSILON {
        return 0.0;
    }
    2.0 * (sin_sum * sin_sum + cos_sum * cos_sum) / (n * sq_sum)
}

/// One sample's contribution to the running sums
#[derive(Debug, Clone, Copy, Default)]
struct Products {
    sin: f64,
    cos: f64,
    sq: f64,
}

/// Sliding-window quadrature correlator
pub struct QueueCorrelator {
    osc: Oscillator,
    window: HeapRb<Products>,
    len: usize,
    sin_sum: f64,
    cos_sum: f64,
    sq_sum: f64,
    seen: u64,
}

impl QueueCorrelator {
    /// - `len`: window length in samples
    /// - `freq`: tuned frequency in cycles per sample (Hz / fs)
    pub fn new(len: usize, freq: f64) -> Self {
        let len = len.max(1);
        Self {
            osc: Oscillator::new(freq),
            window: HeapRb::new(len),
            len,
            sin_sum: 0.0,
            cos_sum: 0.0,
            sq_sum: 0.0,
            seen: 0,
        }
    }

    pub fn add(&mut self, sample: f64) {
        let new = Products {
            sin: self.osc.real() * sample,
            cos: self.osc.imag() * sample,
            sq: sample * sample,
        };
        let old = self.window.push_overwrite(new).unwrap_or_default();

        self.sin_sum += new.sin - old.sin;
        self.cos_sum += new.cos - old.cos;
        self.sq_sum += new.sq - old.sq;
        self.seen += 1;

        self.osc.advance();
        if self.seen % self.len as u64 == 0 {
            self.osc.renormalize();
        }
    }

    /// Phase of the windowed correlation, `[0, 2π)`
    pub fn phase(&self) -> f64 {
        wrap_phase(self.sin_sum.atan2(self.cos_sum))
    }

    /// ~1 for a pure tone at the tuned frequency filling the window, ~0 for uncorrelated input
    pub fn level(&self) -> f64 {
        correlation_level(self.sin_sum, self.cos_sum, self.sq_sum, self.len as f64)
    }

    /// Input energy inside the window
    pub fn energy(&self) -> f64 {
        self.sq_sum
    }

    /// True once the window has been filled at least once
    pub fn ready(&self) -> bool {
        self.seen >= self.len as u64
    }

    /// Clear the window; the oscillator keeps its phase
    pub fn reset(&mut self) {
        self.window = HeapRb::new(self.len);
        self.sin_sum = 0.0;
        self.cos_sum = 0.0;
        self.sq_sum = 0.0;
        self.seen = 0;
    }
}

const RENORMALIZE_INTERVAL: u64 = 1 << 16;

/// Full-history quadrature correlator
#[derive(Debug, Clone)]
pub struct CordicIntegrator {
    osc: Oscillator,
    sin_sum: f64,
    cos_sum: f64,
    sq_sum: f64,
    count: u64,
    ticks: u64,
}

impl CordicIntegrator {
    /// `freq` in cycles per sample
    pub fn new(freq: f64) -> Self {
        Self {
            osc: Oscillator::new(freq),
            sin_sum: 0.0,
            cos_sum: 0.0,
            sq_sum: 0.0,
            count: 0,
            ticks: 0,
        }
    }

    /// Accumulate one sample and advance the oscillator
    pub fn add(&mut self, sample: f64) {
        self.sin_sum += self.osc.real() * sample;
        self.cos_sum += self.osc.imag() * sample;
        self.sq_sum += sample * sample;
        self.count += 1;
        self.tick();
    }

    /// Advance the oscillator without accumulating, keeping it aligned with stream time
    pub fn tick(&mut self) {
        self.osc.advance();
        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % RENORMALIZE_INTERVAL == 0 {
            self.osc.renormalize();
        }
    }

    pub fn phase(&self) -> f64 {
        wrap_phase(self.sin_sum.atan2(self.cos_sum))
    }

    pub fn level(&self) -> f64 {
        correlation_level(self.sin_sum, self.cos_sum, self.sq_sum, self.count as f64)
    }

    /// Samples accumulated since the last reset
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Clear the sums; the oscillator keeps running
    pub fn reset(&mut self) {
        self.sin_sum = 0.0;
        self.cos_sum = 0.0;
        self.sq_sum = 0.0;
        self.count = 0;
    }
}
