//! Spectrum probe
//!
//! Windowed FFT over a block of samples, used to report which tones a
//! recording actually contains before it is decoded.

use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// FFT processor for computing magnitude spectra
pub struct Spectrum {
    fft: Arc<dyn Fft<f64>>,
    fft_size: usize,
    window: Vec<f64>,
}

impl Spectrum {
    /// Create a processor with the given FFT size
    pub fn new(fft_size: usize) -> Self {
        let fft_size = fft_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Hann window
        let window = (0..fft_size)
            .map(|i| {
                let x = std::f64::consts::PI * i as f64 / fft_size as f64;
                0.5 * (1.0 - (2.0 * x).cos())
            })
            .collect();

        Self {
            fft,
            fft_size,
            window,
        }
    }

    /// Linear magnitudes of the positive-frequency bins.
    ///
    /// Uses the first `fft_size` samples, zero-padding short input.
    pub fn magnitudes(&self, samples: &[f64]) -> Vec<f64> {
        let mut buffer: Vec<Complex<f64>> = samples
            .iter()
            .take(self.fft_size)
            .zip(self.window.iter())
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();
        buffer.resize(self.fft_size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer[..self.fft_size / 2].iter().map(|c| c.norm()).collect()
    }

    /// Frequencies (Hz) of the `count` strongest local maxima, strongest first
    pub fn peak_frequencies(&self, samples: &[f64], sample_rate: f64, count: usize) -> Vec<f64> {
        let mags = self.magnitudes(samples);
        let mut peaks: Vec<(usize, f64)> = (1..mags.len().saturating_sub(1))
            .filter(|&i| mags[i] > mags[i - 1] && mags[i] >= mags[i + 1])
            .map(|i| (i, mags[i]))
            .collect();
        peaks.sort_by(|a, b| b.1.total_cmp(&a.1));
        peaks
            .into_iter()
            .take(count)
            .map(|(i, _)| self.bin_frequency(i, sample_rate))
            .collect()
    }

    /// Centre frequency of an FFT bin
    fn bin_frequency(&self, bin: usize, sample_rate: f64) -> f64 {
        bin as f64 * sample_rate / self.fft_size as f64
    }
}
