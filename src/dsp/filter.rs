//! Recursive filters built from second-order sections
//!
//! - [`RcLowPass`]: single real pole, used to smooth slow metrics
//! - [`BiquadLowPass`]: two-pole cookbook low-pass for loop arm filtering
//! - [`BandPassFilter`]: even-order band-pass cascade for tone extraction
//!
//! Every filter is driven one sample at a time with `add()` and keeps
//! only a fixed amount of history.

use std::f64::consts::PI;

use crate::domain::MAX_FILTER_ORDER;

/// Single-pole RC low-pass: `y = (x + τfs·y') / (1 + τfs)`
#[derive(Debug, Clone)]
pub struct RcLowPass {
    tau_fs: f64,
    last: f64,
}

impl RcLowPass {
    /// - `tau`: time constant in seconds
    /// - `sample_rate`: Hz
    pub fn new(tau: f64, sample_rate: f64) -> Self {
        Self {
            tau_fs: tau * sample_rate,
            last: 0.0,
        }
    }

    pub fn add(&mut self, x: f64) -> f64 {
        self.last = (x + self.tau_fs * self.last) / (1.0 + self.tau_fs);
        self.last
    }

    pub fn value(&self) -> f64 {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = 0.0;
    }
}

/// One second-order section with `a[0] == 1`.
///
/// `y = b0·x + b1·x[-1] + b2·x[-2] - a1·y[-1] - a2·y[-2]`
#[derive(Debug, Clone)]
pub struct Sos {
    a: [f64; 3],
    b: [f64; 3],
    x: [f64; 2],
    y: [f64; 2],
}

impl Sos {
    /// Build a section from raw coefficients, normalizing by `a[0]`
    pub fn new(a: [f64; 3], b: [f64; 3]) -> Self {
        let a0 = a[0];
        Self {
            a: [1.0, a[1] / a0, a[2] / a0],
            b: [b[0] / a0, b[1] / a0, b[2] / a0],
            x: [0.0; 2],
            y: [0.0; 2],
        }
    }

    /// Band-pass section from the analog prototype `A·s / (s² + B·s + C)`
    /// mapped through the bilinear substitution `s = D·(z-1)/(z+1)`.
    fn band_pass(va: f64, vb: f64, vc: f64, vd: f64) -> Self {
        let d2 = vd * vd;
        Self::new(
            [d2 + vb * vd + vc, 2.0 * vc - 2.0 * d2, d2 - vb * vd + vc],
            [va * vd, 0.0, -va * vd],
        )
    }

    #[inline]
    pub fn add(&mut self, x: f64) -> f64 {
        let y = self.b[0] * x + self.b[1] * self.x[0] + self.b[2] * self.x[1]
            - self.a[1] * self.y[0]
            - self.a[2] * self.y[1];
        self.x = [x, self.x[0]];
        self.y = [y, self.y[0]];
        y
    }

    /// Last output
    pub fn value(&self) -> f64 {
        self.y[0]
    }

    pub fn reset(&mut self) {
        self.x = [0.0; 2];
        self.y = [0.0; 2];
    }

    pub fn coefficients(&self) -> ([f64; 3], [f64; 3]) {
        (self.a, self.b)
    }
}

/// Two-pole low-pass from the audio-EQ cookbook
#[derive(Debug, Clone)]
pub struct BiquadLowPass {
    section: Sos,
}

impl BiquadLowPass {
    /// - `q`: quality factor (1/√2 for a Butterworth response)
    /// - `cutoff`: -3 dB frequency in Hz
    /// - `sample_rate`: Hz
    pub fn new(q: f64, cutoff: f64, sample_rate: f64) -> Self {
        let w = 2.0 * PI * cutoff / sample_rate;
        let cs = w.cos();
        let alpha = w.sin() / (2.0 * q);
        let b1 = 1.0 - cs;
        Self {
            section: Sos::new([1.0 + alpha, -2.0 * cs, 1.0 - alpha], [b1 / 2.0, b1, b1 / 2.0]),
        }
    }

    pub fn add(&mut self, x: f64) -> f64 {
        self.section.add(x)
    }

    pub fn value(&self) -> f64 {
        self.section.value()
    }

    pub fn reset(&mut self) {
        self.section.reset();
    }
}

/// Low-pass pole quality factors for Butterworth prototypes of order
/// 2, 4, .. 16, one entry per conjugate pole pair.
///
/// Each low-pass pole pair becomes two band-pass sections, so a row with
/// `n` entries yields a cascade of `2n` sections.
pub const POLE_TABLE: [&[f64]; 8] = [
    &[0.71],
    &[0.54, 1.31],
    &[0.52, 0.71, 1.93],
    &[0.51, 0.60, 0.90, 2.56],
    &[0.51, 0.56, 0.71, 1.10, 3.20],
    &[0.50, 0.54, 0.63, 0.82, 1.31, 3.83],
    &[0.50, 0.53, 0.59, 0.71, 0.94, 1.51, 4.47],
    &[0.50, 0.52, 0.57, 0.65, 0.79, 1.06, 1.72, 5.10],
];

/// Pre-warp a frequency for the bilinear transform
fn warp(freq: f64, sample_rate: f64) -> f64 {
    2.0 * sample_rate * (PI * freq / sample_rate).tan()
}

/// Even-order band-pass built from cascaded second-order sections.
///
/// Unity gain and zero phase at the centre frequency.
#[derive(Debug, Clone)]
pub struct BandPassFilter {
    sections: Vec<Sos>,
}

impl BandPassFilter {
    /// Clamp a requested order into the range the pole table covers.
    ///
    /// Odd or sub-2 orders become 2; orders above the table become the
    /// largest even order available.
    pub fn effective_order(order: usize) -> usize {
        if order % 2 != 0 || order < 2 {
            2
        } else {
            order.min(MAX_FILTER_ORDER)
        }
    }

    /// - `sample_rate`: Hz
    /// - `center`: centre frequency in Hz
    /// - `bandwidth`: width of the pass band in Hz
    /// - `order`: number of second-order sections (even, 2..=16)
    pub fn new(sample_rate: f64, center: f64, bandwidth: f64, order: usize) -> Self {
        let effective = Self::effective_order(order);
        if effective != order {
            log::warn!("Band-pass order {order} unsupported, using {effective}");
        }

        let wc = warp(center, sample_rate);
        let w1 = warp(center - bandwidth / 2.0, sample_rate);
        let w2 = warp(center + bandwidth / 2.0, sample_rate);
        let q_bp = wc / (w2 - w1);
        let d = 2.0 * sample_rate;

        let mut sections = Vec::with_capacity(effective);
        for &q_lp in POLE_TABLE[effective / 2 - 1] {
            let a = 1.0 / q_lp;
            let b = 1.0;
            let t = 2.0 * q_bp / a + b / (2.0 * a * q_bp);
            let q = (q_bp / a * (t + (t * t - 1.0).sqrt())).sqrt();
            let wo1 = a * q / (2.0 * q_bp) + 0.5 * (b / (q_bp * q_bp) - 1.0 / (q * q)).sqrt();
            let wo2 = 1.0 / wo1;

            for wo in [wo1, wo2] {
                sections.push(Sos::band_pass(wc / q_bp, wo / q * wc, wo * wo * wc * wc, d));
            }
        }

        Self { sections }
    }

    /// Push one sample through every section in order
    pub fn add(&mut self, sig: f64) -> f64 {
        self.sections.iter_mut().fold(sig, |x, s| s.add(x))
    }

    /// Last output of the final section
    pub fn value(&self) -> f64 {
        self.sections.last().map_or(0.0, Sos::value)
    }

    pub fn reset(&mut self) {
        self.sections.iter_mut().for_each(Sos::reset);
    }

    pub fn order(&self) -> usize {
        self.sections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f64 = 48000.0;

    /// Peak output over the second half of a one second tone
    fn steady_peak(mut filter: impl FnMut(f64) -> f64, freq: f64) -> f64 {
        let mut peak = 0.0f64;
        for n in 0..48000 {
            let x = (2.0 * PI * freq * n as f64 / FS).sin();
            let y = filter(x);
            if n > 24000 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn test_rc_lowpass_converges_to_dc() {
        let mut rc = RcLowPass::new(0.01, FS);
        for _ in 0..10 * 480 {
            rc.add(1.0);
        }
        assert!((rc.value() - 1.0).abs() < 1e-3, "RC should settle at DC, got {}", rc.value());
        rc.reset();
        assert_eq!(rc.value(), 0.0);
    }

    #[test]
    fn test_biquad_passes_dc_and_rejects_high_frequency() {
        let mut lp = BiquadLowPass::new(std::f64::consts::FRAC_1_SQRT_2, 100.0, FS);
        let mut out = 0.0;
        for _ in 0..5000 {
            out = lp.add(1.0);
        }
        assert!((out - 1.0).abs() < 1e-6, "DC gain should be unity, got {out}");

        let mut lp = BiquadLowPass::new(std::f64::consts::FRAC_1_SQRT_2, 100.0, FS);
        let peak = steady_peak(|x| lp.add(x), 5000.0);
        assert!(peak < 0.001, "5 kHz should be rejected by a 100 Hz low-pass, got {peak}");
    }

    #[test]
    fn test_biquad_half_power_at_cutoff() {
        let mut lp = BiquadLowPass::new(std::f64::consts::FRAC_1_SQRT_2, 1000.0, FS);
        let peak = steady_peak(|x| lp.add(x), 1000.0);
        assert!((peak - 0.7071).abs() < 0.01, "cutoff gain should be -3 dB, got {peak}");
    }

    #[test]
    fn test_sos_normalizes_a0() {
        let sos = Sos::new([2.0, 1.0, 0.5], [4.0, 2.0, 0.0]);
        let (a, b) = sos.coefficients();
        assert_eq!(a, [1.0, 0.5, 0.25]);
        assert_eq!(b, [2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_bandpass_unity_at_center() {
        for order in [2, 4, 8, 16] {
            let mut bp = BandPassFilter::new(FS, 1000.0, 200.0, order);
            let peak = steady_peak(|x| bp.add(x), 1000.0);
            assert!(
                (peak - 1.0).abs() < 0.03,
                "order {order}: centre gain should be ~1, got {peak}"
            );
        }
    }

    #[test]
    fn test_bandpass_rejects_three_bandwidths_away() {
        for order in [2, 4, 8] {
            for freq in [400.0, 1600.0] {
                let mut bp = BandPassFilter::new(FS, 1000.0, 200.0, order);
                let peak = steady_peak(|x| bp.add(x), freq);
                assert!(peak < 0.1, "order {order}: {freq} Hz leaked through at {peak}");
            }
        }
    }

    #[test]
    fn test_higher_order_is_more_selective() {
        let mut low = BandPassFilter::new(FS, 1000.0, 200.0, 2);
        let mut high = BandPassFilter::new(FS, 1000.0, 200.0, 4);
        let low_peak = steady_peak(|x| low.add(x), 1400.0);
        let high_peak = steady_peak(|x| high.add(x), 1400.0);
        assert!(high_peak < low_peak, "order 4 ({high_peak}) should beat order 2 ({low_peak})");
    }

    #[test]
    fn test_bandpass_order_clamping() {
        assert_eq!(BandPassFilter::new(FS, 1000.0, 200.0, 3).order(), 2);
        assert_eq!(BandPassFilter::new(FS, 1000.0, 200.0, 0).order(), 2);
        assert_eq!(BandPassFilter::new(FS, 1000.0, 200.0, 6).order(), 6);
        assert_eq!(BandPassFilter::new(FS, 1000.0, 200.0, 40).order(), 16);
    }

    #[test]
    fn test_bandpass_value_and_reset() {
        let mut bp = BandPassFilter::new(FS, 1000.0, 200.0, 4);
        let mut last = 0.0;
        for n in 0..500 {
            last = bp.add((2.0 * PI * 1000.0 * n as f64 / FS).sin());
        }
        assert_eq!(bp.value(), last);
        bp.reset();
        assert_eq!(bp.value(), 0.0);
        assert_eq!(bp.add(0.0), 0.0);
    }
}
