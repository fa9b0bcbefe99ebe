//! Loop integrator
//!
//! Trapezoidal accumulator used as the Costas loop's VCO phase ramp and as
//! its integral term. The running sum is held as an unevaluated pair of
//! doubles (hi + lo, Knuth two-sum) so the phase ramp keeps roughly twice
//! the mantissa of the samples it integrates.

/// Double-double accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Compensated {
    hi: f64,
    lo: f64,
}

impl Compensated {
    pub fn new(value: f64) -> Self {
        Self { hi: value, lo: 0.0 }
    }

    /// Add `x`, carrying the rounding error into the low word
    #[inline]
    pub fn add(&mut self, x: f64) {
        let s = self.hi + x;
        let bp = s - self.hi;
        let err = (self.hi - (s - bp)) + (x - bp);
        let lo = self.lo + err;
        // renormalize so |lo| stays below one ulp of hi
        self.hi = s + lo;
        self.lo = lo - (self.hi - s);
    }

    /// Value rounded to a single double
    #[inline]
    pub fn value(&self) -> f64 {
        self.hi + self.lo
    }
}

/// `out = in + sum; sum = in + out; return out / (2·fs)`
#[derive(Debug, Clone)]
pub struct LoopIntegrator {
    sum: Compensated,
    two_fs: f64,
}

impl LoopIntegrator {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sum: Compensated::default(),
            two_fs: 2.0 * sample_rate,
        }
    }

    pub fn add(&mut self, input: f64) -> f64 {
        let mut out = self.sum;
        out.add(input);
        self.sum.add(2.0 * input);
        out.value() / self.two_fs
    }

    pub fn value(&self) -> f64 {
        self.sum.value() / self.two_fs
    }

    /// Shift the accumulated value by `delta` output units
    pub fn offset(&mut self, delta: f64) {
        self.sum.add(delta * self.two_fs);
    }

    pub fn reset(&mut self) {
        self.sum = Compensated::default();
    }
}
