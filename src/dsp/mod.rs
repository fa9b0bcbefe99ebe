//! Digital Signal Processing
//!
//! Sample-at-a-time numeric building blocks. No I/O, no allocation after
//! construction (except the spectrum probe), and no failure modes: every
//! `add()` is a total function over real inputs.

pub mod agc;
pub mod correlator;
pub mod costas_loop;
pub mod filter;
pub mod integrator;
pub mod lock_detector;
pub mod oscillator;
pub mod spectrum;

// Re-export commonly used items
pub use correlator::{CordicIntegrator, QueueCorrelator};
pub use costas_loop::{CostasLoop, CostasParams};
pub use filter::{BandPassFilter, BiquadLowPass, RcLowPass};
pub use integrator::LoopIntegrator;
pub use lock_detector::LockDetector;
pub use oscillator::Oscillator;
pub use spectrum::Spectrum;
