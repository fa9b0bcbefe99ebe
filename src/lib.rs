//! Three-tone acoustic phase modem
//!
//! Sends bytes as phase shifts of an audio tone and recovers them from a
//! sampled recording. A carrier tone provides the phase reference, a clock
//! tone marks symbol boundaries, and a data tone carries the constellation
//! symbol. The receiver extracts each tone with a band-pass filter, measures
//! its phase with sliding and full-history correlators, and runs a lock state
//! machine that emits one symbol per clock edge. A Costas loop monitors the
//! carrier.
//!
//! ## Architecture (Hexagonal / Ports & Adapters)
//!
//! - `domain/` - Pure domain types, no I/O dependencies
//! - `ports/` - Trait definitions (interfaces) for external I/O
//! - `dsp/` - Signal processing (sample-at-a-time, no I/O)
//! - `modem/` - Modem protocol logic (generators, encoder, acquisition, decoder)
//! - `adapters/` - Implementations of ports (WAV via hound, raw files, memory)
//! - `commands/` - Encode/decode entry points used by the binaries

// Core domain (pure, no I/O)
pub mod domain;
pub mod dsp;
pub mod modem;
pub mod ports;

// Adapters (external I/O)
pub mod adapters;

// Driving layer
pub mod commands;

pub use domain::{ModemConfig, ModemError, ModemResult};
pub use modem::{ModemDecoder, ModemEncoder};
