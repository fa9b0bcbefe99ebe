//! Three-tone phase modem
//!
//! Tone generation, constellation mapping, encoding, symbol acquisition
//! and decoding.

pub mod acquisition;
pub mod constellation;
pub mod decoder;
pub mod encoder;
pub mod generator;

pub use acquisition::{AcquisitionStats, SymbolAcquisition};
pub use constellation::Constellation;
pub use decoder::{DecodeReport, ModemDecoder};
pub use encoder::ModemEncoder;
pub use generator::{SymbolTrack, Target, TargetSource, WaveGenerator};
