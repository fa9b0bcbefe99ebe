//! Adapters: implementations of the port traits

pub mod memory;
pub mod raw_file;
pub mod wav_file;

pub use memory::{MemoryPayload, MemoryWave};
pub use raw_file::RawFile;
pub use wav_file::WavFile;
