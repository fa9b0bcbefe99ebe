//! In-memory adapters
//!
//! Let the encode/decode commands run without touching the filesystem.

use crate::domain::{ModemResult, Recording};
use crate::ports::{PayloadSink, PayloadSource, WaveSink, WaveSource};

/// Holds one recording; reading clones it, writing replaces it
#[derive(Debug, Clone, Default)]
pub struct MemoryWave {
    pub recording: Option<Recording>,
}

impl MemoryWave {
    pub fn new(recording: Recording) -> Self {
        Self {
            recording: Some(recording),
        }
    }
}

impl WaveSource for MemoryWave {
    fn read_wave(&mut self) -> ModemResult<Recording> {
        Ok(self.recording.clone().unwrap_or_else(|| Recording::new(0, Vec::new())))
    }
}

impl WaveSink for MemoryWave {
    fn write_wave(&mut self, recording: &Recording) -> ModemResult<()> {
        self.recording = Some(recording.clone());
        Ok(())
    }
}

/// Holds a byte payload
#[derive(Debug, Clone, Default)]
pub struct MemoryPayload {
    pub bytes: Vec<u8>,
}

impl MemoryPayload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl PayloadSource for MemoryPayload {
    fn read_payload(&mut self) -> ModemResult<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

impl PayloadSink for MemoryPayload {
    fn write_payload(&mut self, bytes: &[u8]) -> ModemResult<()> {
        self.bytes = bytes.to_vec();
        Ok(())
    }
}
