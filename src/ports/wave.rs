//! Recording port traits

use crate::domain::{ModemResult, Recording};

/// Somewhere a recording can be read from
pub trait WaveSource {
    fn read_wave(&mut self) -> ModemResult<Recording>;
}

/// Somewhere a recording can be written to
pub trait WaveSink {
    fn write_wave(&mut self, recording: &Recording) -> ModemResult<()>;
}
