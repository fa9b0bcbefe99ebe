//! Encode command: payload bytes → recording

use std::path::Path;

use crate::adapters::{RawFile, WavFile};
use crate::domain::{ModemConfig, ModemResult, Recording};
use crate::modem::ModemEncoder;
use crate::ports::{PayloadSource, WaveSink};

/// Read a payload, modulate it and write the recording.
///
/// Returns the number of samples written.
pub fn encode_payload(
    source: &mut impl PayloadSource,
    sink: &mut impl WaveSink,
    config: &ModemConfig,
) -> ModemResult<usize> {
    let encoder = ModemEncoder::new(config)?;
    let payload = source.read_payload()?;

    let samples = encoder.encode(&payload);
    let recording = Recording::new(config.sample_rate, samples);
    log::info!(
        "Encoded {} bytes into {:.2} s of audio",
        payload.len(),
        recording.duration()
    );

    sink.write_wave(&recording)?;
    Ok(recording.samples.len())
}

/// Encode the raw file `input` into the WAV file `output`
pub fn run_encode(input: &Path, output: &Path, config: &ModemConfig) -> ModemResult<usize> {
    encode_payload(&mut RawFile::new(input), &mut WavFile::new(output), config)
}
