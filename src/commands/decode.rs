//! Decode command: recording → payload bytes

use std::path::Path;

use crate::adapters::{RawFile, WavFile};
use crate::domain::{Band, ModemConfig, ModemError, ModemResult, Sample};
use crate::dsp::Spectrum;
use crate::modem::{DecodeReport, ModemDecoder};
use crate::ports::{PayloadSink, WaveSource};

const PROBE_FFT_SIZE: usize = 8192;

/// Log the strongest tones in the opening stretch of a recording
fn probe_tones(samples: &[Sample], config: &ModemConfig) {
    if samples.is_empty() {
        return;
    }
    let spectrum = Spectrum::new(PROBE_FFT_SIZE);
    let fs = config.sample_rate as f64;
    let peaks = spectrum.peak_frequencies(samples, fs, 3);
    log::debug!("Strongest tones: {peaks:.1?} Hz");

    let carrier = config.band_frequency(Band::Carrier);
    if !peaks.iter().any(|f| (f - carrier).abs() <= config.band_width_hz) {
        log::warn!("No tone near the {carrier:.0} Hz carrier; is the recording a modem signal?");
    }
}

/// Read a recording, demodulate it and write the recovered bytes.
///
/// The configuration's timing is in carrier cycles, so a recording at a
/// different sample rate is decoded by retargeting the configuration.
pub fn decode_recording(
    source: &mut impl WaveSource,
    sink: &mut impl PayloadSink,
    config: &ModemConfig,
) -> ModemResult<DecodeReport> {
    let recording = source.read_wave()?;

    let mut config = config.clone();
    if recording.sample_rate != config.sample_rate {
        log::info!(
            "Recording is at {} Hz, configuration expects {} Hz; following the recording",
            recording.sample_rate,
            config.sample_rate
        );
        config.sample_rate = recording.sample_rate;
    }
    config.validate()?;

    probe_tones(&recording.samples, &config);
    let report = ModemDecoder::decode(&config, &recording.samples)?;

    if report.leftover_symbols != 0 {
        return Err(ModemError::Processing(format!(
            "{} symbols decoded, {} left over after packing bytes",
            report.symbols.len(),
            report.leftover_symbols
        )));
    }

    sink.write_payload(&report.bytes)?;
    Ok(report)
}

/// Decode the WAV file `input` into the raw file `output`
pub fn run_decode(input: &Path, output: &Path, config: &ModemConfig) -> ModemResult<DecodeReport> {
    decode_recording(&mut WavFile::new(input), &mut RawFile::new(output), config)
}
