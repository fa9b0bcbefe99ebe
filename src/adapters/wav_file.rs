//! WAV file adapter backed by hound
//!
//! Only mono 16-bit integer PCM is accepted. hound writes the canonical
//! 44-byte RIFF/WAVE header for this layout.

use std::io;
use std::path::PathBuf;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::domain::{ModemError, ModemResult, Recording, Sample};
use crate::ports::{WaveSink, WaveSource};

const BITS_PER_SAMPLE: u16 = 16;
const FULL_SCALE_IN: f64 = 32768.0;
const FULL_SCALE_OUT: f64 = 32767.0;

/// A WAV file on disk
pub struct WavFile {
    path: PathBuf,
}

impl WavFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_error(&self, err: hound::Error) -> ModemError {
        match err {
            hound::Error::IoError(source) => ModemError::Input {
                path: self.path.clone(),
                source,
            },
            other => ModemError::Format(format!("{}: {other}", self.path.display())),
        }
    }

    fn write_error(&self, err: hound::Error) -> ModemError {
        let source = match err {
            hound::Error::IoError(source) => source,
            other => io::Error::other(other.to_string()),
        };
        ModemError::Output {
            path: self.path.clone(),
            source,
        }
    }
}

/// Convert to 16-bit PCM, clamping out-of-range samples
pub fn to_pcm(sample: Sample) -> i16 {
    (sample * FULL_SCALE_OUT).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

pub fn from_pcm(sample: i16) -> Sample {
    sample as f64 / FULL_SCALE_IN
}

impl WaveSource for WavFile {
    fn read_wave(&mut self) -> ModemResult<Recording> {
        let reader = WavReader::open(&self.path).map_err(|e| self.read_error(e))?;
        let spec = reader.spec();

        if spec.channels != 1 {
            return Err(ModemError::Format(format!(
                "{}: {} channels, only mono is supported",
                self.path.display(),
                spec.channels
            )));
        }
        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != BITS_PER_SAMPLE {
            return Err(ModemError::Format(format!(
                "{}: {}-bit {:?} samples, only 16-bit PCM is supported",
                self.path.display(),
                spec.bits_per_sample,
                spec.sample_format
            )));
        }

        let samples = reader
            .into_samples::<i16>()
            .map(|s| s.map(from_pcm))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.read_error(e))?;

        log::debug!(
            "Read {} samples at {} Hz from {}",
            samples.len(),
            spec.sample_rate,
            self.path.display()
        );
        Ok(Recording::new(spec.sample_rate, samples))
    }
}

impl WaveSink for WavFile {
    fn write_wave(&mut self, recording: &Recording) -> ModemResult<()> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: recording.sample_rate,
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&self.path, spec).map_err(|e| self.write_error(e))?;

        let clipped = recording.samples.iter().filter(|s| s.abs() > 1.0).count();
        if clipped > 0 {
            log::warn!("{clipped} samples clipped while writing {}", self.path.display());
        }
        for &sample in &recording.samples {
            writer.write_sample(to_pcm(sample)).map_err(|e| self.write_error(e))?;
        }
        writer.finalize().map_err(|e| self.write_error(e))?;

        log::debug!(
            "Wrote {} samples at {} Hz to {}",
            recording.samples.len(),
            recording.sample_rate,
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut wav = WavFile::new(dir.path().join("tone.wav"));
        let samples: Vec<f64> = (0..4800)
            .map(|n| 0.5 * (std::f64::consts::TAU * 1000.0 * n as f64 / 48000.0).sin())
            .collect();

        wav.write_wave(&Recording::new(48000, samples.clone())).unwrap();
        let back = wav.read_wave().unwrap();

        assert_eq!(back.sample_rate, 48000);
        assert_eq!(back.samples.len(), samples.len());
        for (a, b) in samples.iter().zip(&back.samples) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn test_header_is_44_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.wav");
        WavFile::new(&path)
            .write_wave(&Recording::new(8000, vec![0.0; 10]))
            .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 44 + 20);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[36..40], b"data");
    }

    #[test]
    fn test_stereo_rejected_as_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..20 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let err = WavFile::new(&path).read_wave().unwrap_err();
        assert!(matches!(err, ModemError::Format(_)), "got {err:?}");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_garbage_rejected_as_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"this is not a riff file at all, not even close").unwrap();
        let err = WavFile::new(&path).read_wave().unwrap_err();
        assert!(matches!(err, ModemError::Format(_)), "got {err:?}");
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = WavFile::new(dir.path().join("absent.wav")).read_wave().unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_unwritable_path_is_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut wav = WavFile::new(dir.path().join("no/such/dir/out.wav"));
        let err = wav.write_wave(&Recording::new(48000, vec![0.0; 4])).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_pcm_conversion_clamps() {
        assert_eq!(to_pcm(2.0), i16::MAX);
        assert_eq!(to_pcm(-2.0), i16::MIN);
        assert_eq!(to_pcm(0.0), 0);
        assert_eq!(from_pcm(i16::MIN), -1.0);
    }
}
