//! Raw byte file adapter

use std::path::PathBuf;

use crate::domain::{ModemError, ModemResult};
use crate::ports::{PayloadSink, PayloadSource};

/// A file read or written as opaque bytes
pub struct RawFile {
    path: PathBuf,
}

impl RawFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PayloadSource for RawFile {
    fn read_payload(&mut self) -> ModemResult<Vec<u8>> {
        let bytes = std::fs::read(&self.path).map_err(|source| ModemError::Input {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("Read {} bytes from {}", bytes.len(), self.path.display());
        Ok(bytes)
    }
}

impl PayloadSink for RawFile {
    fn write_payload(&mut self, bytes: &[u8]) -> ModemResult<()> {
        std::fs::write(&self.path, bytes).map_err(|source| ModemError::Output {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RawFile::new(dir.path().join("payload.bin"));
        file.write_payload(b"\x00\x01binary\xff").unwrap();
        assert_eq!(file.read_payload().unwrap(), b"\x00\x01binary\xff".to_vec());
    }

    #[test]
    fn test_missing_input_maps_to_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RawFile::new(dir.path().join("missing")).read_payload().unwrap_err();
        assert!(matches!(err, ModemError::Input { .. }));
    }

    #[test]
    fn test_bad_output_maps_to_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RawFile::new(dir.path().join("a/b/c"))
            .write_payload(b"x")
            .unwrap_err();
        assert!(matches!(err, ModemError::Output { .. }));
    }
}
