//! Command handlers (driving adapters)
//!
//! Each command wires a port source and sink around the modem core. The
//! binaries call the file-backed `run_*` entry points; tests drive the
//! generic versions with in-memory adapters.

pub mod decode;
pub mod encode;

use std::path::Path;

use crate::domain::{ModemConfig, ModemResult};

pub use decode::{decode_recording, run_decode};
pub use encode::{encode_payload, run_encode};

/// Load a configuration file, or fall back to the defaults
pub fn load_config(path: Option<&Path>) -> ModemResult<ModemConfig> {
    match path {
        Some(path) => {
            let config = ModemConfig::load(path)?;
            log::info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => {
            let config = ModemConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}
