//! Payload port traits
//!
//! The modem treats its payload as opaque bytes; these traits hide where
//! they come from and where they go.

use crate::domain::ModemResult;

pub trait PayloadSource {
    fn read_payload(&mut self) -> ModemResult<Vec<u8>>;
}

pub trait PayloadSink {
    fn write_payload(&mut self, bytes: &[u8]) -> ModemResult<()>;
}
