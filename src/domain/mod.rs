//! Core domain types
//!
//! Pure types with no I/O dependencies: configuration, errors, and the
//! values that flow between the modem's stages.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
