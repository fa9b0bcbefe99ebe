//! Port traits (interfaces)
//!
//! These traits define the boundaries between the modem core and external I/O.
//! Adapters implement these traits to connect to files or memory.

pub mod payload;
pub mod wave;

pub use payload::*;
pub use wave::*;
