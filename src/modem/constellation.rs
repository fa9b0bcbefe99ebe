//! Constellation mapping and bit packing
//!
//! A symbol value `v` is sent as a data-tone phase of `v·2π/M` relative to
//! the carrier. On receive, the measured phase difference is quantized into
//! `M` bins; quantizing into `2M` bins as well tells whether the phase sat
//! near a constellation point (even index) or between two (odd index).
//!
//! Bytes are split into symbols least-significant bits first.

use std::f64::consts::TAU;

use crate::domain::quantize_phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constellation {
    num_phases: u32,
}

impl Constellation {
    pub fn new(num_phases: u32) -> Self {
        Self {
            num_phases: num_phases.max(2),
        }
    }

    /// Transmit phase for a symbol value
    pub fn phase_of(&self, value: u32) -> f64 {
        (value % self.num_phases) as f64 * TAU / self.num_phases as f64
    }

    /// Quantize a phase difference into `(value, valid)`
    pub fn demap(&self, phase: f64) -> (u32, bool) {
        let value = quantize_phase(phase, self.num_phases);
        let fine = quantize_phase(phase, 2 * self.num_phases);
        (value, fine % 2 == 0)
    }
}

/// Split bytes into `bits`-wide symbols, LSB first
pub fn bytes_to_symbols(bytes: &[u8], bits: u32) -> Vec<u32> {
    let bits = bits.clamp(1, 8);
    let mask = (1u32 << bits) - 1;
    let per_byte = 8 / bits;
    let mut symbols = Vec::with_capacity(bytes.len() * per_byte as usize);
    for &byte in bytes {
        for i in 0..per_byte {
            symbols.push((byte as u32 >> (i * bits)) & mask);
        }
    }
    symbols
}

/// Reassemble bytes from `bits`-wide symbols, LSB first.
///
/// Returns the bytes and the number of trailing symbols that did not fill a byte.
pub fn symbols_to_bytes(symbols: &[u32], bits: u32) -> (Vec<u8>, usize) {
    let bits = bits.clamp(1, 8);
    let mask = (1u32 << bits) - 1;
    let per_byte = (8 / bits) as usize;
    let bytes = symbols
        .chunks_exact(per_byte)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u32, |acc, (i, &s)| acc | ((s & mask) << (i as u32 * bits))) as u8
        })
        .collect();
    (bytes, symbols.len() % per_byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_bpsk_demap() {
        let c = Constellation::new(2);
        assert_eq!(c.demap(0.1), (0, true));
        assert_eq!(c.demap(PI + 0.2), (1, true));
        assert_eq!(c.demap(2.0 * PI - 0.1), (0, true));
        let (_, valid) = c.demap(PI / 2.0 + 0.1);
        assert!(!valid, "quadrature phase is between BPSK points");
    }

    #[test]
    fn test_qpsk_phases_round_trip() {
        let c = Constellation::new(4);
        for v in 0..4 {
            assert_eq!(c.demap(c.phase_of(v) + 0.3), (v, true));
            assert_eq!(c.demap(c.phase_of(v) - 0.3), (v, true));
        }
    }

    #[test]
    fn test_bytes_split_lsb_first() {
        assert_eq!(bytes_to_symbols(&[0b1000_0001], 1), vec![1, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(bytes_to_symbols(&[0b1110_0100], 2), vec![0, 1, 2, 3]);
        assert_eq!(bytes_to_symbols(&[0xA5], 4), vec![0x5, 0xA]);
    }

    #[test]
    fn test_symbols_rejoin_and_report_leftover() {
        let (bytes, leftover) = symbols_to_bytes(&[0, 1, 2, 3, 1], 2);
        assert_eq!(bytes, vec![0b1110_0100]);
        assert_eq!(leftover, 1);

        let text = b"Hi";
        let (bytes, leftover) = symbols_to_bytes(&bytes_to_symbols(text, 1), 1);
        assert_eq!(bytes, text.to_vec());
        assert_eq!(leftover, 0);
    }
}
