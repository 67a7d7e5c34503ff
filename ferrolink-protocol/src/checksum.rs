//! Running 16-bit frame checksum
//!
//! The table-free incremental form used by esp-link, applied once per
//! payload byte on both the transmit and receive paths. The bit
//! manipulation is wire-compatible with CRC-16/KERMIT (zero initial
//! value); an integration test pins it against the `crc` crate's
//! reference implementation.

/// Incremental checksum accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc16 {
    acc: u16,
}

impl Crc16 {
    pub const fn new() -> Self {
        Self { acc: 0 }
    }

    pub fn reset(&mut self) {
        self.acc = 0;
    }

    /// Fold one byte into the accumulator. Must match the peer
    /// bit-for-bit.
    pub fn update(&mut self, byte: u8) {
        let mut acc = self.acc ^ u16::from(byte);
        acc = acc.swap_bytes();
        acc ^= (acc & 0xff00) << 4;
        acc ^= acc >> 12;
        acc ^= (acc & 0xff00) >> 5;
        self.acc = acc;
    }

    pub fn update_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.update(byte);
        }
    }

    pub fn get(&self) -> u16 {
        self.acc
    }
}

/// One-shot checksum of a byte slice.
pub fn crc16(bytes: &[u8]) -> u16 {
    let mut crc = Crc16::new();
    crc.update_slice(bytes);
    crc.get()
}
