//! Byte-level transactional serial port interface
//!
//! The protocol client stages a whole request (header, parameters,
//! checksum) with [`BytePort::append`] and publishes it with a single
//! [`BytePort::commit`], so the interrupt-driven transmitter never
//! observes a partially built frame. Input is a plain byte stream.

/// Byte-level serial interface with transactional output.
///
/// Methods take `&self`: the production implementation guards its
/// state internally so interrupt handlers and the foreground task can
/// share one port instance.
pub trait BytePort {
    /// Stage one output byte. Nothing is transmitted until
    /// [`BytePort::commit`]. Returns `false` (and stages nothing) when
    /// the output buffer is full.
    fn append(&self, byte: u8) -> bool;

    /// Publish all bytes staged since the previous commit and start
    /// transmission if the line is idle.
    fn commit(&self);

    /// Discard all bytes staged since the previous commit.
    fn abort(&self);

    /// True when at least one input byte is ready.
    fn data_available(&self) -> bool;

    /// Pop one input byte if available.
    fn try_get(&self) -> Option<u8>;

    /// Send a single byte immediately.
    fn send_byte(&self, byte: u8) {
        let _ = self.append(byte);
        self.commit();
    }

    /// Stage a run of bytes and publish them as one transaction.
    /// Bytes refused by a full buffer are dropped like any other
    /// overrun.
    fn send(&self, bytes: &[u8]) {
        for &byte in bytes {
            let _ = self.append(byte);
        }
        self.commit();
    }

    /// Pop one input byte, busy-waiting until one arrives.
    fn get(&self) -> u8 {
        loop {
            if let Some(byte) = self.try_get() {
                return byte;
            }
            core::hint::spin_loop();
        }
    }
}
