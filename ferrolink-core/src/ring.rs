//! Transactional single-producer/single-consumer ring buffer
//!
//! The producer stages bytes with [`RingBuffer::write_tentative`] and
//! publishes the whole batch with [`RingBuffer::commit`]. A consumer
//! polling [`RingBuffer::pop`] sees either none or all of the batch,
//! never a partial packet, with one carve-out: a batch that fills the
//! buffer to exactly its capacity becomes readable before its commit,
//! because full and empty share the same index state and the read
//! predicate is `full || read != write`. Producers that want the
//! atomicity guarantee must keep batches under the capacity.
//! [`RingBuffer::reset_tentative`] discards a batch that could not be
//! completed.
//!
//! The buffer itself is a plain `&mut self` structure. Sharing one
//! across the interrupt boundary is the job of
//! [`crate::serial::SerialPort`], which wraps its buffers in a
//! critical-section mutex; each side of that split only ever moves a
//! single index per operation.

/// Fixed-capacity byte queue with tentative writes.
///
/// Invariants:
/// - `write` always reflects the last committed position.
/// - `tentative` is at or ahead of `write` in circular order.
/// - `full` is set when staged plus committed bytes fill the capacity.
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    read: usize,
    write: usize,
    tentative: usize,
    full: bool,
}

impl<const N: usize> RingBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            read: 0,
            write: 0,
            tentative: 0,
            full: false,
        }
    }

    /// Stage one byte without making it visible to the consumer.
    ///
    /// Returns `false` and stages nothing when the buffer (including
    /// staged-but-uncommitted bytes) is full.
    pub fn write_tentative(&mut self, byte: u8) -> bool {
        if self.full {
            return false;
        }
        self.buf[self.tentative] = byte;
        self.tentative = (self.tentative + 1) % N;
        self.full = self.tentative == self.read;
        true
    }

    /// Busy-wait until space is available, then stage one byte.
    ///
    /// Only meaningful when an interrupt consumer drains the buffer
    /// concurrently; on a single-owner buffer this would spin forever.
    pub fn write_tentative_blocking(&mut self, byte: u8) {
        while !self.write_tentative(byte) {
            core::hint::spin_loop();
        }
    }

    /// Publish all bytes staged since the previous commit.
    ///
    /// This is the only producer operation a concurrent consumer can
    /// observe: a single index move that exposes the whole batch.
    pub fn commit(&mut self) {
        self.write = self.tentative;
    }

    /// Discard all staged-but-uncommitted bytes.
    pub fn reset_tentative(&mut self) {
        if self.tentative != self.write {
            self.full = false;
        }
        self.tentative = self.write;
    }

    /// Pop the oldest committed byte.
    pub fn pop(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.read = (self.read + 1) % N;
        self.full = false;
        Some(byte)
    }

    /// The oldest committed byte, without consuming it.
    pub fn peek(&self) -> Option<u8> {
        if self.read == self.write && !self.full {
            None
        } else {
            Some(self.buf[self.read])
        }
    }

    /// Busy-wait until a byte is available, then pop it.
    pub fn pop_blocking(&mut self) -> u8 {
        loop {
            if let Some(byte) = self.pop() {
                return byte;
            }
            core::hint::spin_loop();
        }
    }

    /// Number of committed, unread bytes.
    pub fn len(&self) -> usize {
        if self.full {
            return N;
        }
        (self.write + N - self.read) % N
    }

    pub fn is_empty(&self) -> bool {
        self.read == self.write && !self.full
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
