//! SLIP byte stuffing and incremental frame capture
//!
//! Two reserved byte values delimit and escape frames: an unescaped
//! [`END`] terminates a frame, [`ESC`] announces that the next byte is
//! an escaped stand-in ([`ESC_END`] for a literal END, [`ESC_ESC`] for
//! a literal ESC). Everything else travels verbatim.

use heapless::Vec;

/// End of frame
pub const END: u8 = 0xC0;
/// Escape
pub const ESC: u8 = 0xDB;
/// Escaped END
pub const ESC_END: u8 = 0xDC;
/// Escaped ESC
pub const ESC_ESC: u8 = 0xDD;

/// Default capture buffer capacity in bytes.
pub const DEFAULT_FRAME_CAPACITY: usize = 128;

/// Emit the SLIP encoding of one payload byte (one or two wire bytes).
pub fn encode_byte<F: FnMut(u8)>(byte: u8, mut emit: F) {
    match byte {
        END => {
            emit(ESC);
            emit(ESC_END);
        }
        ESC => {
            emit(ESC);
            emit(ESC_ESC);
        }
        other => emit(other),
    }
}

/// Result of feeding one wire byte to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decoded {
    /// A payload byte (escape sequences already resolved).
    Byte(u8),
    /// An unescaped END: the frame is complete.
    End,
    /// The byte was consumed without producing payload (an ESC).
    Pending,
}

/// Incremental SLIP decoder: one bit of state, carried across calls.
#[derive(Debug, Clone, Default)]
pub struct SlipDecoder {
    escape: bool,
}

impl SlipDecoder {
    pub const fn new() -> Self {
        Self { escape: false }
    }

    pub fn reset(&mut self) {
        self.escape = false;
    }

    pub fn feed(&mut self, byte: u8) -> Decoded {
        if self.escape {
            self.escape = false;
            let byte = match byte {
                ESC_END => END,
                ESC_ESC => ESC,
                // any other byte after ESC passes through unchanged,
                // including a raw END (which then does not terminate)
                other => other,
            };
            return Decoded::Byte(byte);
        }
        match byte {
            ESC => {
                self.escape = true;
                Decoded::Pending
            }
            END => Decoded::End,
            other => Decoded::Byte(other),
        }
    }
}

/// Reassembles delimited frames from a wire byte stream.
///
/// Bytes arriving while the capture buffer is at capacity are silently
/// dropped: the frame is truncated, terminated by the next END and
/// parsed from whatever was captured. Downstream validation decides
/// its fate. This matches the peer's leniency expectations; see the
/// workspace DESIGN notes.
#[derive(Debug, Clone, Default)]
pub struct FrameReceiver<const N: usize = DEFAULT_FRAME_CAPACITY> {
    decoder: SlipDecoder,
    buf: Vec<u8, N>,
    complete: bool,
}

impl<const N: usize> FrameReceiver<N> {
    pub fn new() -> Self {
        Self {
            decoder: SlipDecoder::new(),
            buf: Vec::new(),
            complete: false,
        }
    }

    /// Feed one wire byte; returns `true` when an END completed a
    /// frame. The frame stays readable through [`FrameReceiver::frame`]
    /// until the next byte is fed, which starts the next capture.
    pub fn feed(&mut self, byte: u8) -> bool {
        if self.complete {
            self.reset();
        }
        match self.decoder.feed(byte) {
            Decoded::Byte(byte) => {
                // silent drop on overflow: frame truncated
                let _ = self.buf.push(byte);
                false
            }
            Decoded::End => {
                self.complete = true;
                true
            }
            Decoded::Pending => false,
        }
    }

    /// The captured frame payload (escapes resolved, no delimiters).
    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.decoder.reset();
        self.complete = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_all(payload: &[u8]) -> Vec<u8, 64> {
        let mut out = Vec::new();
        for &byte in payload {
            encode_byte(byte, |b| out.push(b).unwrap());
        }
        out
    }

    #[test]
    fn plain_bytes_pass_verbatim() {
        assert_eq!(encode_all(b"hello").as_slice(), b"hello");
    }

    #[test]
    fn reserved_bytes_are_escaped() {
        assert_eq!(encode_all(&[END]).as_slice(), &[ESC, ESC_END]);
        assert_eq!(encode_all(&[ESC]).as_slice(), &[ESC, ESC_ESC]);
    }

    #[test]
    fn decoder_resolves_escapes_across_calls() {
        let mut decoder = SlipDecoder::new();
        assert_eq!(decoder.feed(ESC), Decoded::Pending);
        assert_eq!(decoder.feed(ESC_END), Decoded::Byte(END));
        assert_eq!(decoder.feed(ESC), Decoded::Pending);
        assert_eq!(decoder.feed(ESC_ESC), Decoded::Byte(ESC));
        assert_eq!(decoder.feed(0x42), Decoded::Byte(0x42));
        assert_eq!(decoder.feed(END), Decoded::End);
    }

    #[test]
    fn round_trip_with_reserved_values() {
        let payload = [0x01, END, 0x02, ESC, END, ESC, 0x03];
        let wire = encode_all(&payload);

        let mut rx = FrameReceiver::<32>::new();
        for &byte in &wire {
            assert!(!rx.feed(byte));
        }
        assert!(rx.feed(END));
        assert_eq!(rx.frame(), &payload);
    }

    #[test]
    fn single_unescaped_end_terminates() {
        let mut rx = FrameReceiver::<32>::new();
        rx.feed(0x11);
        rx.feed(0x22);
        assert!(rx.feed(END));
        assert_eq!(rx.frame(), &[0x11, 0x22]);
    }

    #[test]
    fn next_feed_after_completion_starts_fresh_frame() {
        let mut rx = FrameReceiver::<32>::new();
        rx.feed(0x11);
        assert!(rx.feed(END));
        assert!(!rx.feed(0x22));
        assert!(rx.feed(END));
        assert_eq!(rx.frame(), &[0x22]);
    }

    #[test]
    fn overflow_truncates_silently() {
        let mut rx = FrameReceiver::<4>::new();
        for byte in 0..10u8 {
            assert!(!rx.feed(byte));
        }
        assert!(rx.feed(END));
        // first four bytes kept, the rest dropped, frame still parsed
        assert_eq!(rx.frame(), &[0, 1, 2, 3]);
    }

    #[test]
    fn escaped_end_does_not_terminate() {
        let mut rx = FrameReceiver::<32>::new();
        rx.feed(ESC);
        assert!(!rx.feed(ESC_END));
        assert!(rx.feed(END));
        assert_eq!(rx.frame(), &[END]);
    }
}
