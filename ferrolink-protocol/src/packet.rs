//! Received packet validation and typed argument extraction

use crate::checksum::Crc16;

/// Fixed header size: cmd + argc + value.
pub const HEADER_SIZE: usize = 8;

/// Frames below this size are rejected before any checksum work.
pub const MIN_FRAME_SIZE: usize = 8;

/// Handler invoked for responses addressed to a callback-table slot.
pub type Callback = fn(&Packet<'_>);

/// Errors from frame validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Frame shorter than the minimum header + checksum
    TooShort,
    /// Trailing checksum does not match the payload
    ChecksumMismatch,
}

/// A validated packet, aliasing the receive frame buffer for the
/// lifetime of one decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet<'a> {
    /// Command code
    pub cmd: u16,
    /// Number of encoded arguments
    pub argc: u16,
    /// Response value, or the callback-table index for CMD_RESP_CB
    pub value: u32,
    /// Raw argument byte stream; walk it with [`ArgReader`]
    pub args: &'a [u8],
}

impl<'a> Packet<'a> {
    /// Validate a captured frame and borrow it as a packet.
    ///
    /// Recomputes the running checksum over all bytes but the trailing
    /// two and compares it against that little-endian trailer.
    pub fn parse(frame: &'a [u8]) -> Result<Self, FrameError> {
        if frame.len() < MIN_FRAME_SIZE {
            return Err(FrameError::TooShort);
        }
        let split = frame.len() - 2;
        let mut crc = Crc16::new();
        crc.update_slice(&frame[..split]);
        let trailer = u16::from_le_bytes([frame[split], frame[split + 1]]);
        if trailer != crc.get() {
            return Err(FrameError::ChecksumMismatch);
        }
        Ok(Self {
            cmd: u16::from_le_bytes([frame[0], frame[1]]),
            argc: u16::from_le_bytes([frame[2], frame[3]]),
            value: u32::from_le_bytes([frame[4], frame[5], frame[6], frame[7]]),
            args: frame.get(HEADER_SIZE..split).unwrap_or(&[]),
        })
    }
}

/// Padding after a parameter payload: length field plus payload are
/// always consumed to the next 4-byte boundary.
pub const fn pad(len: u16) -> usize {
    (4 - ((len as usize + 2) & 3)) & 3
}

/// Scalars that can be read from a parameter payload.
pub trait WireScalar: Copy {
    const SIZE: usize;

    /// `bytes` is exactly `SIZE` long.
    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_wire_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl WireScalar for $ty {
            const SIZE: usize = core::mem::size_of::<$ty>();

            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut raw = [0u8; core::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                Self::from_le_bytes(raw)
            }
        }
    )*};
}

impl_wire_scalar!(u8, i8, u16, i16, u32, i32);

impl WireScalar for bool {
    const SIZE: usize = 1;

    fn from_le_slice(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// Cursor over a packet's parameter stream.
///
/// Parameters are length-prefixed and 4-byte aligned. A scalar read
/// whose wire length is shorter than the requested type leaves the
/// caller's default in place; reads past the end of the stream are
/// no-ops (the peer declared fewer arguments than the caller expects).
#[derive(Debug, Clone)]
pub struct ArgReader<'a> {
    args: &'a [u8],
    pos: usize,
}

impl<'a> ArgReader<'a> {
    pub fn new(packet: &Packet<'a>) -> Self {
        Self {
            args: packet.args,
            pos: 0,
        }
    }

    /// Bytes consumed so far, including padding.
    pub fn consumed(&self) -> usize {
        self.pos.min(self.args.len())
    }

    fn take_len(&mut self) -> Option<u16> {
        if self.pos + 2 > self.args.len() {
            // walked past the declared arguments
            self.pos = self.args.len();
            return None;
        }
        let len = u16::from_le_bytes([self.args[self.pos], self.args[self.pos + 1]]);
        self.pos += 2;
        Some(len)
    }

    fn advance(&mut self, len: u16) {
        self.pos += len as usize + pad(len);
    }

    /// Read the next parameter into `value` if its wire length is at
    /// least `size_of::<T>()`; otherwise leave `value` untouched.
    pub fn get<T: WireScalar>(&mut self, value: &mut T) {
        let Some(len) = self.take_len() else {
            return;
        };
        if len as usize >= T::SIZE && self.pos + T::SIZE <= self.args.len() {
            *value = T::from_le_slice(&self.args[self.pos..self.pos + T::SIZE]);
        }
        self.advance(len);
    }

    /// Read the next parameter as a byte-string reference into the
    /// frame buffer. A truncated or absent parameter yields a shorter
    /// or empty slice.
    pub fn get_str(&mut self) -> &'a [u8] {
        let Some(len) = self.take_len() else {
            return &[];
        };
        let start = self.pos.min(self.args.len());
        let end = (self.pos + len as usize).min(self.args.len());
        self.advance(len);
        &self.args[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::Crc16;
    use heapless::Vec;

    /// Build a valid frame: header + raw params + trailing checksum.
    fn frame(cmd: u16, argc: u16, value: u32, args: &[u8]) -> Vec<u8, 128> {
        let mut out: Vec<u8, 128> = Vec::new();
        out.extend_from_slice(&cmd.to_le_bytes()).unwrap();
        out.extend_from_slice(&argc.to_le_bytes()).unwrap();
        out.extend_from_slice(&value.to_le_bytes()).unwrap();
        out.extend_from_slice(args).unwrap();
        let mut crc = Crc16::new();
        crc.update_slice(&out);
        out.extend_from_slice(&crc.get().to_le_bytes()).unwrap();
        out
    }

    /// Encode one parameter the way the peer does: len, payload, pad.
    fn param(out: &mut Vec<u8, 128>, payload: &[u8]) {
        let len = payload.len() as u16;
        out.extend_from_slice(&len.to_le_bytes()).unwrap();
        out.extend_from_slice(payload).unwrap();
        for _ in 0..pad(len) {
            out.push(0).unwrap();
        }
    }

    #[test]
    fn parse_validates_and_aliases() {
        let frame = frame(2, 0, 0xDEAD_BEEF, &[]);
        let packet = Packet::parse(&frame).unwrap();
        assert_eq!(packet.cmd, 2);
        assert_eq!(packet.argc, 0);
        assert_eq!(packet.value, 0xDEAD_BEEF);
        assert!(packet.args.is_empty());
    }

    #[test]
    fn short_frame_rejected_before_checksum() {
        assert_eq!(Packet::parse(&[0; 7]), Err(FrameError::TooShort));
        assert_eq!(Packet::parse(&[]), Err(FrameError::TooShort));
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let mut frame = frame(2, 0, 7, &[]);
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        assert_eq!(Packet::parse(&frame), Err(FrameError::ChecksumMismatch));
    }

    #[test]
    fn corrupted_payload_rejected() {
        let mut frame = frame(2, 0, 7, &[]);
        frame[0] ^= 0x01;
        assert_eq!(Packet::parse(&frame), Err(FrameError::ChecksumMismatch));
    }

    #[test]
    fn scalar_and_string_extraction() {
        let mut args: Vec<u8, 128> = Vec::new();
        param(&mut args, b"topic");
        param(&mut args, &[1]);
        param(&mut args, &0x1234_5678u32.to_le_bytes());
        let frame = frame(3, 3, 0, &args);
        let packet = Packet::parse(&frame).unwrap();

        let mut reader = ArgReader::new(&packet);
        assert_eq!(reader.get_str(), b"topic");
        let mut qos = 0u8;
        reader.get(&mut qos);
        assert_eq!(qos, 1);
        let mut word = 0u32;
        reader.get(&mut word);
        assert_eq!(word, 0x1234_5678);
        // every parameter consumed to a 4-byte boundary
        assert_eq!(reader.consumed() % 4, 0);
        assert_eq!(reader.consumed(), packet.args.len());
    }

    #[test]
    fn short_wire_value_leaves_default() {
        let mut args: Vec<u8, 128> = Vec::new();
        param(&mut args, &[0xAA]); // one byte where a u32 is expected
        let frame = frame(3, 1, 0, &args);
        let packet = Packet::parse(&frame).unwrap();

        let mut reader = ArgReader::new(&packet);
        let mut value = 0xFFFF_FFFFu32;
        reader.get(&mut value);
        assert_eq!(value, 0xFFFF_FFFF);
        // cursor still advances past the short parameter
        assert_eq!(reader.consumed(), packet.args.len());
    }

    #[test]
    fn reads_past_declared_args_are_noops() {
        let frame = frame(2, 0, 0, &[]);
        let packet = Packet::parse(&frame).unwrap();
        let mut reader = ArgReader::new(&packet);
        let mut value = 42u16;
        reader.get(&mut value);
        assert_eq!(value, 42);
        assert_eq!(reader.get_str(), b"");
    }

    #[test]
    fn bool_decodes_from_one_byte() {
        let mut args: Vec<u8, 128> = Vec::new();
        param(&mut args, &[1]);
        param(&mut args, &[0]);
        let frame = frame(3, 2, 0, &args);
        let packet = Packet::parse(&frame).unwrap();

        let mut reader = ArgReader::new(&packet);
        let mut retain = false;
        reader.get(&mut retain);
        assert!(retain);
        let mut clean = true;
        reader.get(&mut clean);
        assert!(!clean);
    }
}
