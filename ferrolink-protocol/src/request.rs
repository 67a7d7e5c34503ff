//! Outgoing request construction
//!
//! A request travels as one SLIP frame: raw END, then the header,
//! parameters and running checksum, all byte-stuffed, then a closing
//! raw END. [`RequestEncoder`] owns the running checksum and the
//! escaping; it writes into any [`ByteSink`], so a caller can stage
//! the whole request as a single ring-buffer transaction and only
//! commit once the encoder reports success.

use crate::checksum::Crc16;
use crate::packet::{pad, Callback};
use crate::slip;

/// Magic carried in the `value` field of every request.
pub const REQUEST_VALUE: u32 = 0x0142;

/// Errors from request encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// The sink refused a byte; the staged transaction should be
    /// aborted and the request retried once the line drains.
    BufferFull,
}

/// Where encoded request bytes go. `put` returns `false` on
/// backpressure; the encoder latches the failure and reports it from
/// [`RequestEncoder::finish`].
pub trait ByteSink {
    fn put(&mut self, byte: u8) -> bool;
}

impl<const N: usize> ByteSink for heapless::Vec<u8, N> {
    fn put(&mut self, byte: u8) -> bool {
        self.push(byte).is_ok()
    }
}

/// One request parameter.
///
/// A closed enumeration stands in for the peer's type-directed
/// encoding: each kind picks a wire representation, and
/// [`Param::slots`] gives the number of argument slots it occupies in
/// the header count.
#[derive(Debug, Clone, Copy)]
pub enum Param<'a> {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    Bool(bool),
    /// Text, sent length-prefixed without its terminator.
    Str(&'a str),
    /// Text followed by its length again as a discrete 16-bit
    /// parameter (MQTT publish wants the message length both ways).
    StrWithLen(&'a str),
    /// Asynchronous response handler; registered in the client's
    /// callback table and sent as the 32-bit slot index. `None` sends
    /// the no-callback sentinel.
    Callback(Option<Callback>),
}

impl Param<'_> {
    /// Argument slots this parameter occupies in the header count.
    pub fn slots(&self) -> u16 {
        match self {
            Param::StrWithLen(_) => 2,
            _ => 1,
        }
    }
}

/// Incremental request builder.
pub struct RequestEncoder<S: ByteSink> {
    sink: S,
    crc: Crc16,
    ok: bool,
}

impl<S: ByteSink> RequestEncoder<S> {
    /// Start a request: frame delimiter, fresh checksum, header.
    pub fn new(sink: S, cmd: u16, argc: u16) -> Self {
        let mut enc = Self {
            sink,
            crc: Crc16::new(),
            ok: true,
        };
        enc.put_raw(slip::END);
        enc.write_bytes(&cmd.to_le_bytes());
        enc.write_bytes(&argc.to_le_bytes());
        enc.write_bytes(&REQUEST_VALUE.to_le_bytes());
        enc
    }

    /// Append the trailing checksum and closing delimiter.
    ///
    /// Consumes the encoder and returns the sink, or the latched
    /// backpressure failure if any byte was refused along the way.
    pub fn finish(mut self) -> Result<S, RequestError> {
        // the trailer itself is escaped but not folded into the crc
        let trailer = self.crc.get().to_le_bytes();
        for byte in trailer {
            self.put_escaped(byte);
        }
        self.put_raw(slip::END);
        if self.ok {
            Ok(self.sink)
        } else {
            Err(RequestError::BufferFull)
        }
    }

    /// One parameter: 16-bit length, payload, zero padding to the
    /// next 4-byte boundary (length field included in the rounding).
    pub fn param_bytes(&mut self, payload: &[u8]) {
        let len = payload.len() as u16;
        self.write_bytes(&len.to_le_bytes());
        self.write_bytes(payload);
        for _ in 0..pad(len) {
            self.write_byte(0);
        }
    }

    pub fn param_u16(&mut self, value: u16) {
        self.param_bytes(&value.to_le_bytes());
    }

    pub fn param_u32(&mut self, value: u32) {
        self.param_bytes(&value.to_le_bytes());
    }

    /// Text, without its terminator.
    pub fn param_str(&mut self, text: &str) {
        self.param_bytes(text.as_bytes());
    }

    /// Text followed by its length again as a discrete 16-bit
    /// parameter; occupies two argument slots in the header count.
    pub fn param_str_with_len(&mut self, text: &str) {
        let bytes = text.as_bytes();
        self.param_bytes(bytes);
        self.param_bytes(&(bytes.len() as u16).to_le_bytes());
    }

    /// Checksummed, escaped payload bytes.
    fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }

    fn write_byte(&mut self, byte: u8) {
        self.crc.update(byte);
        self.put_escaped(byte);
    }

    /// Escaped, but not checksummed (used for the crc trailer).
    fn put_escaped(&mut self, byte: u8) {
        let Self { sink, ok, .. } = self;
        slip::encode_byte(byte, |b| *ok &= sink.put(b));
    }

    /// Straight to the wire: frame delimiters only.
    fn put_raw(&mut self, byte: u8) {
        self.ok &= self.sink.put(byte);
    }
}
