//! esp-link wire protocol
//!
//! This crate implements the request/response format spoken over the
//! serial line to an esp-link networking co-processor. One frame per
//! exchange, SLIP-delimited, little-endian throughout:
//!
//! ```text
//! ┌─────┬─────────┬──────────┬───────────┬──────────┬────────┬─────┐
//! │ END │ cmd:u16 │ argc:u16 │ value:u32 │ [param]* │ crc:u16│ END │
//! └─────┴─────────┴──────────┴───────────┴──────────┴────────┴─────┘
//! ```
//!
//! Each parameter is a 16-bit length, the payload bytes, and zero
//! padding so length field plus payload end on a 4-byte boundary. The
//! `value` field carries the protocol magic on requests and doubles as
//! a response value or callback-table index on responses.
//!
//! Layers, bottom up: [`slip`] (byte stuffing and frame capture),
//! [`checksum`] (the running 16-bit accumulator), [`packet`]
//! (validation and typed argument extraction), [`request`] (building
//! outgoing commands), [`commands`] (the command-code table).

#![no_std]
#![deny(unsafe_code)]

pub mod checksum;
pub mod commands;
pub mod packet;
pub mod request;
pub mod slip;

pub use checksum::Crc16;
pub use packet::{ArgReader, Callback, FrameError, Packet, WireScalar};
pub use request::{ByteSink, Param, RequestEncoder, RequestError, REQUEST_VALUE};
pub use slip::{FrameReceiver, SlipDecoder};
