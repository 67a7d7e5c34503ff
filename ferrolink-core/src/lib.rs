//! Driver layer of the ferrolink stack
//!
//! Two pieces live here:
//!
//! - [`ring::RingBuffer`] - a fixed-capacity byte queue with
//!   tentative-write/commit/abort semantics, so a producer can stage a
//!   multi-byte packet and publish it to the consumer in one step.
//! - [`serial::SerialPort`] - an interrupt-driven UART driver built on
//!   two ring buffers. The foreground task stages and commits output;
//!   the transmit-empty and receive-complete interrupt handlers pump
//!   bytes between the buffers and the hardware data register.
//!
//! Everything is statically sized; there is no allocator anywhere in
//! this workspace.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod ring;
pub mod serial;

pub use ring::RingBuffer;
pub use serial::SerialPort;
