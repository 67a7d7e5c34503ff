//! esp-link protocol client
//!
//! Orchestrates the request/response traffic with the networking
//! co-processor: builds typed requests on top of any
//! [`ferrolink_hal::BytePort`], polls and validates incoming frames,
//! dispatches asynchronous responses through a fixed-size callback
//! table on the [`packet.value`](ferrolink_protocol::Packet::value)
//! index, and runs the resynchronization handshake when either side
//! restarts.
//!
//! Everything degrades to drop-and-continue: a corrupted frame, a
//! full callback table or a lost response never wedges the link.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod callbacks;
pub mod client;

pub use callbacks::{CallbackTable, CALLBACK_SLOTS, NO_CALLBACK};
pub use client::{Client, FRAME_CAPACITY, RECEIVE_TIMEOUT};
