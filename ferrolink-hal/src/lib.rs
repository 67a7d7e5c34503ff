//! Ferrolink Hardware Abstraction Layer
//!
//! This crate defines the two narrow interfaces that separate the
//! communications core from hardware:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ferrolink-client (protocol client)     │
//! └─────────────────────────────────────────┘
//!                     │ BytePort
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ferrolink-core (ring buffer + driver)  │
//! └─────────────────────────────────────────┘
//!                     │ UartHw
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  chip-specific UART registers           │
//! └─────────────────────────────────────────┘
//! ```
//!
//! [`uart::UartHw`] is the register-level primitive interface a chip
//! crate implements (data register access, interrupt source control).
//! [`port::BytePort`] is the byte-level transactional interface the
//! protocol client consumes; `ferrolink-core` provides the production
//! implementation, test code provides scripted mocks.

#![no_std]
#![deny(unsafe_code)]

pub mod port;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use port::BytePort;
pub use uart::{UartConfig, UartHw};
