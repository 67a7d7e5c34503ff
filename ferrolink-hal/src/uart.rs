//! Register-level UART abstraction
//!
//! The serial driver in `ferrolink-core` is written against this trait
//! so the same interrupt pump runs on any chip that exposes a data
//! register and a transmit-empty interrupt source.

/// Register-level UART access.
///
/// Implementations are expected to be thin: each method maps to one or
/// two register operations. The driver guarantees it only calls
/// [`UartHw::read_data`] when the receive-complete interrupt fired and
/// only calls [`UartHw::write_data`] when the transmit register is
/// known to be empty (from the transmit-empty interrupt, or right
/// after enabling transmission from idle).
pub trait UartHw {
    /// Apply line configuration and enable receiver, transmitter and
    /// the receive-complete interrupt.
    fn configure(&mut self, config: &UartConfig);

    /// Write one byte to the transmit data register.
    fn write_data(&mut self, byte: u8);

    /// Read one byte from the receive data register.
    fn read_data(&mut self) -> u8;

    /// Enable or disable the transmit-register-empty interrupt source.
    fn set_tx_irq(&mut self, enabled: bool);
}

/// UART line configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115_200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
