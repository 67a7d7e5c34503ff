//! Interrupt-driven buffered UART driver
//!
//! One [`SerialPort`] owns an output and an input [`RingBuffer`], the
//! hardware handle and the `idle` flag. The foreground task stages
//! output with [`BytePort::append`] and publishes it with
//! [`BytePort::commit`]; the two interrupt entry points
//! ([`SerialPort::tx_empty_irq`], [`SerialPort::rx_irq`]) move single
//! bytes between the buffers and the data register.
//!
//! All shared state sits behind an
//! [`embassy_sync::blocking_mutex::Mutex`] so the idle->active
//! transition in `commit` (and every other index update) happens with
//! the interrupt sources masked: on a real target instantiate with
//! [`CriticalSectionRawMutex`], in host tests with
//! [`NoopRawMutex`](embassy_sync::blocking_mutex::raw::NoopRawMutex).
//! Each locked region is a handful of byte moves at most.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;

use ferrolink_hal::port::BytePort;
use ferrolink_hal::uart::{UartConfig, UartHw};

use crate::ring::RingBuffer;

/// Default output capacity: sized to hold one full SLIP-encoded
/// request so a whole packet can be staged as a single transaction.
pub const DEFAULT_TX_CAPACITY: usize = 256;

/// Default input capacity: covers the worst-case burst between two
/// foreground polls (one maximum-size response frame).
pub const DEFAULT_RX_CAPACITY: usize = 128;

struct PortState<H: UartHw, const TX: usize, const RX: usize> {
    hw: H,
    output: RingBuffer<TX>,
    input: RingBuffer<RX>,
    /// True when no transmission is in flight. The only flag shared
    /// between the foreground `commit` and the transmit interrupt.
    idle: bool,
}

/// Buffered serial port with transactional output.
pub struct SerialPort<
    M: RawMutex,
    H: UartHw,
    const TX: usize = DEFAULT_TX_CAPACITY,
    const RX: usize = DEFAULT_RX_CAPACITY,
> {
    state: Mutex<M, RefCell<PortState<H, TX, RX>>>,
}

/// The production instantiation: interrupt-safe on any target with a
/// `critical-section` implementation.
pub type IrqSerialPort<H, const TX: usize = DEFAULT_TX_CAPACITY, const RX: usize = DEFAULT_RX_CAPACITY> =
    SerialPort<CriticalSectionRawMutex, H, TX, RX>;

impl<M: RawMutex, H: UartHw, const TX: usize, const RX: usize> SerialPort<M, H, TX, RX> {
    pub const fn new(hw: H) -> Self {
        Self {
            state: Mutex::new(RefCell::new(PortState {
                hw,
                output: RingBuffer::new(),
                input: RingBuffer::new(),
                idle: true,
            })),
        }
    }

    /// Configure the line and enable reception.
    pub fn init(&self, config: &UartConfig) {
        self.state.lock(|state| state.borrow_mut().hw.configure(config));
    }

    /// Transmit-register-empty interrupt entry point.
    ///
    /// Pops one committed byte to the hardware; when the output buffer
    /// runs dry, disables its own interrupt source and marks the port
    /// idle so the next commit restarts the chain.
    pub fn tx_empty_irq(&self) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            match state.output.pop() {
                Some(byte) => state.hw.write_data(byte),
                None => {
                    state.hw.set_tx_irq(false);
                    state.idle = true;
                }
            }
        });
    }

    /// Receive-complete interrupt entry point.
    ///
    /// Stages and commits one incoming byte. The input buffer is sized
    /// for the worst-case burst, so a refused write only occurs when
    /// the foreground stops polling entirely; the byte is then dropped
    /// like any other overrun.
    pub fn rx_irq(&self) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            let byte = state.hw.read_data();
            let _ = state.input.write_tentative(byte);
            state.input.commit();
        });
    }

    /// True when no transmission is in flight.
    pub fn is_idle(&self) -> bool {
        self.state.lock(|state| state.borrow().idle)
    }
}

impl<M: RawMutex, H: UartHw, const TX: usize, const RX: usize> BytePort
    for SerialPort<M, H, TX, RX>
{
    fn append(&self, byte: u8) -> bool {
        self.state
            .lock(|state| state.borrow_mut().output.write_tentative(byte))
    }

    fn abort(&self) {
        self.state.lock(|state| state.borrow_mut().output.reset_tentative());
    }

    /// Publish the staged output and, if the port was idle, bootstrap
    /// the interrupt chain: re-enable the transmit-empty interrupt and
    /// push the first byte to the data register. Flag check, flag
    /// flip and first write all happen inside one critical section, so
    /// the transmit interrupt cannot slip in between them.
    fn commit(&self) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.output.commit();
            if state.idle {
                if let Some(byte) = state.output.pop() {
                    state.hw.set_tx_irq(true);
                    state.hw.write_data(byte);
                    state.idle = false;
                }
            }
        });
    }

    fn data_available(&self) -> bool {
        self.state.lock(|state| !state.borrow().input.is_empty())
    }

    fn try_get(&self) -> Option<u8> {
        self.state.lock(|state| state.borrow_mut().input.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell as StdRefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::vec::Vec;

    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    /// Scripted UART hardware: records data-register writes and
    /// interrupt-enable changes, serves reads from a queue.
    #[derive(Default)]
    struct MockState {
        written: Vec<u8>,
        incoming: VecDeque<u8>,
        tx_irq_enabled: bool,
        configured_baud: Option<u32>,
    }

    #[derive(Clone, Default)]
    struct MockUart(Rc<StdRefCell<MockState>>);

    impl UartHw for MockUart {
        fn configure(&mut self, config: &UartConfig) {
            self.0.borrow_mut().configured_baud = Some(config.baudrate);
        }

        fn write_data(&mut self, byte: u8) {
            self.0.borrow_mut().written.push(byte);
        }

        fn read_data(&mut self) -> u8 {
            self.0.borrow_mut().incoming.pop_front().unwrap_or(0)
        }

        fn set_tx_irq(&mut self, enabled: bool) {
            self.0.borrow_mut().tx_irq_enabled = enabled;
        }
    }

    type TestPort = SerialPort<NoopRawMutex, MockUart, 16, 16>;

    fn port() -> (TestPort, MockUart) {
        let hw = MockUart::default();
        (SerialPort::new(hw.clone()), hw)
    }

    #[test]
    fn init_forwards_configuration() {
        let (port, hw) = port();
        port.init(&UartConfig::default());
        assert_eq!(hw.0.borrow().configured_baud, Some(115_200));
    }

    #[test]
    fn commit_kicks_off_transmission_once() {
        let (port, hw) = port();
        for byte in b"abc" {
            assert!(port.append(*byte));
        }
        // staged bytes are not on the wire yet
        assert!(hw.0.borrow().written.is_empty());

        port.commit();
        // first byte pushed directly, interrupt chain armed
        assert_eq!(hw.0.borrow().written, vec![b'a']);
        assert!(hw.0.borrow().tx_irq_enabled);
        assert!(!port.is_idle());

        port.tx_empty_irq();
        port.tx_empty_irq();
        assert_eq!(hw.0.borrow().written, b"abc".to_vec());

        // buffer dry: interrupt disables itself, port goes idle
        port.tx_empty_irq();
        assert!(!hw.0.borrow().tx_irq_enabled);
        assert!(port.is_idle());
    }

    #[test]
    fn commit_while_active_does_not_restart() {
        let (port, hw) = port();
        port.append(1);
        port.commit();
        assert_eq!(hw.0.borrow().written, vec![1]);

        // second commit while a transmission is in flight must not
        // write the data register a second time
        port.append(2);
        port.commit();
        assert_eq!(hw.0.borrow().written, vec![1]);

        port.tx_empty_irq();
        assert_eq!(hw.0.borrow().written, vec![1, 2]);
    }

    #[test]
    fn commit_with_nothing_staged_stays_idle() {
        let (port, hw) = port();
        port.commit();
        assert!(port.is_idle());
        assert!(hw.0.borrow().written.is_empty());
        assert!(!hw.0.borrow().tx_irq_enabled);
    }

    #[test]
    fn abort_discards_staged_output() {
        let (port, hw) = port();
        port.append(1);
        port.append(2);
        port.abort();
        port.commit();
        assert!(hw.0.borrow().written.is_empty());
        assert!(port.is_idle());
    }

    #[test]
    fn rx_irq_makes_bytes_available_to_foreground() {
        let (port, hw) = port();
        hw.0.borrow_mut().incoming.extend([0x10, 0x20]);
        assert!(!port.data_available());

        port.rx_irq();
        port.rx_irq();
        assert!(port.data_available());
        assert_eq!(port.try_get(), Some(0x10));
        assert_eq!(port.get(), 0x20);
        assert_eq!(port.try_get(), None);
    }

    #[test]
    fn send_byte_is_append_plus_commit() {
        let (port, hw) = port();
        port.send_byte(0xC0);
        assert_eq!(hw.0.borrow().written, vec![0xC0]);
    }

    #[test]
    fn send_publishes_a_run_as_one_transaction() {
        let (port, hw) = port();
        port.send(b"xyz");
        // one commit: first byte on the wire, rest behind the
        // interrupt chain
        assert_eq!(hw.0.borrow().written, vec![b'x']);
        port.tx_empty_irq();
        port.tx_empty_irq();
        assert_eq!(hw.0.borrow().written, b"xyz".to_vec());
    }
}
