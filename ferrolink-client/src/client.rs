//! Client orchestration
//!
//! The receive path mirrors the transmit path in reverse: interrupt
//! pump -> input buffer -> [`Client::try_receive`] -> SLIP decode ->
//! checksum validation -> dispatch. Reserved commands (SYNC and
//! RESP_CB) are handled internally and swallowed; anything else is
//! surfaced to the caller.

use heapless::Vec;

use ferrolink_hal::BytePort;
use ferrolink_protocol::commands;
use ferrolink_protocol::packet::Packet;
use ferrolink_protocol::request::{ByteSink, Param, RequestEncoder, RequestError};
use ferrolink_protocol::slip::{self, FrameReceiver};

use crate::callbacks::CallbackTable;

/// Receive frame capture capacity in bytes.
pub const FRAME_CAPACITY: usize = 128;

/// Default receive timeout, expressed as a poll-iteration count (no
/// clock on this target; a caller that never polls never times out).
pub const RECEIVE_TIMEOUT: u32 = 50_000;

/// Adapts the transactional port to the encoder's byte sink.
struct PortSink<'p, P: BytePort>(&'p P);

impl<P: BytePort> ByteSink for PortSink<'_, P> {
    fn put(&mut self, byte: u8) -> bool {
        self.0.append(byte)
    }
}

/// Protocol client for one esp-link peer.
pub struct Client<'a, P: BytePort> {
    port: &'a P,
    rx: FrameReceiver<FRAME_CAPACITY>,
    callbacks: CallbackTable,
    /// Guards [`Client::sync`] against re-entry from the dispatch path.
    syncing: bool,
}

impl<'a, P: BytePort> Client<'a, P> {
    pub fn new(port: &'a P) -> Self {
        Self {
            port,
            rx: FrameReceiver::new(),
            callbacks: CallbackTable::new(),
            syncing: false,
        }
    }

    /// Send a request: command code, parameter list, trailing
    /// checksum, all staged as one output transaction and committed
    /// together, so the interrupt-driven transmitter never sees a
    /// partial frame.
    ///
    /// Callback parameters are registered in the table here; the slot
    /// index is what goes on the wire.
    pub fn execute(&mut self, command: u16, params: &[Param<'_>]) -> Result<(), RequestError> {
        let argc: u16 = params.iter().map(Param::slots).sum();
        let mut enc = RequestEncoder::new(PortSink(self.port), command, argc);
        for param in params {
            match *param {
                Param::U8(v) => enc.param_bytes(&v.to_le_bytes()),
                Param::I8(v) => enc.param_bytes(&v.to_le_bytes()),
                Param::U16(v) => enc.param_u16(v),
                Param::I16(v) => enc.param_bytes(&v.to_le_bytes()),
                Param::U32(v) => enc.param_u32(v),
                Param::I32(v) => enc.param_bytes(&v.to_le_bytes()),
                Param::Bool(v) => enc.param_bytes(&[u8::from(v)]),
                Param::Str(s) => enc.param_str(s),
                Param::StrWithLen(s) => enc.param_str_with_len(s),
                Param::Callback(f) => enc.param_u32(self.callbacks.register(f)),
            }
        }
        match enc.finish() {
            Ok(_sink) => {
                self.port.commit();
                Ok(())
            }
            Err(err) => {
                self.port.abort();
                Err(err)
            }
        }
    }

    /// Non-blocking poll: returns the first application-visible packet
    /// decoded from pending input, or `None` when input is exhausted
    /// or the next frame was swallowed (reserved command, bad
    /// checksum). The packet aliases the internal frame buffer and is
    /// valid until the next receive call.
    pub fn try_receive(&mut self) -> Option<Packet<'_>> {
        if self.poll_dispatch() {
            Packet::parse(self.rx.frame()).ok()
        } else {
            None
        }
    }

    /// Bounded busy-poll wrapper around [`Client::try_receive`].
    pub fn receive(&mut self, timeout: u32) -> Option<Packet<'_>> {
        for _ in 0..timeout {
            if self.poll_dispatch() {
                return Packet::parse(self.rx.frame()).ok();
            }
        }
        None
    }

    /// Resynchronization handshake.
    ///
    /// Primes the peer with a readable marker and a bare frame
    /// delimiter, flushes stale input, then sends the SYNC request and
    /// waits for a RESP_V confirmation. Returns `false` when the
    /// bounded receive loop drains without one, or when called
    /// re-entrantly from the dispatch path.
    pub fn sync(&mut self) -> bool {
        if self.syncing {
            return false;
        }
        self.syncing = true;

        self.send_text("sync\n");
        self.clear_input();
        // a raw END forces the peer's decoder to a frame boundary
        self.port.send_byte(slip::END);
        self.clear_input();
        // on backpressure the request never leaves; the receive loop
        // below then times out and reports the failure
        let _ = self.execute(commands::CMD_SYNC, &[]);

        let mut synced = false;
        loop {
            let Some(cmd) = self.receive(RECEIVE_TIMEOUT).map(|p| p.cmd) else {
                break;
            };
            if cmd == commands::CMD_RESP_V {
                synced = true;
                break;
            }
        }

        self.syncing = false;
        synced
    }

    /// Discard all pending input bytes and any partial capture.
    pub fn clear_input(&mut self) {
        while self.port.try_get().is_some() {}
        self.rx.reset();
    }

    /// Send readable text over the line, SLIP-escaped but outside any
    /// frame. Used by the sync handshake and handy for debug prints
    /// that esp-link forwards to its console. Long text goes out in
    /// committed chunks rather than one oversized transaction.
    pub fn send_text(&mut self, text: &str) {
        let port = self.port;
        let mut chunk: Vec<u8, 64> = Vec::new();
        for &byte in text.as_bytes() {
            slip::encode_byte(byte, |b| {
                if chunk.push(b).is_err() {
                    port.send(&chunk);
                    chunk.clear();
                    let _ = chunk.push(b);
                }
            });
        }
        port.send(&chunk);
    }

    /// Drain input until one frame completes; `true` when that frame
    /// should be surfaced to the caller.
    fn poll_dispatch(&mut self) -> bool {
        while self.port.data_available() {
            let byte = self.port.get();
            if !self.rx.feed(byte) {
                continue;
            }
            if self.rx.frame().is_empty() {
                // back-to-back delimiters: idle-line noise and the
                // boundary between a closing and an opening END
                continue;
            }

            let (cmd, value) = match Packet::parse(self.rx.frame()) {
                Ok(packet) => (packet.cmd, packet.value),
                Err(_err) => {
                    // receiver-silent-drop: no retransmission request
                    #[cfg(feature = "defmt")]
                    defmt::warn!("dropping invalid frame: {}", _err);
                    return false;
                }
            };

            match cmd {
                // the peer restarted and wants a fresh handshake
                commands::CMD_SYNC => {
                    self.sync();
                    return false;
                }
                commands::CMD_RESP_CB => {
                    if let Some(callback) = self.callbacks.lookup(value) {
                        if let Ok(packet) = Packet::parse(self.rx.frame()) {
                            callback(&packet);
                        }
                    }
                    return false;
                }
                _ => return true,
            }
        }
        false
    }
}

/// Typed convenience commands. Thin wrappers over
/// [`Client::execute`]; the command codes stay available for anything
/// not covered here.
impl<P: BytePort> Client<'_, P> {
    /// Seconds since the unix epoch, from the peer's clock.
    pub fn get_time(&mut self) -> Option<u32> {
        self.execute(commands::CMD_GET_TIME, &[]).ok()?;
        let packet = self.receive(RECEIVE_TIMEOUT)?;
        (packet.cmd == commands::CMD_RESP_V).then_some(packet.value)
    }

    /// Register the four MQTT event handlers.
    pub fn mqtt_setup(
        &mut self,
        connected: Option<ferrolink_protocol::Callback>,
        disconnected: Option<ferrolink_protocol::Callback>,
        published: Option<ferrolink_protocol::Callback>,
        data: Option<ferrolink_protocol::Callback>,
    ) -> Result<(), RequestError> {
        self.execute(
            commands::CMD_MQTT_SETUP,
            &[
                Param::Callback(connected),
                Param::Callback(disconnected),
                Param::Callback(published),
                Param::Callback(data),
            ],
        )
    }

    /// Publish a message; the payload length is sent both inline and
    /// as a discrete parameter, as the broker side expects.
    pub fn mqtt_publish(
        &mut self,
        topic: &str,
        message: &str,
        qos: u8,
        retain: bool,
    ) -> Result<(), RequestError> {
        self.execute(
            commands::CMD_MQTT_PUBLISH,
            &[
                Param::Str(topic),
                Param::StrWithLen(message),
                Param::U8(qos),
                Param::Bool(retain),
            ],
        )
    }

    pub fn mqtt_subscribe(&mut self, topic: &str, qos: u8) -> Result<(), RequestError> {
        self.execute(
            commands::CMD_MQTT_SUBSCRIBE,
            &[Param::Str(topic), Param::U8(qos)],
        )
    }
}
