//! Fixed-size asynchronous-callback registry
//!
//! Callback parameters are never sent as raw addresses: the handler is
//! stored here and the 32-bit slot index travels on the wire instead,
//! so a confused peer cannot make the client jump to arbitrary code.
//!
//! Slot 0 is never assigned; registration scans from slot 1. The peer
//! protocol has always behaved this way and existing firmware may key
//! on it, so the quirk is preserved (see the workspace DESIGN notes).

use ferrolink_protocol::Callback;

/// Number of callback slots.
pub const CALLBACK_SLOTS: usize = 8;

/// Sentinel index meaning "no callback": returned for an empty
/// handler or a full table, and never dispatched by the client.
pub const NO_CALLBACK: u32 = CALLBACK_SLOTS as u32;

/// Fixed array of response handlers, indexed by the wire value field.
#[derive(Debug, Clone, Default)]
pub struct CallbackTable {
    slots: [Option<Callback>; CALLBACK_SLOTS],
}

impl CallbackTable {
    pub const fn new() -> Self {
        Self {
            slots: [None; CALLBACK_SLOTS],
        }
    }

    /// Store a handler in the first free slot (scanning from slot 1)
    /// and return its index, or [`NO_CALLBACK`] when the handler is
    /// `None` or the table is full.
    pub fn register(&mut self, callback: Option<Callback>) -> u32 {
        let Some(callback) = callback else {
            return NO_CALLBACK;
        };
        for index in 1..CALLBACK_SLOTS {
            if self.slots[index].is_none() {
                self.slots[index] = Some(callback);
                return index as u32;
            }
        }
        NO_CALLBACK
    }

    /// The handler at `index`, if the index is in range and occupied.
    pub fn lookup(&self, index: u32) -> Option<Callback> {
        self.slots.get(index as usize).copied().flatten()
    }

    /// Free a slot. The wire protocol never releases slots; this
    /// exists for long-running hosts that tear sessions down.
    pub fn release(&mut self, index: u32) {
        if let Some(slot) = self.slots.get_mut(index as usize) {
            *slot = None;
        }
    }
}
