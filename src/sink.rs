//! Event sink boundary.
//!
//! `EventSink` is the seam between the core and whatever transport carries
//! events to a consumer (a GUI shell, an IPC channel, a file writer). The
//! core emits events strictly in the order it produced them and assumes
//! nothing else about delivery.

use std::sync::Mutex;

use crate::event::InputEvent;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Outbound delivery of captured events and status signals.
///
/// Called by the capture session for every forwarded event and by the
/// playback engine for its terminal status. Implementations must not block:
/// `emit` runs on the notification-delivery path during capture.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &InputEvent);
}

// ---------------------------------------------------------------------------
// Channel-backed sink
// ---------------------------------------------------------------------------

/// Forwards events into a crossbeam channel whose receiver is owned by the
/// external transport.
pub struct ChannelSink {
    sender: crossbeam_channel::Sender<InputEvent>,
}

impl ChannelSink {
    /// Returns the sink and the receiver for the transport side.
    pub fn unbounded() -> (Self, crossbeam_channel::Receiver<InputEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &InputEvent) {
        // A dropped receiver means the transport went away; events produced
        // after that point are discarded, not an error.
        if self.sender.send(event.clone()).is_err() {
            log::debug!("sink: receiver dropped, discarding {}", event.type_name());
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory sink
// ---------------------------------------------------------------------------

/// Records every emitted event in memory.
///
/// The substitutable recording sink: lets tests and tooling observe the
/// exact event stream without any transport or OS hook involved.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<InputEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in emission order.
    pub fn events(&self) -> Vec<InputEvent> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.events.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &InputEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
