//! Inbound operation surface for the external transport.
//!
//! Maps transport requests 1:1 onto the core operations: start/stop
//! recording, play a captured sequence, check the capability. Outbound
//! events flow through whatever `EventSink` the gateway was built over; the
//! sink receives them strictly in production order.

use std::sync::{Arc, Mutex, PoisonError};

use crate::capture::CaptureSession;
use crate::config::Config;
use crate::error::Error;
use crate::hooks::{ActivityFlags, Clock, EventInjector, InputMonitor, PermissionGate};
use crate::playback::{PlaybackEngine, PlaybackSummary};
use crate::sink::EventSink;

/// Front door of the record/replay core.
///
/// Owns the capture session and playback engine over one shared pair of
/// activity flags, so the mutual-exclusion checks in both see each other.
pub struct Gateway {
    capture: Mutex<CaptureSession>,
    playback: PlaybackEngine,
    gate: Arc<dyn PermissionGate>,
}

impl Gateway {
    /// Wires a gateway over injected platform capabilities.
    pub fn new(
        monitor: Box<dyn InputMonitor>,
        injector: Box<dyn EventInjector>,
        gate: Arc<dyn PermissionGate>,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        let activity = Arc::new(ActivityFlags::new());
        let capture = CaptureSession::new(
            monitor,
            Arc::clone(&gate),
            Arc::clone(&sink),
            Arc::clone(&clock),
            Arc::clone(&activity),
            &config.capture,
        );
        let playback = PlaybackEngine::new(injector, Arc::clone(&gate), sink, clock, activity);
        Self {
            capture: Mutex::new(capture),
            playback,
            gate,
        }
    }

    /// Starts a recording session.
    pub fn start_recording(&self) -> Result<(), Error> {
        self.capture
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .start()
    }

    /// Stops the recording session. Always succeeds; stopping an idle
    /// session is a no-op that still confirms via a status event.
    pub fn stop_recording(&self) {
        self.capture
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stop();
    }

    /// Replays a sequence of wire-level event records.
    ///
    /// The payload must be a JSON array of event records; anything else is
    /// rejected as `InvalidInput` before any processing. Individual
    /// malformed entries inside a valid array are skipped, not fatal.
    pub fn play_events(&self, payload: &serde_json::Value) -> Result<PlaybackSummary, Error> {
        let entries = payload.as_array().ok_or_else(|| {
            Error::InvalidInput("playEvents expects an array of event records".into())
        })?;
        self.playback.play(entries)
    }

    /// Reports the current capability status without prompting.
    pub fn check_accessibility(&self) -> bool {
        self.gate.is_granted(false)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
