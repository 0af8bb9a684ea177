//! Replay of a captured event sequence.
//!
//! `PlaybackEngine::play` walks the sequence in the given order, sleeps the
//! recorded inter-event delay before each injection, and hands each event to
//! the injector. The call blocks the calling thread for the entire replay
//! and is not cancellable once begun; callers needing responsiveness run it
//! on a worker thread. (A cooperative cancellation check between injections
//! is the natural extension point if that ever changes.)
//!
//! Failure model: permission and concurrency conflicts abort the call before
//! any injection. A malformed entry or a failed injection is a diagnostic
//! and a skip, never fatal; the sequence still concludes with a single
//! completion status.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::event::InputEvent;
use crate::hooks::{ActivityFlags, Clock, EventInjector, KeyState, PermissionGate, Synthesis};
use crate::sink::EventSink;

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Outcome of a completed replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackSummary {
    /// Events successfully handed to the injector.
    pub injected: usize,
    /// Entries skipped: malformed, status-kind, or failed injection.
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// Event -> synthesis mapping
// ---------------------------------------------------------------------------

/// The injection a well-formed event calls for; `None` for status events,
/// which are out-of-band and never injected.
fn synthesis_for(event: &InputEvent) -> Option<Synthesis> {
    match event {
        InputEvent::KeyDown(p) => Some(Synthesis::Key {
            key_code: p.key_code,
            state: KeyState::Down,
            modifier_flags: p.modifier_flags,
        }),
        InputEvent::KeyUp(p) => Some(Synthesis::Key {
            key_code: p.key_code,
            state: KeyState::Up,
            modifier_flags: p.modifier_flags,
        }),
        InputEvent::MouseDown(p) => Some(Synthesis::Button {
            button: p.button,
            state: KeyState::Down,
            position: p.position(),
            click_count: p.click_count,
        }),
        InputEvent::MouseUp(p) => Some(Synthesis::Button {
            button: p.button,
            state: KeyState::Up,
            position: p.position(),
            click_count: None,
        }),
        InputEvent::MouseMove(p) => Some(Synthesis::Motion {
            position: p.position(),
            dragged_button: p.dragged_button,
        }),
        InputEvent::MouseWheel(p) => Some(Synthesis::Wheel {
            delta_x: p.delta_x,
            delta_y: p.delta_y,
            phase: p.phase,
            momentum_phase: p.momentum_phase,
        }),
        InputEvent::Status(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Consumes an ordered event sequence and injects equivalent input.
pub struct PlaybackEngine {
    injector: Box<dyn EventInjector>,
    gate: Arc<dyn PermissionGate>,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    activity: Arc<ActivityFlags>,
}

impl PlaybackEngine {
    pub fn new(
        injector: Box<dyn EventInjector>,
        gate: Arc<dyn PermissionGate>,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        activity: Arc<ActivityFlags>,
    ) -> Self {
        Self {
            injector,
            gate,
            sink,
            clock,
            activity,
        }
    }

    /// Replays `entries` (wire-level event records) with recorded timing.
    ///
    /// Aborts with `ConcurrencyConflict` while a recording is active and
    /// with `PermissionDenied` when the capability is missing -- checked
    /// without prompting, so a user who already declined is not re-asked.
    /// Both abort paths emit one explanatory status and inject nothing.
    pub fn play(&self, entries: &[serde_json::Value]) -> Result<PlaybackSummary, Error> {
        if self.activity.is_recording() {
            let msg = "Cannot play events while recording.";
            log::warn!("playback: {msg}");
            self.sink.emit(&InputEvent::status_error(msg));
            return Err(Error::ConcurrencyConflict(msg.into()));
        }

        if !self.gate.is_granted(false) {
            let msg = "Accessibility permissions required for playback.";
            log::warn!("playback: {msg}");
            self.sink.emit(&InputEvent::status_error(msg));
            return Err(Error::PermissionDenied(msg.into()));
        }

        log::info!("playback: replaying {} entries", entries.len());
        self.activity.set_playing(true);
        let summary = self.run(entries);
        self.activity.set_playing(false);

        log::info!(
            "playback: finished, injected {} skipped {}",
            summary.injected,
            summary.skipped
        );
        self.sink
            .emit(&InputEvent::status_message("Playback finished."));
        Ok(summary)
    }

    /// The replay loop. Skips are non-fatal by contract; nothing in here
    /// returns early.
    fn run(&self, entries: &[serde_json::Value]) -> PlaybackSummary {
        let mut summary = PlaybackSummary::default();
        // Timestamp of the last well-formed entry; the delay base. Malformed
        // and status entries never advance it.
        let mut prev_ts: Option<i64> = None;

        for entry in entries {
            let event: InputEvent = match serde_json::from_value(entry.clone()) {
                Ok(event) => event,
                Err(err) => {
                    log::warn!("playback: skipping malformed event: {err}");
                    summary.skipped += 1;
                    continue;
                }
            };

            let Some(timestamp) = event.timestamp_millis() else {
                log::debug!("playback: skipping status entry");
                summary.skipped += 1;
                continue;
            };

            // Honor the recorded inter-event delay. The first event plays
            // immediately; a non-positive delay (out-of-order or duplicate
            // timestamp) injects immediately rather than waiting backwards.
            if let Some(prev) = prev_ts {
                let delay_ms = timestamp - prev;
                if delay_ms > 0 {
                    self.clock.sleep(Duration::from_millis(delay_ms as u64));
                }
            }
            prev_ts = Some(timestamp);

            let Some(synthesis) = synthesis_for(&event) else {
                // Unreachable for timestamped kinds; kept for totality.
                summary.skipped += 1;
                continue;
            };

            match self.injector.inject(&synthesis) {
                Ok(()) => summary.injected += 1,
                Err(err) => {
                    log::warn!(
                        "playback: injection failed for {}: {err}",
                        event.type_name()
                    );
                    summary.skipped += 1;
                }
            }
        }

        summary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
