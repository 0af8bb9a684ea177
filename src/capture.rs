//! Recording session: raw notifications in, canonical events out.
//!
//! `CaptureSession` owns the Idle/Active state machine. `start()` checks the
//! permission gate (prompting the user if needed), installs the monitor
//! hooks, and from then on normalizes every raw notification into an
//! `InputEvent`, throttles motion-class notifications, and forwards the rest
//! to the sink. `stop()` flips the activity flag before removing hooks so a
//! notification racing the shutdown is either fully processed or fully
//! dropped, never delivered half-way.
//!
//! Known fidelity gap, accepted by design: raw "modifier flags changed"
//! notifications are dropped because a bare modifier tap cannot be reliably
//! classified as press or release from the flags alone. Modifier state is
//! instead exposed on every key event through the derived booleans, so a
//! standalone modifier tap produces no event.

use std::sync::{Arc, Mutex};

use crate::config::CaptureConfig;
use crate::error::Error;
use crate::event::{
    modifier, ButtonPayload, InputEvent, KeyPayload, MotionPayload, WheelPayload,
};
use crate::hooks::{ActivityFlags, Clock, InputMonitor, KeyState, PermissionGate, RawEvent};
use crate::keycodes;
use crate::sink::EventSink;

// ---------------------------------------------------------------------------
// Motion throttle
// ---------------------------------------------------------------------------

/// Time-based throttle for motion-class notifications.
///
/// A notification closer than `interval_ms` to the last *forwarded* one is
/// dropped entirely -- not queued, not coalesced. The first notification is
/// always admitted. Throttling is by elapsed time only, not by distance
/// moved; near-stationary high-frequency motion is forwarded like any other.
#[derive(Debug)]
pub struct MotionThrottle {
    interval_ms: i64,
    last_forwarded_ms: Option<i64>,
}

impl MotionThrottle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms as i64,
            last_forwarded_ms: None,
        }
    }

    /// Returns whether a notification at `now_ms` may be forwarded, and if
    /// so marks it as the new reference point.
    pub fn admit(&mut self, now_ms: i64) -> bool {
        match self.last_forwarded_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_forwarded_ms = Some(now_ms);
                true
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Builds the canonical event for a raw notification, stamped at `now_ms`.
///
/// Returns `None` for notifications this design does not translate
/// (bare modifier-flag changes; see the module doc).
pub fn normalize(raw: RawEvent, now_ms: i64) -> Option<InputEvent> {
    match raw {
        RawEvent::FlagsChanged { key_code, .. } => {
            log::debug!("capture: dropping flags-changed for key code {key_code}");
            None
        }
        RawEvent::Key {
            state,
            key_code,
            characters,
            characters_ignoring_modifiers,
            is_repeat,
            modifier_flags,
        } => {
            let payload = KeyPayload {
                key_code,
                key: keycodes::name_for(key_code),
                characters,
                characters_ignoring_modifiers,
                is_a_repeat: is_repeat,
                modifier_flags,
                is_ctrl_pressed: modifier_flags & modifier::CONTROL != 0,
                is_shift_pressed: modifier_flags & modifier::SHIFT != 0,
                is_alt_pressed: modifier_flags & modifier::ALT != 0,
                is_cmd_pressed: modifier_flags & modifier::META != 0,
                timestamp: now_ms,
            };
            Some(match state {
                KeyState::Down => InputEvent::KeyDown(payload),
                KeyState::Up => InputEvent::KeyUp(payload),
            })
        }
        RawEvent::Button {
            state,
            button,
            click_count,
            local,
            global,
            modifier_flags,
        } => {
            let payload = ButtonPayload {
                button,
                // Click count matters for reproducing multi-click gestures
                // and is only meaningful on the press.
                click_count: (state == KeyState::Down).then_some(click_count),
                x: local.x,
                y: local.y,
                x_global: Some(global.x),
                y_global: Some(global.y),
                modifier_flags,
                timestamp: now_ms,
            };
            Some(match state {
                KeyState::Down => InputEvent::MouseDown(payload),
                KeyState::Up => InputEvent::MouseUp(payload),
            })
        }
        RawEvent::Motion {
            local,
            global,
            dragged_button,
            pressure,
            modifier_flags,
        } => Some(InputEvent::MouseMove(MotionPayload {
            x: local.x,
            y: local.y,
            x_global: Some(global.x),
            y_global: Some(global.y),
            dragged_button,
            pressure,
            modifier_flags,
            timestamp: now_ms,
        })),
        RawEvent::Wheel {
            delta_x,
            delta_y,
            has_precise_deltas,
            phase,
            momentum_phase,
        } => Some(InputEvent::MouseWheel(WheelPayload {
            delta_x,
            delta_y,
            has_precise_scrolling_deltas: has_precise_deltas,
            phase,
            momentum_phase,
            timestamp: now_ms,
        })),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Owns the recording state machine and the monitor hooks.
pub struct CaptureSession {
    monitor: Box<dyn InputMonitor>,
    gate: Arc<dyn PermissionGate>,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    activity: Arc<ActivityFlags>,
    throttle_ms: u64,
}

impl CaptureSession {
    pub fn new(
        monitor: Box<dyn InputMonitor>,
        gate: Arc<dyn PermissionGate>,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        activity: Arc<ActivityFlags>,
        config: &CaptureConfig,
    ) -> Self {
        Self {
            monitor,
            gate,
            sink,
            clock,
            activity,
            throttle_ms: config.motion_throttle_ms,
        }
    }

    /// Idle -> Active.
    ///
    /// Prompts for the capability if it is not yet granted; on denial emits
    /// one status error and stays Idle. Calling `start` on an already active
    /// session is a no-op. Fails with `ConcurrencyConflict` while a playback
    /// is in progress.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.activity.is_recording() {
            log::debug!("capture: start ignored, already recording");
            return Ok(());
        }

        if self.activity.is_playing() {
            let msg = "Cannot start recording during playback.";
            self.sink.emit(&InputEvent::status_error(msg));
            return Err(Error::ConcurrencyConflict(msg.into()));
        }

        if !self.gate.is_granted(true) {
            let msg = "Accessibility permissions required.";
            log::warn!("capture: {msg}");
            self.sink.emit(&InputEvent::status_error(msg));
            return Err(Error::PermissionDenied(msg.into()));
        }

        // Flag first: the callback consults it before every emit, so events
        // observed between hook installation and this store are impossible.
        self.activity.set_recording(true);

        let activity = Arc::clone(&self.activity);
        let sink = Arc::clone(&self.sink);
        let clock = Arc::clone(&self.clock);
        let throttle = Mutex::new(MotionThrottle::new(self.throttle_ms));

        let callback = Box::new(move |raw: RawEvent| {
            // Runs on the adapter's delivery thread; must stay quick and
            // never block beyond the throttle mutex (uncontended).
            if !activity.is_recording() {
                return;
            }
            let now_ms = clock.now_millis();
            if raw.is_motion_class() {
                let admitted = match throttle.lock() {
                    Ok(mut guard) => guard.admit(now_ms),
                    Err(poisoned) => poisoned.into_inner().admit(now_ms),
                };
                if !admitted {
                    return;
                }
            }
            let Some(event) = normalize(raw, now_ms) else {
                return;
            };
            // Re-check after the work above: a stop() racing this
            // notification means the event is dropped, not delivered.
            if !activity.is_recording() {
                return;
            }
            sink.emit(&event);
        });

        match self.monitor.start(callback) {
            Ok(()) => {
                log::info!("capture: hooks installed, recording");
                self.sink
                    .emit(&InputEvent::status_message("Recording started successfully."));
                Ok(())
            }
            Err(err) => {
                self.activity.set_recording(false);
                log::warn!("capture: monitor failed to start: {err}");
                self.sink
                    .emit(&InputEvent::status_error(format!("Recording failed to start: {err}")));
                Err(err.into())
            }
        }
    }

    /// Active -> Idle. Idempotent: stopping an idle session removes no hooks
    /// but still emits exactly one confirming status event.
    pub fn stop(&mut self) {
        if self.activity.is_recording() {
            self.release_hooks();
        }
        self.sink
            .emit(&InputEvent::status_message("Recording stopped."));
    }

    /// True while the session is Active.
    pub fn is_active(&self) -> bool {
        self.activity.is_recording()
    }

    /// Flips the flag, then removes hooks. The ordering guarantees a racing
    /// notification sees Idle before hook removal completes.
    fn release_hooks(&mut self) {
        self.activity.set_recording(false);
        if let Err(err) = self.monitor.stop() {
            log::warn!("capture: monitor failed to stop cleanly: {err}");
        }
        log::info!("capture: hooks removed");
    }
}

impl Drop for CaptureSession {
    /// Hooks acquired in `start()` must be released on every exit path from
    /// Active, including teardown. No status is emitted here; the sink may
    /// already be gone.
    fn drop(&mut self) {
        if self.activity.is_recording() {
            self.release_hooks();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformError;
    use crate::event::{MouseButton, Point, StatusPayload};
    use crate::sink::MemorySink;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::time::Duration;

    // -- fakes -------------------------------------------------------------

    type SharedCallback = Arc<Mutex<Option<Box<dyn Fn(RawEvent) + Send + Sync>>>>;

    /// Monitor fake that hands the installed callback to the test so raw
    /// notifications can be fired deterministically.
    #[derive(Default)]
    struct FakeMonitorState {
        callback: SharedCallback,
        starts: AtomicUsize,
        stops: AtomicUsize,
    }

    impl FakeMonitorState {
        fn fire(&self, raw: RawEvent) {
            // Hold the installed callback across the call, as the adapter
            // delivery thread would.
            if let Ok(guard) = self.callback.lock() {
                if let Some(cb) = guard.as_ref() {
                    cb(raw);
                }
            }
        }
    }

    struct FakeMonitor(Arc<FakeMonitorState>);

    impl InputMonitor for FakeMonitor {
        fn start(
            &mut self,
            callback: Box<dyn Fn(RawEvent) + Send + Sync>,
        ) -> Result<(), PlatformError> {
            self.0.starts.fetch_add(1, Ordering::SeqCst);
            *self.0.callback.lock().unwrap() = Some(callback);
            Ok(())
        }

        fn stop(&mut self) -> Result<(), PlatformError> {
            self.0.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FakeGate {
        granted: bool,
        prompts: AtomicUsize,
    }

    impl FakeGate {
        fn new(granted: bool) -> Self {
            Self {
                granted,
                prompts: AtomicUsize::new(0),
            }
        }
    }

    impl PermissionGate for FakeGate {
        fn is_granted(&self, prompt_user: bool) -> bool {
            if prompt_user {
                self.prompts.fetch_add(1, Ordering::SeqCst);
            }
            self.granted
        }
    }

    struct ManualClock {
        now_ms: AtomicI64,
    }

    impl ManualClock {
        fn at(start_ms: i64) -> Self {
            Self {
                now_ms: AtomicI64::new(start_ms),
            }
        }

        fn advance(&self, delta_ms: i64) {
            self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.now_ms.load(Ordering::SeqCst)
        }

        fn sleep(&self, _duration: Duration) {}
    }

    fn raw_motion(x: i32, y: i32) -> RawEvent {
        RawEvent::Motion {
            local: Point { x, y },
            global: Point { x, y },
            dragged_button: None,
            pressure: 0.0,
            modifier_flags: 0,
        }
    }

    fn raw_key_down(key_code: u16, modifier_flags: u64) -> RawEvent {
        RawEvent::Key {
            state: KeyState::Down,
            key_code,
            characters: String::new(),
            characters_ignoring_modifiers: String::new(),
            is_repeat: false,
            modifier_flags,
        }
    }

    struct Harness {
        session: CaptureSession,
        monitor: Arc<FakeMonitorState>,
        sink: Arc<MemorySink>,
        clock: Arc<ManualClock>,
        gate: Arc<FakeGate>,
        activity: Arc<ActivityFlags>,
    }

    fn harness(granted: bool) -> Harness {
        let monitor = Arc::new(FakeMonitorState::default());
        let sink = Arc::new(MemorySink::new());
        let clock = Arc::new(ManualClock::at(1_000));
        let gate = Arc::new(FakeGate::new(granted));
        let activity = Arc::new(ActivityFlags::new());
        let session = CaptureSession::new(
            Box::new(FakeMonitor(Arc::clone(&monitor))),
            Arc::clone(&gate) as Arc<dyn PermissionGate>,
            Arc::clone(&sink) as Arc<dyn EventSink>,
            Arc::clone(&clock) as Arc<dyn Clock>,
            Arc::clone(&activity),
            &CaptureConfig::default(),
        );
        Harness {
            session,
            monitor,
            sink,
            clock,
            gate,
            activity,
        }
    }

    fn statuses(sink: &MemorySink) -> Vec<StatusPayload> {
        sink.events()
            .into_iter()
            .filter_map(|e| match e {
                InputEvent::Status(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    // -- throttle ----------------------------------------------------------

    #[test]
    fn throttle_admits_first_and_then_spaced_notifications() {
        let mut throttle = MotionThrottle::new(16);
        assert!(throttle.admit(0));
        assert!(!throttle.admit(5));
        assert!(!throttle.admit(10));
        assert!(throttle.admit(20));
    }

    #[test]
    fn throttle_reference_is_last_forwarded_not_last_seen() {
        let mut throttle = MotionThrottle::new(16);
        assert!(throttle.admit(0));
        // Dropped notifications must not push the reference point forward.
        assert!(!throttle.admit(15));
        assert!(throttle.admit(16));
    }

    // -- normalization -----------------------------------------------------

    #[test]
    fn key_normalization_derives_name_and_booleans() {
        let raw = raw_key_down(0, modifier::SHIFT | modifier::META);
        let event = normalize(raw, 42).unwrap();
        let InputEvent::KeyDown(payload) = event else {
            panic!("expected keyDown");
        };
        assert_eq!(payload.key, "A");
        assert_eq!(payload.timestamp, 42);
        assert!(payload.is_shift_pressed);
        assert!(payload.is_cmd_pressed);
        assert!(!payload.is_ctrl_pressed);
        assert!(payload.modifiers_consistent());
    }

    #[test]
    fn flags_changed_is_not_translated() {
        let raw = RawEvent::FlagsChanged {
            key_code: 56,
            modifier_flags: modifier::SHIFT,
        };
        assert_eq!(normalize(raw, 0), None);
    }

    #[test]
    fn button_up_carries_no_click_count() {
        let raw = RawEvent::Button {
            state: KeyState::Up,
            button: MouseButton::Left,
            click_count: 1,
            local: Point { x: 1, y: 2 },
            global: Point { x: 3, y: 4 },
            modifier_flags: 0,
        };
        let InputEvent::MouseUp(payload) = normalize(raw, 0).unwrap() else {
            panic!("expected mouseUp");
        };
        assert_eq!(payload.click_count, None);
        assert_eq!(payload.x_global, Some(3));
    }

    // -- session lifecycle -------------------------------------------------

    #[test]
    fn denied_permission_keeps_session_idle() {
        let mut h = harness(false);
        let result = h.session.start();
        assert!(matches!(result, Err(Error::PermissionDenied(_))));
        assert!(!h.session.is_active());
        // Exactly one explanatory status, no hooks touched.
        let statuses = statuses(&h.sink);
        assert_eq!(statuses.len(), 1);
        assert!(statuses[0].error.is_some());
        assert_eq!(h.monitor.starts.load(Ordering::SeqCst), 0);
        // start() prompts the user (playback never does).
        assert_eq!(h.gate.prompts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn start_installs_hooks_and_confirms() {
        let mut h = harness(true);
        h.session.start().unwrap();
        assert!(h.session.is_active());
        assert_eq!(h.monitor.starts.load(Ordering::SeqCst), 1);
        let statuses = statuses(&h.sink);
        assert_eq!(statuses.len(), 1);
        assert_eq!(
            statuses[0].message.as_deref(),
            Some("Recording started successfully.")
        );
    }

    #[test]
    fn start_twice_is_a_noop() {
        let mut h = harness(true);
        h.session.start().unwrap();
        h.session.start().unwrap();
        assert_eq!(h.monitor.starts.load(Ordering::SeqCst), 1);
        assert_eq!(statuses(&h.sink).len(), 1);
    }

    #[test]
    fn start_during_playback_is_a_conflict() {
        let mut h = harness(true);
        h.activity.set_playing(true);
        let result = h.session.start();
        assert!(matches!(result, Err(Error::ConcurrencyConflict(_))));
        assert_eq!(h.monitor.starts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn captured_key_events_reach_the_sink_with_timestamps() {
        let mut h = harness(true);
        h.session.start().unwrap();
        h.monitor.fire(raw_key_down(0, 0));
        h.clock.advance(50);
        h.monitor.fire(raw_key_down(1, 0));

        let events: Vec<_> = h
            .sink
            .events()
            .into_iter()
            .filter(|e| !matches!(e, InputEvent::Status(_)))
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp_millis(), Some(1_000));
        assert_eq!(events[1].timestamp_millis(), Some(1_050));
    }

    /// Motion at t, t+5, t+10, t+20 with a 16 ms window: only t and t+20
    /// are forwarded.
    #[test]
    fn motion_is_throttled_by_elapsed_time() {
        let mut h = harness(true);
        h.session.start().unwrap();

        h.monitor.fire(raw_motion(0, 0));
        h.clock.advance(5);
        h.monitor.fire(raw_motion(1, 1));
        h.clock.advance(5);
        h.monitor.fire(raw_motion(2, 2));
        h.clock.advance(10);
        h.monitor.fire(raw_motion(3, 3));

        let moves: Vec<_> = h
            .sink
            .events()
            .into_iter()
            .filter(|e| matches!(e, InputEvent::MouseMove(_)))
            .collect();
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].timestamp_millis(), Some(1_000));
        assert_eq!(moves[1].timestamp_millis(), Some(1_020));
    }

    #[test]
    fn key_events_are_never_throttled() {
        let mut h = harness(true);
        h.session.start().unwrap();
        for _ in 0..5 {
            h.monitor.fire(raw_key_down(0, 0));
            h.clock.advance(1);
        }
        let keys = h
            .sink
            .events()
            .into_iter()
            .filter(|e| matches!(e, InputEvent::KeyDown(_)))
            .count();
        assert_eq!(keys, 5);
    }

    #[test]
    fn stop_removes_hooks_once_and_confirms() {
        let mut h = harness(true);
        h.session.start().unwrap();
        h.session.stop();
        assert!(!h.session.is_active());
        assert_eq!(h.monitor.stops.load(Ordering::SeqCst), 1);
        let statuses = statuses(&h.sink);
        assert_eq!(statuses.last().unwrap().message.as_deref(), Some("Recording stopped."));
    }

    /// Stopping an idle session is a no-op that still emits exactly one
    /// status event and removes no hooks.
    #[test]
    fn stop_on_idle_session_is_idempotent() {
        let mut h = harness(true);
        h.session.stop();
        assert_eq!(h.monitor.stops.load(Ordering::SeqCst), 0);
        assert_eq!(statuses(&h.sink).len(), 1);

        h.session.start().unwrap();
        h.session.stop();
        h.session.stop();
        // One stop per call, but hooks came out only once.
        assert_eq!(h.monitor.stops.load(Ordering::SeqCst), 1);
    }

    /// A notification racing `stop()` must be discarded, not delivered.
    #[test]
    fn events_after_stop_are_discarded() {
        let mut h = harness(true);
        h.session.start().unwrap();
        h.session.stop();
        let before = h.sink.len();
        // The fake monitor still holds the callback; a real adapter could
        // deliver one last notification while hooks are coming out.
        h.monitor.fire(raw_key_down(0, 0));
        assert_eq!(h.sink.len(), before);
    }

    #[test]
    fn drop_releases_hooks_without_status() {
        let h = harness(true);
        let monitor = Arc::clone(&h.monitor);
        let sink = Arc::clone(&h.sink);
        let mut session = h.session;
        session.start().unwrap();
        let statuses_before = statuses(&sink).len();
        drop(session);
        assert_eq!(monitor.stops.load(Ordering::SeqCst), 1);
        assert_eq!(statuses(&sink).len(), statuses_before);
    }
}
