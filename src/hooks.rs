//! Injected platform capabilities.
//!
//! The OS-specific hook/inject primitives are not implemented here; they are
//! supplied to the engines as trait objects at construction. This keeps the
//! record/replay core testable with deterministic fakes and leaves the
//! OS-level observation and injection surfaces to per-platform adapters.
//!
//! Coordinate contract for adapters: `Point` values are global-space with a
//! single fixed origin and axis orientation. An adapter whose OS uses a
//! flipped axis performs the flip on its side of the boundary.

use std::time::Duration;

use crate::error::PlatformError;
use crate::event::{MouseButton, Point, ScrollPhase};

// ---------------------------------------------------------------------------
// Raw notifications (capture side)
// ---------------------------------------------------------------------------

/// Press/release direction of a key or button notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Down,
    Up,
}

/// An un-normalized input notification delivered by a monitor adapter.
///
/// Carries no timestamp; the capture session stamps events from its own
/// clock so that recorded delays share one time base.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    /// Discrete key press or release.
    Key {
        state: KeyState,
        key_code: u16,
        characters: String,
        characters_ignoring_modifiers: String,
        is_repeat: bool,
        modifier_flags: u64,
    },
    /// A modifier changed with no accompanying key event. Press/release
    /// cannot be reliably inferred from the flags alone, so the session
    /// drops these; modifier state rides on every other event instead.
    FlagsChanged { key_code: u16, modifier_flags: u64 },
    /// Button press or release.
    Button {
        state: KeyState,
        button: MouseButton,
        click_count: i64,
        local: Point,
        global: Point,
        modifier_flags: u64,
    },
    /// Pointer motion, a drag when `dragged_button` is set.
    Motion {
        local: Point,
        global: Point,
        dragged_button: Option<MouseButton>,
        pressure: f64,
        modifier_flags: u64,
    },
    /// Scroll wheel or trackpad scroll gesture.
    Wheel {
        delta_x: f64,
        delta_y: f64,
        has_precise_deltas: bool,
        phase: ScrollPhase,
        momentum_phase: ScrollPhase,
    },
}

impl RawEvent {
    /// Motion-class notifications (motion and all drag variants) are the
    /// only ones subject to throttling.
    pub fn is_motion_class(&self) -> bool {
        matches!(self, RawEvent::Motion { .. })
    }
}

// ---------------------------------------------------------------------------
// Synthesized events (playback side)
// ---------------------------------------------------------------------------

/// An input event to synthesize, as handed to the injector.
#[derive(Debug, Clone, PartialEq)]
pub enum Synthesis {
    /// Key press/release with the originally recorded modifier bitmask.
    Key {
        key_code: u16,
        state: KeyState,
        modifier_flags: u64,
    },
    /// Button press/release at a global position. `click_count` is present
    /// on presses so multi-click gestures replay as such.
    Button {
        button: MouseButton,
        state: KeyState,
        position: Point,
        click_count: Option<i64>,
    },
    /// Motion or drag at a global position; when `dragged_button` is set the
    /// synthesized event must reflect that button as held.
    Motion {
        position: Point,
        dragged_button: Option<MouseButton>,
    },
    /// Scroll by the recorded deltas. Injectors whose surface has no phase
    /// concept drop the phase metadata without failing the event.
    Wheel {
        delta_x: f64,
        delta_y: f64,
        phase: ScrollPhase,
        momentum_phase: ScrollPhase,
    },
}

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// OS authorization for global observation and injection.
pub trait PermissionGate: Send + Sync {
    /// Returns whether the capability is granted. With `prompt_user` the
    /// gate may trigger the OS consent flow for a not-yet-granted
    /// capability; without it the call only inspects current status.
    fn is_granted(&self, prompt_user: bool) -> bool;
}

/// Global input observation surface.
///
/// `start` installs the OS hooks and delivers every raw notification to the
/// callback. Notifications arrive serialized (one at a time) on an adapter
/// thread; the callback must return quickly and never block, since stalling
/// here stalls input delivery to the whole system. `stop` removes the hooks
/// and must be callable from a different thread than the one delivering
/// notifications.
pub trait InputMonitor: Send {
    fn start(
        &mut self,
        callback: Box<dyn Fn(RawEvent) + Send + Sync>,
    ) -> Result<(), PlatformError>;

    fn stop(&mut self) -> Result<(), PlatformError>;
}

/// Global input injection surface.
pub trait EventInjector: Send + Sync {
    fn inject(&self, synthesis: &Synthesis) -> Result<(), PlatformError>;
}

/// Time source and suspension point.
///
/// Capture stamps event timestamps from `now_millis`; playback realizes
/// inter-event delays through `sleep`. One seam for both lets tests replay
/// deterministically with a manual clock.
pub trait Clock: Send + Sync {
    /// Milliseconds on the capture-time clock. Only differences between two
    /// readings are meaningful.
    fn now_millis(&self) -> i64;

    /// Blocks the calling thread for the given duration. Millisecond
    /// precision is required; sub-millisecond precision is not guaranteed.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation of [`Clock`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_millis() as i64,
            // Clock before the epoch: saturate rather than panic.
            Err(_) => 0,
        }
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ---------------------------------------------------------------------------
// Mutual-exclusion state
// ---------------------------------------------------------------------------

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared recording/playing flags.
///
/// The only mutable state shared between the capture session and the
/// playback engine. Mutual exclusion is a precondition check against these
/// flags, not a lock: callers that race `start()` against `play()` from
/// separate threads must serialize those requests themselves.
#[derive(Debug, Default)]
pub struct ActivityFlags {
    recording: AtomicBool,
    playing: AtomicBool,
}

impl ActivityFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// SeqCst so the transition is visible to the notification path before
    /// any hook-removal side effect completes.
    pub fn set_recording(&self, active: bool) {
        self.recording.store(active, Ordering::SeqCst);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn set_playing(&self, active: bool) {
        self.playing.store(active, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
