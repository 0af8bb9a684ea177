//! Canonical input event model and its wire representation.
//!
//! `InputEvent` is the immutable value exchanged between capture, playback,
//! and the sink boundary. It serializes as a tagged `{type, details}` record;
//! field names are the wire contract: every field the playback engine reads
//! is named exactly as capture emits it, so a captured stream round-trips
//! into a play request unchanged.
//!
//! Timestamps are milliseconds from the capture-time clock and are only ever
//! used for relative delay computation. Status events carry no timestamp;
//! they are out-of-band signals and never part of a replay sequence.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Modifier bitmask
// ---------------------------------------------------------------------------

/// Modifier bit positions within `modifierFlags`.
///
/// The device convention of the capture source. The four derived booleans on
/// key payloads are redundant with these bits by design and must stay
/// consistent: a bit test must equal the boolean.
pub mod modifier {
    pub const SHIFT: u64 = 1 << 17;
    pub const CONTROL: u64 = 1 << 18;
    pub const ALT: u64 = 1 << 19;
    pub const META: u64 = 1 << 20;
}

// ---------------------------------------------------------------------------
// Shared scalar types
// ---------------------------------------------------------------------------

/// A position in the global input space (single fixed origin and axis
/// orientation; any flip required by a given OS is the adapter's problem).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Mouse button identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Trackpad gesture lifecycle marker on wheel events.
///
/// `phase` describes active scrolling; the same values reused as
/// `momentumPhase` describe post-release inertial continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollPhase {
    Began,
    Changed,
    Ended,
    Cancelled,
    MayBegin,
    #[default]
    None,
}

// ---------------------------------------------------------------------------
// Kind-specific payloads
// ---------------------------------------------------------------------------

/// Payload of `keyDown` / `keyUp` records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPayload {
    /// Physical key code as reported by the device.
    #[serde(rename = "keyCode")]
    pub key_code: u16,
    /// Symbolic name derived from the key code table.
    pub key: String,
    /// Raw character(s) produced by the key press, if any.
    #[serde(default)]
    pub characters: String,
    #[serde(rename = "charactersIgnoringModifiers", default)]
    pub characters_ignoring_modifiers: String,
    #[serde(rename = "isARepeat", default)]
    pub is_a_repeat: bool,
    #[serde(rename = "modifierFlags")]
    pub modifier_flags: u64,
    // Derived modifier booleans, redundant with the bitmask for consumer
    // convenience. Invariant: each equals the corresponding bit test.
    pub is_ctrl_pressed: bool,
    pub is_shift_pressed: bool,
    pub is_alt_pressed: bool,
    pub is_cmd_pressed: bool,
    /// Capture-time clock, milliseconds.
    pub timestamp: i64,
}

impl KeyPayload {
    /// True when every derived boolean matches its bit in `modifierFlags`.
    pub fn modifiers_consistent(&self) -> bool {
        self.is_ctrl_pressed == (self.modifier_flags & modifier::CONTROL != 0)
            && self.is_shift_pressed == (self.modifier_flags & modifier::SHIFT != 0)
            && self.is_alt_pressed == (self.modifier_flags & modifier::ALT != 0)
            && self.is_cmd_pressed == (self.modifier_flags & modifier::META != 0)
    }
}

/// Payload of `mouseDown` / `mouseUp` records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonPayload {
    pub button: MouseButton,
    /// Down events only; reproduces multi-click gestures on replay.
    #[serde(rename = "clickCount", default, skip_serializing_if = "Option::is_none")]
    pub click_count: Option<i64>,
    /// Window-local position.
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// Global position; playback falls back to the local fields when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_global: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_global: Option<i32>,
    #[serde(rename = "modifierFlags", default)]
    pub modifier_flags: u64,
    pub timestamp: i64,
}

impl ButtonPayload {
    /// Injection position: global space when recorded, local fallback.
    pub fn position(&self) -> Point {
        Point {
            x: self.x_global.unwrap_or(self.x),
            y: self.y_global.unwrap_or(self.y),
        }
    }
}

/// Payload of `mouseMove` records (plain motion and button drags).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionPayload {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_global: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_global: Option<i32>,
    /// Present when the motion occurred while a button was held.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dragged_button: Option<MouseButton>,
    /// 0.0 when the device reports no pressure.
    #[serde(default)]
    pub pressure: f64,
    #[serde(rename = "modifierFlags", default)]
    pub modifier_flags: u64,
    pub timestamp: i64,
}

impl MotionPayload {
    pub fn position(&self) -> Point {
        Point {
            x: self.x_global.unwrap_or(self.x),
            y: self.y_global.unwrap_or(self.y),
        }
    }
}

/// Payload of `mouseWheel` records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelPayload {
    #[serde(rename = "deltaX")]
    pub delta_x: f64,
    #[serde(rename = "deltaY")]
    pub delta_y: f64,
    #[serde(rename = "hasPreciseScrollingDeltas", default)]
    pub has_precise_scrolling_deltas: bool,
    #[serde(default)]
    pub phase: ScrollPhase,
    #[serde(rename = "momentumPhase", default)]
    pub momentum_phase: ScrollPhase,
    pub timestamp: i64,
}

/// Payload of `status` records: out-of-band signaling only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// The event itself
// ---------------------------------------------------------------------------

/// A captured or replayable input event.
///
/// Constructed by the capture session during an active recording (or by the
/// engines for status signaling) and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum InputEvent {
    #[serde(rename = "keyDown")]
    KeyDown(KeyPayload),
    #[serde(rename = "keyUp")]
    KeyUp(KeyPayload),
    #[serde(rename = "mouseDown")]
    MouseDown(ButtonPayload),
    #[serde(rename = "mouseUp")]
    MouseUp(ButtonPayload),
    #[serde(rename = "mouseMove")]
    MouseMove(MotionPayload),
    #[serde(rename = "mouseWheel")]
    MouseWheel(WheelPayload),
    #[serde(rename = "status")]
    Status(StatusPayload),
}

impl InputEvent {
    /// The wire tag for this event.
    pub fn type_name(&self) -> &'static str {
        match self {
            InputEvent::KeyDown(_) => "keyDown",
            InputEvent::KeyUp(_) => "keyUp",
            InputEvent::MouseDown(_) => "mouseDown",
            InputEvent::MouseUp(_) => "mouseUp",
            InputEvent::MouseMove(_) => "mouseMove",
            InputEvent::MouseWheel(_) => "mouseWheel",
            InputEvent::Status(_) => "status",
        }
    }

    /// Capture timestamp in milliseconds; `None` for status events.
    pub fn timestamp_millis(&self) -> Option<i64> {
        match self {
            InputEvent::KeyDown(p) | InputEvent::KeyUp(p) => Some(p.timestamp),
            InputEvent::MouseDown(p) | InputEvent::MouseUp(p) => Some(p.timestamp),
            InputEvent::MouseMove(p) => Some(p.timestamp),
            InputEvent::MouseWheel(p) => Some(p.timestamp),
            InputEvent::Status(_) => None,
        }
    }

    /// An informational status event.
    pub fn status_message(message: impl Into<String>) -> Self {
        InputEvent::Status(StatusPayload {
            message: Some(message.into()),
            error: None,
        })
    }

    /// An error-carrying status event.
    pub fn status_error(error: impl Into<String>) -> Self {
        InputEvent::Status(StatusPayload {
            message: None,
            error: Some(error.into()),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
