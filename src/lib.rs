//! evreplay -- system-wide input event record and replay engine.
//!
//! Observes low-level keyboard, mouse-button, motion, and scroll events,
//! normalizes them into a timestamped device-agnostic event log, and later
//! reproduces that log by synthesizing equivalent input with the same
//! relative timing.
//!
//! The OS-specific pieces (hook installation, event injection, the
//! permission consent flow) are injected capabilities -- see [`hooks`] --
//! so the engine itself is portable and fully testable with fakes. The
//! [`gateway::Gateway`] type is the front door for an external transport.

pub mod capture;
pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod hooks;
pub mod keycodes;
pub mod noop;
pub mod playback;
pub mod sink;

pub use config::Config;
pub use error::{Error, PlatformError};
pub use event::InputEvent;
pub use gateway::Gateway;
