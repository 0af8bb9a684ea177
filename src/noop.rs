//! Stub capability backends.
//!
//! Stand-ins for environments without an OS adapter: the demo binary, CI,
//! and integration tests. The monitor never delivers events, the injector
//! logs and succeeds, the gate grants unconditionally.

use crate::error::PlatformError;
use crate::hooks::{EventInjector, InputMonitor, PermissionGate, RawEvent, Synthesis};

/// Monitor that installs nothing and delivers nothing.
#[derive(Debug, Default)]
pub struct NoopMonitor {
    running: bool,
}

impl NoopMonitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputMonitor for NoopMonitor {
    fn start(
        &mut self,
        _callback: Box<dyn Fn(RawEvent) + Send + Sync>,
    ) -> Result<(), PlatformError> {
        self.running = true;
        log::debug!("noop monitor: started (no events will be delivered)");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlatformError> {
        self.running = false;
        log::debug!("noop monitor: stopped");
        Ok(())
    }
}

/// Injector that accepts every synthesis without touching any OS API.
#[derive(Debug, Default)]
pub struct NoopInjector;

impl NoopInjector {
    pub fn new() -> Self {
        Self
    }
}

impl EventInjector for NoopInjector {
    fn inject(&self, synthesis: &Synthesis) -> Result<(), PlatformError> {
        log::debug!("noop injector: {:?}", synthesis);
        Ok(())
    }
}

/// Gate that always reports the capability as granted.
#[derive(Debug, Default)]
pub struct OpenGate;

impl OpenGate {
    pub fn new() -> Self {
        Self
    }
}

impl PermissionGate for OpenGate {
    fn is_granted(&self, _prompt_user: bool) -> bool {
        true
    }
}
