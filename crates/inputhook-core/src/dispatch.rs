//! Consumer-side routing of drained events to per-kind handlers.
//!
//! This is the layer a host application wires up: it asks for privilege,
//! starts the engine, and on every tick routes what the engine drained to
//! whichever handlers it registered.

use crate::adapter::PrivilegeState;
use crate::engine::InputHookEngine;
use crate::error::{HookError, HookResult};
use crate::event::{EventKind, NormalizedInputEvent};
use crate::keycode::KeyCode;
use tracing::{debug, warn};

type KeyHandler = Box<dyn FnMut(KeyCode) + Send>;
type KeyEventHandler = Box<dyn FnMut(&NormalizedInputEvent) + Send>;
type MouseHandler = Box<dyn FnMut(i32, i32, i32) + Send>;
type WheelHandler = Box<dyn FnMut(i32, i32) + Send>;
type PrivilegeHandler = Box<dyn FnMut(bool) + Send>;

/// Handler set for normalized events.
#[derive(Default)]
pub struct InputDispatcher {
    on_key_down: Option<KeyHandler>,
    on_key_up: Option<KeyHandler>,
    on_key_event: Option<KeyEventHandler>,
    on_mouse_down: Option<MouseHandler>,
    on_mouse_up: Option<MouseHandler>,
    on_wheel: Option<WheelHandler>,
    on_privilege_check_failed: Option<PrivilegeHandler>,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key pressed.
    pub fn on_key_down(mut self, f: impl FnMut(KeyCode) + Send + 'static) -> Self {
        self.on_key_down = Some(Box::new(f));
        self
    }

    /// Key released.
    pub fn on_key_up(mut self, f: impl FnMut(KeyCode) + Send + 'static) -> Self {
        self.on_key_up = Some(Box::new(f));
        self
    }

    /// Every keyboard event, press or release, with its full payload.
    pub fn on_key_event(
        mut self,
        f: impl FnMut(&NormalizedInputEvent) + Send + 'static,
    ) -> Self {
        self.on_key_event = Some(Box::new(f));
        self
    }

    /// Mouse button pressed: `(button, x, y)`.
    pub fn on_mouse_down(mut self, f: impl FnMut(i32, i32, i32) + Send + 'static) -> Self {
        self.on_mouse_down = Some(Box::new(f));
        self
    }

    /// Mouse button released: `(button, x, y)`.
    pub fn on_mouse_up(mut self, f: impl FnMut(i32, i32, i32) + Send + 'static) -> Self {
        self.on_mouse_up = Some(Box::new(f));
        self
    }

    /// Wheel scrolled: `(delta_x, delta_y)`.
    pub fn on_wheel(mut self, f: impl FnMut(i32, i32) + Send + 'static) -> Self {
        self.on_wheel = Some(Box::new(f));
        self
    }

    /// Privilege probe failed; the argument is `true` when the OS opened its
    /// consent prompt.
    pub fn on_privilege_check_failed(mut self, f: impl FnMut(bool) + Send + 'static) -> Self {
        self.on_privilege_check_failed = Some(Box::new(f));
        self
    }

    /// Route one event. Keyboard sentinels (no unified key) are dropped.
    pub fn dispatch(&mut self, event: &NormalizedInputEvent) {
        match event.kind {
            EventKind::KeyDown | EventKind::KeyUp => {
                let Some(key) = event.unified_key() else {
                    return;
                };
                let handler = if event.kind.is_up() {
                    &mut self.on_key_up
                } else {
                    &mut self.on_key_down
                };
                if let Some(f) = handler {
                    f(key);
                }
                if let Some(f) = &mut self.on_key_event {
                    f(event);
                }
            }
            EventKind::MouseDown => {
                if let Some(f) = &mut self.on_mouse_down {
                    f(event.code, event.param1, event.param2);
                }
            }
            EventKind::MouseUp => {
                if let Some(f) = &mut self.on_mouse_up {
                    f(event.code, event.param1, event.param2);
                }
            }
            EventKind::MouseWheel => {
                if let Some(f) = &mut self.on_wheel {
                    f(event.param1, event.param2);
                }
            }
        }
    }

    /// Probe privilege and start the engine; on a refused probe notify the
    /// privilege handler instead.
    pub fn enable(&mut self, engine: &mut InputHookEngine) -> HookResult<()> {
        let privilege = engine.probe_privilege();
        if !privilege.is_normal() {
            self.privilege_failed(privilege);
            return Err(HookError::PermissionDenied(privilege));
        }
        let report = engine.start()?;
        debug!(installed = ?report.installed, "Dispatcher enabled");
        Ok(())
    }

    fn privilege_failed(&mut self, privilege: PrivilegeState) {
        warn!(?privilege, "Privilege check failed");
        if let Some(f) = &mut self.on_privilege_check_failed {
            f(privilege.prompt_shown());
        }
    }
}
