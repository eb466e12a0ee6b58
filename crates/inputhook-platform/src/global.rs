//! Process-wide engine instance.
//!
//! The OS allows one set of global hooks per process to make sense, so hosts
//! that do not want to own an [`InputHookEngine`] use these free functions.
//! None of them may be called from inside a consumer callback: the consumer
//! runs while the instance lock is held.

use crate::input_hook::create_adapter;
use inputhook_core::{
    EventConsumer, HookConfig, HookResult, InputHookEngine, InstallReport,
    NormalizedInputEvent, PrivilegeState,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

static ENGINE: Mutex<Option<InputHookEngine>> = Mutex::new(None);

fn lock() -> MutexGuard<'static, Option<InputHookEngine>> {
    // A consumer panic must not take the hooks down with it.
    ENGINE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_engine<R>(f: impl FnOnce(&mut InputHookEngine) -> R) -> R {
    let mut guard = lock();
    let engine = guard.get_or_insert_with(|| {
        debug!("Creating process-wide input hook engine");
        InputHookEngine::new(create_adapter(HookConfig::default()))
    });
    f(engine)
}

/// Create the instance with `config`. Returns `false` (and changes nothing)
/// if it already exists.
pub fn init(config: HookConfig) -> bool {
    let mut guard = lock();
    if guard.is_some() {
        return false;
    }
    *guard = Some(InputHookEngine::new(create_adapter(config)));
    true
}

pub fn is_initialized() -> bool {
    lock().is_some()
}

pub fn probe_privilege() -> PrivilegeState {
    with_engine(|engine| engine.probe_privilege())
}

/// Requires a prior [`probe_privilege`]; see [`InputHookEngine::start`].
pub fn start() -> HookResult<InstallReport> {
    with_engine(|engine| engine.start())
}

/// Remove the hooks. Does nothing if there is no instance.
pub fn stop() {
    if let Some(engine) = lock().as_mut() {
        engine.stop();
    }
}

pub fn is_running() -> bool {
    lock().as_ref().is_some_and(|engine| engine.is_running())
}

pub fn set_consumer(consumer: Option<EventConsumer>) {
    with_engine(|engine| engine.set_consumer(consumer));
}

/// See [`InputHookEngine::poll_once`]. Returns 0 if there is no instance.
pub fn poll_once() -> usize {
    lock().as_mut().map_or(0, |engine| engine.poll_once())
}

pub fn drain_all() -> Vec<NormalizedInputEvent> {
    lock()
        .as_ref()
        .map(|engine| engine.drain_all())
        .unwrap_or_default()
}

/// Stop and drop the instance. The next call creates a fresh one.
pub fn dispose() {
    let engine = lock().take();
    if let Some(engine) = engine {
        engine.dispose();
    }
}
