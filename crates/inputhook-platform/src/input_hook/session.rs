//! Hook ownership shared by the native adapters.
//!
//! OS hook callbacks reach their state through a static. Only one adapter
//! at a time may own that static: the first `start` claims it and every
//! other adapter in the process gets [`HookError::AlreadyActive`] until the
//! owner stops. A `stop` from an adapter that owns nothing leaves the
//! static alone.

#![cfg_attr(not(any(target_os = "windows", target_os = "macos")), allow(dead_code))]

use crate::error::PlatformResult;
use inputhook_core::translate::windows::WheelAccumulator;
use inputhook_core::{
    EventSink, HookCategory, HookError, HookResult, InstallReport, ModifierTracker,
    NormalizedInputEvent, PressStateTable,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use tracing::{debug, warn};

/// What the OS callbacks share with the owning adapter.
pub(crate) struct CallbackState {
    pub(crate) table: PressStateTable,
    pub(crate) modifiers: ModifierTracker,
    pub(crate) wheel: WheelAccumulator,
    pub(crate) panics: AtomicUsize,
    sink: RwLock<Option<EventSink>>,
    claimed: AtomicBool,
}

impl CallbackState {
    pub(crate) const fn new() -> Self {
        Self {
            table: PressStateTable::new(),
            modifiers: ModifierTracker::new(),
            wheel: WheelAccumulator::new(),
            panics: AtomicUsize::new(0),
            sink: RwLock::new(None),
            claimed: AtomicBool::new(false),
        }
    }

    fn claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.claimed.store(false, Ordering::Release);
    }

    fn attach(&self, sink: EventSink) {
        if let Ok(mut slot) = self.sink.write() {
            *slot = Some(sink);
        }
    }

    fn detach(&self) {
        if let Ok(mut slot) = self.sink.write() {
            *slot = None;
        }
    }

    fn reset_filters(&self) {
        self.table.clear();
        self.modifiers.reset();
        self.wheel.reset();
    }

    /// Never blocks: a callback racing with start/stop drops its event.
    pub(crate) fn deliver(&self, event: NormalizedInputEvent) {
        if let Ok(slot) = self.sink.try_read() {
            if let Some(sink) = slot.as_ref() {
                sink.enqueue(event);
            }
        }
    }
}

/// A native hook handle owned by a [`HookSession`].
pub(crate) trait InstalledHook: Send {
    fn category(&self) -> HookCategory;

    /// Remove the hook from the OS. Must not fail loudly.
    fn remove(self);
}

/// The hooks one adapter installed, plus its claim on the callback state.
pub(crate) struct HookSession<H: InstalledHook> {
    state: &'static CallbackState,
    hooks: Vec<H>,
    owner: bool,
    panics_seen: usize,
}

impl<H: InstalledHook> HookSession<H> {
    pub(crate) const fn new(state: &'static CallbackState) -> Self {
        Self {
            state,
            hooks: Vec::new(),
            owner: false,
            panics_seen: 0,
        }
    }

    /// Claim the callback state and install one hook per category.
    ///
    /// Stops this session first. A partial install keeps what succeeded; if
    /// nothing installs the claim is released again.
    pub(crate) fn start<F>(
        &mut self,
        categories: &[HookCategory],
        sink: EventSink,
        mut install: F,
    ) -> HookResult<InstallReport>
    where
        F: FnMut(HookCategory) -> PlatformResult<H>,
    {
        self.stop();
        if !self.state.claim() {
            warn!("Input hooks already owned by another adapter");
            return Err(HookError::AlreadyActive);
        }
        self.owner = true;
        self.state.reset_filters();
        self.state.attach(sink);
        self.panics_seen = self.state.panics.load(Ordering::Relaxed);

        let mut report = InstallReport::default();
        for &category in categories {
            match install(category) {
                Ok(hook) => {
                    debug!(?category, "Hook installed");
                    self.hooks.push(hook);
                    report.record_installed(category);
                }
                Err(e) => report.record_failed(category, e.to_string()),
            }
        }
        if report.is_empty() {
            self.stop();
        }
        Ok(report)
    }

    /// Remove every hook, reset the filters, detach the sink and release the
    /// claim. Returns how many hooks were removed. Does nothing unless this
    /// session owns the callback state.
    pub(crate) fn stop(&mut self) -> usize {
        if !self.owner {
            return 0;
        }
        let removed = self.hooks.len();
        for hook in self.hooks.drain(..) {
            debug!(category = ?hook.category(), "Removing hook");
            hook.remove();
        }
        self.state.detach();
        self.state.reset_filters();
        self.state.release();
        self.owner = false;
        removed
    }

    pub(crate) fn is_active(&self) -> bool {
        !self.hooks.is_empty()
    }

    #[cfg_attr(target_os = "windows", allow(dead_code))]
    pub(crate) fn hooks(&self) -> &[H] {
        &self.hooks
    }

    /// Total callback panics, if any happened since the last call.
    pub(crate) fn new_panics(&mut self) -> Option<usize> {
        let panics = self.state.panics.load(Ordering::Relaxed);
        if panics == self.panics_seen {
            return None;
        }
        self.panics_seen = panics;
        Some(panics)
    }
}

impl<H: InstalledHook> Drop for HookSession<H> {
    fn drop(&mut self) {
        self.stop();
    }
}
