//! Hook engine: privilege gate, adapter lifecycle and the consumer's drain
//! point.

use crate::adapter::{HookAdapter, InstallReport, PrivilegeState};
use crate::error::{HookError, HookResult};
use crate::event::NormalizedInputEvent;
use crate::queue::DeliveryQueue;
use tracing::{debug, info, warn};

/// Callback receiving drained events on the consumer's thread.
pub type EventConsumer = Box<dyn FnMut(&NormalizedInputEvent) + Send>;

/// Owns one platform adapter and the queue it delivers into.
///
/// The engine never spawns threads. Events are produced on whatever thread
/// the OS runs hook callbacks on and handed to the consumer only from
/// [`poll_once`](Self::poll_once), which the host calls on its own schedule.
pub struct InputHookEngine {
    adapter: Box<dyn HookAdapter>,
    queue: DeliveryQueue,
    privilege: Option<PrivilegeState>,
    consumer: Option<EventConsumer>,
}

impl InputHookEngine {
    pub fn new(adapter: Box<dyn HookAdapter>) -> Self {
        debug!(platform = adapter.platform(), "Input hook engine created");
        Self {
            adapter,
            queue: DeliveryQueue::new(),
            privilege: None,
            consumer: None,
        }
    }

    pub fn platform(&self) -> &'static str {
        self.adapter.platform()
    }

    /// Probe (and if needed request) permission to observe input.
    pub fn probe_privilege(&mut self) -> PrivilegeState {
        let state = self.adapter.probe_privilege();
        if state.is_normal() {
            debug!("Input monitoring permitted");
        } else {
            warn!(?state, "Input monitoring not permitted");
        }
        self.privilege = Some(state);
        state
    }

    /// Result of the last probe, if any.
    pub fn privilege(&self) -> Option<PrivilegeState> {
        self.privilege
    }

    /// Install the platform hooks.
    ///
    /// Gated on the cached result of [`probe_privilege`](Self::probe_privilege):
    /// never probes itself, since a macOS probe may open the system prompt.
    /// Without a prior probe, or with any state other than `Normal`, nothing
    /// is touched. On success the queue is cleared first so nothing from an
    /// earlier session surfaces. A partial install is returned as `Ok` with
    /// the failures listed in the report.
    pub fn start(&mut self) -> HookResult<InstallReport> {
        match self.privilege {
            None => return Err(HookError::PrivilegeNotChecked),
            Some(PrivilegeState::Normal) => {}
            Some(state) => return Err(HookError::PermissionDenied(state)),
        }

        let stale = self.queue.clear();
        if stale > 0 {
            debug!(stale, "Dropped events from previous session");
        }

        let report = self.adapter.start(self.queue.sink())?;
        if report.is_empty() {
            self.adapter.stop();
            for failure in &report.failed {
                warn!(category = ?failure.category, reason = %failure.reason, "Hook not installed");
            }
            return Err(HookError::NothingInstalled);
        }
        if !report.is_complete() {
            for failure in &report.failed {
                warn!(category = ?failure.category, reason = %failure.reason, "Hook not installed");
            }
        }
        info!(
            platform = self.adapter.platform(),
            installed = report.installed.len(),
            failed = report.failed.len(),
            "Input hook started"
        );
        Ok(report)
    }

    /// Remove every hook. Idempotent. Events already queued stay available.
    pub fn stop(&mut self) {
        let was_active = self.adapter.is_active();
        self.adapter.stop();
        if was_active {
            info!(pending = self.queue.len(), "Input hook stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.adapter.is_active()
    }

    /// Register the consumer, replacing any previous one. `None` deregisters.
    pub fn set_consumer(&mut self, consumer: Option<EventConsumer>) {
        self.consumer = consumer;
    }

    pub fn has_consumer(&self) -> bool {
        self.consumer.is_some()
    }

    /// Service the OS event source, then hand every queued event to the
    /// consumer in order. Without a consumer the events are discarded.
    /// Returns the number of events drained.
    ///
    /// Never blocks. The consumer must not call back into the engine.
    pub fn poll_once(&mut self) -> usize {
        self.adapter.pump();
        let consumer = &mut self.consumer;
        self.queue.drain_into(|event| {
            if let Some(consumer) = consumer.as_mut() {
                consumer(&event);
            }
        })
    }

    /// Pull one event without going through the consumer.
    pub fn try_dequeue(&self) -> Option<NormalizedInputEvent> {
        self.queue.try_dequeue()
    }

    /// Pull every queued event without going through the consumer.
    pub fn drain_all(&self) -> Vec<NormalizedInputEvent> {
        self.queue.drain_all()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Stop and release the consumer. The engine is gone afterwards.
    pub fn dispose(mut self) {
        self.stop();
        self.consumer = None;
        info!("Input hook engine disposed");
    }
}

impl Drop for InputHookEngine {
    fn drop(&mut self) {
        self.adapter.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::HookCategory;
    use crate::keycode::KeyCode;
    use crate::queue::EventSink;
    use std::sync::{Arc, Mutex};

    /// Adapter stub recording calls, with a scripted privilege result.
    #[derive(Default)]
    struct StubState {
        checks: usize,
        starts: usize,
        stops: usize,
        pumps: usize,
        active: bool,
        sink: Option<EventSink>,
    }

    struct StubAdapter {
        privilege: PrivilegeState,
        fail_all: bool,
        state: Arc<Mutex<StubState>>,
    }

    impl StubAdapter {
        fn new(privilege: PrivilegeState) -> (Self, Arc<Mutex<StubState>>) {
            let state = Arc::new(Mutex::new(StubState::default()));
            (
                Self {
                    privilege,
                    fail_all: false,
                    state: state.clone(),
                },
                state,
            )
        }
    }

    impl HookAdapter for StubAdapter {
        fn platform(&self) -> &'static str {
            "stub"
        }

        fn probe_privilege(&mut self) -> PrivilegeState {
            self.state.lock().unwrap().checks += 1;
            self.privilege
        }

        fn start(&mut self, sink: EventSink) -> HookResult<InstallReport> {
            self.stop();
            let mut state = self.state.lock().unwrap();
            state.starts += 1;
            let mut report = InstallReport::default();
            if self.fail_all {
                report.record_failed(HookCategory::Keyboard, "denied");
            } else {
                report.record_installed(HookCategory::Keyboard);
                state.active = true;
                state.sink = Some(sink);
            }
            Ok(report)
        }

        fn stop(&mut self) {
            let mut state = self.state.lock().unwrap();
            state.stops += 1;
            state.active = false;
            state.sink = None;
        }

        fn pump(&mut self) {
            self.state.lock().unwrap().pumps += 1;
        }

        fn is_active(&self) -> bool {
            self.state.lock().unwrap().active
        }
    }

    fn started(privilege: PrivilegeState) -> (InputHookEngine, Arc<Mutex<StubState>>) {
        let (adapter, state) = StubAdapter::new(privilege);
        let mut engine = InputHookEngine::new(Box::new(adapter));
        engine.probe_privilege();
        engine.start().unwrap();
        (engine, state)
    }

    fn emit(state: &Arc<Mutex<StubState>>, code: i32) {
        let sink = state.lock().unwrap().sink.clone().expect("adapter not started");
        sink.enqueue(NormalizedInputEvent::key_down(KeyCode::from_raw(code), 0, 0));
    }

    #[test]
    fn test_privilege_gate_blocks_start() {
        let (adapter, state) = StubAdapter::new(PrivilegeState::PromptShown);
        let mut engine = InputHookEngine::new(Box::new(adapter));

        assert_eq!(engine.probe_privilege(), PrivilegeState::PromptShown);
        let result = engine.start();

        assert!(matches!(
            result,
            Err(HookError::PermissionDenied(PrivilegeState::PromptShown))
        ));
        assert_eq!(state.lock().unwrap().starts, 0);
        assert!(!engine.is_running());
        assert_eq!(engine.pending(), 0);
    }

    #[test]
    fn test_granted_immediately_is_not_normal() {
        let (adapter, state) = StubAdapter::new(PrivilegeState::GrantedImmediately);
        let mut engine = InputHookEngine::new(Box::new(adapter));
        engine.probe_privilege();
        assert!(matches!(
            engine.start(),
            Err(HookError::PermissionDenied(PrivilegeState::GrantedImmediately))
        ));
        assert_eq!(state.lock().unwrap().starts, 0);
    }

    #[test]
    fn test_start_without_privilege_check_is_refused() {
        let (adapter, state) = StubAdapter::new(PrivilegeState::Normal);
        let mut engine = InputHookEngine::new(Box::new(adapter));
        assert_eq!(engine.privilege(), None);
        assert!(matches!(engine.start(), Err(HookError::PrivilegeNotChecked)));
        let state = state.lock().unwrap();
        assert_eq!(state.checks, 0);
        assert_eq!(state.starts, 0);
        assert!(!state.active);
    }

    #[test]
    fn test_refused_start_does_not_reprompt() {
        let (adapter, state) = StubAdapter::new(PrivilegeState::PromptShown);
        let mut engine = InputHookEngine::new(Box::new(adapter));
        engine.probe_privilege();
        assert!(engine.start().is_err());
        assert!(engine.start().is_err());
        assert_eq!(state.lock().unwrap().checks, 1);

        let (mut engine, state) = started(PrivilegeState::Normal);
        engine.stop();
        engine.start().unwrap();
        assert_eq!(state.lock().unwrap().checks, 1);
        assert_eq!(state.lock().unwrap().starts, 2);
    }

    #[test]
    fn test_nothing_installed_is_an_error() {
        let (mut adapter, _state) = StubAdapter::new(PrivilegeState::Normal);
        adapter.fail_all = true;
        let mut engine = InputHookEngine::new(Box::new(adapter));
        engine.probe_privilege();
        assert!(matches!(engine.start(), Err(HookError::NothingInstalled)));
        assert!(!engine.is_running());
    }

    #[test]
    fn test_poll_dispatches_in_order() {
        let (mut engine, state) = started(PrivilegeState::Normal);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        engine.set_consumer(Some(Box::new(move |e: &NormalizedInputEvent| {
            sink.lock().unwrap().push(e.code)
        })));

        emit(&state, 1);
        emit(&state, 2);
        emit(&state, 3);
        assert_eq!(engine.poll_once(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(engine.poll_once(), 0);
        assert_eq!(state.lock().unwrap().pumps, 2);
    }

    #[test]
    fn test_replacing_and_clearing_consumer() {
        let (mut engine, state) = started(PrivilegeState::Normal);

        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));
        let f = first.clone();
        engine.set_consumer(Some(Box::new(move |_: &NormalizedInputEvent| {
            *f.lock().unwrap() += 1
        })));
        let s = second.clone();
        engine.set_consumer(Some(Box::new(move |_: &NormalizedInputEvent| {
            *s.lock().unwrap() += 1
        })));

        emit(&state, 10);
        engine.poll_once();
        assert_eq!(*first.lock().unwrap(), 0);
        assert_eq!(*second.lock().unwrap(), 1);

        engine.set_consumer(None);
        assert!(!engine.has_consumer());
        emit(&state, 11);
        assert_eq!(engine.poll_once(), 1);
        assert_eq!(*second.lock().unwrap(), 1);
    }

    #[test]
    fn test_stop_is_idempotent_and_keeps_queued_events() {
        let (adapter, state) = StubAdapter::new(PrivilegeState::Normal);
        let mut engine = InputHookEngine::new(Box::new(adapter));
        engine.stop();
        engine.stop();

        engine.probe_privilege();
        engine.start().unwrap();
        emit(&state, 5);
        engine.stop();
        engine.stop();
        assert!(!engine.is_running());
        assert_eq!(engine.drain_all().len(), 1);
    }

    #[test]
    fn test_restart_discards_stale_events() {
        let (mut engine, state) = started(PrivilegeState::Normal);
        emit(&state, 5);
        engine.stop();
        engine.start().unwrap();
        assert_eq!(engine.pending(), 0);
        emit(&state, 6);
        assert_eq!(engine.try_dequeue().map(|e| e.code), Some(6));
    }

    #[test]
    fn test_dispose_stops_adapter() {
        let (engine, state) = started(PrivilegeState::Normal);
        engine.dispose();
        let state = state.lock().unwrap();
        assert!(!state.active);
        assert!(state.sink.is_none());
    }
}
