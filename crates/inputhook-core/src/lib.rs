//! inputhook-core: normalized input events and the hook engine.
//!
//! Design goal: keep this crate platform-agnostic. Everything that touches an
//! OS API (hook installation, permission prompts) lives in
//! `inputhook-platform`, behind the [`HookAdapter`] trait defined here.
//!
//! ## Module Structure
//!
//! - `event` - normalized event record and its kind tags
//! - `keycode` - unified key code space and per-platform normalizers
//! - `state` - press-state table and modifier edge tracking
//! - `translate` - native record translation rules per platform family
//! - `queue` - cross-thread delivery queue
//! - `adapter` - platform adapter trait, privilege state, install reports
//! - `engine` - lifecycle, privilege gate and consumer polling
//! - `dispatch` - per-kind handler routing for consumers
//! - `config` - hook configuration

mod adapter;
mod config;
mod dispatch;
mod engine;
mod error;
mod event;
mod keycode;
mod queue;
mod state;
pub mod translate;

pub use adapter::{HookAdapter, HookCategory, InstallFailure, InstallReport, PrivilegeState};
pub use config::HookConfig;
pub use dispatch::InputDispatcher;
pub use engine::{EventConsumer, InputHookEngine};
pub use error::{HookError, HookResult};
pub use event::{EventKind, NormalizedInputEvent};
pub use keycode::{normalize_mac_char, normalize_windows_vk, KeyCode};
pub use queue::{DeliveryQueue, EventSink};
pub use state::{
    ModifierEdge, ModifierEdges, ModifierTracker, PressStateTable, TrackedModifier,
    KEY_TABLE_SIZE, TRACKED_MODIFIERS,
};
