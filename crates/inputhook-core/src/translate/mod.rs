//! Native record -> [`NormalizedInputEvent`](crate::NormalizedInputEvent)
//! translation.
//!
//! These functions hold the filtering rules of each adapter but touch no OS
//! API, so the platform crate calls them from its callbacks and the tests
//! here drive them with synthetic records on any host.
//!
//! - `windows`: one low-level hook record per physical transition, auto-repeat
//!   filtered with a [`PressStateTable`](crate::PressStateTable).
//! - `macos`: discrete key monitors that flag repeats themselves, plus an
//!   aggregate modifier mask turned into edges by a
//!   [`ModifierTracker`](crate::ModifierTracker).

pub mod macos;
pub mod windows;
