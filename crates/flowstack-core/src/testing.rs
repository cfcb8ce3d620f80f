#![forbid(unsafe_code)]

//! Recording doubles for hosts, handles, and surfaces.
//!
//! Available with the `test-helpers` feature. Each double shares its state
//! through an `Rc`, so a test can hand one clone to the component under test
//! and inspect the other afterward.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::frame::{FrameHost, FrameToken};
use crate::geometry::Measurement;
use crate::handle::ElementHandle;
use crate::listener::{ListenerHost, ListenerId, ListenerKind};
use crate::scroll_lock::ScrollSurface;
use crate::visual::StyleWrite;

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct FrameLog {
    next: u64,
    outstanding: Vec<FrameToken>,
    requested: u64,
    cancelled: Vec<FrameToken>,
}

/// Frame host whose callbacks fire only when the test says so.
#[derive(Debug, Clone, Default)]
pub struct ManualFrameHost {
    log: Rc<RefCell<FrameLog>>,
}

impl ManualFrameHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks requested and neither fired nor cancelled.
    pub fn outstanding(&self) -> Vec<FrameToken> {
        self.log.borrow().outstanding.clone()
    }

    /// Simulate the refresh: forget the oldest outstanding callback and
    /// return it. The caller then runs its frame pass.
    pub fn fire(&self) -> Option<FrameToken> {
        let mut log = self.log.borrow_mut();
        if log.outstanding.is_empty() {
            None
        } else {
            Some(log.outstanding.remove(0))
        }
    }

    /// Total callbacks requested.
    pub fn requested(&self) -> u64 {
        self.log.borrow().requested
    }

    /// Callbacks cancelled before firing.
    pub fn cancelled(&self) -> Vec<FrameToken> {
        self.log.borrow().cancelled.clone()
    }
}

impl FrameHost for ManualFrameHost {
    fn request_frame(&self) -> FrameToken {
        let mut log = self.log.borrow_mut();
        log.next += 1;
        log.requested += 1;
        let token = FrameToken(log.next);
        log.outstanding.push(token);
        token
    }

    fn cancel_frame(&self, token: FrameToken) {
        let mut log = self.log.borrow_mut();
        log.outstanding.retain(|t| *t != token);
        log.cancelled.push(token);
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ListenerLog {
    next: u64,
    live: BTreeMap<u64, ListenerKind>,
    removed: u64,
}

/// Listener host that tracks live registrations.
#[derive(Debug, Clone, Default)]
pub struct RecordingListenerHost {
    log: Rc<RefCell<ListenerLog>>,
}

impl RecordingListenerHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinds with a live registration, in registration order.
    pub fn live_kinds(&self) -> Vec<ListenerKind> {
        self.log.borrow().live.values().copied().collect()
    }

    /// Whether `kind` has at least one live registration.
    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.log.borrow().live.values().any(|k| *k == kind)
    }

    /// Number of live registrations.
    pub fn live_count(&self) -> usize {
        self.log.borrow().live.len()
    }

    /// Total removals.
    pub fn removed_count(&self) -> u64 {
        self.log.borrow().removed
    }
}

impl ListenerHost for RecordingListenerHost {
    fn listen(&self, kind: ListenerKind) -> ListenerId {
        let mut log = self.log.borrow_mut();
        log.next += 1;
        let id = log.next;
        log.live.insert(id, kind);
        ListenerId(id)
    }

    fn unlisten(&self, id: ListenerId) {
        let mut log = self.log.borrow_mut();
        if log.live.remove(&id.0).is_some() {
            log.removed += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Scroll surface
// ---------------------------------------------------------------------------

/// Scroll surface that records lock transitions.
#[derive(Debug, Clone, Default)]
pub struct RecordingScrollSurface {
    transitions: Rc<RefCell<Vec<bool>>>,
}

impl RecordingScrollSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the most recent transition locked the surface.
    pub fn is_locked(&self) -> bool {
        self.transitions.borrow().last().copied().unwrap_or(false)
    }

    /// Every `set_locked` call, in order.
    pub fn transitions(&self) -> Vec<bool> {
        self.transitions.borrow().clone()
    }
}

impl ScrollSurface for RecordingScrollSurface {
    fn set_locked(&mut self, locked: bool) {
        self.transitions.borrow_mut().push(locked);
    }
}

// ---------------------------------------------------------------------------
// Element handle
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct HandleState {
    measurement: Option<Measurement>,
    writes: Vec<StyleWrite>,
    measured: u64,
}

/// Element handle with a settable measurement and a write log.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandle {
    state: Rc<RefCell<HandleState>>,
}

impl RecordingHandle {
    /// Handle reporting `measurement`.
    #[must_use]
    pub fn new(measurement: Option<Measurement>) -> Self {
        Self {
            state: Rc::new(RefCell::new(HandleState {
                measurement,
                ..HandleState::default()
            })),
        }
    }

    /// Change what the next measurement pass will see.
    pub fn set_measurement(&self, measurement: Option<Measurement>) {
        self.state.borrow_mut().measurement = measurement;
    }

    /// All writes applied so far.
    pub fn writes(&self) -> Vec<StyleWrite> {
        self.state.borrow().writes.clone()
    }

    /// Most recent write.
    pub fn last_write(&self) -> Option<StyleWrite> {
        self.state.borrow().writes.last().cloned()
    }

    /// Number of writes applied.
    pub fn write_count(&self) -> usize {
        self.state.borrow().writes.len()
    }

    /// Number of times the handle was measured.
    pub fn measure_count(&self) -> u64 {
        self.state.borrow().measured
    }

    /// Forget recorded writes.
    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }

    /// Boxed clone for handing to a component.
    #[must_use]
    pub fn boxed(&self) -> Box<dyn ElementHandle> {
        Box::new(self.clone())
    }
}

impl ElementHandle for RecordingHandle {
    fn measure(&self) -> Option<Measurement> {
        let mut state = self.state.borrow_mut();
        state.measured += 1;
        state.measurement
    }

    fn apply(&mut self, write: &StyleWrite) {
        self.state.borrow_mut().writes.push(write.clone());
    }
}
