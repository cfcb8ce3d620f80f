#![forbid(unsafe_code)]

//! Listener registration with guaranteed teardown.
//!
//! Every listener a component registers is represented by a
//! [`ListenerGuard`]. Dropping the guard unregisters the listener exactly
//! once, so a component that is torn down (normally or not) cannot leave a
//! handler behind that references its elements.

use std::fmt;
use std::rc::Rc;

/// Host notification a component can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Scroll,
    Resize,
    PointerMove,
    PointerLeave,
    KeyDown,
    FontsLoaded,
    OrientationChange,
}

impl ListenerKind {
    /// DOM event name.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::PointerMove => "pointermove",
            Self::PointerLeave => "pointerleave",
            Self::KeyDown => "keydown",
            Self::FontsLoaded => "loadingdone",
            Self::OrientationChange => "orientationchange",
        }
    }
}

/// Host identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Environment that can attach and detach listeners.
pub trait ListenerHost {
    /// Attach a listener for `kind`.
    fn listen(&self, kind: ListenerKind) -> ListenerId;

    /// Detach a listener previously returned by [`listen`](Self::listen).
    fn unlisten(&self, id: ListenerId);
}

/// Registration that detaches on drop.
pub struct ListenerGuard {
    host: Rc<dyn ListenerHost>,
    kind: ListenerKind,
    id: Option<ListenerId>,
}

impl ListenerGuard {
    /// Register `kind` with `host`.
    #[must_use]
    pub fn register(host: &Rc<dyn ListenerHost>, kind: ListenerKind) -> Self {
        let id = host.listen(kind);
        crate::trace!(?kind, id = id.0, "listener registered");
        Self {
            host: Rc::clone(host),
            kind,
            id: Some(id),
        }
    }

    #[inline]
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }

    /// Detach now instead of at drop.
    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            crate::trace!(kind = ?self.kind, id = id.0, "listener removed");
            self.host.unlisten(id);
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}

/// A component's full set of registrations.
#[derive(Debug, Default)]
pub struct ListenerSet {
    guards: Vec<ListenerGuard>,
}

impl ListenerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every kind in `kinds`.
    #[must_use]
    pub fn register_all(host: &Rc<dyn ListenerHost>, kinds: &[ListenerKind]) -> Self {
        Self {
            guards: kinds
                .iter()
                .map(|&kind| ListenerGuard::register(host, kind))
                .collect(),
        }
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Whether `kind` is registered.
    pub fn contains(&self, kind: ListenerKind) -> bool {
        self.guards.iter().any(|g| g.kind() == kind)
    }

    /// Detach everything.
    pub fn clear(&mut self) {
        self.guards.clear();
    }
}
