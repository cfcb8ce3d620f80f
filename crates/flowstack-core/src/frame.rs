#![forbid(unsafe_code)]

//! Frame-aligned scheduling.
//!
//! Scroll, resize, and pointer notifications can arrive many times per
//! display refresh. Handlers never recompute transforms directly; they call
//! [`FrameScheduler::request`], which asks the host for at most one callback
//! aligned to the next refresh. Further requests before that callback fires
//! are coalesced into the pending one.
//!
//! # Invariants
//!
//! 1. At most one frame callback is in flight per scheduler.
//! 2. [`FrameScheduler::begin_pass`] clears the pending state *before* the
//!    pass does any work, so the pass itself may queue the next frame.
//! 3. [`FrameScheduler::cancel`] releases the in-flight callback; after it
//!    returns the host holds no callback for this scheduler.

/// Host identifier for a requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// The environment's "animation tick" facility.
pub trait FrameHost {
    /// Schedule one callback for the next display refresh.
    fn request_frame(&self) -> FrameToken;

    /// Cancel a previously requested callback that has not fired.
    fn cancel_frame(&self, token: FrameToken);
}

/// Coalescing single-callback scheduler.
///
/// Carries no state besides the pending token (and diagnostic counters).
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: Option<FrameToken>,
    requested: u64,
    coalesced: u64,
}

impl FrameScheduler {
    /// Create an idle scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a pass on the next refresh.
    ///
    /// Returns `true` when a new callback was scheduled and `false` when the
    /// request was folded into one already pending.
    pub fn request(&mut self, host: &dyn FrameHost) -> bool {
        if self.pending.is_some() {
            self.coalesced = self.coalesced.saturating_add(1);
            crate::trace!(coalesced = self.coalesced, "frame request coalesced");
            return false;
        }
        self.pending = Some(host.request_frame());
        self.requested = self.requested.saturating_add(1);
        true
    }

    /// Mark the start of a pass. Must be called first thing in the callback.
    pub fn begin_pass(&mut self) {
        self.pending = None;
    }

    /// Cancel the pending callback, if any.
    pub fn cancel(&mut self, host: &dyn FrameHost) {
        if let Some(token) = self.pending.take() {
            host.cancel_frame(token);
        }
    }

    /// Whether a callback is in flight.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Token of the in-flight callback.
    #[inline]
    pub fn pending_token(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Callbacks actually requested from the host (diagnostic).
    #[inline]
    pub fn requested_count(&self) -> u64 {
        self.requested
    }

    /// Requests folded into a pending callback (diagnostic).
    #[inline]
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }
}
