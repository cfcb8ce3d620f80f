#![forbid(unsafe_code)]

//! Shared-element hand-off between the card stack and the overlay.
//!
//! Exactly one presenter owns a card's visuals at any time. The stack owns
//! every card by default. Expanding a card hands it to the overlay
//! immediately; the overlay then grows the card from its last in-stack bounds
//! to the full viewport while fading in. Collapsing runs the same path in
//! reverse and returns ownership to the stack only when the reverse
//! transition finishes, so the stack never writes to a card that the overlay
//! is still animating.
//!
//! Transitions are keyed by [`CardId`], never by element identity, so the
//! stack's handles can be re-created without breaking an open overlay.

use std::time::Duration;

use flowstack_core::animation::{Animation, Fade, ease_out};
use flowstack_core::geometry::{Measurement, Viewport};

use crate::deck::CardId;

/// Default overlay fade duration.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(400);

/// Which presenter currently owns a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Stack,
    Overlay,
}

/// Direction of a running hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Stack to overlay.
    Expand,
    /// Overlay back to stack.
    Collapse,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    kind: TransitionKind,
    fade: Fade,
}

/// Where and how opaque the overlay should draw its card this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFrame {
    pub card: CardId,
    /// Bounds in client (viewport-relative) pixels.
    pub bounds: Measurement,
    pub opacity: f64,
    /// Running transition, or `None` once settled.
    pub transition: Option<TransitionKind>,
}

/// Tracks which card the overlay owns and animates hand-offs.
#[derive(Debug, Clone)]
pub struct SharedElementRegistry {
    duration: Duration,
    presented: Option<CardId>,
    /// In-stack bounds of the presented card, document coordinates.
    origin: Option<Measurement>,
    transition: Option<Transition>,
}

impl Default for SharedElementRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSITION)
    }
}

impl SharedElementRegistry {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            presented: None,
            origin: None,
            transition: None,
        }
    }

    /// Current owner of `card`.
    pub fn owner(&self, card: CardId) -> Owner {
        if self.presented == Some(card) {
            Owner::Overlay
        } else {
            Owner::Stack
        }
    }

    /// Card the overlay owns, if any.
    #[inline]
    pub fn presented(&self) -> Option<CardId> {
        self.presented
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Kind of the running transition.
    pub fn transition(&self) -> Option<TransitionKind> {
        self.transition.map(|t| t.kind)
    }

    /// Hand `card` to the overlay, growing it from `origin`.
    ///
    /// A different card still held by the overlay is released to the stack
    /// first and returned.
    pub fn expand(&mut self, card: CardId, origin: Option<Measurement>) -> Option<CardId> {
        let released = if self.presented.is_some_and(|p| p != card) {
            self.release()
        } else {
            None
        };
        if self.presented == Some(card) && self.transition() == Some(TransitionKind::Expand) {
            return released;
        }
        let resume = if self.presented == Some(card) {
            self.openness()
        } else {
            0.0
        };
        self.presented = Some(card);
        if origin.is_some() {
            self.origin = origin;
        }
        self.transition = Some(self.start(TransitionKind::Expand, resume));
        flowstack_core::debug!(card = card.0, "shared element expand");
        released
    }

    /// Switch the overlay to another card without a bounds animation.
    ///
    /// `origin` becomes the collapse target for the new card. Returns the
    /// card handed back to the stack.
    pub fn retarget(&mut self, card: CardId, origin: Option<Measurement>) -> Option<CardId> {
        let Some(previous) = self.presented else {
            return self.expand(card, origin);
        };
        if previous == card {
            return None;
        }
        self.presented = Some(card);
        self.origin = origin;
        flowstack_core::debug!(card = card.0, "shared element retarget");
        Some(previous)
    }

    /// Start returning the presented card to the stack.
    ///
    /// Returns `false` when nothing is presented.
    pub fn collapse(&mut self) -> bool {
        if self.presented.is_none() {
            return false;
        }
        if self.transition() == Some(TransitionKind::Collapse) {
            return true;
        }
        self.transition = Some(self.start(TransitionKind::Collapse, self.openness()));
        flowstack_core::debug!("shared element collapse");
        true
    }

    /// Return the presented card to the stack immediately.
    ///
    /// Returns the released card.
    pub fn release(&mut self) -> Option<CardId> {
        self.transition = None;
        self.origin = None;
        self.presented.take()
    }

    /// Advance the running transition.
    ///
    /// Returns the card handed back to the stack when a collapse completes.
    pub fn tick(&mut self, dt: Duration) -> Option<CardId> {
        let transition = self.transition.as_mut()?;
        transition.fade.tick(dt);
        if !transition.fade.is_complete() {
            return None;
        }
        match transition.kind {
            TransitionKind::Expand => {
                self.transition = None;
                None
            }
            TransitionKind::Collapse => self.release(),
        }
    }

    /// Overlay geometry and opacity for this frame.
    pub fn overlay_frame(&self, viewport: &Viewport) -> Option<OverlayFrame> {
        let card = self.presented?;
        let full = Measurement::new(0.0, 0.0, viewport.width, viewport.height);
        let origin = self
            .origin
            .map(|m| viewport.document_to_client(&m))
            .unwrap_or(full);
        let openness = self.openness();
        Some(OverlayFrame {
            card,
            bounds: origin.lerp(&full, openness),
            opacity: openness,
            transition: self.transition.map(|t| t.kind),
        })
    }

    /// 0 at the stack, 1 filling the viewport.
    fn openness(&self) -> f64 {
        match self.transition {
            None if self.presented.is_some() => 1.0,
            None => 0.0,
            Some(t) => {
                let v = t.fade.value();
                match t.kind {
                    TransitionKind::Expand => v,
                    TransitionKind::Collapse => 1.0 - v,
                }
            }
        }
    }

    /// A transition of `kind` positioned so it starts at `openness`.
    fn start(&self, kind: TransitionKind, openness: f64) -> Transition {
        // Fraction of the eased fade already covered.
        let covered = match kind {
            TransitionKind::Expand => openness,
            TransitionKind::Collapse => 1.0 - openness,
        }
        .clamp(0.0, 1.0);
        // Inverse of ease_out: 1 - (1 - t)^2.
        let t = 1.0 - (1.0 - covered).sqrt();
        let mut fade = Fade::new(self.duration).easing(ease_out);
        fade.tick(self.duration.mul_f64(t));
        Transition { kind, fade }
    }
}
