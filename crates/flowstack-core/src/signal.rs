#![forbid(unsafe_code)]

//! Signal sampling: the latest scroll, viewport, and pointer state.
//!
//! Raw host notifications arrive as [`Signal`]s far more often than the
//! display refreshes. The sampler only records the newest values ("latest
//! wins") and reports which passes the event calls for; it never computes
//! transforms itself.
//!
//! The pointer is stored in client (viewport) coordinates and converted to
//! document coordinates on read, so a scroll without a pointer move still
//! yields the correct document position.

use crate::geometry::{Point, Viewport};
use crate::input::KeyEvent;

/// A notification from the host environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Document scroll offset changed.
    Scroll { x: f64, y: f64 },
    /// Viewport size changed.
    Resize { width: f64, height: f64 },
    /// Pointer moved, in client coordinates.
    PointerMove { client_x: f64, client_y: f64 },
    /// Pointer left the document.
    PointerLeave,
    /// Web fonts finished loading (glyph metrics may have changed).
    FontsLoaded,
    /// Device orientation changed.
    OrientationChange,
    /// Key pressed.
    Key(KeyEvent),
}

/// Work requested by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalEffect {
    /// Layout may have changed: re-run the measurement pass.
    pub measure_pass: bool,
    /// Inputs to the transform pass changed: schedule a frame.
    pub transform_pass: bool,
}

impl SignalEffect {
    const NONE: Self = Self {
        measure_pass: false,
        transform_pass: false,
    };
    const TRANSFORM: Self = Self {
        measure_pass: false,
        transform_pass: true,
    };
    const LAYOUT: Self = Self {
        measure_pass: true,
        transform_pass: true,
    };
}

/// Latest-wins store of continuous environmental signals.
#[derive(Debug, Clone, Default)]
pub struct SignalSampler {
    viewport: Viewport,
    pointer_client: Option<Point>,
    samples: u64,
}

impl SignalSampler {
    /// Create a sampler for the given initial viewport.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            pointer_client: None,
            samples: 0,
        }
    }

    /// Record a signal and classify the work it requires.
    pub fn apply(&mut self, signal: &Signal) -> SignalEffect {
        self.samples = self.samples.saturating_add(1);
        match *signal {
            Signal::Scroll { x, y } => {
                if x == self.viewport.scroll_x && y == self.viewport.scroll_y {
                    return SignalEffect::NONE;
                }
                self.viewport.scroll_x = x;
                self.viewport.scroll_y = y;
                SignalEffect::TRANSFORM
            }
            Signal::Resize { width, height } => {
                self.viewport.width = width;
                self.viewport.height = height;
                SignalEffect::LAYOUT
            }
            Signal::PointerMove { client_x, client_y } => {
                self.pointer_client = Some(Point::new(client_x, client_y));
                SignalEffect::TRANSFORM
            }
            // The last position is kept so glyphs do not snap when the
            // pointer exits the window.
            Signal::PointerLeave => SignalEffect::NONE,
            Signal::FontsLoaded | Signal::OrientationChange => SignalEffect::LAYOUT,
            Signal::Key(_) => SignalEffect::NONE,
        }
    }

    /// Current viewport.
    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Last pointer position in client coordinates.
    #[inline]
    pub fn pointer_client(&self) -> Option<Point> {
        self.pointer_client
    }

    /// Pointer position in document coordinates, once the pointer has been seen.
    #[inline]
    pub fn pointer_document(&self) -> Option<Point> {
        self.pointer_client
            .map(|p| self.viewport.client_to_document(p))
    }

    /// Total signals applied (diagnostic).
    #[inline]
    pub fn sample_count(&self) -> u64 {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, KeyEvent};

    #[test]
    fn pointer_is_unknown_until_first_move() {
        let sampler = SignalSampler::new(Viewport::new(800.0, 600.0));
        assert_eq!(sampler.pointer_document(), None);
    }

    #[test]
    fn pointer_tracks_scroll_without_moving() {
        let mut sampler = SignalSampler::new(Viewport::new(800.0, 600.0));
        sampler.apply(&Signal::PointerMove {
            client_x: 100.0,
            client_y: 50.0,
        });
        assert_eq!(sampler.pointer_document(), Some(Point::new(100.0, 50.0)));
        sampler.apply(&Signal::Scroll { x: 0.0, y: 400.0 });
        assert_eq!(sampler.pointer_document(), Some(Point::new(100.0, 450.0)));
    }

    #[test]
    fn effects_are_classified() {
        let mut sampler = SignalSampler::new(Viewport::new(800.0, 600.0));
        assert_eq!(
            sampler.apply(&Signal::Scroll { x: 0.0, y: 10.0 }),
            SignalEffect::TRANSFORM
        );
        // Same offset again is a no-op.
        assert_eq!(
            sampler.apply(&Signal::Scroll { x: 0.0, y: 10.0 }),
            SignalEffect::NONE
        );
        assert_eq!(
            sampler.apply(&Signal::Resize {
                width: 1024.0,
                height: 768.0
            }),
            SignalEffect::LAYOUT
        );
        assert_eq!(sampler.viewport().height, 768.0);
        assert_eq!(sampler.apply(&Signal::FontsLoaded), SignalEffect::LAYOUT);
        assert_eq!(
            sampler.apply(&Signal::Key(KeyEvent::new(KeyCode::Escape))),
            SignalEffect::NONE
        );
        assert_eq!(sampler.sample_count(), 5);
    }

    #[test]
    fn pointer_leave_keeps_last_position() {
        let mut sampler = SignalSampler::new(Viewport::new(800.0, 600.0));
        sampler.apply(&Signal::PointerMove {
            client_x: 1.0,
            client_y: 2.0,
        });
        sampler.apply(&Signal::PointerLeave);
        assert_eq!(sampler.pointer_document(), Some(Point::new(1.0, 2.0)));
    }
}
