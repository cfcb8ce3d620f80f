#![forbid(unsafe_code)]

//! Geometric primitives in document coordinates.
//!
//! All positions are CSS pixels relative to the document origin (top-left of
//! the page, not the viewport), so they stay valid while the page scrolls.

use crate::animation::lerp;

/// A point in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Measured bounds of a tracked element (character, card, or text block).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Measurement {
    /// Create a new measurement.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether every component is finite.
    ///
    /// Hosts can report NaN for detached elements; such measurements are
    /// treated as missing.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Component-wise interpolation toward `to`.
    pub fn lerp(&self, to: &Measurement, t: f64) -> Measurement {
        Measurement {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
            width: lerp(self.width, to.width, t),
            height: lerp(self.height, to.height, t),
        }
    }
}

/// The visible window onto the document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Create a viewport of the given size scrolled to the origin.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
        }
    }

    /// Builder: set the scroll offset.
    #[inline]
    #[must_use]
    pub const fn scrolled_to(mut self, x: f64, y: f64) -> Self {
        self.scroll_x = x;
        self.scroll_y = y;
        self
    }

    /// Vertical center of the viewport, in document coordinates.
    #[inline]
    pub fn center_y_document(&self) -> f64 {
        self.scroll_y + self.height / 2.0
    }

    /// Full viewport bounds in document coordinates.
    #[inline]
    pub fn bounds(&self) -> Measurement {
        Measurement::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }

    /// Convert a viewport-relative (client) point to document coordinates.
    #[inline]
    pub fn client_to_document(&self, client: Point) -> Point {
        Point::new(client.x + self.scroll_x, client.y + self.scroll_y)
    }

    /// Convert a document-space measurement to viewport-relative bounds.
    #[inline]
    pub fn document_to_client(&self, m: &Measurement) -> Measurement {
        Measurement::new(m.x - self.scroll_x, m.y - self.scroll_y, m.width, m.height)
    }
}
