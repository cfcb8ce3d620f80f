#![forbid(unsafe_code)]

//! Imperative element handles.
//!
//! The animation loop never touches a view tree. Each tracked element is
//! reached through a stable [`ElementHandle`] that can report its geometry
//! (read pass) and accept a [`StyleWrite`] (write pass). Keeping the two
//! operations on separate passes avoids forcing synchronous layout.

use crate::geometry::Measurement;
use crate::visual::StyleWrite;

/// A stable reference to one rendered element.
pub trait ElementHandle {
    /// Bounds in document coordinates, or `None` when the element is not laid
    /// out (detached, hidden, or not yet rendered).
    fn measure(&self) -> Option<Measurement>;

    /// Apply style values. Fields set to `None` are left untouched.
    fn apply(&mut self, write: &StyleWrite);
}

impl<H: ElementHandle + ?Sized> ElementHandle for Box<H> {
    fn measure(&self) -> Option<Measurement> {
        (**self).measure()
    }

    fn apply(&mut self, write: &StyleWrite) {
        (**self).apply(write);
    }
}
