#![forbid(unsafe_code)]

//! Progress normalization.
//!
//! Turns a raw geometric measurement into a bounded progress value where
//! `0` means "at the reference point, fully focused" and `1` means "at or past
//! the edge of the effect range, fully de-emphasized".
//!
//! The base computation is always `min(|distance| / range, 1)`; nothing is
//! extrapolated past the range. Two reference frames are provided:
//!
//! - [`ViewportCenterNormalizer`]: vertical offset of the element center from
//!   the viewport center, range a fraction of viewport height.
//! - [`PointerDistanceNormalizer`]: Euclidean distance from the pointer, range
//!   a fixed pixel radius, followed by a cubic ease-out.

use crate::animation::{Falloff, ease_out_cubic};
use crate::geometry::{Measurement, Point, Viewport};

/// Default viewport-center range as a fraction of viewport height.
pub const DEFAULT_VIEWPORT_FRACTION: f64 = 0.55;

/// Default pointer effect radius in pixels.
pub const DEFAULT_POINTER_RADIUS: f64 = 300.0;

/// Progress clamped into [0, 1].
///
/// The only constructor clamps, so an unclamped value cannot reach the
/// transform synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Progress(f64);

impl Progress {
    /// At the reference point.
    pub const FOCUSED: Self = Self(0.0);
    /// At or beyond the edge of the range.
    pub const FAR: Self = Self(1.0);

    /// Clamp `value` into [0, 1]. NaN is treated as fully de-emphasized.
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self::FAR
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// The clamped value.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// `1 - p`.
    #[inline]
    #[must_use]
    pub fn inverted(self) -> Self {
        Self(1.0 - self.0)
    }
}

/// Signed progress clamped into [-1, 1]; negative means before the reference.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct SignedProgress(f64);

impl SignedProgress {
    /// Clamp `value` into [-1, 1]. NaN maps to 1.
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(1.0)
        } else {
            Self(value.clamp(-1.0, 1.0))
        }
    }

    /// The clamped value.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Magnitude as unsigned progress.
    #[inline]
    pub fn magnitude(self) -> Progress {
        Progress::new(self.0.abs())
    }
}

/// `min(|distance| / range, 1)`.
///
/// A non-positive range collapses the effect to a step: zero distance is
/// focused, anything else is far.
#[inline]
#[must_use]
pub fn normalize(distance: f64, range: f64) -> Progress {
    let distance = distance.abs();
    if range.is_nan() || range <= 0.0 {
        return if distance == 0.0 {
            Progress::FOCUSED
        } else {
            Progress::FAR
        };
    }
    Progress::new((distance / range).min(1.0))
}

/// Viewport-center reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportCenterNormalizer {
    /// Effect range as a fraction of viewport height.
    pub range_fraction: f64,
    pub falloff: Falloff,
}

impl Default for ViewportCenterNormalizer {
    fn default() -> Self {
        Self {
            range_fraction: DEFAULT_VIEWPORT_FRACTION,
            falloff: Falloff::Linear,
        }
    }
}

impl ViewportCenterNormalizer {
    /// Effective range in pixels for `viewport`.
    #[inline]
    pub fn range(&self, viewport: &Viewport) -> f64 {
        viewport.height * self.range_fraction
    }

    /// Signed offset from center and the shaped unsigned progress.
    pub fn measure(
        &self,
        element: &Measurement,
        viewport: &Viewport,
    ) -> (SignedProgress, Progress) {
        let offset = element.center().y - viewport.center_y_document();
        let range = self.range(viewport);
        let raw = normalize(offset, range);
        let signed = if range > 0.0 {
            SignedProgress::new(offset / range)
        } else {
            SignedProgress::new(raw.get().copysign(offset))
        };
        (signed, Progress::new(self.falloff.apply(raw.get())))
    }

    /// Shaped unsigned progress only.
    #[inline]
    pub fn progress(&self, element: &Measurement, viewport: &Viewport) -> Progress {
        self.measure(element, viewport).1
    }
}

/// Pointer-distance reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDistanceNormalizer {
    /// Effect radius in pixels.
    pub radius: f64,
    pub falloff: Falloff,
}

impl Default for PointerDistanceNormalizer {
    fn default() -> Self {
        Self {
            radius: DEFAULT_POINTER_RADIUS,
            falloff: Falloff::Linear,
        }
    }
}

impl PointerDistanceNormalizer {
    /// Raw (unshaped) progress for the element.
    #[inline]
    pub fn raw(&self, element: &Measurement, pointer: Point) -> Progress {
        normalize(element.center().distance_to(pointer), self.radius)
    }

    /// Falloff-shaped, cubic-eased progress for the element.
    #[inline]
    pub fn progress(&self, element: &Measurement, pointer: Point) -> Progress {
        let raw = self.raw(element, pointer);
        Progress::new(ease_out_cubic(self.falloff.apply(raw.get())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_clamps() {
        assert_eq!(Progress::new(-0.5).get(), 0.0);
        assert_eq!(Progress::new(1.5).get(), 1.0);
        assert_eq!(Progress::new(f64::NAN), Progress::FAR);
        assert_eq!(Progress::new(0.25).inverted().get(), 0.75);
    }

    #[test]
    fn normalize_base_formula() {
        assert_eq!(normalize(0.0, 550.0).get(), 0.0);
        assert_eq!(normalize(275.0, 550.0).get(), 0.5);
        assert_eq!(normalize(-275.0, 550.0).get(), 0.5);
        assert_eq!(normalize(550.0, 550.0).get(), 1.0);
        assert_eq!(normalize(10_000.0, 550.0).get(), 1.0);
    }

    #[test]
    fn degenerate_range_is_a_step() {
        assert_eq!(normalize(0.0, 0.0), Progress::FOCUSED);
        assert_eq!(normalize(1.0, 0.0), Progress::FAR);
        assert_eq!(normalize(1.0, -5.0), Progress::FAR);
    }

    #[test]
    fn viewport_center_at_center_is_focused() {
        let vp = Viewport::new(1280.0, 1000.0);
        let element = Measurement::new(0.0, 450.0, 500.0, 100.0);
        let (signed, p) = ViewportCenterNormalizer::default().measure(&element, &vp);
        assert_eq!(p, Progress::FOCUSED);
        assert_eq!(signed.get(), 0.0);
    }

    #[test]
    fn viewport_center_sign_follows_side() {
        let vp = Viewport::new(1280.0, 1000.0).scrolled_to(0.0, 2000.0);
        let norm = ViewportCenterNormalizer::default();
        let above = Measurement::new(0.0, 2000.0, 10.0, 10.0);
        let below = Measurement::new(0.0, 3100.0, 10.0, 10.0);
        assert!(norm.measure(&above, &vp).0.get() < 0.0);
        assert!(norm.measure(&below, &vp).0.get() > 0.0);
        assert_eq!(norm.measure(&below, &vp).1, Progress::FAR);
    }

    #[test]
    fn pointer_progress_is_eased() {
        let norm = PointerDistanceNormalizer::default();
        let element = Measurement::new(-5.0, -5.0, 10.0, 10.0);
        let p = norm.progress(&element, Point::new(150.0, 0.0));
        assert!((p.get() - 0.875).abs() < 1e-12);
        assert_eq!(norm.raw(&element, Point::new(150.0, 0.0)).get(), 0.5);
    }

    #[test]
    fn pointer_beyond_radius_is_exactly_far() {
        let norm = PointerDistanceNormalizer::default();
        let element = Measurement::new(-5.0, -5.0, 10.0, 10.0);
        assert_eq!(norm.progress(&element, Point::new(600.0, 0.0)), Progress::FAR);
    }
}
