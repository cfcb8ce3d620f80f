#![forbid(unsafe_code)]

//! Transform synthesis: progress to concrete visual parameters.
//!
//! [`EffectProfile::synthesize`] is a pure function from a clamped
//! [`Progress`] to a [`VisualParams`] set. Each parameter interpolates
//! independently between its `from` value (progress 0, at the reference) and
//! its `to` value (progress 1, edge of range).
//!
//! The direction of the effect is declared by the profile's [`Polarity`]:
//!
//! | Polarity | At the reference | Far away |
//! |----------|------------------|----------|
//! | `Focus`  | sharp, opaque, enlarged | blurred, dim, shrunk |
//! | `Contact`| blurred, dim, enlarged  | sharp, opaque, neutral |
//!
//! Every output is rounded to a fixed number of decimals before it leaves
//! this module, and [`StyleWrite`] strings are formatted with the same
//! precision, so identical input always yields byte-identical writes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::animation::lerp;
use crate::geometry::Measurement;
use crate::progress::Progress;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// A visual parameter the synthesizer can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    /// Gaussian blur radius in pixels.
    Blur,
    Opacity,
    /// Uniform scale factor.
    Scale,
    /// Vertical offset as a percentage of the element's own height.
    TranslateY,
    /// Brightness multiplier.
    Brightness,
    /// Rotation about the X axis in degrees.
    RotateX,
}

impl Param {
    pub const ALL: [Param; 6] = [
        Param::Blur,
        Param::Opacity,
        Param::Scale,
        Param::TranslateY,
        Param::Brightness,
        Param::RotateX,
    ];

    /// Decimal places kept when rounding and formatting.
    #[must_use]
    pub const fn decimals(self) -> usize {
        match self {
            Self::Blur | Self::TranslateY | Self::RotateX => 2,
            Self::Opacity | Self::Scale | Self::Brightness => 3,
        }
    }

    /// Value that leaves the element visually untouched.
    #[must_use]
    pub const fn neutral(self) -> f64 {
        match self {
            Self::Blur | Self::TranslateY | Self::RotateX => 0.0,
            Self::Opacity | Self::Scale | Self::Brightness => 1.0,
        }
    }

    /// Configuration name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blur => "blur",
            Self::Opacity => "opacity",
            Self::Scale => "scale",
            Self::TranslateY => "translate_y",
            Self::Brightness => "brightness",
            Self::RotateX => "rotate_x",
        }
    }
}

/// Endpoints of one parameter's interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    /// Value at progress 0.
    pub from: f64,
    /// Value at progress 1.
    pub to: f64,
}

impl ParamRange {
    #[must_use]
    pub const fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    /// A range that does not vary with progress.
    #[must_use]
    pub const fn constant(value: f64) -> Self {
        Self::new(value, value)
    }

    /// Interpolated value at `p`.
    #[inline]
    pub fn at(&self, p: Progress) -> f64 {
        lerp(self.from, self.to, p.get())
    }
}

// ---------------------------------------------------------------------------
// Polarity
// ---------------------------------------------------------------------------

/// Which end of the progress range is emphasized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Sharp and enlarged at the reference (viewport-center text).
    Focus,
    /// Disturbed at the reference, neutral far away (pointer glyphs).
    Contact,
}

impl Polarity {
    /// Default range for `param` under this polarity.
    #[must_use]
    pub const fn default_range(self, param: Param) -> ParamRange {
        match (self, param) {
            (Self::Focus, Param::Blur) => ParamRange::new(0.0, 24.0),
            (Self::Focus, Param::Opacity) => ParamRange::new(1.0, 0.3),
            (Self::Focus, Param::Scale) => ParamRange::new(1.05, 0.95),
            (Self::Contact, Param::Blur) => ParamRange::new(12.0, 0.0),
            (Self::Contact, Param::Opacity) => ParamRange::new(0.5, 1.0),
            (Self::Contact, Param::Scale) => ParamRange::new(1.15, 1.0),
            (_, other) => ParamRange::constant(other.neutral()),
        }
    }
}

/// A range that points the wrong way for its profile's polarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarityViolation {
    pub param: Param,
    pub range: ParamRange,
    pub expected: &'static str,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Per-component interpolation rules.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectProfile {
    polarity: Polarity,
    ranges: BTreeMap<Param, ParamRange>,
}

impl EffectProfile {
    /// Profile with the polarity's default ranges.
    #[must_use]
    pub fn new(polarity: Polarity) -> Self {
        let ranges = Param::ALL
            .iter()
            .map(|&p| (p, polarity.default_range(p)))
            .collect();
        Self { polarity, ranges }
    }

    /// Viewport-center text profile.
    #[must_use]
    pub fn focus() -> Self {
        Self::new(Polarity::Focus)
    }

    /// Pointer-contact glyph profile.
    #[must_use]
    pub fn contact() -> Self {
        Self::new(Polarity::Contact)
    }

    /// Builder: override one parameter's range.
    #[must_use]
    pub fn with_range(mut self, param: Param, range: ParamRange) -> Self {
        self.ranges.insert(param, range);
        self
    }

    #[inline]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Range for `param`.
    pub fn range(&self, param: Param) -> ParamRange {
        self.ranges
            .get(&param)
            .copied()
            .unwrap_or_else(|| self.polarity.default_range(param))
    }

    /// Ranges that contradict the declared polarity.
    ///
    /// Focus profiles must not blur more at the reference than at the edge and
    /// must scale toward the larger endpoint at the reference. Contact
    /// profiles must be at least as blurred and no more opaque at the
    /// reference than far away.
    pub fn polarity_violations(&self) -> Vec<PolarityViolation> {
        let mut out = Vec::new();
        let mut check = |param: Param, ok: fn(&ParamRange) -> bool, expected: &'static str| {
            let range = self.range(param);
            if !ok(&range) {
                out.push(PolarityViolation {
                    param,
                    range,
                    expected,
                });
            }
        };
        match self.polarity {
            Polarity::Focus => {
                check(Param::Blur, |r| r.from <= r.to, "from <= to");
                check(Param::Scale, |r| r.from >= r.to, "from >= to");
            }
            Polarity::Contact => {
                check(Param::Blur, |r| r.from >= r.to, "from >= to");
                check(Param::Opacity, |r| r.from <= r.to, "from <= to");
            }
        }
        out
    }

    /// Map progress to rounded visual parameters.
    pub fn synthesize(&self, p: Progress) -> VisualParams {
        VisualParams {
            blur: self.range(Param::Blur).at(p),
            opacity: self.range(Param::Opacity).at(p),
            scale: self.range(Param::Scale).at(p),
            translate_y: self.range(Param::TranslateY).at(p),
            brightness: self.range(Param::Brightness).at(p),
            rotate_x: self.range(Param::RotateX).at(p),
            z_index: None,
        }
        .quantized()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Round to `decimals` places; negative zero becomes zero.
#[inline]
#[must_use]
pub fn quantize(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    let q = (value * scale).round() / scale;
    if q == 0.0 { 0.0 } else { q }
}

/// Format with fixed precision after quantizing.
#[inline]
#[must_use]
pub fn fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, quantize(value, decimals))
}

/// Concrete visual parameters for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualParams {
    pub blur: f64,
    pub opacity: f64,
    pub scale: f64,
    pub translate_y: f64,
    pub brightness: f64,
    pub rotate_x: f64,
    /// Stacking order, if this element participates in one.
    pub z_index: Option<i32>,
}

impl Default for VisualParams {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl VisualParams {
    /// Parameters that leave an element untouched.
    pub const NEUTRAL: Self = Self {
        blur: 0.0,
        opacity: 1.0,
        scale: 1.0,
        translate_y: 0.0,
        brightness: 1.0,
        rotate_x: 0.0,
        z_index: None,
    };

    /// Round every component to its fixed precision.
    #[must_use]
    pub fn quantized(self) -> Self {
        Self {
            blur: quantize(self.blur, Param::Blur.decimals()),
            opacity: quantize(self.opacity, Param::Opacity.decimals()),
            scale: quantize(self.scale, Param::Scale.decimals()),
            translate_y: quantize(self.translate_y, Param::TranslateY.decimals()),
            brightness: quantize(self.brightness, Param::Brightness.decimals()),
            rotate_x: quantize(self.rotate_x, Param::RotateX.decimals()),
            z_index: self.z_index,
        }
    }

    /// Render into style strings for the given element form.
    pub fn to_style(&self, form: RenderForm) -> StyleWrite {
        let f = |param: Param, v: f64| fixed(v, param.decimals());
        match form {
            RenderForm::Glyph => {
                let s = f(Param::Scale, self.scale);
                StyleWrite {
                    filter: Some(format!("blur({}px)", f(Param::Blur, self.blur))),
                    opacity: Some(f(Param::Opacity, self.opacity)),
                    transform: Some(format!("scale3d({s}, {s}, 1)")),
                    ..StyleWrite::default()
                }
            }
            RenderForm::Card => StyleWrite {
                filter: Some(format!(
                    "brightness({}) blur({}px)",
                    f(Param::Brightness, self.brightness),
                    f(Param::Blur, self.blur)
                )),
                transform: Some(format!(
                    "translate3d(0, {}%, 0) scale({})",
                    f(Param::TranslateY, self.translate_y),
                    f(Param::Scale, self.scale)
                )),
                z_index: self.z_index.map(|z| z.to_string()),
                ..StyleWrite::default()
            },
            RenderForm::StackWrapper { perspective } => StyleWrite {
                transform: Some(format!(
                    "perspective({}px) rotateX({}deg) scale({})",
                    fixed(perspective, 0),
                    f(Param::RotateX, self.rotate_x),
                    f(Param::Scale, self.scale)
                )),
                ..StyleWrite::default()
            },
        }
    }
}

/// How an element consumes its visual parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderForm {
    /// Text glyph or block: blur filter, opacity, uniform 3D scale.
    Glyph,
    /// Stacked card: percentage offset plus scale, brightness plus blur, z-order.
    Card,
    /// Whole-stack wrapper: perspective tilt plus scale.
    StackWrapper { perspective: f64 },
}

/// Style values ready to be written to a render target.
///
/// `None` fields are left untouched by the host.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleWrite {
    pub filter: Option<String>,
    pub opacity: Option<String>,
    pub transform: Option<String>,
    pub z_index: Option<String>,
    /// Fixed-position bounds in client pixels (overlay presentation).
    pub bounds: Option<Measurement>,
    /// Block size, e.g. `"5600px"`.
    pub height: Option<String>,
}

impl StyleWrite {
    /// Full-bleed overlay write: client bounds plus opacity.
    #[must_use]
    pub fn overlay(bounds: Measurement, opacity: f64) -> Self {
        let q = |v: f64| quantize(v, 2);
        Self {
            opacity: Some(fixed(opacity, Param::Opacity.decimals())),
            bounds: Some(Measurement::new(
                q(bounds.x),
                q(bounds.y),
                q(bounds.width),
                q(bounds.height),
            )),
            ..Self::default()
        }
    }

    /// Height-only write in whole pixels. Non-finite or negative heights
    /// produce an empty write.
    #[must_use]
    pub fn height_px(px: f64) -> Self {
        if !(px.is_finite() && px >= 0.0) {
            return Self::default();
        }
        Self {
            height: Some(format!("{}px", fixed(px, 0))),
            ..Self::default()
        }
    }

    /// Whether the write touches nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn focus_profile_at_reference() {
        let v = EffectProfile::focus().synthesize(Progress::FOCUSED);
        assert_eq!(v.blur, 0.0);
        assert_eq!(v.opacity, 1.0);
        assert_eq!(v.scale, 1.05);
    }

    #[test]
    fn focus_profile_at_edge() {
        let v = EffectProfile::focus().synthesize(Progress::FAR);
        assert_eq!(v.blur, 24.0);
        assert_eq!(v.opacity, 0.3);
        assert_eq!(v.scale, 0.95);
    }

    #[test]
    fn contact_profile_is_inverted() {
        let near = EffectProfile::contact().synthesize(Progress::FOCUSED);
        let far = EffectProfile::contact().synthesize(Progress::FAR);
        assert_eq!((near.blur, near.opacity, near.scale), (12.0, 0.5, 1.15));
        assert_eq!(far, VisualParams::NEUTRAL);
    }

    #[test]
    fn outputs_are_rounded() {
        let v = EffectProfile::focus().synthesize(Progress::new(1.0 / 3.0));
        assert_eq!(v.blur, 8.0);
        assert_eq!(v.opacity, 0.767);
        assert_eq!(v.scale, 1.017);
    }

    #[test]
    fn glyph_style_strings() {
        let v = EffectProfile::contact().synthesize(Progress::new(0.5));
        let w = v.to_style(RenderForm::Glyph);
        assert_eq!(w.filter.as_deref(), Some("blur(6.00px)"));
        assert_eq!(w.opacity.as_deref(), Some("0.750"));
        assert_eq!(w.transform.as_deref(), Some("scale3d(1.075, 1.075, 1)"));
        assert_eq!(w.z_index, None);
    }

    #[test]
    fn card_style_strings() {
        let v = VisualParams {
            translate_y: -10.0,
            scale: 0.95,
            brightness: 0.9,
            blur: 2.0,
            z_index: Some(11),
            ..VisualParams::NEUTRAL
        };
        let w = v.to_style(RenderForm::Card);
        assert_eq!(
            w.transform.as_deref(),
            Some("translate3d(0, -10.00%, 0) scale(0.950)")
        );
        assert_eq!(w.filter.as_deref(), Some("brightness(0.900) blur(2.00px)"));
        assert_eq!(w.z_index.as_deref(), Some("11"));
    }

    #[test]
    fn wrapper_style_string() {
        let v = VisualParams {
            rotate_x: 40.0,
            scale: 0.8,
            ..VisualParams::NEUTRAL
        };
        let w = v.to_style(RenderForm::StackWrapper {
            perspective: 1000.0,
        });
        assert_eq!(
            w.transform.as_deref(),
            Some("perspective(1000px) rotateX(40.00deg) scale(0.800)")
        );
    }

    #[test]
    fn negative_zero_is_not_written() {
        assert_eq!(fixed(-0.0001, 2), "0.00");
        assert_eq!(fixed(-0.0, 3), "0.000");
    }

    #[test]
    fn overriding_a_range() {
        let profile =
            EffectProfile::focus().with_range(Param::Blur, ParamRange::new(0.0, 8.0));
        assert_eq!(profile.synthesize(Progress::FAR).blur, 8.0);
        assert!(profile.polarity_violations().is_empty());
    }

    #[test]
    fn reversed_focus_scale_is_a_violation() {
        let profile =
            EffectProfile::focus().with_range(Param::Scale, ParamRange::new(0.9, 1.1));
        let v = profile.polarity_violations();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].param, Param::Scale);
    }

    #[test]
    fn default_profiles_respect_polarity() {
        assert!(EffectProfile::focus().polarity_violations().is_empty());
        assert!(EffectProfile::contact().polarity_violations().is_empty());
    }

    #[test]
    fn overlay_write_rounds_bounds() {
        let w = StyleWrite::overlay(Measurement::new(0.123, 1.0, 99.999, 50.0), 0.5);
        assert_eq!(w.opacity.as_deref(), Some("0.500"));
        assert_eq!(w.bounds, Some(Measurement::new(0.12, 1.0, 100.0, 50.0)));
        assert!(!w.is_empty());
        assert!(StyleWrite::default().is_empty());
    }

    #[test]
    fn height_write_is_whole_pixels() {
        assert_eq!(StyleWrite::height_px(5599.6).height.as_deref(), Some("5600px"));
        assert!(StyleWrite::height_px(f64::NAN).is_empty());
        assert!(StyleWrite::height_px(-1.0).is_empty());
    }
}
