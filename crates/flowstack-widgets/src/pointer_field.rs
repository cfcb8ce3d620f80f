#![forbid(unsafe_code)]

//! Pointer-reactive glyph field.
//!
//! Text is split into per-glyph elements; each glyph is disturbed (blurred,
//! faded, enlarged) in proportion to how close the pointer is to its center,
//! and settles back to neutral outside the effect radius.
//!
//! Glyphs inside a sticky stage keep their client position while the stage is
//! stuck and scroll with the page once it releases. Such fields use
//! [`Anchoring::Viewport`]: their positions are re-read whenever the scroll
//! offset has moved since the last measurement, so both phases stay correct.

use unicode_segmentation::UnicodeSegmentation;

use flowstack_core::config::EffectConfig;
use flowstack_core::geometry::{Point, Viewport};
use flowstack_core::handle::ElementHandle;
use flowstack_core::measure::InvalidationCause;
use flowstack_core::visual::{EffectProfile, RenderForm};

use crate::tracked::Tracked;

/// Non-breaking space, substituted for spaces so glyph boxes keep their width.
pub const NBSP: &str = "\u{00A0}";

/// Split `text` into user-perceived characters, one element each.
///
/// Spaces become non-breaking spaces.
pub fn split_glyphs(text: &str) -> Vec<String> {
    text.graphemes(true)
        .map(|g| if g == " " { NBSP.to_string() } else { g.to_string() })
        .collect()
}

/// Coordinate space glyph positions are stable in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchoring {
    /// Glyphs scroll with the page.
    #[default]
    Document,
    /// Glyphs may stay put while the page scrolls (sticky or fixed
    /// ancestors). Positions are refreshed on scroll.
    Viewport,
}

/// Pointer-distance effect over per-glyph handles.
pub struct PointerField {
    config: EffectConfig,
    profile: EffectProfile,
    anchoring: Anchoring,
    glyphs: Tracked,
    /// Scroll offset at the last measurement pass.
    measured_scroll: Point,
}

impl PointerField {
    pub fn new(config: EffectConfig, glyphs: Vec<Box<dyn ElementHandle>>) -> Self {
        Self {
            profile: config.profile(),
            config,
            anchoring: Anchoring::Document,
            glyphs: Tracked::new(glyphs),
            measured_scroll: Point::new(0.0, 0.0),
        }
    }

    /// Default contact configuration.
    pub fn with_defaults(glyphs: Vec<Box<dyn ElementHandle>>) -> Self {
        Self::new(EffectConfig::contact(), glyphs)
    }

    /// Builder: set the anchoring.
    #[must_use]
    pub fn anchoring(mut self, anchoring: Anchoring) -> Self {
        self.anchoring = anchoring;
        self
    }

    #[inline]
    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.glyphs.len() == 0
    }

    /// Measurement pass at the current scroll offset.
    pub fn measure(&mut self, viewport: &Viewport) -> usize {
        self.measured_scroll = Point::new(viewport.scroll_x, viewport.scroll_y);
        self.glyphs.measure_all()
    }

    pub fn invalidate(&mut self, cause: InvalidationCause) {
        self.glyphs.invalidate(cause);
    }

    /// Re-measure a viewport-anchored field whose scroll offset moved since
    /// the last measurement. Returns whether a measurement ran.
    pub fn refresh(&mut self, viewport: &Viewport) -> bool {
        let scrolled = self.measured_scroll != Point::new(viewport.scroll_x, viewport.scroll_y);
        if self.anchoring != Anchoring::Viewport || !scrolled || self.is_empty() {
            return false;
        }
        self.measure(viewport);
        true
    }

    /// Transform pass for a pointer at `pointer_client`.
    ///
    /// Nothing is written before the first pointer sample. Returns the number
    /// of glyphs written.
    pub fn frame(&mut self, viewport: &Viewport, pointer_client: Option<Point>) -> usize {
        let Some(client) = pointer_client else {
            return 0;
        };
        let pointer = match self.anchoring {
            // Shift the pointer into the coordinate frame the glyphs were
            // measured in.
            Anchoring::Document => viewport.client_to_document(client),
            Anchoring::Viewport => Point::new(
                client.x + self.measured_scroll.x,
                client.y + self.measured_scroll.y,
            ),
        };
        let normalizer = self.config.pointer_normalizer(viewport.height);
        let mut written = 0;
        for slot in 0..self.glyphs.len() {
            let Some(glyph) = self.glyphs.measurement(slot) else {
                continue;
            };
            let p = normalizer.progress(&glyph, pointer);
            let style = self.profile.synthesize(p).to_style(RenderForm::Glyph);
            if self.glyphs.write(slot, style) {
                written += 1;
            }
        }
        written
    }
}
