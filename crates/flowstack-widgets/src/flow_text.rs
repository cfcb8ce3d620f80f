#![forbid(unsafe_code)]

//! Viewport-center focus text.
//!
//! Each tracked block is sharp, opaque, and slightly enlarged when its center
//! sits at the viewport center, and recedes (blur, fade, shrink) as it moves
//! toward either edge of the effect range.

use flowstack_core::config::EffectConfig;
use flowstack_core::geometry::Viewport;
use flowstack_core::handle::ElementHandle;
use flowstack_core::measure::InvalidationCause;
use flowstack_core::visual::{EffectProfile, RenderForm};

use crate::tracked::Tracked;

/// Focus effect over one or more text blocks.
pub struct FlowText {
    config: EffectConfig,
    profile: EffectProfile,
    blocks: Tracked,
}

impl FlowText {
    pub fn new(config: EffectConfig, blocks: Vec<Box<dyn ElementHandle>>) -> Self {
        Self {
            profile: config.profile(),
            config,
            blocks: Tracked::new(blocks),
        }
    }

    /// Default focus configuration.
    pub fn with_defaults(blocks: Vec<Box<dyn ElementHandle>>) -> Self {
        Self::new(EffectConfig::focus(), blocks)
    }

    #[inline]
    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.len() == 0
    }

    /// Measurement pass. Returns the number of blocks laid out.
    pub fn measure(&mut self) -> usize {
        self.blocks.measure_all()
    }

    pub fn invalidate(&mut self, cause: InvalidationCause) {
        self.blocks.invalidate(cause);
    }

    /// Transform pass. Unmeasured blocks are left alone. Returns the number
    /// of blocks written.
    pub fn frame(&mut self, viewport: &Viewport) -> usize {
        let normalizer = self.config.viewport_normalizer(viewport.height);
        let mut written = 0;
        for slot in 0..self.blocks.len() {
            let Some(block) = self.blocks.measurement(slot) else {
                continue;
            };
            let p = normalizer.progress(&block, viewport);
            let style = self.profile.synthesize(p).to_style(RenderForm::Glyph);
            if self.blocks.write(slot, style) {
                written += 1;
            }
        }
        written
    }
}
