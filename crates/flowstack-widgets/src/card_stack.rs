#![forbid(unsafe_code)]

//! Scroll-driven card stack.
//!
//! A tall container scrolls past a sticky stage. The scroll distance into the
//! container, measured in "card units" of `scroll_per_card × viewport height`,
//! is the stack *depth*. Card `i` sits at distance `(i + 1) − depth`:
//!
//! - positive distance: the card is still entering from below, offset by up
//!   to `entry_window × entry_offset` percent and shrunk;
//! - zero or negative: the card has landed and recedes under the cards that
//!   follow it (nudged up, shrunk, dimmed, blurred).
//!
//! While depth is below one the whole stage is tilted back in perspective and
//! scaled down, straightening as the first card lands.
//!
//! ```text
//!   depth 0.0        depth 1.5               depth 3.0
//!   ┌──────┐         ┌──────┐ ← card 0       ┌──────┐ ← 0, 1 stacked
//!   │tilted│         │ card1│ ← half in      │ card2│ ← front
//!   └──────┘         └──────┘                └──────┘
//! ```

use serde::{Deserialize, Serialize};

use flowstack_core::config::ConfigError;
use flowstack_core::geometry::{Measurement, Viewport};
use flowstack_core::handle::ElementHandle;
use flowstack_core::measure::InvalidationCause;
use flowstack_core::visual::{RenderForm, StyleWrite, VisualParams};

use crate::deck::CardId;
use crate::shared_element::{Owner, SharedElementRegistry};
use crate::tracked::Tracked;

/// Tuning for the stack choreography.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Scroll distance per card, as a fraction of viewport height.
    pub scroll_per_card: f64,
    /// Distance (in cards) over which an entering card travels.
    pub entry_window: f64,
    /// Entering offset per card unit, percent of card height.
    pub entry_offset: f64,
    /// Entering shrink per card unit.
    pub entry_shrink: f64,
    /// Upward nudge per stacked unit, percent of card height.
    pub stacked_offset: f64,
    pub stacked_shrink: f64,
    pub stacked_dim: f64,
    /// Blur per stacked unit, pixels.
    pub stacked_blur: f64,
    /// z-index of the first card.
    pub base_z: i32,
    /// Stage tilt at depth 0, degrees.
    pub tilt: f64,
    /// Stage scale at depth 0.
    pub entry_scale: f64,
    /// Stage perspective distance, pixels.
    pub perspective: f64,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            scroll_per_card: 0.8,
            entry_window: 2.0,
            entry_offset: 110.0,
            entry_shrink: 0.1,
            stacked_offset: 10.0,
            stacked_shrink: 0.05,
            stacked_dim: 0.1,
            stacked_blur: 2.0,
            base_z: 10,
            tilt: 40.0,
            entry_scale: 0.8,
            perspective: 1000.0,
        }
    }
}

impl StackConfig {
    /// Collect every field that would put non-finite or inverted values on
    /// the frame path.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let positive = [
            ("stack.scroll_per_card", self.scroll_per_card),
            ("stack.entry_window", self.entry_window),
            ("stack.entry_scale", self.entry_scale),
            ("stack.perspective", self.perspective),
        ];
        let non_negative = [
            ("stack.entry_offset", self.entry_offset),
            ("stack.entry_shrink", self.entry_shrink),
            ("stack.stacked_offset", self.stacked_offset),
            ("stack.stacked_shrink", self.stacked_shrink),
            ("stack.stacked_dim", self.stacked_dim),
            ("stack.stacked_blur", self.stacked_blur),
        ];
        let mut errors = Vec::new();
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                errors.push(ConfigError::new(field, value.to_string(), "must be positive"));
            }
        }
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(ConfigError::new(field, value.to_string(), "must be >= 0"));
            }
        }
        if !self.tilt.is_finite() {
            errors.push(ConfigError::new("stack.tilt", self.tilt.to_string(), "must be finite"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Container height that gives every card its scroll span plus two
    /// units of run-out.
    #[inline]
    pub fn container_height(&self, count: usize, viewport_height: f64) -> f64 {
        (count as f64 + 2.0) * (self.scroll_per_card * viewport_height)
    }

    /// Stack depth in [0, count] for the current scroll position.
    pub fn depth_progress(&self, container: &Measurement, viewport: &Viewport, count: usize) -> f64 {
        let unit = self.scroll_per_card * viewport.height;
        if !(unit.is_finite() && unit > 0.0) {
            return 0.0;
        }
        let depth = (viewport.scroll_y - container.y) / unit;
        if depth.is_nan() {
            0.0
        } else {
            depth.clamp(0.0, count as f64)
        }
    }

    /// Pose of card `index` at `depth`.
    pub fn card_pose(&self, index: usize, depth: f64) -> VisualParams {
        let dist = (index as f64 + 1.0) - depth;
        let mut pose = if dist > 0.0 {
            let enter = dist.min(self.entry_window);
            VisualParams {
                translate_y: enter * self.entry_offset,
                scale: (1.0 - enter * self.entry_shrink).max(0.0),
                ..VisualParams::NEUTRAL
            }
        } else {
            let stacked = dist.abs();
            VisualParams {
                translate_y: -stacked * self.stacked_offset,
                scale: (1.0 - stacked * self.stacked_shrink).max(0.0),
                brightness: (1.0 - stacked * self.stacked_dim).max(0.0),
                blur: stacked * self.stacked_blur,
                ..VisualParams::NEUTRAL
            }
        };
        pose.z_index = Some(self.base_z.saturating_add(index as i32));
        pose.quantized()
    }

    /// Pose of the stage wrapper at `depth`.
    pub fn wrapper_pose(&self, depth: f64) -> VisualParams {
        if depth >= 1.0 {
            return VisualParams::NEUTRAL;
        }
        let remaining = 1.0 - depth.max(0.0);
        VisualParams {
            rotate_x: remaining * self.tilt,
            scale: self.entry_scale + (1.0 - self.entry_scale) * (1.0 - remaining),
            ..VisualParams::NEUTRAL
        }
        .quantized()
    }
}

const SLOT_CONTAINER: usize = 0;
const SLOT_WRAPPER: usize = 1;

/// Card stack bound to its element handles.
pub struct CardStack {
    config: StackConfig,
    ids: Vec<CardId>,
    stage: Tracked,
    cards: Tracked,
    depth: f64,
}

impl CardStack {
    /// `container` is the tall scroll container, `wrapper` the sticky stage
    /// that tilts, `cards` one handle per card in deck order.
    pub fn new(
        config: StackConfig,
        container: Box<dyn ElementHandle>,
        wrapper: Box<dyn ElementHandle>,
        cards: Vec<(CardId, Box<dyn ElementHandle>)>,
    ) -> Self {
        let (ids, handles): (Vec<_>, Vec<_>) = cards.into_iter().unzip();
        Self {
            config,
            ids,
            stage: Tracked::new(vec![container, wrapper]),
            cards: Tracked::new(handles),
            depth: 0.0,
        }
    }

    #[inline]
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.len() == 0
    }

    pub fn ids(&self) -> &[CardId] {
        &self.ids
    }

    /// Depth computed by the last frame.
    #[inline]
    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Container height for the current viewport height.
    pub fn container_height(&self, viewport_height: f64) -> f64 {
        self.config.container_height(self.len(), viewport_height)
    }

    /// Size the scroll container for the current viewport height.
    ///
    /// Runs ahead of the measurement pass so the runway tracks resizes.
    /// Returns whether the container was written.
    pub fn size_container(&mut self, viewport_height: f64) -> bool {
        let write = StyleWrite::height_px(self.container_height(viewport_height));
        if write.is_empty() {
            return false;
        }
        self.stage.write(SLOT_CONTAINER, write)
    }

    /// Measurement pass. Returns the number of cards laid out.
    pub fn measure(&mut self) -> usize {
        self.stage.measure_all();
        self.cards.measure_all()
    }

    pub fn invalidate(&mut self, cause: InvalidationCause) {
        self.stage.invalidate(cause);
        self.cards.invalidate(cause);
    }

    /// Current bounds of `card`, read directly from its handle.
    pub fn card_bounds(&self, card: CardId) -> Option<Measurement> {
        let slot = self.ids.iter().position(|&id| id == card)?;
        self.cards.measure_now(slot)
    }

    /// Resume writing `card` after the overlay hands it back.
    pub fn reclaim(&mut self, card: CardId) {
        if let Some(slot) = self.ids.iter().position(|&id| id == card) {
            self.cards.forget(slot);
        }
    }

    /// Transform pass. Returns the number of handles written.
    ///
    /// Without a fresh container measurement there is no depth to pose
    /// against, so nothing is written.
    pub fn frame(&mut self, viewport: &Viewport, shared: &SharedElementRegistry) -> usize {
        #[cfg(feature = "tracing")]
        let _span = tracing::trace_span!("card_stack_frame", cards = self.ids.len()).entered();
        let Some(container) = self.stage.measurement(SLOT_CONTAINER) else {
            flowstack_core::trace!("card stack skipped: container unmeasured");
            return 0;
        };
        self.depth = self
            .config
            .depth_progress(&container, viewport, self.ids.len());
        let mut written = 0;
        let wrapper = self.config.wrapper_pose(self.depth).to_style(RenderForm::StackWrapper {
            perspective: self.config.perspective,
        });
        if self.stage.write(SLOT_WRAPPER, wrapper) {
            written += 1;
        }
        for (slot, &id) in self.ids.iter().enumerate() {
            if shared.owner(id) == Owner::Overlay {
                continue;
            }
            let pose = self.config.card_pose(slot, self.depth);
            if self.cards.write(slot, pose.to_style(RenderForm::Card)) {
                written += 1;
            }
        }
        written
    }
}
