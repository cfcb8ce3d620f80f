#![forbid(unsafe_code)]

//! Gallery composition.
//!
//! [`Gallery`] wires the card stack, focus texts, pointer fields, lightbox,
//! and shared-element overlay to one signal sampler and one frame scheduler.
//!
//! # Passes
//!
//! ```text
//! signal ──▶ sampler ──┬─ layout change ──▶ invalidate + measure (now) ──┐
//!                      └─ scroll/pointer ───────────────────────────────┴▶ request frame
//!
//! frame  ──▶ tick transitions ──▶ stack ──▶ texts ──▶ fields ──▶ overlay
//!                                         (writes only, no layout reads)
//! ```
//!
//! Any number of signals between two display refreshes produce at most one
//! transform pass. While a shared-element transition is running the gallery
//! keeps requesting frames; once it settles the loop goes idle again.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use flowstack_core::frame::{FrameHost, FrameScheduler};
use flowstack_core::geometry::Viewport;
use flowstack_core::listener::{ListenerHost, ListenerKind, ListenerSet};
use flowstack_core::measure::InvalidationCause;
use flowstack_core::scroll_lock::ScrollLock;
use flowstack_core::signal::{Signal, SignalSampler};
use flowstack_core::visual::StyleWrite;

use crate::card_stack::CardStack;
use crate::deck::{Card, CardId, Deck};
use crate::flow_text::FlowText;
use crate::lightbox::{CloseTrigger, KeyOutcome, Lightbox, LightboxChange};
use crate::pointer_field::PointerField;
use crate::shared_element::{DEFAULT_TRANSITION, SharedElementRegistry};

/// Longest time step a single frame may advance transitions by.
///
/// The first frame after an idle period would otherwise see the whole idle
/// gap as elapsed time and skip the transition.
pub const MAX_FRAME_STEP: Duration = Duration::from_millis(64);

/// Document-level notifications the gallery subscribes to while mounted.
pub const GALLERY_LISTENERS: [ListenerKind; 6] = [
    ListenerKind::Scroll,
    ListenerKind::Resize,
    ListenerKind::PointerMove,
    ListenerKind::PointerLeave,
    ListenerKind::FontsLoaded,
    ListenerKind::OrientationChange,
];

/// Full-screen presenter for the selected card.
pub trait OverlaySurface {
    /// Show `card` with the given bounds and opacity.
    fn present(&mut self, card: &Card, write: &StyleWrite);

    /// Remove the overlay entirely.
    fn dismiss(&mut self);
}

/// Environment services.
pub struct GalleryHosts {
    pub frames: Rc<dyn FrameHost>,
    pub listeners: Rc<dyn ListenerHost>,
    pub scroll_lock: ScrollLock,
}

/// Components the gallery takes ownership of at mount.
pub struct GalleryParts {
    pub deck: Deck,
    pub stack: CardStack,
    pub flow_texts: Vec<FlowText>,
    pub pointer_fields: Vec<PointerField>,
    pub overlay: Box<dyn OverlaySurface>,
    /// Shared-element transition duration.
    pub transition: Duration,
}

impl GalleryParts {
    /// Parts with no texts or fields and the default transition.
    pub fn new(deck: Deck, stack: CardStack, overlay: Box<dyn OverlaySurface>) -> Self {
        Self {
            deck,
            stack,
            flow_texts: Vec::new(),
            pointer_fields: Vec::new(),
            overlay,
            transition: DEFAULT_TRANSITION,
        }
    }
}

/// Mount errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    /// A stack card has no entry in the deck.
    UnknownCard(CardId),
    /// The same card appears twice in the stack.
    DuplicateStackCard(CardId),
}

impl fmt::Display for GalleryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCard(id) => write!(f, "stack card {} is not in the deck", id.0),
            Self::DuplicateStackCard(id) => write!(f, "stack card {} appears twice", id.0),
        }
    }
}

impl std::error::Error for GalleryError {}

/// Counters for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GalleryStats {
    pub frames: u64,
    pub measure_passes: u64,
    pub writes: u64,
}

/// The mounted gallery.
pub struct Gallery {
    frames: Rc<dyn FrameHost>,
    sampler: SignalSampler,
    scheduler: FrameScheduler,
    stack: CardStack,
    flow_texts: Vec<FlowText>,
    pointer_fields: Vec<PointerField>,
    shared: SharedElementRegistry,
    lightbox: Lightbox,
    overlay: Box<dyn OverlaySurface>,
    overlay_shown: bool,
    listeners: ListenerSet,
    mounted: bool,
    stats: GalleryStats,
}

impl Gallery {
    /// Attach listeners, run the first measurement pass, and request the
    /// first frame.
    pub fn mount(
        hosts: GalleryHosts,
        parts: GalleryParts,
        viewport: Viewport,
    ) -> Result<Self, GalleryError> {
        let ids = parts.stack.ids();
        for (i, &id) in ids.iter().enumerate() {
            if !parts.deck.contains(id) {
                return Err(GalleryError::UnknownCard(id));
            }
            if ids[..i].contains(&id) {
                return Err(GalleryError::DuplicateStackCard(id));
            }
        }
        let listeners = ListenerSet::register_all(&hosts.listeners, &GALLERY_LISTENERS);
        let mut gallery = Self {
            frames: hosts.frames,
            sampler: SignalSampler::new(viewport),
            scheduler: FrameScheduler::new(),
            stack: parts.stack,
            flow_texts: parts.flow_texts,
            pointer_fields: parts.pointer_fields,
            shared: SharedElementRegistry::new(parts.transition),
            lightbox: Lightbox::new(parts.deck, hosts.scroll_lock, hosts.listeners),
            overlay: parts.overlay,
            overlay_shown: false,
            listeners,
            mounted: true,
            stats: GalleryStats::default(),
        };
        gallery.measure_pass(InvalidationCause::Mount);
        gallery.request_frame();
        flowstack_core::debug!(
            cards = gallery.stack.len(),
            texts = gallery.flow_texts.len(),
            fields = gallery.pointer_fields.len(),
            "gallery mounted"
        );
        Ok(gallery)
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[inline]
    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    #[inline]
    pub fn shared(&self) -> &SharedElementRegistry {
        &self.shared
    }

    #[inline]
    pub fn stack(&self) -> &CardStack {
        &self.stack
    }

    #[inline]
    pub fn sampler(&self) -> &SignalSampler {
        &self.sampler
    }

    #[inline]
    pub fn stats(&self) -> GalleryStats {
        self.stats
    }

    /// Whether a frame callback is outstanding.
    #[inline]
    pub fn frame_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Feed one host notification.
    ///
    /// Returns `true` when the signal was consumed and the host should
    /// suppress its default action (handled lightbox keys).
    pub fn handle_signal(&mut self, signal: &Signal) -> bool {
        if !self.mounted {
            return false;
        }
        let effect = self.sampler.apply(signal);
        if let Signal::Key(key) = signal {
            return match self.lightbox.handle_key(key) {
                KeyOutcome::Handled(change) => {
                    self.apply_change(change);
                    true
                }
                KeyOutcome::Ignored => false,
            };
        }
        if effect.measure_pass {
            let cause = match signal {
                Signal::FontsLoaded => InvalidationCause::FontLoad,
                Signal::OrientationChange => InvalidationCause::OrientationChange,
                _ => InvalidationCause::Resize,
            };
            self.measure_pass(cause);
        }
        if effect.transform_pass {
            self.request_frame();
        }
        false
    }

    /// Run one transform pass. `dt` is the time since the previous frame.
    pub fn on_frame(&mut self, dt: Duration) {
        if !self.mounted {
            return;
        }
        self.scheduler.begin_pass();
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "gallery_frame",
            frame = self.stats.frames,
            depth = self.stack.depth()
        )
        .entered();

        if let Some(card) = self.shared.tick(dt.min(MAX_FRAME_STEP)) {
            self.stack.reclaim(card);
        }
        let viewport = self.sampler.viewport();
        // Reads before any write of this pass.
        for field in &mut self.pointer_fields {
            field.refresh(&viewport);
        }
        let mut writes = self.stack.frame(&viewport, &self.shared);
        for text in &mut self.flow_texts {
            writes += text.frame(&viewport);
        }
        let pointer = self.sampler.pointer_client();
        for field in &mut self.pointer_fields {
            writes += field.frame(&viewport, pointer);
        }
        match self.shared.overlay_frame(&viewport) {
            Some(frame) => {
                if let Some(card) = self.lightbox.deck().get(frame.card) {
                    self.overlay
                        .present(card, &StyleWrite::overlay(frame.bounds, frame.opacity));
                    self.overlay_shown = true;
                    writes += 1;
                }
            }
            None if self.overlay_shown => {
                self.overlay.dismiss();
                self.overlay_shown = false;
            }
            None => {}
        }
        self.stats.frames += 1;
        self.stats.writes += writes as u64;
        flowstack_core::trace!(writes, "gallery frame");

        if self.shared.is_animating() {
            self.request_frame();
        }
    }

    /// Open the lightbox on `card`, or move to it.
    pub fn select(&mut self, card: CardId) -> Option<LightboxChange> {
        let change = self.lightbox.select(card)?;
        self.apply_change(change);
        Some(change)
    }

    pub fn next(&mut self) -> Option<LightboxChange> {
        let change = self.lightbox.next()?;
        self.apply_change(change);
        Some(change)
    }

    pub fn prev(&mut self) -> Option<LightboxChange> {
        let change = self.lightbox.prev()?;
        self.apply_change(change);
        Some(change)
    }

    pub fn close(&mut self, trigger: CloseTrigger) -> Option<LightboxChange> {
        let change = self.lightbox.close(trigger)?;
        self.apply_change(change);
        Some(change)
    }

    /// Cancel the pending frame, detach every listener, and close the
    /// lightbox. Idempotent.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.close(CloseTrigger::Teardown);
        if self.overlay_shown {
            self.overlay.dismiss();
            self.overlay_shown = false;
        }
        self.scheduler.cancel(self.frames.as_ref());
        self.listeners.clear();
        self.mounted = false;
        flowstack_core::debug!(frames = self.stats.frames, "gallery unmounted");
    }

    fn apply_change(&mut self, change: LightboxChange) {
        match change {
            LightboxChange::Opened(card) => {
                let origin = self.stack.card_bounds(card);
                if let Some(released) = self.shared.expand(card, origin) {
                    self.stack.reclaim(released);
                }
            }
            LightboxChange::Moved { to, .. } => {
                let origin = self.stack.card_bounds(to);
                if let Some(released) = self.shared.retarget(to, origin) {
                    self.stack.reclaim(released);
                }
            }
            LightboxChange::Closed {
                trigger: CloseTrigger::Teardown,
                ..
            } => {
                if let Some(released) = self.shared.release() {
                    self.stack.reclaim(released);
                }
            }
            LightboxChange::Closed { .. } => {
                self.shared.collapse();
            }
        }
        if self.mounted {
            self.request_frame();
        }
    }

    fn measure_pass(&mut self, cause: InvalidationCause) {
        let viewport = self.sampler.viewport();
        self.stack.size_container(viewport.height);
        self.stack.invalidate(cause);
        self.stack.measure();
        for text in &mut self.flow_texts {
            text.invalidate(cause);
            text.measure();
        }
        for field in &mut self.pointer_fields {
            field.invalidate(cause);
            field.measure(&viewport);
        }
        self.stats.measure_passes += 1;
    }

    fn request_frame(&mut self) {
        self.scheduler.request(self.frames.as_ref());
    }
}

impl Drop for Gallery {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card_stack::StackConfig;
    use flowstack_core::geometry::Measurement;
    use flowstack_core::input::{KeyCode, KeyEvent};
    use flowstack_core::testing::{
        ManualFrameHost, RecordingHandle, RecordingListenerHost, RecordingScrollSurface,
    };
    use std::cell::RefCell;

    #[derive(Clone, Default)]
    struct Overlay(Rc<RefCell<Vec<Option<(CardId, StyleWrite)>>>>);

    impl OverlaySurface for Overlay {
        fn present(&mut self, card: &Card, write: &StyleWrite) {
            self.0.borrow_mut().push(Some((card.id, write.clone())));
        }

        fn dismiss(&mut self) {
            self.0.borrow_mut().push(None);
        }
    }

    struct Rig {
        gallery: Gallery,
        frames: ManualFrameHost,
        listeners: RecordingListenerHost,
        surface: RecordingScrollSurface,
        overlay: Overlay,
        cards: Vec<RecordingHandle>,
    }

    fn rig() -> Rig {
        let frames = ManualFrameHost::new();
        let listeners = RecordingListenerHost::new();
        let surface = RecordingScrollSurface::new();
        let overlay = Overlay::default();
        let deck = Deck::showcase();
        let cards: Vec<_> = (0..5)
            .map(|i| {
                RecordingHandle::new(Some(Measurement::new(100.0, 200.0 + i as f64, 600.0, 400.0)))
            })
            .collect();
        let stack = CardStack::new(
            StackConfig::default(),
            RecordingHandle::new(Some(Measurement::new(0.0, 0.0, 1280.0, 5600.0))).boxed(),
            RecordingHandle::new(None).boxed(),
            deck.ids().zip(cards.iter().map(RecordingHandle::boxed)).collect(),
        );
        let gallery = Gallery::mount(
            GalleryHosts {
                frames: Rc::new(frames.clone()),
                listeners: Rc::new(listeners.clone()),
                scroll_lock: ScrollLock::new(surface.clone()),
            },
            GalleryParts::new(deck, stack, Box::new(overlay.clone())),
            Viewport::new(1280.0, 1000.0),
        )
        .expect("valid gallery");
        Rig {
            gallery,
            frames,
            listeners,
            surface,
            overlay,
            cards,
        }
    }

    fn run_frame(r: &mut Rig, dt: Duration) {
        if r.frames.fire().is_some() {
            r.gallery.on_frame(dt);
        }
    }

    #[test]
    fn mount_registers_listeners_and_requests_frame() {
        let r = rig();
        assert_eq!(r.listeners.live_count(), GALLERY_LISTENERS.len());
        assert!(r.gallery.frame_pending());
        assert_eq!(r.frames.outstanding().len(), 1);
        assert_eq!(r.gallery.stats().measure_passes, 1);
    }

    #[test]
    fn scroll_burst_coalesces_into_one_frame() {
        let mut r = rig();
        run_frame(&mut r, Duration::from_millis(16));
        for y in 1..=10 {
            r.gallery.handle_signal(&Signal::Scroll {
                x: 0.0,
                y: f64::from(y) * 50.0,
            });
        }
        assert_eq!(r.frames.outstanding().len(), 1);
        run_frame(&mut r, Duration::from_millis(16));
        assert_eq!(r.gallery.stats().frames, 2);
        assert!(!r.gallery.frame_pending());
    }

    #[test]
    fn resize_measures_synchronously() {
        let mut r = rig();
        r.gallery.handle_signal(&Signal::Resize {
            width: 800.0,
            height: 600.0,
        });
        assert_eq!(r.gallery.stats().measure_passes, 2);
        assert_eq!(r.gallery.sampler().viewport().height, 600.0);
    }

    #[test]
    fn open_runs_transition_then_idles() {
        let mut r = rig();
        run_frame(&mut r, Duration::from_millis(16));
        assert_eq!(r.gallery.select(CardId(2)), Some(LightboxChange::Opened(CardId(2))));
        assert!(r.surface.is_locked());
        assert!(r.listeners.is_listening(ListenerKind::KeyDown));
        for _ in 0..10 {
            run_frame(&mut r, Duration::from_millis(50));
        }
        assert!(!r.gallery.shared().is_animating());
        assert!(!r.gallery.frame_pending());
        let last = r.overlay.0.borrow().last().cloned().flatten().expect("presented");
        assert_eq!(last.0, CardId(2));
        assert_eq!(last.1.opacity.as_deref(), Some("1.000"));
        assert_eq!(last.1.bounds, Some(Measurement::new(0.0, 0.0, 1280.0, 1000.0)));
    }

    #[test]
    fn selected_card_not_written_by_stack_while_open() {
        let mut r = rig();
        run_frame(&mut r, Duration::from_millis(16));
        r.gallery.select(CardId(1));
        r.cards[0].clear_writes();
        r.gallery.handle_signal(&Signal::Scroll { x: 0.0, y: 900.0 });
        run_frame(&mut r, Duration::from_millis(16));
        assert_eq!(r.cards[0].write_count(), 0);
        assert!(r.cards[1].write_count() > 0);
    }

    #[test]
    fn keys_drive_navigation_and_escape_collapses() {
        let mut r = rig();
        r.gallery.select(CardId(3));
        for _ in 0..10 {
            run_frame(&mut r, Duration::from_millis(50));
        }
        assert!(r.gallery.handle_signal(&Signal::Key(KeyEvent::new(KeyCode::Right))));
        assert_eq!(r.gallery.lightbox().selected(), Some(CardId(4)));
        assert_eq!(r.gallery.shared().presented(), Some(CardId(4)));
        assert!(r.gallery.handle_signal(&Signal::Key(KeyEvent::new(KeyCode::Escape))));
        assert!(!r.gallery.lightbox().is_open());
        assert!(!r.surface.is_locked());
        // The overlay keeps the card until the collapse finishes.
        assert_eq!(r.gallery.shared().presented(), Some(CardId(4)));
        for _ in 0..10 {
            run_frame(&mut r, Duration::from_millis(50));
        }
        assert_eq!(r.gallery.shared().presented(), None);
        assert_eq!(r.overlay.0.borrow().last().cloned(), Some(None));
    }

    #[test]
    fn unrelated_keys_are_not_consumed() {
        let mut r = rig();
        r.gallery.select(CardId(3));
        assert!(!r.gallery.handle_signal(&Signal::Key(KeyEvent::new(KeyCode::Enter))));
    }

    #[test]
    fn unmount_while_open_releases_everything() {
        let mut r = rig();
        r.gallery.select(CardId(5));
        r.gallery.unmount();
        assert!(!r.gallery.is_mounted());
        assert!(!r.surface.is_locked());
        assert_eq!(r.listeners.live_count(), 0);
        assert!(r.frames.outstanding().is_empty());
        assert!(!r.gallery.handle_signal(&Signal::Scroll { x: 0.0, y: 10.0 }));
        r.gallery.unmount();
    }

    #[test]
    fn drop_releases_everything() {
        let Rig {
            mut gallery,
            frames,
            listeners,
            surface,
            ..
        } = rig();
        gallery.select(CardId(1));
        drop(gallery);
        assert_eq!(surface.transitions(), vec![true, false]);
        assert_eq!(listeners.live_count(), 0);
        assert_eq!(frames.cancelled().len(), 1);
    }

    #[test]
    fn unknown_stack_card_fails_mount() {
        let stack = CardStack::new(
            StackConfig::default(),
            RecordingHandle::new(None).boxed(),
            RecordingHandle::new(None).boxed(),
            vec![(CardId(9), RecordingHandle::new(None).boxed())],
        );
        let listeners = RecordingListenerHost::new();
        let err = Gallery::mount(
            GalleryHosts {
                frames: Rc::new(ManualFrameHost::new()),
                listeners: Rc::new(listeners.clone()),
                scroll_lock: ScrollLock::new(RecordingScrollSurface::new()),
            },
            GalleryParts::new(Deck::showcase(), stack, Box::new(Overlay::default())),
            Viewport::new(800.0, 600.0),
        )
        .err();
        assert_eq!(err, Some(GalleryError::UnknownCard(CardId(9))));
        assert_eq!(listeners.live_count(), 0);
    }
}
