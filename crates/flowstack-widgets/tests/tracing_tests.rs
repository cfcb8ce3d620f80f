#![forbid(unsafe_code)]

//! Tracing integration tests.
//!
//! Frame spans enabled:
//!   cargo test -p flowstack-widgets --features tracing --test tracing_tests
//!
//! Zero-overhead verification (no feature):
//!   cargo test -p flowstack-widgets --test tracing_tests -- zero_overhead

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use flowstack_core::geometry::{Measurement, Viewport};
use flowstack_core::scroll_lock::ScrollLock;
use flowstack_core::signal::Signal;
use flowstack_core::testing::{
    ManualFrameHost, RecordingHandle, RecordingListenerHost, RecordingScrollSurface,
};
use flowstack_core::visual::StyleWrite;
use flowstack_widgets::{
    Card, CardStack, Deck, Gallery, GalleryHosts, GalleryParts, OverlaySurface, StackConfig,
};

use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Span recorder
// ============================================================================

#[derive(Debug, Clone)]
#[allow(dead_code)]
struct OpenedSpan {
    name: &'static str,
    fields: HashMap<&'static str, String>,
    parent: Option<&'static str>,
}

/// Layer recording every opened span and the names of closed ones.
#[derive(Clone, Default)]
struct Spans {
    opened: Arc<Mutex<Vec<OpenedSpan>>>,
    closed: Arc<Mutex<Vec<&'static str>>>,
}

impl Spans {
    fn named(&self, name: &str) -> Vec<OpenedSpan> {
        let opened = self.opened.lock().unwrap();
        opened.iter().filter(|s| s.name == name).cloned().collect()
    }

    #[allow(dead_code)]
    fn closed(&self, name: &str) -> usize {
        self.closed.lock().unwrap().iter().filter(|n| **n == name).count()
    }
}

struct Fields<'a>(&'a mut HashMap<&'static str, String>);

impl tracing::field::Visit for Fields<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name(), format!("{value:?}"));
    }
}

impl<S> tracing_subscriber::Layer<S> for Spans
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &tracing::span::Attributes<'_>, _id: &tracing::span::Id, ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        attrs.record(&mut Fields(&mut fields));
        let parent = ctx.lookup_current().map(|span| span.name());
        self.opened.lock().unwrap().push(OpenedSpan {
            name: attrs.metadata().name(),
            fields,
            parent,
        });
    }

    fn on_close(&self, id: tracing::span::Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(&id) {
            self.closed.lock().unwrap().push(span.name());
        }
    }
}

fn capture(f: impl FnOnce()) -> Spans {
    let spans = Spans::default();
    tracing::subscriber::with_default(tracing_subscriber::registry().with(spans.clone()), f);
    spans
}

struct NullOverlay;

impl OverlaySurface for NullOverlay {
    fn present(&mut self, _card: &Card, _write: &StyleWrite) {}
    fn dismiss(&mut self) {}
}

/// Mount a three-card gallery, run `frames` scroll-driven frames, unmount.
fn run_gallery(frames: usize) {
    let host = ManualFrameHost::new();
    let deck = Deck::new(Deck::showcase().cards()[..3].to_vec()).expect("unique ids");
    let cards = deck
        .ids()
        .map(|id| {
            let h = RecordingHandle::new(Some(Measurement::new(0.0, 500.0, 600.0, 400.0)));
            (id, h.boxed())
        })
        .collect();
    let stack = CardStack::new(
        StackConfig::default(),
        RecordingHandle::new(Some(Measurement::new(0.0, 0.0, 1280.0, 4000.0))).boxed(),
        RecordingHandle::new(None).boxed(),
        cards,
    );
    let mut gallery = Gallery::mount(
        GalleryHosts {
            frames: Rc::new(host.clone()),
            listeners: Rc::new(RecordingListenerHost::new()),
            scroll_lock: ScrollLock::new(RecordingScrollSurface::new()),
        },
        GalleryParts::new(deck, stack, Box::new(NullOverlay)),
        Viewport::new(1280.0, 1000.0),
    )
    .expect("gallery mounts");
    for i in 0..frames {
        gallery.handle_signal(&Signal::Scroll {
            x: 0.0,
            y: 100.0 * (i + 1) as f64,
        });
        if host.fire().is_some() {
            gallery.on_frame(Duration::from_millis(16));
        }
    }
    gallery.unmount();
}

// ============================================================================
// Tests
// ============================================================================

/// One `gallery_frame` span per fired frame, numbered in order.
#[test]
#[cfg(feature = "tracing")]
fn frame_spans_created_per_pass() {
    let spans = capture(|| run_gallery(4));

    let frames = spans.named("gallery_frame");
    assert_eq!(frames.len(), 4, "got {frames:?}");
    let numbers: Vec<_> = frames
        .iter()
        .filter_map(|s| s.fields.get("frame").cloned())
        .collect();
    assert_eq!(numbers, ["0", "1", "2", "3"]);
    assert!(frames.iter().all(|s| s.fields.contains_key("depth")));
}

/// The stack pass is nested under the frame span.
#[test]
#[cfg(feature = "tracing")]
fn stack_span_nests_under_frame() {
    let spans = capture(|| run_gallery(2));

    let stack_spans = spans.named("card_stack_frame");
    assert_eq!(stack_spans.len(), 2);
    for span in &stack_spans {
        assert_eq!(span.parent, Some("gallery_frame"));
        assert_eq!(span.fields.get("cards").map(String::as_str), Some("3"));
    }
}

/// Every frame span is closed by the end of its pass.
#[test]
#[cfg(feature = "tracing")]
fn frame_spans_close_each_pass() {
    let spans = capture(|| run_gallery(8));
    assert_eq!(spans.named("gallery_frame").len(), 8);
    assert_eq!(spans.closed("gallery_frame"), 8);
    assert_eq!(spans.closed("card_stack_frame"), 8);
}

/// Without `--features tracing` the span sites are compiled out, so nothing
/// reaches the subscriber.
#[test]
fn zero_overhead_when_disabled() {
    let frames = capture(|| run_gallery(3)).named("gallery_frame");

    #[cfg(feature = "tracing")]
    assert!(!frames.is_empty(), "gallery_frame spans expected with tracing");

    #[cfg(not(feature = "tracing"))]
    assert!(frames.is_empty(), "no spans expected, got {}", frames.len());
}
