//! Benchmarks for gallery frame passes.
//!
//! Run with: cargo bench -p flowstack-widgets

use std::rc::Rc;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use flowstack_core::geometry::{Measurement, Viewport};
use flowstack_core::scroll_lock::ScrollLock;
use flowstack_core::signal::Signal;
use flowstack_core::testing::{
    ManualFrameHost, RecordingHandle, RecordingListenerHost, RecordingScrollSurface,
};
use flowstack_core::visual::StyleWrite;
use flowstack_widgets::{
    Card, CardId, CardStack, Deck, Gallery, GalleryHosts, GalleryParts, OverlaySurface,
    PointerField, StackConfig, split_glyphs,
};
use std::hint::black_box;

struct NullOverlay;

impl OverlaySurface for NullOverlay {
    fn present(&mut self, card: &Card, write: &StyleWrite) {
        black_box((card.id, write));
    }

    fn dismiss(&mut self) {}
}

fn gallery(cards: usize, glyphs: usize) -> (Gallery, ManualFrameHost) {
    let host = ManualFrameHost::new();
    let deck = Deck::new(
        (0..cards as u32)
            .map(|i| Card::new(i + 1, format!("Card {i}"), "", "", ""))
            .collect(),
    )
    .unwrap();
    let vh = 1000.0;
    let config = StackConfig::default();
    let container = RecordingHandle::new(Some(Measurement::new(
        0.0,
        0.0,
        1280.0,
        config.container_height(cards, vh),
    )));
    let stack = CardStack::new(
        config,
        container.boxed(),
        RecordingHandle::new(None).boxed(),
        deck.ids()
            .map(|id| {
                let h = RecordingHandle::new(Some(Measurement::new(340.0, 200.0, 600.0, 400.0)));
                (id, h.boxed())
            })
            .collect(),
    );
    let text = "Scroll-driven stacks ".repeat(glyphs / 21 + 1);
    let handles = split_glyphs(&text)
        .into_iter()
        .take(glyphs)
        .enumerate()
        .map(|(i, _)| {
            RecordingHandle::new(Some(Measurement::new(
                (i % 60) as f64 * 18.0,
                100.0 + (i / 60) as f64 * 40.0,
                16.0,
                32.0,
            )))
            .boxed()
        })
        .collect();
    let mut parts = GalleryParts::new(deck, stack, Box::new(NullOverlay));
    parts.pointer_fields = vec![PointerField::with_defaults(handles)];
    let g = Gallery::mount(
        GalleryHosts {
            frames: Rc::new(host.clone()),
            listeners: Rc::new(RecordingListenerHost::new()),
            scroll_lock: ScrollLock::new(RecordingScrollSurface::new()),
        },
        parts,
        Viewport::new(1280.0, vh),
    )
    .unwrap();
    (g, host)
}

// ============================================================================
// Scroll frames
// ============================================================================

fn bench_scroll_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("gallery/scroll_frame");

    for cards in [5usize, 20, 80] {
        let (mut g, host) = gallery(cards, 0);
        let mut y = 0.0;
        group.bench_with_input(BenchmarkId::from_parameter(cards), &cards, |b, _| {
            b.iter(|| {
                y = (y + 37.0) % 8000.0;
                g.handle_signal(&Signal::Scroll { x: 0.0, y });
                if host.fire().is_some() {
                    g.on_frame(Duration::from_millis(16));
                }
                black_box(g.stack().depth())
            })
        });
    }
    group.finish();
}

// ============================================================================
// Pointer frames
// ============================================================================

fn bench_pointer_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("gallery/pointer_frame");

    for glyphs in [32usize, 256, 1024] {
        let (mut g, host) = gallery(5, glyphs);
        let mut x = 0.0;
        group.bench_with_input(BenchmarkId::from_parameter(glyphs), &glyphs, |b, _| {
            b.iter(|| {
                x = (x + 11.0) % 1080.0;
                g.handle_signal(&Signal::PointerMove {
                    client_x: x,
                    client_y: 140.0,
                });
                if host.fire().is_some() {
                    g.on_frame(Duration::from_millis(16));
                }
                black_box(g.stats().writes)
            })
        });
    }
    group.finish();
}

// ============================================================================
// Lightbox transition
// ============================================================================

fn bench_transition(c: &mut Criterion) {
    c.bench_function("gallery/open_close_cycle", |b| {
        let (mut g, host) = gallery(5, 0);
        b.iter(|| {
            g.select(CardId(3));
            g.close(flowstack_widgets::CloseTrigger::Backdrop);
            while host.fire().is_some() {
                g.on_frame(Duration::from_millis(64));
            }
            black_box(g.shared().presented())
        })
    });
}

criterion_group!(benches, bench_scroll_frame, bench_pointer_frame, bench_transition);
criterion_main!(benches);
