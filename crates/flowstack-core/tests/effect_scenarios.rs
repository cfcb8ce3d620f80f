//! End-to-end scenarios through the core pipeline: sampler, normalizer,
//! profile, and style strings.

use flowstack_core::config::EffectConfig;
use flowstack_core::frame::{FrameHost, FrameScheduler, FrameToken};
use flowstack_core::geometry::{Measurement, Viewport};
use flowstack_core::measure::{InvalidationCause, MeasurementCache};
use flowstack_core::progress::Progress;
use flowstack_core::signal::{Signal, SignalSampler};
use flowstack_core::visual::{RenderForm, VisualParams};
use pretty_assertions::assert_eq;
use std::cell::Cell;

#[derive(Default)]
struct CountingHost {
    requested: Cell<u64>,
}

impl FrameHost for CountingHost {
    fn request_frame(&self) -> FrameToken {
        self.requested.set(self.requested.get() + 1);
        FrameToken(self.requested.get())
    }

    fn cancel_frame(&self, _token: FrameToken) {}
}

#[test]
fn centered_block_is_fully_focused() {
    let config = EffectConfig::focus();
    let vp = Viewport::new(1280.0, 1000.0).scrolled_to(0.0, 3000.0);
    let norm = config.viewport_normalizer(vp.height);
    assert_eq!(norm.range(&vp), 550.0);

    // Center at 3500 = scroll 3000 + half of 1000.
    let block = Measurement::new(0.0, 3450.0, 800.0, 100.0);
    let v = config.profile().synthesize(norm.progress(&block, &vp));
    assert_eq!((v.blur, v.opacity, v.scale), (0.0, 1.0, 1.05));

    let write = v.to_style(RenderForm::Glyph);
    assert_eq!(write.filter.as_deref(), Some("blur(0.00px)"));
    assert_eq!(write.opacity.as_deref(), Some("1.000"));
    assert_eq!(write.transform.as_deref(), Some("scale3d(1.050, 1.050, 1)"));
}

#[test]
fn block_at_range_edge_is_fully_receded() {
    let config = EffectConfig::focus();
    let vp = Viewport::new(1280.0, 1000.0);
    let norm = config.viewport_normalizer(vp.height);
    // Center at 500 + 550.
    let block = Measurement::new(0.0, 1000.0, 800.0, 100.0);
    let v = config.profile().synthesize(norm.progress(&block, &vp));
    assert_eq!((v.blur, v.opacity, v.scale), (24.0, 0.3, 0.95));
}

#[test]
fn distant_pointer_leaves_glyph_neutral() {
    let config = EffectConfig::contact();
    let mut sampler = SignalSampler::new(Viewport::new(1280.0, 800.0));
    sampler.apply(&Signal::PointerMove {
        client_x: 610.0,
        client_y: 10.0,
    });
    let pointer = sampler.pointer_document().expect("pointer seen");
    let glyph = Measurement::new(0.0, 0.0, 20.0, 20.0);
    let norm = config.pointer_normalizer(800.0);
    let p = norm.progress(&glyph, pointer);
    assert_eq!(p, Progress::FAR);
    assert_eq!(config.profile().synthesize(p), VisualParams::NEUTRAL);
}

#[test]
fn pointer_on_glyph_is_fully_disturbed() {
    let config = EffectConfig::contact();
    let glyph = Measurement::new(90.0, 90.0, 20.0, 20.0);
    let mut sampler = SignalSampler::new(Viewport::new(1280.0, 800.0));
    sampler.apply(&Signal::PointerMove {
        client_x: 100.0,
        client_y: 100.0,
    });
    let p = config
        .pointer_normalizer(800.0)
        .progress(&glyph, sampler.pointer_document().expect("pointer seen"));
    let v = config.profile().synthesize(p);
    assert_eq!((v.blur, v.opacity, v.scale), (12.0, 0.5, 1.15));
}

#[test]
fn burst_of_signals_yields_one_frame() {
    let host = CountingHost::default();
    let mut sched = FrameScheduler::new();
    let mut sampler = SignalSampler::new(Viewport::new(1280.0, 800.0));
    for y in 1..=40 {
        let effect = sampler.apply(&Signal::Scroll {
            x: 0.0,
            y: f64::from(y) * 3.0,
        });
        if effect.transform_pass {
            sched.request(&host);
        }
    }
    assert_eq!(host.requested.get(), 1);
    assert_eq!(sched.coalesced_count(), 39);
    sched.begin_pass();
    assert!(!sched.is_pending());
}

#[test]
fn resize_remeasures_before_next_transform() {
    let mut cache = MeasurementCache::new(1);
    cache.record(0, Some(Measurement::new(0.0, 100.0, 50.0, 50.0)));
    assert!(cache.get(0).is_some());

    let mut sampler = SignalSampler::new(Viewport::new(1280.0, 800.0));
    let effect = sampler.apply(&Signal::Resize {
        width: 600.0,
        height: 900.0,
    });
    assert!(effect.measure_pass);
    cache.invalidate_all(InvalidationCause::Resize);
    assert_eq!(cache.get(0), None);

    cache.record(0, Some(Measurement::new(0.0, 140.0, 40.0, 50.0)));
    assert_eq!(cache.get(0), Some(Measurement::new(0.0, 140.0, 40.0, 50.0)));
}

#[test]
fn detached_element_has_no_measurement() {
    let mut cache = MeasurementCache::new(1);
    cache.record(0, None);
    assert_eq!(cache.get(0), None);
    cache.record(0, Some(Measurement::new(f64::NAN, 0.0, 1.0, 1.0)));
    assert_eq!(cache.fresh_count(), 0);
}
