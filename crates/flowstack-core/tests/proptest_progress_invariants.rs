//! Property-based invariants for normalization and synthesis.
//!
//! 1. Normalized progress stays in [0, 1] for any finite input.
//! 2. Pointer progress never decreases as distance grows.
//! 3. Synthesis is idempotent: same progress, same output, same strings.
//! 4. Synthesized values never overshoot their configured range.
//! 5. Progress at or beyond the radius is exactly the far value.

use flowstack_core::animation::Falloff;
use flowstack_core::geometry::{Measurement, Point, Viewport};
use flowstack_core::progress::{
    PointerDistanceNormalizer, Progress, ViewportCenterNormalizer, normalize,
};
use flowstack_core::visual::{EffectProfile, Param, Polarity, RenderForm, VisualParams};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn falloff_strategy() -> impl Strategy<Value = Falloff> {
    prop_oneof![
        Just(Falloff::Linear),
        Just(Falloff::Gaussian),
        Just(Falloff::Exponential),
    ]
}

fn polarity_strategy() -> impl Strategy<Value = Polarity> {
    prop_oneof![Just(Polarity::Focus), Just(Polarity::Contact)]
}

fn dot(x: f64, y: f64) -> Measurement {
    Measurement::new(x - 1.0, y - 1.0, 2.0, 2.0)
}

fn param_value(v: &VisualParams, param: Param) -> f64 {
    match param {
        Param::Blur => v.blur,
        Param::Opacity => v.opacity,
        Param::Scale => v.scale,
        Param::TranslateY => v.translate_y,
        Param::Brightness => v.brightness,
        Param::RotateX => v.rotate_x,
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Bounded progress
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn normalize_is_bounded(distance in -1.0e6f64..1.0e6, range in -10.0f64..5000.0) {
        let p = normalize(distance, range).get();
        prop_assert!((0.0..=1.0).contains(&p), "progress {} out of range", p);
    }

    #[test]
    fn viewport_progress_is_bounded(
        y in -5000.0f64..20_000.0,
        scroll in 0.0f64..10_000.0,
        height in 1.0f64..3000.0,
        falloff in falloff_strategy(),
    ) {
        let vp = Viewport::new(1200.0, height).scrolled_to(0.0, scroll);
        let norm = ViewportCenterNormalizer { falloff, ..ViewportCenterNormalizer::default() };
        let (signed, p) = norm.measure(&Measurement::new(0.0, y, 100.0, 40.0), &vp);
        prop_assert!((0.0..=1.0).contains(&p.get()));
        prop_assert!((-1.0..=1.0).contains(&signed.get()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Monotonic pointer progress
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pointer_progress_monotonic_in_distance(
        a in 0.0f64..900.0,
        b in 0.0f64..900.0,
        radius in 1.0f64..800.0,
        falloff in falloff_strategy(),
    ) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        let norm = PointerDistanceNormalizer { radius, falloff };
        let origin = Point::new(0.0, 0.0);
        let p_near = norm.progress(&dot(near, 0.0), origin).get();
        let p_far = norm.progress(&dot(far, 0.0), origin).get();
        prop_assert!(
            p_near <= p_far + 1e-12,
            "progress decreased: {} at {} vs {} at {}", p_near, near, p_far, far
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Idempotent synthesis
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn synthesis_is_idempotent(p in 0.0f64..=1.0, polarity in polarity_strategy()) {
        let profile = EffectProfile::new(polarity);
        let first = profile.synthesize(Progress::new(p));
        let second = profile.synthesize(Progress::new(p));
        prop_assert_eq!(first, second);
        prop_assert_eq!(first.quantized(), first);
        prop_assert_eq!(
            first.to_style(RenderForm::Glyph),
            second.to_style(RenderForm::Glyph)
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. No overshoot
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn synthesis_stays_within_ranges(p in -2.0f64..3.0, polarity in polarity_strategy()) {
        let profile = EffectProfile::new(polarity);
        let v = profile.synthesize(Progress::new(p));
        for param in Param::ALL {
            let range = profile.range(param);
            let (lo, hi) = if range.from <= range.to {
                (range.from, range.to)
            } else {
                (range.to, range.from)
            };
            let value = param_value(&v, param);
            prop_assert!(
                value >= lo - 1e-9 && value <= hi + 1e-9,
                "{:?} = {} outside [{}, {}]", param, value, lo, hi
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Exact far value beyond the radius
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn beyond_radius_is_far(extra in 0.0f64..5000.0, radius in 1.0f64..800.0, falloff in falloff_strategy()) {
        let norm = PointerDistanceNormalizer { radius, falloff };
        let p = norm.progress(&dot(radius + extra, 0.0), Point::new(0.0, 0.0));
        prop_assert_eq!(p, Progress::FAR);
        prop_assert_eq!(EffectProfile::contact().synthesize(p), VisualParams::NEUTRAL);
    }
}
