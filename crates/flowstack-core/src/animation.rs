#![forbid(unsafe_code)]

//! Easing curves, falloff shapes, and the timeline used for transitions.
//!
//! Every curve maps `t` in [0, 1] to an output in [0, 1] and clamps its input,
//! so callers can feed raw ratios without pre-validating them.
//!
//! # Invariants
//!
//! 1. `f(0) == 0` and `f(1) == 1` exactly for every easing and [`Falloff`].
//! 2. All curves are monotonically non-decreasing on [0, 1].
//! 3. [`Fade`] never reports a value outside [0, 1], however far it is ticked.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f64) -> f64;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f64) -> f64 {
    clamp_unit(t)
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f64) -> f64 {
    let t = clamp_unit(t);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f64) -> f64 {
    let t = clamp_unit(t);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Cubic ease-out: `1 - (1 - t)^3`.
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = clamp_unit(t);
    1.0 - (1.0 - t).powi(3)
}

/// Linear interpolation between `from` and `to`. `t` is not clamped.
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Clamp into [0, 1], sending NaN to 0.
#[inline]
fn clamp_unit(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

// ---------------------------------------------------------------------------
// Falloff
// ---------------------------------------------------------------------------

const GAUSSIAN_K: f64 = 4.5;
const EXPONENTIAL_K: f64 = 3.0;

/// Shape of the drop-off between the reference point and the edge of the
/// effect range.
///
/// Applied to raw distance progress before any component easing. The
/// non-linear shapes are normalized so they still hit 0 and 1 at the ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Falloff {
    /// `p` unchanged.
    #[default]
    Linear,
    /// Bell-shaped: flat near the reference, steep in the middle.
    Gaussian,
    /// Steep near the reference, flattening toward the edge.
    Exponential,
}

impl Falloff {
    /// Apply the falloff to raw progress `p`.
    #[must_use]
    pub fn apply(self, p: f64) -> f64 {
        let p = clamp_unit(p);
        let shaped = match self {
            Self::Linear => return p,
            Self::Gaussian => {
                (1.0 - (-GAUSSIAN_K * p * p).exp()) / (1.0 - (-GAUSSIAN_K).exp())
            }
            Self::Exponential => {
                (1.0 - (-EXPONENTIAL_K * p).exp()) / (1.0 - (-EXPONENTIAL_K).exp())
            }
        };
        // Normalization can land a hair outside the unit interval at p == 1.
        if p >= 1.0 { 1.0 } else { clamp_unit(shaped) }
    }

    /// Parse the lowercase name used in configuration and env overrides.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" => Some(Self::Linear),
            "gaussian" => Some(Self::Gaussian),
            "exponential" => Some(Self::Exponential),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Animation trait
// ---------------------------------------------------------------------------

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current output value, clamped to [0.0, 1.0].
    fn value(&self) -> f64;

    /// Reset the animation to its initial state.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// Fade
// ---------------------------------------------------------------------------

/// Progression from 0.0 to 1.0 over a duration, with configurable easing.
///
/// Elapsed time is tracked as [`Duration`] so repeated small ticks do not
/// accumulate floating-point drift. Time is supplied by the host.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Fade {
    /// Create a fade with the given duration and linear easing.
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: if duration.is_zero() {
                Duration::from_nanos(1)
            } else {
                duration
            },
            easing: linear,
        }
    }

    /// Set the easing function.
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Raw linear progress (before easing), in [0.0, 1.0].
    pub fn raw_progress(&self) -> f64 {
        clamp_unit(self.elapsed.as_secs_f64() / self.duration.as_secs_f64())
    }

    /// Configured duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Animation for Fade {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f64 {
        (self.easing)(self.raw_progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
