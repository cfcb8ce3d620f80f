#![forbid(unsafe_code)]

//! Core: signal sampling, progress normalization, transform synthesis, and
//! frame scheduling for scroll- and pointer-reactive surfaces.
//!
//! Data flows one way:
//!
//! ```text
//! host events ─▶ SignalSampler ─▶ normalizers ─▶ EffectProfile ─▶ ElementHandle
//!                     │                                               ▲
//!                     └──────── FrameScheduler (one pass per refresh) ┘
//! ```
//!
//! Nothing here knows about the DOM. Hosts implement [`frame::FrameHost`],
//! [`listener::ListenerHost`], [`scroll_lock::ScrollSurface`], and
//! [`handle::ElementHandle`].

pub mod animation;
pub mod config;
pub mod frame;
pub mod geometry;
pub mod handle;
pub mod input;
pub mod listener;
pub mod logging;
pub mod measure;
pub mod progress;
pub mod scroll_lock;
pub mod signal;
pub mod visual;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, trace_span, warn};
