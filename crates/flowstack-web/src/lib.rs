#![forbid(unsafe_code)]

//! WASM frontend for flowstack.
//!
//! This crate is host-specific. It binds a [`flowstack_widgets::Gallery`] to
//! the DOM:
//! - element handles that read `getBoundingClientRect` and write inline styles,
//! - a `requestAnimationFrame` frame host,
//! - window/document listener registration,
//! - `body` overflow as the scroll-lock surface,
//! - a DOM lightbox overlay.
//!
//! The event schema ([`event`]), mount options ([`options`]), and glyph
//! preparation ([`glyphs`]) are plain Rust and build on every target.

pub mod event;
pub mod glyphs;
pub mod options;

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod listeners;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod hosts;
#[cfg(target_arch = "wasm32")]
mod overlay;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::FlowstackWeb;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct FlowstackWeb;

#[cfg(not(target_arch = "wasm32"))]
impl FlowstackWeb {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}
