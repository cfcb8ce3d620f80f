#![forbid(unsafe_code)]

//! Scroll-driven presentation components for a card gallery.
//!
//! - [`card_stack`]: cards that enter, stack, and recede with scroll depth.
//! - [`flow_text`]: blocks that sharpen at the viewport center.
//! - [`pointer_field`]: glyphs disturbed by pointer proximity.
//! - [`lightbox`] and [`shared_element`]: the selected-card overlay.
//! - [`gallery`]: the composition, driven by one frame scheduler.
//!
//! Components never touch a document directly. They write [`StyleWrite`]s
//! through [`ElementHandle`]s supplied by the host.
//!
//! [`StyleWrite`]: flowstack_core::visual::StyleWrite
//! [`ElementHandle`]: flowstack_core::handle::ElementHandle

pub mod card_stack;
pub mod deck;
pub mod flow_text;
pub mod gallery;
pub mod lightbox;
pub mod pointer_field;
pub mod shared_element;

mod tracked;

pub use card_stack::{CardStack, StackConfig};
pub use deck::{Card, CardId, Deck, DeckError};
pub use flow_text::FlowText;
pub use gallery::{
    Gallery, GalleryError, GalleryHosts, GalleryParts, GalleryStats, OverlaySurface,
};
pub use lightbox::{CloseTrigger, KeyOutcome, Lightbox, LightboxChange, LightboxState};
pub use pointer_field::{Anchoring, PointerField, split_glyphs};
pub use shared_element::{OverlayFrame, Owner, SharedElementRegistry, TransitionKind};
