#![forbid(unsafe_code)]

//! Selected-card lightbox.
//!
//! The lightbox is a two-state machine. Everything that must exist only while
//! a card is open (the document scroll lock and the keyboard listener) lives
//! inside [`LightboxState::Open`] as RAII guards, so leaving that state by any
//! path, including dropping the lightbox itself, restores scrolling and
//! detaches the key handler.
//!
//! # Keys
//!
//! | Key | Effect |
//! |-----|--------|
//! | `Escape` | close |
//! | `ArrowRight` | next card, wrapping |
//! | `ArrowLeft` | previous card, wrapping |
//!
//! Arrow keys held with alt, ctrl, or super are left to the browser.

use std::rc::Rc;

use flowstack_core::input::{KeyCode, KeyEvent};
use flowstack_core::listener::{ListenerGuard, ListenerHost, ListenerKind};
use flowstack_core::scroll_lock::{ScrollLock, ScrollLockGuard};

use crate::deck::{CardId, Deck};

/// Why the lightbox closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    Escape,
    /// Click outside the card.
    Backdrop,
    /// The explicit close button.
    CloseControl,
    /// The owning component went away.
    Teardown,
}

/// Observable result of a lightbox operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxChange {
    Opened(CardId),
    Moved { from: CardId, to: CardId },
    Closed { card: CardId, trigger: CloseTrigger },
}

/// Result of offering a key to the lightbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not ours; let the host handle it.
    Ignored,
    Handled(LightboxChange),
}

/// Lightbox state.
#[derive(Debug, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Open {
        selected: CardId,
        scroll: ScrollLockGuard,
        keys: ListenerGuard,
    },
}

/// Card lightbox over a [`Deck`].
pub struct Lightbox {
    deck: Deck,
    state: LightboxState,
    scroll_lock: ScrollLock,
    listeners: Rc<dyn ListenerHost>,
}

impl Lightbox {
    pub fn new(deck: Deck, scroll_lock: ScrollLock, listeners: Rc<dyn ListenerHost>) -> Self {
        Self {
            deck,
            state: LightboxState::Closed,
            scroll_lock,
            listeners,
        }
    }

    #[inline]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    #[inline]
    pub fn state(&self) -> &LightboxState {
        &self.state
    }

    /// Selected card, when open.
    pub fn selected(&self) -> Option<CardId> {
        match self.state {
            LightboxState::Open { selected, .. } => Some(selected),
            LightboxState::Closed => None,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.selected().is_some()
    }

    /// Open on `card`, or move to it when already open.
    ///
    /// Unknown ids and re-selecting the current card change nothing.
    pub fn select(&mut self, card: CardId) -> Option<LightboxChange> {
        if !self.deck.contains(card) {
            flowstack_core::debug!(card = card.0, "select ignored: unknown card");
            return None;
        }
        if let LightboxState::Open { selected, .. } = &mut self.state {
            if *selected == card {
                return None;
            }
            let from = std::mem::replace(selected, card);
            return Some(LightboxChange::Moved { from, to: card });
        }
        self.state = LightboxState::Open {
            selected: card,
            scroll: self.scroll_lock.acquire(),
            keys: ListenerGuard::register(&self.listeners, ListenerKind::KeyDown),
        };
        flowstack_core::debug!(card = card.0, "lightbox opened");
        Some(LightboxChange::Opened(card))
    }

    /// Advance to the next card, wrapping.
    pub fn next(&mut self) -> Option<LightboxChange> {
        let to = self.deck.next_id(self.selected()?)?;
        self.select(to)
    }

    /// Step back to the previous card, wrapping.
    pub fn prev(&mut self) -> Option<LightboxChange> {
        let to = self.deck.prev_id(self.selected()?)?;
        self.select(to)
    }

    /// Close, releasing the scroll lock and key listener.
    pub fn close(&mut self, trigger: CloseTrigger) -> Option<LightboxChange> {
        match std::mem::take(&mut self.state) {
            LightboxState::Closed => None,
            LightboxState::Open { selected, .. } => {
                // Guards dropped with the old state.
                flowstack_core::debug!(card = selected.0, ?trigger, "lightbox closed");
                Some(LightboxChange::Closed {
                    card: selected,
                    trigger,
                })
            }
        }
    }

    /// Offer a key press.
    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyOutcome {
        if !self.is_open() {
            return KeyOutcome::Ignored;
        }
        let change = match key.code {
            KeyCode::Escape => self.close(CloseTrigger::Escape),
            _ if key.modifiers.has_command() => None,
            KeyCode::Right => self.next(),
            KeyCode::Left => self.prev(),
            _ => None,
        };
        change.map_or(KeyOutcome::Ignored, KeyOutcome::Handled)
    }
}

impl Drop for Lightbox {
    fn drop(&mut self) {
        self.close(CloseTrigger::Teardown);
    }
}
