#![forbid(unsafe_code)]

//! JSON-friendly event schema between the page script and the gallery.
//!
//! The JS side forwards DOM notifications as small tagged objects:
//!
//! ```json
//! {"kind":"scroll","x":0,"y":1200}
//! {"kind":"pointer_move","client_x":412,"client_y":96}
//! {"kind":"key","key":"ArrowRight","mods":2}
//! {"kind":"card_click","card":3}
//! {"kind":"next"}
//! ```
//!
//! [`WebEvent::into_action`] validates the payload and turns it into either a
//! sampler [`Signal`] or a direct lightbox command. `mods` is the compact
//! modifier bitset (shift 1, alt 2, ctrl 4, super 8).

use std::fmt;

use serde::{Deserialize, Serialize};

use flowstack_core::input::{KeyCode, KeyEvent, Modifiers};
use flowstack_core::signal::Signal;
use flowstack_widgets::{CardId, CloseTrigger};

/// One notification from the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WebEvent {
    Scroll {
        x: f64,
        y: f64,
    },
    Resize {
        width: f64,
        height: f64,
    },
    PointerMove {
        client_x: f64,
        client_y: f64,
    },
    PointerLeave,
    FontsLoaded,
    OrientationChange,
    Key {
        key: String,
        #[serde(default)]
        mods: u8,
    },
    /// A stacked card was activated.
    CardClick {
        card: u32,
    },
    /// Click outside the open card.
    Backdrop,
    /// The overlay's close button.
    CloseControl,
    /// The overlay's next-card control.
    Next,
    /// The overlay's previous-card control.
    Prev,
}

/// What the gallery should do with an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Signal(Signal),
    Select(CardId),
    Close(CloseTrigger),
    Next,
    Prev,
}

/// Rejected event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Not valid JSON for the schema.
    Parse(String),
    /// A coordinate or dimension was NaN or infinite.
    NonFinite(&'static str),
    /// Viewport dimensions must be positive.
    EmptyViewport,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid event: {msg}"),
            Self::NonFinite(field) => write!(f, "event field {field} is not finite"),
            Self::EmptyViewport => f.write_str("resize to an empty viewport"),
        }
    }
}

impl std::error::Error for EventError {}

fn finite(field: &'static str, value: f64) -> Result<f64, EventError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EventError::NonFinite(field))
    }
}

impl WebEvent {
    pub fn from_json(json: &str) -> Result<Self, EventError> {
        serde_json::from_str(json).map_err(|e| EventError::Parse(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        // Serializing a plain enum of numbers and strings cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Validate and classify.
    pub fn into_action(self) -> Result<Action, EventError> {
        let signal = match self {
            Self::Scroll { x, y } => Signal::Scroll {
                x: finite("x", x)?,
                y: finite("y", y)?,
            },
            Self::Resize { width, height } => {
                let width = finite("width", width)?;
                let height = finite("height", height)?;
                if width <= 0.0 || height <= 0.0 {
                    return Err(EventError::EmptyViewport);
                }
                Signal::Resize { width, height }
            }
            Self::PointerMove { client_x, client_y } => Signal::PointerMove {
                client_x: finite("client_x", client_x)?,
                client_y: finite("client_y", client_y)?,
            },
            Self::PointerLeave => Signal::PointerLeave,
            Self::FontsLoaded => Signal::FontsLoaded,
            Self::OrientationChange => Signal::OrientationChange,
            Self::Key { key, mods } => Signal::Key(
                KeyEvent::new(KeyCode::from_dom_key(&key))
                    .with_modifiers(Modifiers::from_bits_truncate(mods)),
            ),
            Self::CardClick { card } => return Ok(Action::Select(CardId(card))),
            Self::Backdrop => return Ok(Action::Close(CloseTrigger::Backdrop)),
            Self::CloseControl => return Ok(Action::Close(CloseTrigger::CloseControl)),
            Self::Next => return Ok(Action::Next),
            Self::Prev => return Ok(Action::Prev),
        };
        Ok(Action::Signal(signal))
    }
}
