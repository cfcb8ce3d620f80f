#![forbid(unsafe_code)]

//! Mount options passed from the page as JSON.
//!
//! Every field is optional; an empty object mounts the showcase deck with
//! the default effect tuning against the default `data-*` selectors.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use flowstack_core::config::{ConfigError, EffectConfig};
use flowstack_widgets::{Card, Deck, DeckError, StackConfig};

/// Longest accepted shared-element transition.
pub const MAX_TRANSITION_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountOptions {
    /// Tall scroll container of the card stack.
    pub stack_container: String,
    /// Sticky stage that tilts with depth.
    pub stack_wrapper: String,
    /// One element per card, carrying `data-card-id`.
    pub card_selector: String,
    /// Blocks with the viewport-center focus effect.
    pub flow_text_selector: String,
    /// Containers whose text becomes a pointer-reactive glyph field.
    pub pointer_field_selector: String,
    /// Pointer fields sit inside a sticky stage and do not scroll.
    pub sticky_pointer_fields: bool,
    /// Element the lightbox overlay is appended to.
    pub overlay_root: String,
    /// Deck override; the showcase deck when absent.
    pub cards: Option<Vec<Card>>,
    pub focus: EffectConfig,
    pub contact: EffectConfig,
    pub stack: StackConfig,
    pub transition_ms: u64,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            stack_container: "[data-stack-container]".into(),
            stack_wrapper: "[data-stack-wrapper]".into(),
            card_selector: "[data-card-id]".into(),
            flow_text_selector: "[data-flow-text]".into(),
            pointer_field_selector: "[data-pointer-field]".into(),
            sticky_pointer_fields: true,
            overlay_root: "body".into(),
            cards: None,
            focus: EffectConfig::focus(),
            contact: EffectConfig::contact(),
            stack: StackConfig::default(),
            transition_ms: 400,
        }
    }
}

/// Rejected mount options.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionsError {
    Parse(String),
    Effect {
        which: &'static str,
        error: ConfigError,
    },
    Deck(DeckError),
    Stack(ConfigError),
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid mount options: {msg}"),
            Self::Effect { which, error } => write!(f, "{which} effect: {error}"),
            Self::Deck(error) => write!(f, "{error}"),
            Self::Stack(error) => write!(f, "card stack: {error}"),
            Self::Invalid { field, message } => write!(f, "{field}: {message}"),
        }
    }
}

impl std::error::Error for OptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Effect { error, .. } => Some(error),
            Self::Deck(error) => Some(error),
            Self::Stack(error) => Some(error),
            _ => None,
        }
    }
}

impl MountOptions {
    /// Parse and validate. Returns the first violation on failure.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| OptionsError::Parse(e.to_string()))?;
        options
            .validate()
            .map_err(|mut errors| errors.swap_remove(0))?;
        Ok(options)
    }

    /// Collect every violation.
    pub fn validate(&self) -> Result<(), Vec<OptionsError>> {
        let mut errors = Vec::new();
        for (field, selector) in [
            ("stack_container", &self.stack_container),
            ("stack_wrapper", &self.stack_wrapper),
            ("card_selector", &self.card_selector),
            ("overlay_root", &self.overlay_root),
        ] {
            if selector.trim().is_empty() {
                errors.push(OptionsError::Invalid {
                    field,
                    message: "selector is empty".into(),
                });
            }
        }
        for (which, config) in [("focus", &self.focus), ("contact", &self.contact)] {
            if let Err(violations) = config.validate() {
                errors.extend(
                    violations
                        .into_iter()
                        .map(|error| OptionsError::Effect { which, error }),
                );
            }
        }
        if let Err(violations) = self.stack.validate() {
            errors.extend(violations.into_iter().map(OptionsError::Stack));
        }
        if !(1..=MAX_TRANSITION_MS).contains(&self.transition_ms) {
            errors.push(OptionsError::Invalid {
                field: "transition_ms",
                message: format!("must be in 1..={MAX_TRANSITION_MS}, got {}", self.transition_ms),
            });
        }
        if let Err(e) = self.deck() {
            errors.push(OptionsError::Deck(e));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            #[cfg(feature = "tracing")]
            for e in &errors {
                flowstack_core::warn!(error = %e, "mount option rejected");
            }
            Err(errors)
        }
    }

    /// The deck to mount.
    pub fn deck(&self) -> Result<Deck, DeckError> {
        match &self.cards {
            Some(cards) => Deck::new(cards.clone()),
            None => Ok(Deck::showcase()),
        }
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}
