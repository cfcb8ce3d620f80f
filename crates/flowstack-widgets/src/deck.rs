#![forbid(unsafe_code)]

//! Ordered card collection.
//!
//! A [`Deck`] is the single source of truth for which cards exist and in what
//! order. Ids are unique; navigation wraps around in both directions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable card identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

/// One gallery card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub subtitle: String,
    /// Image URL or other media reference.
    pub media_ref: String,
    /// Free-form caption line (date, clip count).
    pub metadata: String,
}

impl Card {
    pub fn new(
        id: u32,
        title: impl Into<String>,
        subtitle: impl Into<String>,
        media_ref: impl Into<String>,
        metadata: impl Into<String>,
    ) -> Self {
        Self {
            id: CardId(id),
            title: title.into(),
            subtitle: subtitle.into(),
            media_ref: media_ref.into(),
            metadata: metadata.into(),
        }
    }
}

/// Deck construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckError {
    /// Two cards share an id.
    DuplicateId(CardId),
    /// The JSON document could not be read.
    Parse(String),
}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate card id {}", id.0),
            Self::Parse(msg) => write!(f, "invalid deck document: {msg}"),
        }
    }
}

impl std::error::Error for DeckError {}

/// Ordered cards with unique ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build a deck, rejecting duplicate ids.
    pub fn new(cards: Vec<Card>) -> Result<Self, DeckError> {
        for (i, card) in cards.iter().enumerate() {
            if cards[..i].iter().any(|c| c.id == card.id) {
                return Err(DeckError::DuplicateId(card.id));
            }
        }
        Ok(Self { cards })
    }

    /// Parse a JSON array of cards.
    pub fn from_json(json: &str) -> Result<Self, DeckError> {
        let cards: Vec<Card> =
            serde_json::from_str(json).map_err(|e| DeckError::Parse(e.to_string()))?;
        Self::new(cards)
    }

    /// The five cards shown on the landing page.
    #[must_use]
    pub fn showcase() -> Self {
        const MEDIA: [&str; 5] = [
            "photo-1535498730771-e735b998cd64",
            "photo-1595760780346-f972eb49f094",
            "photo-1506057213338-1560206e1bda",
            "photo-1621644886561-98752d5377cd",
            "photo-1514565131-fce0801e5785",
        ];
        let media = |i: usize| {
            format!("https://images.unsplash.com/{}?q=80&w=1600&auto=format&fit=crop", MEDIA[i])
        };
        Self {
            cards: vec![
                Card::new(1, "Follow The Light", "Cinematic Reality", media(0), "24th Apr, 2024 · 34 clips"),
                Card::new(2, "Electric Pink", "Neon Nights", media(1), "02nd May, 2024 · 12 clips"),
                Card::new(3, "Winging It", "Freedom Series", media(2), "15th May, 2024 · 8 clips"),
                Card::new(4, "Bloom", "Natural Order", media(3), "21st Jun, 2024 · 45 clips"),
                Card::new(5, "Urban Air", "City Pulse", media(4), "10th Jul, 2024 · 20 clips"),
            ],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.cards.iter().map(|c| c.id)
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn index_of(&self, id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.index_of(id).is_some()
    }

    /// Id after `id`, wrapping to the first card.
    pub fn next_id(&self, id: CardId) -> Option<CardId> {
        let i = self.index_of(id)?;
        Some(self.cards[(i + 1) % self.cards.len()].id)
    }

    /// Id before `id`, wrapping to the last card.
    pub fn prev_id(&self, id: CardId) -> Option<CardId> {
        let i = self.index_of(id)?;
        let n = self.cards.len();
        Some(self.cards[(i + n - 1) % n].id)
    }
}
