//! Deck requests: what a presenter asks to have rendered.
//!
//! The deck content is opaque to live sessions; it is validated here and
//! handed to the deck renderer unchanged.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Maximum number of items in one deck.
pub const MAX_DECK_ITEMS: usize = 100;

/// A renderable deck: an ordered list of items for one service date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRequest {
    pub date: String,
    pub items: Vec<DeckItem>,
    #[serde(default)]
    pub hints: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub contents: bool,
}

/// One entry of a deck (a song, a liturgy part, free text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckItem {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<u32>,
}

impl DeckRequest {
    /// Validates the date and the item count.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_service_date(&self.date) {
            return Err(ValidationError::invalid_format("date", "expected 20YY-MM-DD"));
        }
        if self.items.is_empty() {
            return Err(ValidationError::empty_field("items"));
        }
        if self.items.len() > MAX_DECK_ITEMS {
            return Err(ValidationError::out_of_range(
                "items",
                1,
                MAX_DECK_ITEMS as i64,
                self.items.len() as i64,
            ));
        }
        Ok(())
    }
}

/// Body of `POST /live` and `PUT /live/{key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSessionRequest {
    pub deck: DeckRequest,
    #[serde(default)]
    pub current_page: i64,
}

impl LiveSessionRequest {
    /// Validates the whole request and returns the initial page.
    pub fn validate(&self) -> Result<u32, ValidationError> {
        let page = u32::try_from(self.current_page).map_err(|_| {
            ValidationError::out_of_range("currentPage", 0, u32::MAX as i64, self.current_page)
        })?;
        self.deck.validate()?;
        Ok(page)
    }
}

/// Matches `20\d\d-[0-1]\d-[0-3]\d`.
fn is_service_date(raw: &str) -> bool {
    let b = raw.as_bytes();
    b.len() == 10
        && b.starts_with(b"20")
        && b[2].is_ascii_digit()
        && b[3].is_ascii_digit()
        && b[4] == b'-'
        && matches!(b[5], b'0'..=b'1')
        && b[6].is_ascii_digit()
        && b[7] == b'-'
        && matches!(b[8], b'0'..=b'3')
        && b[9].is_ascii_digit()
}
