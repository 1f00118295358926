//! Records exchanged between the store, the API layer and the editor.
//!
//! Every type serializes with camelCase field names (`textId`, `createdAt`)
//! so replies match what API clients expect.

use serde::{Deserialize, Serialize};

/// One line of content within a [`Text`], positioned by `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: i64,
    pub content: String,
    /// Position within the owning text. The editor keeps these at `0..n`,
    /// but nothing in storage enforces uniqueness or contiguity.
    pub order: i64,
    pub text_id: i64,
}

/// A note: a titled, ordered sequence of [`Line`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub id: i64,
    pub title: String,
    /// Unix timestamp (seconds) assigned when the text was created.
    pub created_at: i64,
    pub lines: Vec<Line>,
}

/// The `{ id, title }` shape returned when listing or creating texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSummary {
    pub id: i64,
    pub title: String,
}

impl From<&Text> for TextSummary {
    fn from(text: &Text) -> Self {
        Self {
            id: text.id,
            title: text.title.clone(),
        }
    }
}
