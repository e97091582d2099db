//! Request and result types shared by the extractor, orchestrator and server.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the two search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Broad web search followed by a visit to each result page.
    General,
    /// Fixed registry of domain sites whose listings carry structured fields.
    Specialized,
}

impl Category {
    /// Categories searched when the caller does not choose.
    pub const DEFAULT_ORDER: [Category; 2] = [Category::General, Category::Specialized];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Specialized => "specialized",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial typed record produced by the field extractor.
///
/// Every field is independent: a `None` means the corresponding rule did not
/// match and is omitted from serialized output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_model: Option<String>,
    /// Inches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Inches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Inches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Registry name of the specialized source the record came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
}

impl ExtractedRecord {
    /// Returns `true` when no rule populated any field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One aggregated search hit with mandatory provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "source")]
    pub category: Category,
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub data: ExtractedRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidQuery {
    #[error("query is required")]
    Empty,
}

/// Validated search request: non-empty text plus an ordered category list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    categories: Vec<Category>,
}

impl SearchQuery {
    /// Validates the query text and normalizes the category list.
    ///
    /// `None` selects [`Category::DEFAULT_ORDER`]. Duplicates are dropped,
    /// keeping the first occurrence so the caller's order is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidQuery::Empty`] when the text is empty or whitespace.
    pub fn new(
        text: impl Into<String>,
        categories: Option<Vec<Category>>,
    ) -> Result<Self, InvalidQuery> {
        let text = text.into().trim().to_owned();
        if text.is_empty() {
            return Err(InvalidQuery::Empty);
        }

        let requested = categories.unwrap_or_else(|| Category::DEFAULT_ORDER.to_vec());
        let mut categories = Vec::with_capacity(requested.len());
        for category in requested {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }

        Ok(Self { text, categories })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}
