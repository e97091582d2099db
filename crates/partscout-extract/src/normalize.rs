use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Where a text blob came from. Decides whitespace handling and whether
/// field labels are matched case-sensitively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextOrigin {
    /// Text of a rendered web page; labels are reliable.
    #[default]
    Page,
    /// Output of a text recognizer; spacing and casing are not.
    Ocr,
}

/// Collapses every whitespace run (including newlines) into a single space
/// and trims both ends.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Applies the origin-specific preprocessing that precedes rule evaluation.
#[must_use]
pub fn prepare(text: &str, origin: TextOrigin) -> Cow<'_, str> {
    match origin {
        TextOrigin::Page => Cow::Borrowed(text),
        TextOrigin::Ocr => Cow::Owned(normalize_whitespace(text)),
    }
}
