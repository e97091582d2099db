//! Field extraction: unstructured page or OCR text in, partial typed record out.
//!
//! Every field has its own ordered rule cascade (see [`cascade`]); rules are
//! evaluated first-match-wins and fields never depend on one another, so a
//! miss on one pattern cannot block the rest of the record.

pub mod cascade;
pub mod document;
pub mod normalize;
pub mod ocr;
pub mod rules;

pub use document::{extract_document, page_text};
pub use normalize::{normalize_whitespace, TextOrigin};
pub use ocr::{scan_candidates, OcrCandidates};
pub use rules::{extract, Dimensions, Vehicle, Weight};
