//! Extraction from a rendered HTML document.
//!
//! Text fields run through [`crate::rules::extract`] over the visible page
//! text. Description and image URL come from document structure.

use std::sync::LazyLock;

use partscout_core::ExtractedRecord;
use scraper::{ElementRef, Html, Selector};

use crate::cascade::{first_match, Rule};
use crate::normalize::TextOrigin;
use crate::rules::extract;

const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid static selector")
}

static DESCRIPTION_DIV: LazyLock<Selector> = LazyLock::new(|| selector("div.description"));
static PRODUCT_DESCRIPTION_DIV: LazyLock<Selector> =
    LazyLock::new(|| selector("div.product-description"));
static META_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"meta[name="description"]"#));
static PRODUCT_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img.product-image"));
static MAIN_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img.main-image"));
static OG_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:image"]"#));

/// Visible text of an element: trimmed text nodes joined by single spaces.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Visible text of the whole document, excluding script-like elements.
#[must_use]
pub fn page_text(document: &Html) -> String {
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
            });
            if hidden {
                return None;
            }
            let trimmed = text.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(document: &Html, sel: &Selector) -> Option<String> {
    document
        .select(sel)
        .map(element_text)
        .find(|t| !t.is_empty())
}

fn first_attr(document: &Html, sel: &Selector, attr: &str) -> Option<String> {
    document
        .select(sel)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_owned)
}

fn usable_image(document: &Html, sel: &Selector, attr: &str) -> Option<String> {
    document
        .select(sel)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|v| v.starts_with("http") || v.starts_with('/'))
        .map(str::to_owned)
}

const DESCRIPTION_RULES: &[Rule<Html, String>] = &[
    Rule {
        name: "description_div",
        apply: |doc, _| first_text(doc, &DESCRIPTION_DIV),
    },
    Rule {
        name: "product_description_div",
        apply: |doc, _| first_text(doc, &PRODUCT_DESCRIPTION_DIV),
    },
    Rule {
        name: "meta_description",
        apply: |doc, _| first_attr(doc, &META_DESCRIPTION, "content"),
    },
];

const IMAGE_RULES: &[Rule<Html, String>] = &[
    Rule {
        name: "product_image",
        apply: |doc, _| usable_image(doc, &PRODUCT_IMAGE, "src"),
    },
    Rule {
        name: "main_image",
        apply: |doc, _| usable_image(doc, &MAIN_IMAGE, "src"),
    },
    Rule {
        name: "og_image",
        apply: |doc, _| usable_image(doc, &OG_IMAGE, "content"),
    },
];

/// Extracts a record from rendered page markup.
#[must_use]
pub fn extract_document(html: &str) -> ExtractedRecord {
    let document = Html::parse_document(html);
    let text = page_text(&document);

    let mut record = extract(&text, TextOrigin::Page);
    record.description = first_match(DESCRIPTION_RULES, &document, &text).map(|m| m.value);
    record.image_url = first_match(IMAGE_RULES, &document, &text).map(|m| m.value);
    record
}
