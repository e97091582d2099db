//! Per-field rule cascades over plain text.
//!
//! Labels ("Part #:", "Width:", ...) are matched case-sensitively for page
//! text and case-insensitively for OCR text. Vehicle makes and weight units
//! are always case-insensitive.

use std::sync::LazyLock;

use partscout_core::ExtractedRecord;
use regex::{Regex, RegexBuilder};

use crate::cascade::{first_match, Matched, Rule};
use crate::normalize::{prepare, TextOrigin};

const CM_PER_INCH: f64 = 2.54;

/// Makes recognized without a "for <Make> <Model>" phrase.
pub const KNOWN_MAKES: [&str; 10] = [
    "Toyota",
    "Honda",
    "Ford",
    "Chevrolet",
    "BMW",
    "Mercedes",
    "Audi",
    "Nissan",
    "Hyundai",
    "Kia",
];

const NUMBER: &str = r"(\d+(?:\.\d+)?)";
const LENGTH_UNIT: &str = r"(inches|in|cm)\b";
const WEIGHT_UNIT: &str = r"(kg|lbs|lb|oz|pounds?|ounces?|g)\b";

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub make: String,
    pub model: Option<String>,
}

/// Width/height/depth in inches; any subset may be present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dimensions {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub depth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weight {
    pub value: f64,
    pub unit: String,
}

pub(crate) struct Patterns {
    part_hash: Regex,
    part_number: Regex,
    item_hash: Regex,
    sku: Regex,
    vehicle_for: Regex,
    known_make: Regex,
    dimensions_labelled: Regex,
    dimensions_bare: Regex,
    width: Regex,
    height: Regex,
    depth: Regex,
    weight_labelled: Regex,
    weight_bare: Regex,
    price: Regex,
    color: Regex,
}

fn build(pattern: &str, case_insensitive: bool) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .expect("valid extraction pattern")
}

impl Patterns {
    fn compile(case_insensitive: bool) -> Self {
        let ci = case_insensitive;
        let triple = format!(r"{NUMBER}\s*[xX×]\s*{NUMBER}\s*[xX×]\s*{NUMBER}\s*{LENGTH_UNIT}");
        let makes = KNOWN_MAKES.join("|");

        Self {
            part_hash: build(r"Part\s*#?\s*:\s*([A-Z0-9-]+)", ci),
            part_number: build(r"Part\s*Number\s*:\s*([A-Z0-9-]+)", ci),
            item_hash: build(r"Item\s*#?\s*:\s*([A-Z0-9-]+)", ci),
            sku: build(r"SKU\s*:\s*([A-Z0-9-]+)", ci),
            vehicle_for: build(r"\b(?i:for)\s+([A-Za-z]+)\s+([A-Za-z0-9]+)", ci),
            known_make: build(&format!(r"(?i)\b({makes})\b"), true),
            dimensions_labelled: build(&format!(r"Dimensions\s*:\s*{triple}"), ci),
            dimensions_bare: build(&format!(r"\b{triple}"), ci),
            width: build(&format!(r"Width\s*:\s*{NUMBER}\s*{LENGTH_UNIT}"), ci),
            height: build(&format!(r"Height\s*:\s*{NUMBER}\s*{LENGTH_UNIT}"), ci),
            depth: build(&format!(r"Depth\s*:\s*{NUMBER}\s*{LENGTH_UNIT}"), ci),
            weight_labelled: build(
                &format!(r"(?i)weight\s*:\s*{NUMBER}\s*{WEIGHT_UNIT}"),
                true,
            ),
            weight_bare: build(&format!(r"(?i)\b{NUMBER}\s+{WEIGHT_UNIT}"), true),
            price: build(r"[$€£]\s*(\d[\d,]*(?:\.\d+)?)", ci),
            color: build(r"Colou?r\s*:\s*([A-Za-z]+)", ci),
        }
    }
}

static PAGE_PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns::compile(false));
static OCR_PATTERNS: LazyLock<Patterns> = LazyLock::new(|| Patterns::compile(true));

fn patterns(origin: TextOrigin) -> &'static Patterns {
    match origin {
        TextOrigin::Page => &PAGE_PATTERNS,
        TextOrigin::Ocr => &OCR_PATTERNS,
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

fn to_inches(value: f64, unit: &str) -> f64 {
    if unit.eq_ignore_ascii_case("cm") {
        (value / CM_PER_INCH * 1000.0).round() / 1000.0
    } else {
        value
    }
}

fn length(re: &Regex, text: &str) -> Option<f64> {
    let caps = re.captures(text)?;
    let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
    Some(to_inches(value, caps.get(2)?.as_str()))
}

fn triple(re: &Regex, text: &str) -> Option<Dimensions> {
    let caps = re.captures(text)?;
    let unit = caps.get(4)?.as_str();
    let axis = |i: usize| -> Option<f64> {
        let value = caps.get(i)?.as_str().parse::<f64>().ok()?;
        Some(to_inches(value, unit))
    };
    Some(Dimensions {
        width: Some(axis(1)?),
        height: Some(axis(2)?),
        depth: Some(axis(3)?),
    })
}

// ---------------------------------------------------------------------------
// Cascades
// ---------------------------------------------------------------------------

pub(crate) const PART_NUMBER_RULES: &[Rule<Patterns, String>] = &[
    Rule {
        name: "part_hash",
        apply: |p, t| capture(&p.part_hash, t),
    },
    Rule {
        name: "part_number",
        apply: |p, t| capture(&p.part_number, t),
    },
    Rule {
        name: "item_hash",
        apply: |p, t| capture(&p.item_hash, t),
    },
    Rule {
        name: "sku",
        apply: |p, t| capture(&p.sku, t),
    },
];

pub(crate) const VEHICLE_RULES: &[Rule<Patterns, Vehicle>] = &[
    Rule {
        name: "for_make_model",
        apply: |p, t| {
            let caps = p.vehicle_for.captures(t)?;
            Some(Vehicle {
                make: caps.get(1)?.as_str().to_owned(),
                model: Some(caps.get(2)?.as_str().to_owned()),
            })
        },
    },
    Rule {
        name: "known_make",
        apply: |p, t| {
            let found = capture(&p.known_make, t)?;
            let make = KNOWN_MAKES
                .iter()
                .find(|m| m.eq_ignore_ascii_case(&found))
                .map_or(found, |m| (*m).to_owned());
            Some(Vehicle { make, model: None })
        },
    },
];

pub(crate) const DIMENSION_RULES: &[Rule<Patterns, Dimensions>] = &[
    Rule {
        name: "dimensions_labelled",
        apply: |p, t| triple(&p.dimensions_labelled, t),
    },
    Rule {
        name: "dimensions_bare",
        apply: |p, t| triple(&p.dimensions_bare, t),
    },
    Rule {
        name: "single_axes",
        apply: |p, t| {
            let dims = Dimensions {
                width: length(&p.width, t),
                height: length(&p.height, t),
                depth: length(&p.depth, t),
            };
            (dims != Dimensions::default()).then_some(dims)
        },
    },
];

fn weight_from(re: &Regex, text: &str) -> Option<Weight> {
    let caps = re.captures(text)?;
    Some(Weight {
        value: caps.get(1)?.as_str().parse().ok()?,
        unit: caps.get(2)?.as_str().to_owned(),
    })
}

/// A bare amount needs whitespace before its unit so that codes such as
/// `500G` stay out of the weight field.
pub(crate) const WEIGHT_RULES: &[Rule<Patterns, Weight>] = &[
    Rule {
        name: "weight_labelled",
        apply: |p, t| weight_from(&p.weight_labelled, t),
    },
    Rule {
        name: "weight_bare",
        apply: |p, t| weight_from(&p.weight_bare, t),
    },
];

pub(crate) const PRICE_RULES: &[Rule<Patterns, f64>] = &[Rule {
    name: "currency_prefixed",
    apply: |p, t| capture(&p.price, t)?.replace(',', "").parse().ok(),
}];

pub(crate) const COLOR_RULES: &[Rule<Patterns, String>] = &[Rule {
    name: "color_label",
    apply: |p, t| capture(&p.color, t),
}];

fn run<T>(rules: &[Rule<Patterns, T>], text: &str, origin: TextOrigin) -> Option<Matched<T>> {
    first_match(rules, patterns(origin), text)
}

// ---------------------------------------------------------------------------
// Per-field entry points
// ---------------------------------------------------------------------------

/// Part number by label priority: `Part #:`, `Part Number:`, `Item #:`, `SKU:`.
///
/// Priority is by label, not by position in the text.
#[must_use]
pub fn part_number(text: &str, origin: TextOrigin) -> Option<String> {
    run(PART_NUMBER_RULES, text, origin).map(|m| m.value)
}

/// `for <Make> <Model>`, else the first known make mentioned.
#[must_use]
pub fn vehicle(text: &str, origin: TextOrigin) -> Option<Vehicle> {
    run(VEHICLE_RULES, text, origin).map(|m| m.value)
}

/// Compound `W x H x D` first; independent axis labels only when no
/// compound form is present.
#[must_use]
pub fn dimensions(text: &str, origin: TextOrigin) -> Option<Matched<Dimensions>> {
    run(DIMENSION_RULES, text, origin)
}

#[must_use]
pub fn weight(text: &str, origin: TextOrigin) -> Option<Weight> {
    run(WEIGHT_RULES, text, origin).map(|m| m.value)
}

/// Currency-prefixed amount with thousands separators removed.
#[must_use]
pub fn price(text: &str, origin: TextOrigin) -> Option<f64> {
    run(PRICE_RULES, text, origin).map(|m| m.value)
}

#[must_use]
pub fn color(text: &str, origin: TextOrigin) -> Option<String> {
    run(COLOR_RULES, text, origin).map(|m| m.value)
}

/// Runs every text cascade against `text` and assembles the record.
///
/// OCR text is whitespace-normalized first. Description and image URL need
/// document structure and are left to [`crate::document::extract_document`].
#[must_use]
pub fn extract(text: &str, origin: TextOrigin) -> ExtractedRecord {
    let prepared = prepare(text, origin);
    let text: &str = &prepared;

    let mut record = ExtractedRecord {
        part_number: part_number(text, origin),
        price: price(text, origin),
        color: color(text, origin),
        ..ExtractedRecord::default()
    };

    if let Some(found) = vehicle(text, origin) {
        record.vehicle_make = Some(found.make);
        record.vehicle_model = found.model;
    }

    if let Some(Matched { value: dims, .. }) = dimensions(text, origin) {
        record.width = dims.width;
        record.height = dims.height;
        record.depth = dims.depth;
    }

    if let Some(found) = weight(text, origin) {
        record.weight = Some(found.value);
        record.weight_unit = Some(found.unit);
    }

    record
}

#[cfg(test)]
#[path = "rules_test.rs"]
mod tests;
