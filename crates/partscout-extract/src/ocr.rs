//! Loose candidate scan over recognized text.
//!
//! Unlike the rule cascades this collects every plausible hit per field so
//! a human (or a later pass) can pick among them.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::rules::KNOWN_MAKES;

static PART_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z0-9]{5,}\b").expect("valid part number pattern"));
static COMPACT_DIMENSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d+(?:\.\d+)?[xX]\d+(?:\.\d+)?(?:[xX]\d+(?:\.\d+)?)?\b")
        .expect("valid dimensions pattern")
});
static WEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(kg|g|lbs|lb|oz|pounds?|ounces?)\b")
        .expect("valid weight pattern")
});
static PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*\d+(?:\.\d{2})?").expect("valid price pattern"));
static MAKES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    KNOWN_MAKES
        .iter()
        .map(|make| {
            let re = Regex::new(&format!(r"(?i)\b{make}\b")).expect("valid make pattern");
            (*make, re)
        })
        .collect()
});

/// Every candidate found in a block of recognized text, in text order
/// (makes in list order).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrCandidates {
    pub part_numbers: Vec<String>,
    pub vehicle_makes: Vec<String>,
    pub dimensions: Vec<String>,
    pub weights: Vec<String>,
    pub prices: Vec<String>,
}

fn all(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_owned()).collect()
}

/// Scans already-normalized text for candidates.
#[must_use]
pub fn scan_candidates(text: &str) -> OcrCandidates {
    OcrCandidates {
        part_numbers: all(&PART_NUMBER, text),
        vehicle_makes: MAKES
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(make, _)| (*make).to_owned())
            .collect(),
        dimensions: all(&COMPACT_DIMENSIONS, text),
        weights: WEIGHT
            .captures_iter(text)
            .map(|caps| format!("{} {}", &caps[1], &caps[2]))
            .collect(),
        prices: all(&PRICE, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_part_number_candidate() {
        let found = scan_candidates("REF 12AB9 and X99Z0Q but not abc12 or AB12");
        assert_eq!(found.part_numbers, vec!["12AB9", "X99Z0Q"]);
    }

    #[test]
    fn makes_follow_list_order_not_text_order() {
        let found = scan_candidates("kia fits, also TOYOTA and Fordson");
        assert_eq!(found.vehicle_makes, vec!["Toyota", "Kia"]);
    }

    #[test]
    fn compact_dimensions_two_and_three_axes() {
        let found = scan_candidates("box 10x20x30 tray 4.5X6 plate 7 x 8");
        assert_eq!(found.dimensions, vec!["10x20x30", "4.5X6"]);
    }

    #[test]
    fn weights_are_rejoined_with_single_space() {
        let found = scan_candidates("2.5kg and 12 OZ");
        assert_eq!(found.weights, vec!["2.5 kg", "12 OZ"]);
    }

    #[test]
    fn dollar_prices_only() {
        let found = scan_candidates("$19.99 or $ 5 or €7");
        assert_eq!(found.prices, vec!["$19.99", "$ 5"]);
    }

    #[test]
    fn empty_text_has_no_candidates() {
        assert_eq!(scan_candidates(""), OcrCandidates::default());
    }
}
