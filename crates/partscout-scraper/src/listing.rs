//! Parsing of rendered result pages into candidate items.
//!
//! Everything here is synchronous: `scraper::Html` is not `Send`, so pages
//! are parsed and dropped before the caller awaits again.

use std::sync::LazyLock;

use partscout_core::{ExtractedRecord, SourceDefinition, SourceLayout};
use partscout_extract::document::element_text;
use partscout_extract::{rules, TextOrigin};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::RenderError;

pub const GENERAL_ITEM_LOCATOR: &str = "div.g";
const GENERAL_TITLE_LOCATOR: &str = "h3";
const GENERAL_SNIPPET_LOCATOR: &str = "div.VwiC3b";
const GENERAL_LINK_LOCATOR: &str = "a[href]";

pub const NO_TITLE: &str = "No title";
pub const NO_DESCRIPTION: &str = "No description";

/// One organic web-search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralEntry {
    pub title: String,
    pub snippet: String,
    /// Absolute `http(s)` link; `None` when the entry has no usable link.
    pub link: Option<String>,
}

/// One item scraped directly from a specialized listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingItem {
    pub title: String,
    pub record: ExtractedRecord,
}

/// One item on a detail-page source: a title and where to follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLink {
    pub title: Option<String>,
    pub url: Option<String>,
}

fn parse_locator(locator: &str) -> Result<Selector, RenderError> {
    Selector::parse(locator).map_err(|_| RenderError::InvalidLocator {
        locator: locator.to_string(),
    })
}

fn text_of(item: ElementRef<'_>, selector: &Selector) -> Option<String> {
    item.select(selector)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

/// First `limit` result entries of a web-search page.
///
/// # Errors
///
/// Returns [`RenderError::InvalidLocator`] if a built-in locator fails to
/// parse.
pub fn general_entries(html: &str, limit: usize) -> Result<Vec<GeneralEntry>, RenderError> {
    let item_sel = parse_locator(GENERAL_ITEM_LOCATOR)?;
    let title_sel = parse_locator(GENERAL_TITLE_LOCATOR)?;
    let snippet_sel = parse_locator(GENERAL_SNIPPET_LOCATOR)?;
    let link_sel = parse_locator(GENERAL_LINK_LOCATOR)?;

    let document = Html::parse_document(html);
    let entries = document
        .select(&item_sel)
        .take(limit)
        .map(|item| GeneralEntry {
            title: text_of(item, &title_sel).unwrap_or_else(|| NO_TITLE.to_string()),
            snippet: text_of(item, &snippet_sel).unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            link: item
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .filter(|href| href.starts_with("http"))
                .map(str::to_owned),
        })
        .collect();
    Ok(entries)
}

static PLAIN_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid amount pattern"));

/// Price from a price-locator fragment: a currency-prefixed amount, else
/// the first plain amount in the fragment.
fn listing_price(text: &str) -> Option<f64> {
    rules::price(text, TextOrigin::Page).or_else(|| {
        PLAIN_AMOUNT
            .find(text)
            .and_then(|m| m.as_str().replace(',', "").parse().ok())
    })
}

/// Part number from a part-number-locator fragment. A labelled fragment
/// goes through the part-number rules; otherwise the fragment is the part
/// number.
fn listing_part_number(text: &str) -> Option<String> {
    rules::part_number(text, TextOrigin::Page).or_else(|| {
        let raw = text.trim();
        (!raw.is_empty()).then(|| raw.to_owned())
    })
}

fn listing_record(
    item: ElementRef<'_>,
    source_name: &str,
    title: &str,
    selectors: &ListingSelectors,
) -> ExtractedRecord {
    let mut record = ExtractedRecord {
        source_name: Some(source_name.to_string()),
        price: text_of(item, &selectors.price).and_then(|t| listing_price(&t)),
        part_number: text_of(item, &selectors.part_number)
            .and_then(|t| listing_part_number(&t)),
        ..ExtractedRecord::default()
    };

    if let Some(vehicle) = rules::vehicle(title, TextOrigin::Page) {
        record.vehicle_make = Some(vehicle.make);
        record.vehicle_model = vehicle.model;
    }

    if let Some(specs) = text_of(item, &selectors.specs) {
        if let Some(dims) = rules::dimensions(&specs, TextOrigin::Page) {
            record.width = dims.value.width;
            record.height = dims.value.height;
            record.depth = dims.value.depth;
        }
        record.color = rules::color(&specs, TextOrigin::Page);
    }

    if let Some(weight) = text_of(item, &selectors.weight)
        .and_then(|t| rules::weight(&t, TextOrigin::Page))
    {
        record.weight = Some(weight.value);
        record.weight_unit = Some(weight.unit);
    }

    record
}

struct ListingSelectors {
    title: Selector,
    price: Selector,
    part_number: Selector,
    specs: Selector,
    weight: Selector,
}

/// First `limit` items of a listing-layout source's result page.
///
/// # Errors
///
/// Returns [`RenderError::InvalidLocator`] when one of the source's
/// locators is not valid CSS, or [`RenderError::Command`] when the source
/// does not use the listing layout.
pub fn listing_items(
    html: &str,
    source: &SourceDefinition,
    limit: usize,
) -> Result<Vec<ListingItem>, RenderError> {
    let SourceLayout::Listing {
        title_locator,
        price_locator,
        part_number_locator,
        specs_locator,
        weight_locator,
    } = &source.layout
    else {
        return Err(RenderError::Command(format!(
            "source '{}' does not use the listing layout",
            source.name
        )));
    };

    let item_sel = parse_locator(&source.item_locator)?;
    let selectors = ListingSelectors {
        title: parse_locator(title_locator)?,
        price: parse_locator(price_locator)?,
        part_number: parse_locator(part_number_locator)?,
        specs: parse_locator(specs_locator)?,
        weight: parse_locator(weight_locator)?,
    };

    let document = Html::parse_document(html);
    let items = document
        .select(&item_sel)
        .take(limit)
        .map(|item| {
            let title =
                text_of(item, &selectors.title).unwrap_or_else(|| NO_TITLE.to_string());
            let record = listing_record(item, &source.name, &title, &selectors);
            ListingItem { title, record }
        })
        .collect();
    Ok(items)
}

/// First `limit` items of a detail-page source, with links resolved
/// against `page_url`.
///
/// # Errors
///
/// Returns [`RenderError::InvalidLocator`] for unparsable locators, or
/// [`RenderError::Command`] when the source does not use the detail-page
/// layout.
pub fn detail_links(
    html: &str,
    page_url: &str,
    source: &SourceDefinition,
    limit: usize,
) -> Result<Vec<DetailLink>, RenderError> {
    let SourceLayout::DetailPage {
        title_locator,
        link_locator,
    } = &source.layout
    else {
        return Err(RenderError::Command(format!(
            "source '{}' does not use the detail_page layout",
            source.name
        )));
    };

    let item_sel = parse_locator(&source.item_locator)?;
    let title_sel = parse_locator(title_locator)?;
    let link_sel = parse_locator(link_locator)?;
    let base = reqwest::Url::parse(page_url).ok();

    let document = Html::parse_document(html);
    let links = document
        .select(&item_sel)
        .take(limit)
        .map(|item| {
            let href = item
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"));
            let url = href.and_then(|href| match &base {
                Some(base) => base.join(href).ok().map(String::from),
                None => reqwest::Url::parse(href).ok().map(String::from),
            });
            DetailLink {
                title: text_of(item, &title_sel),
                url: url.filter(|u| u.starts_with("http")),
            }
        })
        .collect();
    Ok(links)
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
