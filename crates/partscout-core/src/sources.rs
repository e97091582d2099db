//! Registry of specialized search sources.
//!
//! Each entry describes where to search and which structural locators
//! identify listing items on the result page. The registry is built once at
//! startup (either the built-in defaults or a YAML file) and never mutated.

use std::collections::HashSet;
use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Characters left unescaped in query terms, as in form encoding.
const QUERY_TERM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const QUERY_PLACEHOLDER: &str = "{query}";

fn default_specs_locator() -> String {
    "div.dimensions, div.specs".to_string()
}

fn default_weight_locator() -> String {
    "div.weight, div.specs".to_string()
}

/// How a source's result page exposes item data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceLayout {
    /// Listing markup carries title, price and part number directly.
    Listing {
        title_locator: String,
        price_locator: String,
        part_number_locator: String,
        #[serde(default = "default_specs_locator")]
        specs_locator: String,
        #[serde(default = "default_weight_locator")]
        weight_locator: String,
    },
    /// Listing only links to detail pages, which go through the generic
    /// field extractor.
    DetailPage {
        title_locator: String,
        link_locator: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDefinition {
    pub name: String,
    /// Result-page URL with a `{query}` placeholder.
    pub query_url_template: String,
    pub item_locator: String,
    pub layout: SourceLayout,
}

impl SourceDefinition {
    /// Builds the result-page URL for `query`.
    #[must_use]
    pub fn query_url(&self, query: &str) -> String {
        render_query_url(&self.query_url_template, query)
    }

    fn locators(&self) -> Vec<(&'static str, &str)> {
        let mut locators = vec![("item_locator", self.item_locator.as_str())];
        match &self.layout {
            SourceLayout::Listing {
                title_locator,
                price_locator,
                part_number_locator,
                specs_locator,
                weight_locator,
            } => {
                locators.push(("title_locator", title_locator.as_str()));
                locators.push(("price_locator", price_locator.as_str()));
                locators.push(("part_number_locator", part_number_locator.as_str()));
                locators.push(("specs_locator", specs_locator.as_str()));
                locators.push(("weight_locator", weight_locator.as_str()));
            }
            SourceLayout::DetailPage {
                title_locator,
                link_locator,
            } => {
                locators.push(("title_locator", title_locator.as_str()));
                locators.push(("link_locator", link_locator.as_str()));
            }
        }
        locators
    }
}

/// Substitutes the `{query}` placeholder with the form-encoded query,
/// words joined by `+`.
#[must_use]
pub fn render_query_url(template: &str, query: &str) -> String {
    let encoded = query
        .split_whitespace()
        .map(|term| utf8_percent_encode(term, QUERY_TERM).to_string())
        .collect::<Vec<_>>()
        .join("+");
    template.replace(QUERY_PLACEHOLDER, &encoded)
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    sources: Vec<SourceDefinition>,
}

/// Immutable, ordered collection of specialized sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRegistry {
    sources: Vec<SourceDefinition>,
}

impl SourceRegistry {
    /// Builds a registry after validating names, templates and locators.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] on empty or duplicate names, a
    /// template without `{query}`, or an empty locator.
    pub fn new(sources: Vec<SourceDefinition>) -> Result<Self, ConfigError> {
        validate_sources(&sources)?;
        Ok(Self { sources })
    }

    /// The auto-parts sites searched when no sources file is configured.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            sources: vec![
                SourceDefinition {
                    name: "RockAuto".to_string(),
                    query_url_template: "https://www.rockauto.com/en/search/?query={query}"
                        .to_string(),
                    item_locator: "tbody.listing-inner".to_string(),
                    layout: SourceLayout::Listing {
                        title_locator: "span.ra-description".to_string(),
                        price_locator: "span.ra-formatted-amount".to_string(),
                        part_number_locator: "span.ra-part-number".to_string(),
                        specs_locator: default_specs_locator(),
                        weight_locator: default_weight_locator(),
                    },
                },
                SourceDefinition {
                    name: "AutoZone".to_string(),
                    query_url_template: "https://www.autozone.com/search?searchText={query}"
                        .to_string(),
                    item_locator: "div.product-card".to_string(),
                    layout: SourceLayout::Listing {
                        title_locator: "h2.product-name".to_string(),
                        price_locator: "span.price".to_string(),
                        part_number_locator: "div.product-details".to_string(),
                        specs_locator: default_specs_locator(),
                        weight_locator: default_weight_locator(),
                    },
                },
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDefinition> {
        self.sources.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Looks a source up by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SourceDefinition> {
        self.sources
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

impl<'a> IntoIterator for &'a SourceRegistry {
    type Item = &'a SourceDefinition;
    type IntoIter = std::slice::Iter<'a, SourceDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}

/// Load the source registry: the YAML file at `path` when given, the
/// built-in defaults otherwise.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: Option<&Path>) -> Result<SourceRegistry, ConfigError> {
    let Some(path) = path else {
        return Ok(SourceRegistry::builtin());
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sources(&content)
}

fn parse_sources(content: &str) -> Result<SourceRegistry, ConfigError> {
    let file: SourcesFile = serde_yaml::from_str(content)?;
    SourceRegistry::new(file.sources)
}

fn validate_sources(sources: &[SourceDefinition]) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for source in sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(source.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }

        if !source.query_url_template.contains(QUERY_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "source '{}' query_url_template must contain {QUERY_PLACEHOLDER}",
                source.name
            )));
        }

        if let Some((field, _)) = source
            .locators()
            .into_iter()
            .find(|(_, locator)| locator.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "source '{}' has an empty {field}",
                source.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
