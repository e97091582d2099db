use partscout_core::SearchResult;

/// Concatenates per-category result lists in the order given.
///
/// No deduplication and no re-ranking: items keep the order in which their
/// category produced them.
#[must_use]
pub fn aggregate(per_category: Vec<Vec<SearchResult>>) -> Vec<SearchResult> {
    per_category.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use partscout_core::{Category, ExtractedRecord};

    use super::*;

    fn result(category: Category, url: &str) -> SearchResult {
        SearchResult {
            category,
            source_url: url.to_string(),
            title: None,
            description: None,
            data: ExtractedRecord::default(),
        }
    }

    #[test]
    fn keeps_category_then_item_order() {
        let merged = aggregate(vec![
            vec![
                result(Category::Specialized, "s1"),
                result(Category::Specialized, "s2"),
            ],
            vec![result(Category::General, "g1")],
        ]);
        let urls: Vec<_> = merged.iter().map(|r| r.source_url.as_str()).collect();
        assert_eq!(urls, vec!["s1", "s2", "g1"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let merged = aggregate(vec![
            vec![result(Category::General, "same")],
            vec![result(Category::General, "same")],
        ]);
        assert_eq!(merged.len(), 2);
    }
}
