//! Tag index: tag → pages carrying it.

use crate::page::{Page, PageId};
use std::collections::{BTreeMap, BTreeSet};

/// Every tag in the site, each with its pages in flat-collection order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TagIndex {
    pub tags: BTreeMap<String, Vec<PageId>>,
}

impl TagIndex {
    /// Build the index from scratch.
    pub fn build(pages: &[Page]) -> Self {
        let all: BTreeSet<&str> = pages
            .iter()
            .flat_map(|p| p.meta.tags.iter().map(String::as_str))
            .collect();

        let tags = all
            .into_iter()
            .map(|tag| {
                let carriers = pages
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.meta.tags.contains(tag))
                    .map(|(idx, _)| PageId(idx))
                    .collect();
                (tag.to_string(), carriers)
            })
            .collect();
        Self { tags }
    }

    pub fn get(&self, tag: &str) -> &[PageId] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
