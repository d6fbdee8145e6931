//! Category forest construction.
//!
//! Pages form a pseudo-tree: every page is a node, a page's `category` path
//! names the chain of ancestor slugs, and children hang off their parent's
//! `subpages`. There is no single root; every page with an empty category is
//! a root of its own.
//!
//! ```text
//! index.md            category []            → root
//! blog.md             category []            → root, slug "blog"
//! blog/post1.md       category [blog]        → child of blog
//! blog/rust/intro.md  category [blog, rust]  → orphan unless a page with
//!                                              slug "rust" sits under blog
//! ```
//!
//! Insertion walks pages in ascending category depth so that every
//! potential parent is already in the forest when its children arrive. A
//! page whose path cannot be resolved is an orphan: it is reported and left
//! out of the forest, but stays in the flat page list and the per-category
//! listing.

use crate::page::{Page, PageId};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The category forest plus the flat per-top-level-category listing.
#[derive(Debug, Default)]
pub struct CategoryTree {
    /// Top-level pages in insertion order.
    pub roots: Vec<PageId>,
    /// Top-level category slug → every page under it, in insertion order.
    /// Orphans are included.
    pub categories: BTreeMap<String, Vec<PageId>>,
    /// Source paths of pages that could not be placed.
    pub orphans: Vec<PathBuf>,
}

/// Sort `pages` by category depth and build the forest over them.
///
/// The sort is stable, so pages of equal depth keep their load order. The
/// returned ids index into `pages` as it is left by this call.
pub fn build(pages: &mut [Page]) -> CategoryTree {
    pages.sort_by_key(|p| p.meta.category.len());

    let mut tree = CategoryTree::default();
    for idx in 0..pages.len() {
        let id = PageId(idx);
        if let Some(top) = pages[idx].meta.category.first() {
            tree.categories.entry(top.clone()).or_default().push(id);
        }
        match find_parent(pages, &tree.roots, &pages[idx].meta.category) {
            Ok(Parent::Root) => {
                warn_duplicate_slug(pages, &tree.roots, id);
                tree.roots.push(id);
            }
            Ok(Parent::Page(parent)) => {
                warn_duplicate_slug(pages, &pages[parent.0].meta.subpages, id);
                pages[parent.0].meta.subpages.push(id);
            }
            Err(missing) => {
                let page = &pages[idx];
                tracing::error!(
                    path = %page.path.display(),
                    category = %page.meta.category.join("/"),
                    missing = %missing,
                    "Page is an orphan: no parent page for its category"
                );
                tree.orphans.push(page.path.clone());
            }
        }
    }
    tracing::debug!(
        roots = tree.roots.len(),
        categories = tree.categories.len(),
        orphans = tree.orphans.len(),
        "Category tree built"
    );
    tree
}

enum Parent {
    Root,
    Page(PageId),
}

/// Resolve a category path to the node new pages attach to.
///
/// Returns the first unmatched slug on failure.
fn find_parent(pages: &[Page], roots: &[PageId], category: &[String]) -> Result<Parent, String> {
    let mut parent = Parent::Root;
    let mut siblings = roots;
    for slug in category {
        let found = siblings
            .iter()
            .copied()
            .find(|id| pages[id.0].meta.slug == *slug)
            .ok_or_else(|| slug.clone())?;
        parent = Parent::Page(found);
        siblings = &pages[found.0].meta.subpages;
    }
    Ok(parent)
}

fn warn_duplicate_slug(pages: &[Page], siblings: &[PageId], id: PageId) {
    let slug = &pages[id.0].meta.slug;
    if let Some(existing) = siblings.iter().find(|s| pages[s.0].meta.slug == *slug) {
        tracing::warn!(
            path = %pages[id.0].path.display(),
            shadowed_by = %pages[existing.0].path.display(),
            slug = %slug,
            "Duplicate slug among siblings; lookups resolve to the first"
        );
    }
}
