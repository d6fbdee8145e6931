//! Shared test utilities for the quire test suite.
//!
//! Provides page builders, lookup helpers, and category-forest assertions
//! that work with the page arena (`Vec<Page>` plus [`CategoryTree`]).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut pages = vec![
//!     page_at("blog.md", &[], "blog"),
//!     page_at("blog/post.md", &["blog"], "post"),
//! ];
//! let tree = tree::build(&mut pages);
//!
//! assert_forest_shape(&pages, &tree, &[("blog", &["post"])]);
//! let blog = find_page(&pages, "blog");
//! assert_eq!(subpage_slugs(&pages, blog), vec!["post"]);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::page::{Page, PageId, build_url};
use crate::renderers::Markdown;
use crate::tree::CategoryTree;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, contents).unwrap();
    path
}

/// Default config with every directory rooted at `root`.
pub fn config_at(root: &Path) -> SiteConfig {
    crate::config::load_config(root).unwrap()
}

// =========================================================================
// Page builders
// =========================================================================

/// A markdown page with an explicit category path and slug and an empty body.
pub fn page_at(path: &str, category: &[&str], slug: &str) -> Page {
    let config = SiteConfig::default();
    let mut page = Page::parse(
        PathBuf::from(path),
        category.iter().map(|c| c.to_string()).collect(),
        "",
        &config,
        Arc::new(Markdown),
    )
    .unwrap();
    page.meta.slug = slug.to_string();
    page.meta.url = build_url(&config.url_pattern, &page.meta.category, slug, 1, &page.meta.kind);
    page
}

/// Replace a page's tags.
pub fn with_tags(mut page: Page, tags: &[&str]) -> Page {
    page.meta.tags = tags.iter().map(|t| t.to_string()).collect();
    page
}

/// A root-level page whose slug is its file stem, carrying `tags`.
pub fn tagged(path: &str, tags: &[&str]) -> Page {
    let stem = Path::new(path)
        .file_stem()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    with_tags(page_at(path, &[], &stem), tags)
}

// =========================================================================
// Arena lookups: panics with a clear message on miss
// =========================================================================

/// Find the first page with `slug`. Panics if not found.
pub fn find_page(pages: &[Page], slug: &str) -> PageId {
    pages
        .iter()
        .position(|p| p.meta.slug == slug)
        .map(PageId)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = pages.iter().map(|p| p.meta.slug.as_str()).collect();
            panic!("page '{slug}' not found. Available: {slugs:?}")
        })
}

/// Slugs of a page's subpages in order.
pub fn subpage_slugs(pages: &[Page], id: PageId) -> Vec<&str> {
    pages[id.0]
        .meta
        .subpages
        .iter()
        .map(|s| pages[s.0].meta.slug.as_str())
        .collect()
}

// =========================================================================
// Forest helpers
// =========================================================================

/// Root slugs in order.
pub fn root_slugs<'a>(pages: &'a [Page], tree: &CategoryTree) -> Vec<&'a str> {
    tree.roots
        .iter()
        .map(|id| pages[id.0].meta.slug.as_str())
        .collect()
}

/// Assert that the top two levels of the forest match an expected shape.
///
/// Each entry is `(slug, children)`. Use `&[]` for leaf nodes.
///
/// ```rust
/// assert_forest_shape(&pages, &tree, &[
///     ("index", &[]),
///     ("blog", &["post1", "post2"]),
/// ]);
/// ```
pub fn assert_forest_shape(pages: &[Page], tree: &CategoryTree, expected: &[(&str, &[&str])]) {
    let actual = root_slugs(pages, tree);
    let expected_slugs: Vec<&str> = expected.iter().map(|(s, _)| *s).collect();
    assert_eq!(actual, expected_slugs, "forest root slugs mismatch");

    for ((slug, children), id) in expected.iter().zip(&tree.roots) {
        assert_eq!(
            subpage_slugs(pages, *id),
            children.to_vec(),
            "subpages of '{slug}' mismatch"
        );
    }
}
