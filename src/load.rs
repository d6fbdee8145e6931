//! Page discovery.
//!
//! Walks the content root and turns every regular file into a [`Page`]:
//!
//! ```text
//! content/
//! ├── index.md          → Markdown, category []
//! ├── .draft.md         → skipped (hidden)
//! ├── blog.md           → Markdown, category []
//! └── blog/
//!     ├── post.txt      → Plain, category [blog]
//!     └── feed.rst      → no renderer claims it: Raw, with a warning
//! ```
//!
//! Entries are visited sorted by file name so two runs over the same tree
//! produce the same page order. Unpublished pages are dropped here and never
//! reach the tree, the tag index, or the output.

use crate::config::SiteConfig;
use crate::page::{Page, PageError};
use crate::renderers::{RendererRegistry, Selection};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Page(#[from] PageError),
}

/// Load every published page under `config.content_dir`.
///
/// A missing content directory yields no pages.
pub fn load_pages(config: &SiteConfig, registry: &RendererRegistry) -> Result<Vec<Page>, LoadError> {
    let root = &config.content_dir;
    if !root.is_dir() {
        tracing::debug!(dir = %root.display(), "No content directory");
        return Ok(Vec::new());
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        let renderer = match registry.select(path) {
            Selection::Matched(r) => r,
            Selection::Fallback(r) => {
                tracing::warn!(
                    path = %path.display(),
                    renderer = r.name(),
                    "No renderer for file extension, using fallback"
                );
                r
            }
        };

        let page = Page::from_file(path, root, config, renderer)?;
        if page.meta.published {
            tracing::debug!(path = %path.display(), slug = %page.meta.slug, "Loaded page");
            pages.push(page);
        } else {
            tracing::debug!(path = %path.display(), "Skipping unpublished page");
        }
    }
    tracing::info!(count = pages.len(), "Gathered pages");
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn slugs(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.meta.slug.as_str()).collect()
    }

    #[test]
    fn loads_files_in_name_order_with_directory_categories() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/index.md", "# Home");
        write_file(tmp.path(), "content/blog.md", "");
        write_file(tmp.path(), "content/blog/b-post.md", "");
        write_file(tmp.path(), "content/blog/a-post.md", "");
        let config = config_at(tmp.path());

        let pages = load_pages(&config, &RendererRegistry::default()).unwrap();
        // Depth-first: the `blog` directory sorts before `blog.md`
        assert_eq!(slugs(&pages), vec!["a-post", "b-post", "blog", "index"]);
        let post = &pages[find_page(&pages, "a-post").0];
        assert_eq!(post.meta.category, vec!["blog"]);
        assert_eq!(post.renderer.name(), "markdown");
    }

    #[test]
    fn hidden_files_skipped() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/.draft.md", "");
        write_file(tmp.path(), "content/visible.md", "");
        let config = config_at(tmp.path());

        let pages = load_pages(&config, &RendererRegistry::default()).unwrap();
        assert_eq!(slugs(&pages), vec!["visible"]);
    }

    #[test]
    fn unpublished_pages_dropped() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/draft.md", "---\npublished: false\n---\n");
        write_file(tmp.path(), "content/live.md", "");
        let config = config_at(tmp.path());

        let pages = load_pages(&config, &RendererRegistry::default()).unwrap();
        assert_eq!(slugs(&pages), vec!["live"]);
    }

    #[test]
    fn unmatched_extension_uses_fallback_and_is_kept() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/notes.rst", "raw *text*");
        let config = config_at(tmp.path());

        let pages = load_pages(&config, &RendererRegistry::default()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].renderer.name(), "raw");
    }

    #[test]
    fn fixture_site_loads_published_pages() {
        let site = setup_fixtures();
        let config = config_at(site.path());

        let pages = load_pages(&config, &RendererRegistry::default()).unwrap();
        assert_eq!(
            slugs(&pages),
            vec![
                "about",
                "post1-orphan",
                "post-one",
                "post-two",
                "blog",
                "index",
                "notes",
                "tags",
            ]
        );
        let orphan = &pages[1];
        assert_eq!(orphan.meta.category, vec!["blog", "missing"]);
        assert_eq!(orphan.meta.url, "/blog/missing/post1-orphan.html");
    }

    #[test]
    fn missing_content_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let config = config_at(tmp.path());
        assert!(load_pages(&config, &RendererRegistry::default()).unwrap().is_empty());
    }

    #[test]
    fn bad_front_matter_aborts_load() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "content/bad.md", "---\ntags: [oops\n---\n");
        let config = config_at(tmp.path());

        let result = load_pages(&config, &RendererRegistry::default());
        assert!(matches!(result, Err(LoadError::Page(PageError::FrontMatter { .. }))));
    }
}
