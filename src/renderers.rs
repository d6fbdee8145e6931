//! Content renderers and the registry that picks one per source file.
//!
//! A [`Renderer`] turns the body of a source file (front matter already
//! stripped) into an HTML fragment. The fragment is then handed to the page
//! template as `page.content`.
//!
//! | Renderer | Extensions | Output |
//! |----------|------------|--------|
//! | [`Markdown`] | `md`, `mkd`, `markdown` | CommonMark via pulldown-cmark |
//! | [`Html`] | `html`, `htm` | body passed through unchanged |
//! | [`Plain`] | `txt` | escaped, wrapped in `<pre>` |
//! | [`Raw`] | (fallback) | body passed through, no transformation |
//!
//! Selection is a linear first-match scan in registration order, which is
//! the order callers pass to [`RendererRegistry::new`].

use maud::html;
use pulldown_cmark::{Options, Parser, html as md_html};
use std::path::Path;
use std::sync::Arc;

/// A content transformation strategy keyed by file extension.
pub trait Renderer: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Lowercase file extensions this renderer claims.
    fn extensions(&self) -> &[&'static str];

    /// Convert a source body into an HTML fragment.
    fn render(&self, source: &str) -> String;
}

/// CommonMark with tables, footnotes, and strikethrough.
pub struct Markdown;

impl Renderer for Markdown {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn extensions(&self) -> &[&'static str] {
        &["md", "mkd", "markdown"]
    }

    fn render(&self, source: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH;
        let parser = Parser::new_ext(source, options);
        let mut out = String::with_capacity(source.len() * 3 / 2);
        md_html::push_html(&mut out, parser);
        out
    }
}

pub struct Html;

impl Renderer for Html {
    fn name(&self) -> &'static str {
        "html"
    }

    fn extensions(&self) -> &[&'static str] {
        &["html", "htm"]
    }

    fn render(&self, source: &str) -> String {
        source.to_string()
    }
}

/// Plain text, escaped and kept preformatted.
pub struct Plain;

impl Renderer for Plain {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn extensions(&self) -> &[&'static str] {
        &["txt"]
    }

    fn render(&self, source: &str) -> String {
        html! { pre.plain { (source) } }.into_string()
    }
}

/// Fallback for files no registered renderer claims.
pub struct Raw;

impl Renderer for Raw {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn extensions(&self) -> &[&'static str] {
        &[]
    }

    fn render(&self, source: &str) -> String {
        source.to_string()
    }
}

/// Result of looking up a renderer for a path.
pub enum Selection {
    Matched(Arc<dyn Renderer>),
    Fallback(Arc<dyn Renderer>),
}

impl Selection {
    pub fn renderer(self) -> Arc<dyn Renderer> {
        match self {
            Selection::Matched(r) | Selection::Fallback(r) => r,
        }
    }
}

/// Ordered set of renderers plus an explicit fallback.
#[derive(Clone)]
pub struct RendererRegistry {
    renderers: Vec<Arc<dyn Renderer>>,
    fallback: Arc<dyn Renderer>,
}

impl RendererRegistry {
    pub fn new(renderers: Vec<Arc<dyn Renderer>>, fallback: Arc<dyn Renderer>) -> Self {
        Self {
            renderers,
            fallback,
        }
    }

    /// Register another renderer after the existing ones.
    pub fn push(&mut self, renderer: Arc<dyn Renderer>) {
        self.renderers.push(renderer);
    }

    /// Pick the renderer for a file by its extension.
    ///
    /// Files without an extension never match and get the fallback.
    pub fn select(&self, path: &Path) -> Selection {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !ext.is_empty() {
            for renderer in &self.renderers {
                if renderer.extensions().contains(&ext.as_str()) {
                    return Selection::Matched(Arc::clone(renderer));
                }
            }
        }
        Selection::Fallback(Arc::clone(&self.fallback))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.renderers.iter().map(|r| r.name()).collect()
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new(
            vec![Arc::new(Markdown), Arc::new(Html), Arc::new(Plain)],
            Arc::new(Raw),
        )
    }
}
