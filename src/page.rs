//! The page record every pipeline phase operates on.
//!
//! A [`Page`] is created from one source file. Its [`PageMeta`] comes from
//! an optional YAML front-matter block:
//!
//! ```text
//! ---
//! title: Summer Notes
//! category: blog/travel
//! tags: [sea, sun]
//! pagination:
//!   list: site.tags.sea
//!   limit: 5
//! ---
//! Body goes here.
//! ```
//!
//! Pages live in a single `Vec<Page>` arena for the whole build. The category
//! tree, the per-category listings and the tag index all refer to pages by
//! [`PageId`], so a change made through one path (for example a page gaining
//! subpages) is visible through every other.

use crate::config::{Author, SiteConfig};
use crate::context::TemplateContext;
use crate::pagination;
use crate::renderers::Renderer;
use crate::slug;
use crate::templates::{TemplateError, Templates};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("{path}: URL {url} would leave the output directory")]
    UnsafeUrl { path: PathBuf, url: String },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template error while rendering {path}: {source}")]
    Template {
        path: PathBuf,
        source: TemplateError,
    },
    #[error("pagination error in {path}: {message}")]
    Pagination { path: PathBuf, message: String },
    #[error("page {0} was written before it was rendered")]
    NotRendered(PathBuf),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Stable index of a page in the build's page arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub usize);

/// Pagination request from front matter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pagination {
    /// Dotted path into the template context, e.g. `site.tags.rust`.
    pub list: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

/// Page metadata exposed to templates as `page`.
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub title: String,
    pub slug: String,
    /// Category slugs, root to leaf. Empty for root-level pages.
    pub category: Vec<String>,
    pub tags: BTreeSet<String>,
    pub published: bool,
    pub datetime: Option<NaiveDateTime>,
    pub author: Option<Author>,
    /// Output type, used for `{type}` and the template file extension.
    pub kind: String,
    pub template: String,
    pub pagination: Option<Pagination>,
    pub url: String,
    /// Converted body. `None` until the render step runs.
    pub content: Option<String>,
    /// Child pages, filled in by the category tree.
    pub subpages: Vec<PageId>,
    /// Front-matter keys without a dedicated field.
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// One content item.
pub struct Page {
    pub path: PathBuf,
    pub meta: PageMeta,
    pub renderer: Arc<dyn Renderer>,
    /// Body with the front matter stripped.
    pub source: String,
    /// 1-based position in a paginated series.
    pub page_number: usize,
    /// True for continuation pages produced by another page's render step.
    pub spawned: bool,
    /// Pagination list length recorded by page 1 of the series.
    series_total: Option<usize>,
    document: Option<String>,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("path", &self.path)
            .field("meta", &self.meta)
            .field("renderer", &self.renderer.name())
            .field("page_number", &self.page_number)
            .field("spawned", &self.spawned)
            .field("rendered", &self.document.is_some())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
    slug: Option<String>,
    category: Option<StringOrList>,
    tags: Option<StringOrList>,
    published: Option<bool>,
    datetime: Option<String>,
    date: Option<String>,
    author: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    template: Option<String>,
    pagination: Option<Pagination>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

impl Page {
    /// Read and parse a source file under `content_root`.
    ///
    /// The default category is the file's directory relative to the
    /// content root.
    pub fn from_file(
        path: &Path,
        content_root: &Path,
        config: &SiteConfig,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, PageError> {
        let text = fs::read_to_string(path).map_err(|source| PageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dir_category = path
            .parent()
            .and_then(|p| p.strip_prefix(content_root).ok())
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        Self::parse(path.to_path_buf(), dir_category, &text, config, renderer)
    }

    /// Build a page from already-read source text.
    pub fn parse(
        path: PathBuf,
        dir_category: Vec<String>,
        text: &str,
        config: &SiteConfig,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, PageError> {
        let (header, body) = split_front_matter(text);
        let fm: FrontMatter = match header {
            Some(yaml) if !yaml.trim().is_empty() => {
                serde_yaml::from_str(yaml).map_err(|source| PageError::FrontMatter {
                    path: path.clone(),
                    source,
                })?
            }
            _ => FrontMatter::default(),
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let title = fm.title.unwrap_or_else(|| slug::title_from_stem(&stem));
        let slug = fm.slug.unwrap_or_else(|| slug::slugify(&title));
        let category = match fm.category {
            Some(StringOrList::One(s)) => split_clean(&s, '/'),
            Some(StringOrList::Many(list)) => list.into_iter().filter(|s| !s.is_empty()).collect(),
            None => dir_category,
        };
        let tags = match fm.tags {
            Some(StringOrList::One(s)) => split_clean(&s, ',').into_iter().collect(),
            Some(StringOrList::Many(list)) => list
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            None => BTreeSet::new(),
        };
        let datetime = fm
            .datetime
            .or(fm.date)
            .and_then(|raw| match parse_datetime(&raw) {
                Some(dt) => Some(dt),
                None => {
                    tracing::warn!(path = %path.display(), value = %raw, "Unrecognized date, ignoring");
                    None
                }
            });
        let author = fm
            .author
            .map(|a| Author::parse(&a))
            .or_else(|| config.authors().into_iter().next());
        let kind = fm.kind.unwrap_or_else(|| "html".to_string());
        let url = build_url(&config.url_pattern, &category, &slug, 1, &kind);
        if !is_safe_url(&url) {
            return Err(PageError::UnsafeUrl { path, url });
        }

        Ok(Self {
            path,
            meta: PageMeta {
                title,
                slug,
                category,
                tags,
                published: fm.published.unwrap_or(true),
                datetime,
                author,
                kind,
                template: fm.template.unwrap_or_else(|| "default".to_string()),
                pagination: fm.pagination,
                url,
                content: None,
                subpages: Vec::new(),
                extra: fm.extra,
            },
            renderer,
            source: body.to_string(),
            page_number: 1,
            spawned: false,
            series_total: None,
            document: None,
        })
    }

    pub fn is_rendered(&self) -> bool {
        self.document.is_some()
    }

    /// Output file path relative to the output root.
    pub fn output_path(&self) -> PathBuf {
        let rel = self.meta.url.trim_start_matches('/');
        if rel.is_empty() || self.meta.url.ends_with('/') {
            Path::new(rel).join("index.html")
        } else {
            PathBuf::from(rel)
        }
    }

    /// Render this page with its template context.
    ///
    /// Returns the pages this render produced, which the caller must render
    /// and write in turn. Only paginated pages produce any: page `k` of `n`
    /// yields page `k + 1`.
    pub fn render(
        &mut self,
        mut ctx: TemplateContext,
        templates: &Templates,
        config: &SiteConfig,
    ) -> Result<Vec<Page>, RenderError> {
        let content = self.renderer.render(&self.source);
        ctx.set_page_content(&content);
        self.meta.content = Some(content);

        let mut spawned = Vec::new();
        if let Some(request) = &self.meta.pagination {
            let slice = pagination::paginate(
                &ctx,
                request,
                self.page_number,
                self.series_total,
                |n| build_url(&config.url_pattern, &self.meta.category, &self.meta.slug, n, &self.meta.kind),
            )
            .map_err(|message| RenderError::Pagination {
                path: self.path.clone(),
                message,
            })?;
            if self.page_number < slice.num_pages {
                spawned.push(self.continuation(config, slice.total_items));
            }
            ctx.pagination = Some(slice);
        }

        let document = templates
            .render(&self.meta.template, &self.meta.kind, &ctx)
            .map_err(|source| RenderError::Template {
                path: self.path.clone(),
                source,
            })?;
        self.document = Some(document);
        Ok(spawned)
    }

    /// Write the rendered document under `output_root`.
    pub fn write(&self, output_root: &Path) -> Result<PathBuf, RenderError> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| RenderError::NotRendered(self.path.clone()))?;
        let target = output_root.join(self.output_path());
        let io_err = |source| RenderError::Io {
            path: target.clone(),
            source,
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&target, document).map_err(io_err)?;
        Ok(target)
    }

    /// The next page of a paginated series.
    ///
    /// Subpage ids are kept so `page.subpages` stays paginable; the copy is
    /// never inserted into the category tree.
    fn continuation(&self, config: &SiteConfig, total: usize) -> Page {
        let number = self.page_number + 1;
        let mut meta = self.meta.clone();
        meta.content = None;
        meta.url = build_url(&config.url_pattern, &meta.category, &meta.slug, number, &meta.kind);
        Page {
            path: self.path.clone(),
            meta,
            renderer: Arc::clone(&self.renderer),
            source: self.source.clone(),
            page_number: number,
            spawned: true,
            series_total: Some(total),
            document: None,
        }
    }
}

/// Expand a URL pattern.
///
/// `{page}` is empty on the first page so the first page keeps the plain
/// URL. Repeated slashes (from an empty category) are collapsed.
pub fn build_url(pattern: &str, category: &[String], slug: &str, page: usize, kind: &str) -> String {
    let page = if page > 1 { page.to_string() } else { String::new() };
    let expanded = pattern
        .replace("{category}", &category.join("/"))
        .replace("{slug}", slug)
        .replace("{page}", &page)
        .replace("{type}", kind);

    let mut url = String::with_capacity(expanded.len() + 1);
    if !expanded.starts_with('/') {
        url.push('/');
    }
    for c in expanded.chars() {
        if c == '/' && url.ends_with('/') {
            continue;
        }
        url.push(c);
    }
    url
}

/// A URL whose path segments stay below the output root.
fn is_safe_url(url: &str) -> bool {
    url.split('/')
        .all(|segment| segment != ".." && segment != "." && !segment.contains('\\'))
}

/// Split a leading `---` delimited block from the body.
fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let Some(rest) = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))
    else {
        return (None, text);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, text)
}

fn split_clean(s: &str, sep: char) -> Vec<String> {
    s.split(sep)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
