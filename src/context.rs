//! Per-page template context.
//!
//! Every page gets its own freshly built [`TemplateContext`]. The top-level
//! `site` and `page` maps belong to that one context, so a page's render
//! step can insert or replace keys without affecting the next page.
//!
//! ```text
//! site.title        site_title from config
//! site.datetime     build timestamp
//! site.tags         tag → [page]
//! site.pages        [page], every page in the arena at this moment
//! site.categories   top-level category → [page]
//! site.tree         [page], forest roots with nested subpages
//! site.<key>        every non-reserved config key
//! site.authors      parsed authors
//! site.author       raw `author` config value
//! page              the page being rendered
//! pagination        only on paginated pages
//! ```
//!
//! The values inside are immutable `minijinja` values. Each page is
//! serialized once into [`PageValues`] and shared by every list that
//! mentions it, in this context and the next. Rendering a page changes its
//! `content`, so the worklist invalidates that page (and every page that
//! embeds it as a subpage) right after each render.
//!
//! Because the page arena grows while rendering, `site.pages` seen by a later
//! page includes continuation pages spawned by earlier ones.

use crate::config::{RESERVED_KEYS, SiteConfig};
use crate::page::{Page, PageId};
use crate::pagination::PaginationContext;
use crate::tags::TagIndex;
use crate::tree::CategoryTree;
use minijinja::Value;
use minijinja::value::ValueKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// Data bundle handed to templates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateContext {
    pub site: BTreeMap<String, Value>,
    pub page: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationContext>,
}

impl TemplateContext {
    /// Record the converted body as `page.content`.
    pub fn set_page_content(&mut self, content: &str) {
        self.page.insert("content".to_string(), Value::from(content));
    }

    /// Resolve a dotted path such as `site.tags.rust` or `page.subpages.0`.
    pub fn lookup(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let root = match segments.next()? {
            "site" => &self.site,
            "page" => &self.page,
            _ => return None,
        };
        let mut current = root.get(segments.next()?)?.clone();
        for segment in segments {
            current = match current.kind() {
                ValueKind::Map => current.get_attr(segment).ok()?,
                ValueKind::Seq => current.get_item_by_index(segment.parse().ok()?).ok()?,
                _ => return None,
            };
            if current.is_undefined() {
                return None;
            }
        }
        Some(current)
    }
}

/// Serialized pages, reused across contexts until a page changes.
#[derive(Debug, Default)]
pub struct PageValues {
    values: Vec<Option<Value>>,
    /// Pages whose cached value embeds this one as a subpage.
    embedded_in: Vec<Vec<PageId>>,
    builds: usize,
}

impl PageValues {
    /// The value for `id`, serializing it and its subpages on first use.
    pub fn get(&mut self, pages: &[Page], id: PageId) -> Option<Value> {
        if id.0 >= pages.len() {
            return None;
        }
        if self.values.len() < pages.len() {
            self.values.resize(pages.len(), None);
            self.embedded_in.resize(pages.len(), Vec::new());
        }
        if let Some(value) = &self.values[id.0] {
            return Some(value.clone());
        }
        let value = Value::from(self.page_map(pages, id));
        self.values[id.0] = Some(value.clone());
        self.builds += 1;
        Some(value)
    }

    /// Drop the cached value of `id` and of every page embedding it.
    pub fn invalidate(&mut self, id: PageId) {
        match self.values.get_mut(id.0) {
            Some(slot) if slot.is_some() => *slot = None,
            _ => return,
        }
        for parent in std::mem::take(&mut self.embedded_in[id.0]) {
            self.invalidate(parent);
        }
    }

    /// Number of page serializations so far.
    pub fn builds(&self) -> usize {
        self.builds
    }

    fn list(&mut self, pages: &[Page], ids: &[PageId]) -> Value {
        Value::from(
            ids.iter()
                .filter_map(|&id| self.get(pages, id))
                .collect::<Vec<_>>(),
        )
    }

    /// One page's fields, with subpages resolved through the cache.
    ///
    /// Free-form front-matter keys go in first so the built-in fields win on
    /// a name clash.
    fn page_map(&mut self, pages: &[Page], id: PageId) -> BTreeMap<String, Value> {
        let page = &pages[id.0];
        let meta = &page.meta;

        let mut map: BTreeMap<String, Value> = meta
            .extra
            .iter()
            .map(|(key, value)| (key.clone(), Value::from_serialize(value)))
            .collect();
        map.insert("title".to_string(), Value::from(meta.title.as_str()));
        map.insert("slug".to_string(), Value::from(meta.slug.as_str()));
        map.insert("category".to_string(), Value::from(meta.category.clone()));
        map.insert(
            "tags".to_string(),
            Value::from(meta.tags.iter().cloned().collect::<Vec<_>>()),
        );
        map.insert("published".to_string(), Value::from(meta.published));
        map.insert(
            "datetime".to_string(),
            optional(
                meta.datetime
                    .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            ),
        );
        map.insert("author".to_string(), Value::from_serialize(&meta.author));
        map.insert("type".to_string(), Value::from(meta.kind.as_str()));
        map.insert("template".to_string(), Value::from(meta.template.as_str()));
        map.insert("url".to_string(), Value::from(meta.url.as_str()));
        map.insert("content".to_string(), optional(meta.content.clone()));
        map.insert("page_number".to_string(), Value::from_serialize(page.page_number));
        map.insert(
            "source".to_string(),
            Value::from(page.path.to_string_lossy().into_owned()),
        );

        for &child in &meta.subpages {
            if let Some(parents) = self.embedded_in.get_mut(child.0)
                && !parents.contains(&id)
            {
                parents.push(id);
            }
        }
        map.insert("subpages".to_string(), self.list(pages, &meta.subpages));
        map
    }
}

/// Build the context for `current`.
pub fn build(
    pages: &[Page],
    tree: &CategoryTree,
    tags: &TagIndex,
    config: &SiteConfig,
    values: &mut PageValues,
    current: PageId,
) -> TemplateContext {
    let mut site = BTreeMap::new();
    site.insert("title".to_string(), Value::from(config.site_title.as_str()));
    site.insert(
        "datetime".to_string(),
        Value::from(chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%:z").to_string()),
    );
    let by_tag: BTreeMap<String, Value> = tags
        .tags
        .iter()
        .map(|(tag, ids)| (tag.clone(), values.list(pages, ids)))
        .collect();
    site.insert("tags".to_string(), Value::from(by_tag));
    let all: Vec<PageId> = (0..pages.len()).map(PageId).collect();
    site.insert("pages".to_string(), values.list(pages, &all));
    let by_category: BTreeMap<String, Value> = tree
        .categories
        .iter()
        .map(|(cat, ids)| (cat.clone(), values.list(pages, ids)))
        .collect();
    site.insert("categories".to_string(), Value::from(by_category));
    site.insert("tree".to_string(), values.list(pages, &tree.roots));

    merge_config(&mut site, config);

    // Built fresh: the render step adds `content` to this map.
    let page = if current.0 < pages.len() {
        values.page_map(pages, current)
    } else {
        BTreeMap::new()
    };

    TemplateContext {
        site,
        page,
        pagination: None,
    }
}

/// Copy every non-reserved config key into `site`, then bind authors.
fn merge_config(site: &mut BTreeMap<String, Value>, config: &SiteConfig) {
    for (key, value) in &config.extra {
        if !RESERVED_KEYS.contains(&key.as_str()) {
            site.insert(key.clone(), toml_value(value));
        }
    }

    let authors = config.authors();
    if !authors.is_empty() {
        site.insert("authors".to_string(), Value::from_serialize(&authors));
    }
    if let Some(author) = &config.author {
        site.insert("author".to_string(), Value::from(author.as_str()));
    }
}

/// `none` in templates when absent.
fn optional(value: Option<String>) -> Value {
    value.map(Value::from).unwrap_or_else(|| Value::from(()))
}

/// Convert a config value. Datetimes become their TOML text form.
fn toml_value(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::from(s.as_str()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => Value::from(*f),
        toml::Value::Boolean(b) => Value::from(*b),
        toml::Value::Datetime(dt) => Value::from(dt.to_string()),
        toml::Value::Array(items) => Value::from(items.iter().map(toml_value).collect::<Vec<_>>()),
        toml::Value::Table(table) => Value::from(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_value(v)))
                .collect::<BTreeMap<_, _>>(),
        ),
    }
}
