//! Page templates.
//!
//! A page renders through `<template>.<type>` from the template directory,
//! `default.html` unless its front matter says otherwise. Templates are
//! Jinja-style and loaded lazily by minijinja's path loader. As in Jinja2,
//! nothing is escaped automatically: `{{ page.content }}` emits the converted
//! HTML as is, and templates apply `|e` to values that need escaping.
//!
//! When the template file does not exist, HTML pages fall back to a small
//! built-in layout generated with [maud](https://maud.lambda.xyz/), and
//! pages of any other type are written as their bare content.

use crate::context::TemplateContext;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use minijinja::{AutoEscape, Environment, ErrorKind, Value, path_loader};
use std::collections::BTreeMap;
use std::path::Path;

pub use minijinja::Error as TemplateError;

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Templates loaded from `dir`. A missing directory means every page
    /// uses the built-in layout.
    pub fn load(dir: &Path) -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        if dir.is_dir() {
            env.set_loader(path_loader(dir));
        } else {
            tracing::debug!(dir = %dir.display(), "No template directory, using built-in layout");
        }
        Self { env }
    }

    /// Only the built-in layout.
    pub fn builtin() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Render `name.kind` with the given context.
    pub fn render(
        &self,
        name: &str,
        kind: &str,
        ctx: &TemplateContext,
    ) -> Result<String, TemplateError> {
        let file = format!("{name}.{kind}");
        match self.env.get_template(&file) {
            Ok(template) => template.render(ctx),
            Err(e) if e.kind() == ErrorKind::TemplateNotFound => {
                tracing::debug!(template = %file, "Template not found, using built-in layout");
                if kind == "html" {
                    Ok(builtin_layout(ctx).into_string())
                } else {
                    Ok(str_field(&ctx.page, "content").to_string())
                }
            }
            Err(e) => Err(e),
        }
    }
}

fn str_field<'a>(map: &'a BTreeMap<String, Value>, key: &str) -> &'a str {
    map.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn attr(item: &Value, key: &str) -> String {
    item.get_attr(key)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

// ============================================================================
// Built-in layout
// ============================================================================

fn builtin_layout(ctx: &TemplateContext) -> Markup {
    let title = str_field(&ctx.page, "title");
    let site_title = str_field(&ctx.site, "title");
    let current_url = str_field(&ctx.page, "url");
    let tree = ctx.site.get("tree").cloned().unwrap_or_default();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title {
                    (title)
                    @if !site_title.is_empty() { " · " (site_title) }
                }
            }
            body {
                header.site-header {
                    a.site-title href="/" { (site_title) }
                    nav.site-nav { (render_nav(&tree, current_url)) }
                }
                main {
                    h1 { (title) }
                    (PreEscaped(str_field(&ctx.page, "content")))
                    @if let Some(p) = &ctx.pagination {
                        nav.pagination {
                            @if let Some(prev) = &p.prev_url {
                                a rel="prev" href=(prev) { "← Newer" }
                            }
                            span.page-count { (p.page) " / " (p.num_pages) }
                            @if let Some(next) = &p.next_url {
                                a rel="next" href=(next) { "Older →" }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Navigation list over the category forest.
fn render_nav(items: &Value, current_url: &str) -> Markup {
    let items: Vec<Value> = items
        .try_iter()
        .map(Iterator::collect)
        .unwrap_or_default();
    html! {
        @if !items.is_empty() {
            ul {
                @for item in &items {
                    @let url = attr(item, "url");
                    @let children = item.get_attr("subpages").unwrap_or_default();
                    li class=[(url == current_url).then_some("current")] {
                        a href=(url) { (attr(item, "title")) }
                        (render_nav(&children, current_url))
                    }
                }
            }
        }
    }
}
