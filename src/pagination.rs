//! Splitting a context list across a series of pages.
//!
//! A page asking for pagination names a list in its template context and a
//! page size. Page `k` of the series shows items `(k-1)*limit .. k*limit`
//! and, while `k` is below the page count, its render step spawns page
//! `k + 1`. The worklist renders that page later in the same run, which
//! spawns the next, and so on until the list is exhausted.
//!
//! The list length is fixed when page 1 renders and carried into every
//! continuation. Lists that grow during the run (`site.pages` gains each
//! continuation) therefore still produce a finite series.

use crate::context::TemplateContext;
use crate::page::Pagination;
use minijinja::Value;
use minijinja::value::ValueKind;
use serde::Serialize;

/// What a paginated template sees as `pagination`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationContext {
    /// 1-based number of this page.
    pub page: usize,
    pub num_pages: usize,
    /// Length of the list as seen by page 1.
    pub total_items: usize,
    pub items: Vec<Value>,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

/// Slice the requested list for page `page`.
///
/// `total` is the length recorded by page 1 of the series, `None` on page 1
/// itself. `url_for` maps a page number to that page's URL.
pub fn paginate(
    ctx: &TemplateContext,
    request: &Pagination,
    page: usize,
    total: Option<usize>,
    url_for: impl Fn(usize) -> String,
) -> Result<PaginationContext, String> {
    if request.limit == 0 {
        return Err("pagination limit must be greater than zero".to_string());
    }
    let list = ctx
        .lookup(&request.list)
        .ok_or_else(|| format!("`{}` names nothing in the template context", request.list))?;
    if list.kind() != ValueKind::Seq {
        return Err(format!("`{}` is not a list", request.list));
    }

    let total_items = total.unwrap_or_else(|| list.len().unwrap_or(0));
    let num_pages = total_items.div_ceil(request.limit).max(1);
    let start = page.saturating_sub(1) * request.limit;
    let end = (start + request.limit).min(total_items);
    let items = list
        .try_iter()
        .map_err(|e| e.to_string())?
        .skip(start)
        .take(end.saturating_sub(start))
        .collect();

    Ok(PaginationContext {
        page,
        num_pages,
        total_items,
        items,
        prev_url: (page > 1).then(|| url_for(page - 1)),
        next_url: (page < num_pages).then(|| url_for(page + 1)),
    })
}
