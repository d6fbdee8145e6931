//! The self-extending render worklist.
//!
//! The page arena doubles as the worklist. A cursor walks it from the front
//! and re-reads its length on every step, so pages appended by a render are
//! picked up in the same pass:
//!
//! ```text
//! [index, blog, post1, post2]          cursor → blog (paginated, 1 of 3)
//! [index, blog, post1, post2, blog#2]  cursor → … → blog#2 (2 of 3)
//! [index, blog, post1, post2, blog#2, blog#3]
//! ```
//!
//! Every page is rendered and written exactly once. A render or write
//! failure stops the walk; pages already written stay on disk.
//!
//! Serialized pages are shared between contexts through one
//! [`PageValues`] per run. A page's entry is dropped right after it renders,
//! since rendering fills in its `content`.

use crate::config::SiteConfig;
use crate::context::{self, PageValues};
use crate::hooks::Hooks;
use crate::page::{Page, PageId, RenderError};
use crate::tags::TagIndex;
use crate::templates::Templates;
use crate::tree::CategoryTree;
use std::path::PathBuf;

/// A page that made it to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenPage {
    pub title: String,
    pub url: String,
    pub output: PathBuf,
    pub source: PathBuf,
    pub spawned: bool,
}

/// Everything a render needs besides the pages themselves.
pub struct Worklist<'a> {
    pub tree: &'a CategoryTree,
    pub tags: &'a TagIndex,
    pub config: &'a SiteConfig,
    pub templates: &'a Templates,
    pub hooks: &'a Hooks,
}

impl Worklist<'_> {
    /// Render and write every page, including those spawned along the way.
    pub fn run(&self, pages: &mut Vec<Page>) -> Result<Vec<WrittenPage>, RenderError> {
        let mut written = Vec::with_capacity(pages.len());
        let mut values = PageValues::default();
        let mut cursor = 0;
        while cursor < pages.len() {
            let id = PageId(cursor);
            let ctx = context::build(pages, self.tree, self.tags, self.config, &mut values, id);
            let spawned = pages[cursor].render(ctx, self.templates, self.config)?;
            values.invalidate(id);

            let page = &pages[cursor];
            self.hooks.page_rendered(page);
            let output = page.write(&self.config.output_dir)?;
            tracing::debug!(url = %page.meta.url, output = %output.display(), "Wrote page");
            written.push(WrittenPage {
                title: page.meta.title.clone(),
                url: page.meta.url.clone(),
                output,
                source: page.path.clone(),
                spawned: page.spawned,
            });

            if !spawned.is_empty() {
                tracing::debug!(
                    from = %pages[cursor].path.display(),
                    count = spawned.len(),
                    "Queued spawned pages"
                );
                pages.extend(spawned);
            }
            cursor += 1;
        }
        Ok(written)
    }
}
