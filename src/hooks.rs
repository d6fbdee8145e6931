//! Build hooks.
//!
//! Library users can register closures at four points of a build:
//!
//! | Point | Runs | Receives |
//! |-------|------|----------|
//! | `site.start` | before the output root is touched | config |
//! | `site.content.gathered` | after loading, before the tree is built | the page list, mutable |
//! | `page.rendered` | after each page renders, before it is written | the page |
//! | `site.done` | after the last page is written | config |
//!
//! Hooks run in registration order. They cannot fail the build.

use crate::config::SiteConfig;
use crate::page::Page;

type SiteHook = Box<dyn Fn(&SiteConfig) + Send + Sync>;
type PagesHook = Box<dyn Fn(&mut Vec<Page>) + Send + Sync>;
type PageHook = Box<dyn Fn(&Page) + Send + Sync>;

/// Names of the hook points, in the order they fire.
pub const HOOK_POINTS: [&str; 4] = [
    "site.start",
    "site.content.gathered",
    "page.rendered",
    "site.done",
];

#[derive(Default)]
pub struct Hooks {
    site_start: Vec<SiteHook>,
    content_gathered: Vec<PagesHook>,
    page_rendered: Vec<PageHook>,
    site_done: Vec<SiteHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_site_start(&mut self, hook: impl Fn(&SiteConfig) + Send + Sync + 'static) -> &mut Self {
        self.site_start.push(Box::new(hook));
        self
    }

    pub fn on_content_gathered(
        &mut self,
        hook: impl Fn(&mut Vec<Page>) + Send + Sync + 'static,
    ) -> &mut Self {
        self.content_gathered.push(Box::new(hook));
        self
    }

    pub fn on_page_rendered(&mut self, hook: impl Fn(&Page) + Send + Sync + 'static) -> &mut Self {
        self.page_rendered.push(Box::new(hook));
        self
    }

    pub fn on_site_done(&mut self, hook: impl Fn(&SiteConfig) + Send + Sync + 'static) -> &mut Self {
        self.site_done.push(Box::new(hook));
        self
    }

    /// Hook points with at least one registered hook.
    pub fn names(&self) -> Vec<&'static str> {
        let counts = [
            self.site_start.len(),
            self.content_gathered.len(),
            self.page_rendered.len(),
            self.site_done.len(),
        ];
        HOOK_POINTS
            .into_iter()
            .zip(counts)
            .filter(|(_, n)| *n > 0)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }

    pub(crate) fn site_start(&self, config: &SiteConfig) {
        self.site_start.iter().for_each(|h| h(config));
    }

    pub(crate) fn content_gathered(&self, pages: &mut Vec<Page>) {
        self.content_gathered.iter().for_each(|h| h(pages));
    }

    pub(crate) fn page_rendered(&self, page: &Page) {
        self.page_rendered.iter().for_each(|h| h(page));
    }

    pub(crate) fn site_done(&self, config: &SiteConfig) {
        self.site_done.iter().for_each(|h| h(config));
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks").field("registered", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn empty_by_default() {
        let hooks = Hooks::new();
        assert!(hooks.is_empty());
        assert!(hooks.names().is_empty());
    }

    #[test]
    fn names_follow_firing_order() {
        let mut hooks = Hooks::new();
        hooks.on_site_done(|_| {}).on_site_start(|_| {});
        assert_eq!(hooks.names(), vec!["site.start", "site.done"]);
    }

    #[test]
    fn hooks_run_in_registration_order() {
        let seen = Arc::new(AtomicUsize::new(0));
        let mut hooks = Hooks::new();
        let first = Arc::clone(&seen);
        hooks.on_page_rendered(move |_| {
            assert_eq!(first.fetch_add(1, Ordering::SeqCst), 0);
        });
        let second = Arc::clone(&seen);
        hooks.on_page_rendered(move |_| {
            assert_eq!(second.fetch_add(1, Ordering::SeqCst), 1);
        });

        hooks.page_rendered(&page_at("a.md", &[], "a"));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn content_gathered_can_edit_pages() {
        let mut hooks = Hooks::new();
        hooks.on_content_gathered(|pages| pages.retain(|p| p.meta.slug != "drop"));

        let mut pages = vec![page_at("a.md", &[], "keep"), page_at("b.md", &[], "drop")];
        hooks.content_gathered(&mut pages);
        assert_eq!(pages.len(), 1);
    }
}
