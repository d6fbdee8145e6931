//! # Quire
//!
//! A static site generator for hand-written sites. Pages are plain files
//! with optional YAML front matter; the directory a page lives in is its
//! category, and categories nest under the page whose slug they name.
//!
//! # Architecture: One Pass, Five Phases
//!
//! Every build is a full rebuild from scratch:
//!
//! ```text
//! 1. Stage   output/ cleared, media/ copied in
//! 2. Load    content/ → Vec<Page>            (front matter, renderer, URL)
//! 3. Tree    pages → category forest         (orphans reported)
//! 4. Tags    pages → tag index
//! 5. Render  worklist over the page arena    (pagination appends pages)
//! ```
//!
//! The phases share one `Vec<Page>` arena. The category forest, the
//! per-category listings and the tag index all hold [`page::PageId`]s into
//! it, so a page reached through any of them is the same record. The render
//! phase walks the arena with a cursor and appends the continuation pages
//! produced by paginated pages, which are then rendered in the same pass.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Runs the phases in order, fires hooks, produces the build report |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation, authors |
//! | [`load`] | Walks the content directory and builds published pages |
//! | [`page`] | The page record: front matter, URL building, render and write steps |
//! | [`renderers`] | Markdown, HTML, plain-text and raw renderers behind one trait |
//! | [`tree`] | Depth-sorted category forest with orphan detection |
//! | [`tags`] | Tag → pages index |
//! | [`context`] | Fresh per-page template context |
//! | [`pagination`] | Slicing context lists into numbered pages |
//! | [`templates`] | minijinja templates with a built-in maud fallback layout |
//! | [`worklist`] | The self-extending render loop |
//! | [`stage`] | Output directory reset and media copy |
//! | [`hooks`] | Closures run at `site.start`, `site.content.gathered`, `page.rendered`, `site.done` |
//! | [`serve`] | Blocking preview server over the output directory |
//! | [`output`] | CLI formatting of build and check reports |
//! | [`slug`] | Slug and title derivation |
//!
//! # Design Decisions
//!
//! ## An Arena Instead of Shared Pointers
//!
//! Pages are referenced from several places at once: the flat list, the
//! forest, the category listings, the tag index. Indices into a single
//! `Vec<Page>` give that aliasing without `Rc<RefCell<_>>`; mutation happens
//! in exactly two places (the tree adding subpages, the worklist rendering),
//! both of which hold the arena mutably.
//!
//! ## Snapshots for Template Contexts
//!
//! Each page's context is assembled right before it renders, from page
//! values serialized once and shared by reference. A render step can insert
//! or replace keys in its own context; the next page never sees it. A page's
//! shared value is rebuilt only after that page renders.
//!
//! ## Orphans Are Reported, Not Fatal
//!
//! A page whose category path names a missing parent is logged as an error
//! and left out of the forest, but it is still rendered, listed under its
//! category, and indexed by tag. `quire check` exits non-zero when any exist.

pub mod config;
pub mod context;
pub mod engine;
pub mod hooks;
pub mod load;
pub mod output;
pub mod page;
pub mod pagination;
pub mod renderers;
pub mod serve;
pub mod slug;
pub mod stage;
pub mod tags;
pub mod templates;
pub mod tree;
pub mod worklist;

#[cfg(test)]
pub(crate) mod test_helpers;
