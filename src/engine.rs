//! Build orchestration.
//!
//! A build runs five phases strictly in sequence:
//!
//! ```text
//! 1. Stage    output root cleared, media copied in
//! 2. Load     content tree → Vec<Page> (published only)
//! 3. Tree     pages sorted by depth, category forest + listings, orphans
//! 4. Tags     tag → pages
//! 5. Render   worklist: context → render → write, spawned pages appended
//! ```
//!
//! Hooks fire around the phases (see [`crate::hooks`]). Every build is a
//! full rebuild; nothing is cached between runs.

use crate::config::{self, ConfigError, SiteConfig};
use crate::hooks::Hooks;
use crate::load::{self, LoadError};
use crate::page::RenderError;
use crate::renderers::RendererRegistry;
use crate::stage::{self, StageError};
use crate::tags::TagIndex;
use crate::templates::Templates;
use crate::tree;
use crate::worklist::{Worklist, WrittenPage};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(
        "not a site: neither {} nor {} exists",
        .content_dir.display(),
        .template_dir.display()
    )]
    NotASite {
        content_dir: PathBuf,
        template_dir: PathBuf,
    },
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
    #[error("Output error: {0}")]
    Stage(#[from] StageError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Outcome of a full build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Pages in the order they were written, spawned pages included.
    pub pages: Vec<WrittenPage>,
    /// Source paths of pages left out of the category forest.
    pub orphans: Vec<PathBuf>,
    pub media_files: usize,
}

/// Outcome of a dry run.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub pages: usize,
    pub roots: usize,
    pub categories: usize,
    pub tags: usize,
    pub orphans: Vec<PathBuf>,
}

pub struct Engine {
    config: SiteConfig,
    renderers: RendererRegistry,
    hooks: Hooks,
}

impl Engine {
    pub fn new(config: SiteConfig) -> Self {
        Self {
            config,
            renderers: RendererRegistry::default(),
            hooks: Hooks::default(),
        }
    }

    /// Engine for the site rooted at `root`, reading its `config.toml`.
    pub fn from_root(root: &Path) -> Result<Self, BuildError> {
        Ok(Self::new(config::load_config(root)?))
    }

    pub fn with_renderers(mut self, renderers: RendererRegistry) -> Self {
        self.renderers = renderers;
        self
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Run a full build into the output directory.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        self.sanity_check()?;
        self.log_hooks();
        self.hooks.site_start(&self.config);

        let media_files = stage::prepare_output(&self.config)?;

        let mut pages = load::load_pages(&self.config, &self.renderers)?;
        self.hooks.content_gathered(&mut pages);

        let tree = tree::build(&mut pages);
        let tags = TagIndex::build(&pages);
        let templates = Templates::load(&self.config.template_dir);

        let written = Worklist {
            tree: &tree,
            tags: &tags,
            config: &self.config,
            templates: &templates,
            hooks: &self.hooks,
        }
        .run(&mut pages)?;

        self.hooks.site_done(&self.config);
        tracing::info!(
            pages = written.len(),
            orphans = tree.orphans.len(),
            output = %self.config.output_dir.display(),
            "Build complete"
        );
        Ok(BuildReport {
            pages: written,
            orphans: tree.orphans,
            media_files,
        })
    }

    /// Load pages and build the tree and tag index without writing anything.
    pub fn check(&self) -> Result<CheckReport, BuildError> {
        self.sanity_check()?;
        let mut pages = load::load_pages(&self.config, &self.renderers)?;
        let tree = tree::build(&mut pages);
        let tags = TagIndex::build(&pages);
        Ok(CheckReport {
            pages: pages.len(),
            roots: tree.roots.len(),
            categories: tree.categories.len(),
            tags: tags.len(),
            orphans: tree.orphans,
        })
    }

    fn sanity_check(&self) -> Result<(), BuildError> {
        let content_dir = &self.config.content_dir;
        let template_dir = &self.config.template_dir;
        if !content_dir.is_dir() && !template_dir.is_dir() {
            tracing::error!(
                content_dir = %content_dir.display(),
                template_dir = %template_dir.display(),
                "This doesn't look like a site: no content or template directory"
            );
            return Err(BuildError::NotASite {
                content_dir: content_dir.clone(),
                template_dir: template_dir.clone(),
            });
        }
        Ok(())
    }

    fn log_hooks(&self) {
        if self.hooks.is_empty() {
            tracing::debug!("No hooks registered");
        } else {
            tracing::info!(hooks = ?self.hooks.names(), "Registered hooks");
        }
    }
}
