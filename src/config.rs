//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table, the user's file is merged over them key by key,
//! and the result is deserialized into a [`SiteConfig`] that every pipeline
//! phase then reads by reference.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── config.toml      # Site config (optional)
//! ├── content/         # Pages
//! ├── templates/       # Jinja-style templates
//! └── media/           # Copied verbatim into the output root
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! content_dir  = "content"
//! template_dir = "templates"
//! output_dir   = "output"
//! media_dir    = "media"
//! site_title   = "Untitled Site"
//! url_pattern  = "/{category}/{slug}{page}.{type}"
//!
//! # Optional. A single author, a comma separated string, or a list.
//! author  = "Jane Doe <jane@example.com>"
//! authors = ["Jane Doe <jane@example.com>", "John Roe"]
//!
//! # Any other key is free-form and shows up as `site.<key>` in templates.
//! tagline = "Notes from the workshop"
//! ```
//!
//! Unlike most settings structs, unknown keys are *accepted*: they are how
//! users pass arbitrary data to their templates.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Config keys that describe the build itself and are never surfaced
/// generically into template contexts.
pub const RESERVED_KEYS: &[&str] = &[
    "site_title",
    "output_dir",
    "content_dir",
    "template_dir",
    "media_dir",
    "url_pattern",
];

/// Site configuration loaded from `config.toml`.
///
/// All recognized fields have defaults. Keys the struct does not know about
/// are collected into [`SiteConfig::extra`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Root of the content tree that pages are loaded from.
    pub content_dir: PathBuf,
    /// Directory the template loader reads from.
    pub template_dir: PathBuf,
    /// Output root. Removed and recreated on every build.
    pub output_dir: PathBuf,
    /// Static files copied into the output root before rendering.
    pub media_dir: PathBuf,
    /// Site title, exposed as `site.title`.
    pub site_title: String,
    /// Pattern every page URL is built from. See [`crate::page::build_url`].
    pub url_pattern: String,
    /// Raw `author` value, bound as `site.author` in templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Raw `authors` value. Use [`SiteConfig::authors`] for the parsed list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<AuthorList>,
    /// Free-form keys.
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            template_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("output"),
            media_dir: PathBuf::from("media"),
            site_title: "Untitled Site".to_string(),
            url_pattern: "/{category}/{slug}{page}.{type}".to_string(),
            author: None,
            authors: None,
            extra: toml::Table::new(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.url_pattern.contains("{slug}") {
            return Err(ConfigError::Validation(
                "url_pattern must contain {slug}".into(),
            ));
        }
        for (key, dir) in [
            ("content_dir", &self.content_dir),
            ("template_dir", &self.template_dir),
            ("output_dir", &self.output_dir),
            ("media_dir", &self.media_dir),
        ] {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }

    /// Parsed site authors.
    ///
    /// `authors` wins over `author`. A plain string is split on commas; a
    /// list is taken entry by entry.
    pub fn authors(&self) -> Vec<Author> {
        let specs: Vec<&str> = match (&self.authors, &self.author) {
            (Some(AuthorList::Many(list)), _) => list.iter().map(String::as_str).collect(),
            (Some(AuthorList::One(s)), _) | (None, Some(s)) => s.split(',').collect(),
            (None, None) => Vec::new(),
        };
        specs
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Author::parse)
            .collect()
    }

    /// Resolve the relative directory options against the site root.
    fn rooted(mut self, root: &Path) -> Self {
        for dir in [
            &mut self.content_dir,
            &mut self.template_dir,
            &mut self.output_dir,
            &mut self.media_dir,
        ] {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }
        self
    }
}

/// The two accepted shapes of the `authors` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorList {
    One(String),
    Many(Vec<String>),
}

/// A structured author identity parsed from `Name <email>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Author {
    /// Parse `Name <email>` or a bare name.
    ///
    /// - `"Jane Doe <jane@example.com>"` → name + email
    /// - `"Jane Doe"` → name only
    /// - `"<jane@example.com>"` → empty name + email
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(open) = raw.find('<')
            && let Some(close) = raw[open..].find('>')
        {
            let email = raw[open + 1..open + close].trim();
            return Self {
                name: raw[..open].trim().to_string(),
                email: (!email.is_empty()).then(|| email.to_string()),
            };
        }
        Self {
            name: raw.to_string(),
            email: None,
        }
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.email {
            Some(email) => write!(f, "{} <{}>", self.name, email),
            None => write!(f, "{}", self.name),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the site config rooted at `root`.
///
/// Merges `root/config.toml` over stock defaults, validates, and resolves
/// the directory options relative to `root`.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    Ok(resolve_config(base, overlay)?.rooted(root))
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Quire Configuration
# ===================
# All settings are optional. Values shown below are the defaults.
# Relative directories are resolved against the directory holding this file.

# Where pages are read from.
content_dir = "content"

# Where `<template>.<type>` files are looked up.
template_dir = "templates"

# Removed and recreated on every build.
output_dir = "output"

# Copied into the output root before rendering. Optional.
media_dir = "media"

# Exposed to templates as `site.title`.
site_title = "Untitled Site"

# Every page URL is built from this pattern.
#   {category}  category path joined with "/"
#   {slug}      page slug (required)
#   {page}      empty on the first page, the page number on continuations
#   {type}      output type, "html" unless the page says otherwise
url_pattern = "/{category}/{slug}{page}.{type}"

# ---------------------------------------------------------------------------
# Authors
# ---------------------------------------------------------------------------
# author = "Jane Doe <jane@example.com>"
# authors = ["Jane Doe <jane@example.com>", "John Roe"]

# ---------------------------------------------------------------------------
# Anything else
# ---------------------------------------------------------------------------
# Unknown keys are passed through to templates as `site.<key>`.
# tagline = "Notes from the workshop"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert_eq!(config.template_dir, PathBuf::from("templates"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.media_dir, PathBuf::from("media"));
        assert_eq!(config.url_pattern, "/{category}/{slug}{page}.{type}");
        assert!(config.extra.is_empty());
    }

    #[test]
    fn parse_partial_config() {
        let config: SiteConfig = toml::from_str(r#"site_title = "Field Notes""#).unwrap();
        assert_eq!(config.site_title, "Field Notes");
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn unknown_keys_collected_as_extra() {
        let config: SiteConfig = toml::from_str(
            r#"
tagline = "hello"
[social]
mastodon = "@me"
"#,
        )
        .unwrap();
        assert_eq!(config.extra["tagline"].as_str(), Some("hello"));
        assert_eq!(config.extra["social"]["mastodon"].as_str(), Some("@me"));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site_title, "Untitled Site");
        assert_eq!(config.content_dir, tmp.path().join("content"));
        assert_eq!(config.output_dir, tmp.path().join("output"));
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
site_title = "Workshop"
output_dir = "public"
tagline = "things I made"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site_title, "Workshop");
        assert_eq!(config.output_dir, tmp.path().join("public"));
        assert_eq!(config.extra["tagline"].as_str(), Some("things I made"));
    }

    #[test]
    fn load_config_keeps_absolute_dirs() {
        let tmp = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            format!("media_dir = {:?}\n", elsewhere.path().to_str().unwrap()),
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.media_dir, elsewhere.path());
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn url_pattern_without_slug_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"url_pattern = "/{category}/index.html""#,
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn empty_output_dir_rejected() {
        let config = SiteConfig {
            output_dir: PathBuf::new(),
            ..SiteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Authors
    // =========================================================================

    #[test]
    fn author_parse_name_and_email() {
        let a = Author::parse("Jane Doe <jane@example.com>");
        assert_eq!(a.name, "Jane Doe");
        assert_eq!(a.email.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn author_parse_name_only() {
        let a = Author::parse("  John Roe ");
        assert_eq!(a.name, "John Roe");
        assert_eq!(a.email, None);
    }

    #[test]
    fn author_display_round_trips_spec() {
        let a = Author::parse("Jane Doe <jane@example.com>");
        assert_eq!(a.to_string(), "Jane Doe <jane@example.com>");
    }

    #[test]
    fn authors_from_comma_separated_author() {
        let config: SiteConfig =
            toml::from_str(r#"author = "Jane <j@x.org>, John""#).unwrap();
        let authors = config.authors();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].email.as_deref(), Some("j@x.org"));
        assert_eq!(authors[1].name, "John");
    }

    #[test]
    fn authors_list_wins_over_author() {
        let config: SiteConfig = toml::from_str(
            r#"
author = "Someone Else"
authors = ["Jane <j@x.org>", "John"]
"#,
        )
        .unwrap();
        let names: Vec<String> = config.authors().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Jane", "John"]);
    }

    #[test]
    fn no_authors_by_default() {
        assert!(SiteConfig::default().authors().is_empty());
    }

    // =========================================================================
    // Merge tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"a = 1"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"a = 2"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(2));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[t]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[t]\ny = 5").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["t"]["x"].as_integer(), Some(1));
        assert_eq!(merged["t"]["y"].as_integer(), Some(5));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site_title, defaults.site_title);
        assert_eq!(config.url_pattern, defaults.url_pattern);
        assert!(config.extra.is_empty());
    }
}
