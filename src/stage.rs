//! Output directory preparation.
//!
//! Every build starts from an empty output root: a previous output tree is
//! removed wholesale, then the media tree is copied in. Rendered pages are
//! written on top afterwards, so a page URL that collides with a media file
//! overwrites it.
//!
//! A missing media directory is normal. Any other failure while copying is
//! an error and aborts the build before anything is rendered.

use crate::config::SiteConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("failed to prepare {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

fn at(path: &Path) -> impl FnOnce(io::Error) -> StageError + '_ {
    move |source| StageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Clear the output root and copy media into it.
///
/// Returns the number of media entries copied (files and links).
pub fn prepare_output(config: &SiteConfig) -> Result<usize, StageError> {
    let out = &config.output_dir;
    match fs::remove_dir_all(out) {
        Ok(()) => tracing::debug!(dir = %out.display(), "Removed previous output"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(at(out)(e)),
    }
    fs::create_dir_all(out).map_err(at(out))?;

    // The root is followed if it is a link; links inside it are kept as links.
    let media = &config.media_dir;
    match fs::metadata(media) {
        Ok(meta) if meta.is_dir() => {
            let copied = copy_dir_recursive(media, out)?;
            tracing::info!(files = copied, from = %media.display(), "Copied media");
            Ok(copied)
        }
        Ok(_) => Err(StageError::Io {
            path: media.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "media path is not a directory"),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(dir = %media.display(), "No media directory");
            Ok(0)
        }
        Err(e) => Err(at(media)(e)),
    }
}

/// Copy `src` into `dst`, preserving symbolic links as links.
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<usize, StageError> {
    let mut copied = 0;
    for entry in fs::read_dir(src).map_err(at(src))? {
        let entry = entry.map_err(at(src))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(at(&src_path))?;

        if file_type.is_symlink() {
            copy_link(&src_path, &dst_path)?;
            copied += 1;
        } else if file_type.is_dir() {
            fs::create_dir_all(&dst_path).map_err(at(&dst_path))?;
            copied += copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).map_err(at(&src_path))?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(unix)]
fn copy_link(src: &Path, dst: &Path) -> Result<(), StageError> {
    let target = fs::read_link(src).map_err(at(src))?;
    std::os::unix::fs::symlink(&target, dst).map_err(at(dst))
}

#[cfg(not(unix))]
fn copy_link(src: &Path, dst: &Path) -> Result<(), StageError> {
    // No portable symlink creation; copy what the link points at.
    fs::copy(src, dst).map(|_| ()).map_err(at(src))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn stale_output_removed() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "output/stale.html", "old");
        let config = config_at(tmp.path());

        prepare_output(&config).unwrap();
        assert!(config.output_dir.is_dir());
        assert!(!config.output_dir.join("stale.html").exists());
    }

    #[test]
    fn media_copied_recursively() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "media/style.css", "body {}");
        write_file(tmp.path(), "media/img/logo.svg", "<svg/>");
        let config = config_at(tmp.path());

        let copied = prepare_output(&config).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(
            fs::read_to_string(config.output_dir.join("img/logo.svg")).unwrap(),
            "<svg/>"
        );
    }

    #[test]
    fn missing_media_is_silent() {
        let tmp = TempDir::new().unwrap();
        let config = config_at(tmp.path());
        assert_eq!(prepare_output(&config).unwrap(), 0);
        assert!(config.output_dir.is_dir());
    }

    #[test]
    fn media_file_instead_of_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "media", "not a directory");
        let config = config_at(tmp.path());
        assert!(matches!(prepare_output(&config), Err(StageError::Io { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_preserved() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "media/real.txt", "hi");
        std::os::unix::fs::symlink("real.txt", tmp.path().join("media/alias.txt")).unwrap();
        let config = config_at(tmp.path());

        prepare_output(&config).unwrap();
        let link = config.output_dir.join("alias.txt");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("real.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_media_root_followed() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "shared/media/style.css", "body {}");
        write_file(tmp.path(), "shared/media/real.txt", "hi");
        std::os::unix::fs::symlink("real.txt", tmp.path().join("shared/media/alias.txt")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("shared/media"), tmp.path().join("media"))
            .unwrap();
        let config = config_at(tmp.path());

        assert_eq!(prepare_output(&config).unwrap(), 3);
        let out = &config.output_dir;
        assert!(fs::symlink_metadata(out).unwrap().is_dir());
        assert_eq!(fs::read_to_string(out.join("style.css")).unwrap(), "body {}");
        assert!(fs::symlink_metadata(out.join("alias.txt")).unwrap().file_type().is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_media_root_is_missing() {
        let tmp = TempDir::new().unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone"), tmp.path().join("media")).unwrap();
        let config = config_at(tmp.path());
        assert_eq!(prepare_output(&config).unwrap(), 0);
    }
}
