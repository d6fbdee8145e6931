//! Preview server for a built site.
//!
//! A blocking `tiny_http` server over the output directory:
//!
//! - exact file match → the file
//! - directory with `index.html` → that file
//! - anything else → 404
//!
//! Requests run on the calling thread, one at a time. Stop it with Ctrl+C.

use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("could not listen on {addr}: {message}")]
    Bind { addr: String, message: String },
}

/// Serve `root` on `address:port` until the process is stopped.
pub fn run(address: &str, port: u16, root: &Path) -> Result<(), ServeError> {
    let addr = format!("{address}:{port}");
    let server = Server::http(&addr).map_err(|e| ServeError::Bind {
        addr: addr.clone(),
        message: e.to_string(),
    })?;
    tracing::info!(root = %root.display(), "Listening on http://{}", addr);

    for request in server.incoming_requests() {
        handle_request(request, root);
    }
    Ok(())
}

fn handle_request(request: Request, root: &Path) {
    let url = request.url().to_string();
    let result = match resolve(root, &url).and_then(|path| fs::read(&path).ok().map(|data| (path, data))) {
        Some((path, data)) => {
            tracing::debug!(url = %url, file = %path.display(), "200");
            let mut response = Response::from_data(data);
            if let Ok(header) = Header::from_bytes("Content-Type", guess_content_type(&path)) {
                response.add_header(header);
            }
            request.respond(response)
        }
        None => {
            tracing::debug!(url = %url, "404");
            request.respond(Response::from_string("404 Not Found").with_status_code(StatusCode(404)))
        }
    };
    if let Err(e) = result {
        tracing::warn!(url = %url, error = %e, "Failed to send response");
    }
}

/// Map a request URL to a file under `root`.
///
/// The query string is ignored and any `..` component rejects the request.
fn resolve(root: &Path, url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let rel = Path::new(path.trim_start_matches('/'));
    if rel.components().any(|c| !matches!(c, Component::Normal(_))) {
        return None;
    }

    let local = root.join(rel);
    if local.is_file() {
        return Some(local);
    }
    let index = local.join("index.html");
    index.is_file().then_some(index)
}

/// Guess MIME content type from file extension.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_file;
    use tempfile::TempDir;

    #[test]
    fn resolves_files_and_directory_indexes() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "index.html", "home");
        write_file(tmp.path(), "blog/index.html", "blog");
        write_file(tmp.path(), "blog/post.html", "post");

        assert_eq!(resolve(tmp.path(), "/"), Some(tmp.path().join("index.html")));
        assert_eq!(resolve(tmp.path(), "/blog"), Some(tmp.path().join("blog/index.html")));
        assert_eq!(
            resolve(tmp.path(), "/blog/post.html?v=2"),
            Some(tmp.path().join("blog/post.html"))
        );
        assert_eq!(resolve(tmp.path(), "/missing.html"), None);
    }

    #[test]
    fn parent_components_rejected() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "site/index.html", "x");
        write_file(tmp.path(), "secret.txt", "x");
        assert_eq!(resolve(&tmp.path().join("site"), "/../secret.txt"), None);
    }

    #[test]
    fn content_types() {
        assert_eq!(guess_content_type(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("a.svg")), "image/svg+xml");
        assert_eq!(guess_content_type(Path::new("a.bin")), "application/octet-stream");
    }
}
