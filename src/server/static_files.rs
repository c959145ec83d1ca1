//! Static front-end assets

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use hyper::{Body, Response, StatusCode};
use percent_encoding::percent_decode_str;
use tracing::warn;

use super::response;

/// Serves files from a fixed root directory
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Maps a request path onto a file under the root
    ///
    /// The path is percent-decoded first. `/` maps to `index.html`. Anything
    /// that could escape the root, or that does not decode to UTF-8, yields `None`.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
        let relative = decoded.trim_start_matches('/');
        if relative.is_empty() {
            return Some(self.root.join("index.html"));
        }
        if relative.contains(['\\', '\0']) {
            return None;
        }

        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }

    /// Reads the file for `request_path`, 404 if it is missing or not allowed
    pub async fn serve(&self, request_path: &str) -> Response<Body> {
        let Some(mut path) = self.resolve(request_path) else {
            return response::not_found();
        };

        if tokio::fs::metadata(&path).await.map(|m| m.is_dir()).unwrap_or(false) {
            path.push("index.html");
        }

        match tokio::fs::read(&path).await {
            Ok(body) => response::bytes(StatusCode::OK, content_type(&path), body),
            Err(e) if e.kind() == ErrorKind::NotFound => response::not_found(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read static file");
                response::not_found()
            }
        }
    }
}

/// Content type guessed from the file extension
fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("txt") | Some("csv") => "text/plain; charset=utf-8",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
