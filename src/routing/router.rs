//! Route lookup.
//!
//! # Responsibilities
//! - Map (method, path) to one of the service's routes
//! - Percent-decode the file name of download routes
//!
//! # Design Decisions
//! - Prefixes are matched on the raw path, only the name is decoded, so an
//!   encoded `/f/` never selects the download route
//! - Names are decoded as UTF-8; anything else has no matching file
//! - Decoded names are untrusted; the resolver validates them

use axum::http::Method;
use percent_encoding::percent_decode_str;

/// Path prefix of download links.
pub const DOWNLOAD_PREFIX: &str = "/f/";

/// Path accepting multipart uploads.
pub const UPLOAD_PATH: &str = "/upload";

/// A matched route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `GET /`: directory listing page.
    Listing,
    /// `GET /f/<name>`: file download, carrying the decoded name.
    Download(String),
    /// `POST /upload`: multipart upload.
    Upload,
    NotFound,
}

impl Route {
    /// Match a request. `HEAD` is accepted wherever `GET` is.
    pub fn resolve(method: &Method, raw_path: &str) -> Self {
        let readable = *method == Method::GET || *method == Method::HEAD;

        if raw_path == "/" {
            return if readable { Route::Listing } else { Route::NotFound };
        }

        if raw_path == UPLOAD_PATH {
            return if *method == Method::POST {
                Route::Upload
            } else {
                Route::NotFound
            };
        }

        if let Some(encoded) = raw_path.strip_prefix(DOWNLOAD_PREFIX) {
            if !readable {
                return Route::NotFound;
            }
            return match percent_decode_str(encoded).decode_utf8() {
                Ok(name) => Route::Download(name.into_owned()),
                Err(_) => {
                    tracing::debug!(path = %raw_path, "Download name is not valid UTF-8");
                    Route::NotFound
                }
            };
        }

        Route::NotFound
    }

    /// Label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Route::Listing => "listing",
            Route::Download(_) => "download",
            Route::Upload => "upload",
            Route::NotFound => "not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing() {
        assert_eq!(Route::resolve(&Method::GET, "/"), Route::Listing);
        assert_eq!(Route::resolve(&Method::HEAD, "/"), Route::Listing);
        assert_eq!(Route::resolve(&Method::POST, "/"), Route::NotFound);
    }

    #[test]
    fn test_download_name_is_decoded() {
        assert_eq!(
            Route::resolve(&Method::GET, "/f/my%20report.pdf"),
            Route::Download("my report.pdf".to_string())
        );
        assert_eq!(
            Route::resolve(&Method::HEAD, "/f/a+b.txt"),
            Route::Download("a+b.txt".to_string())
        );
        assert_eq!(
            Route::resolve(&Method::GET, "/f/%E6%97%A5.txt"),
            Route::Download("\u{65e5}.txt".to_string())
        );
    }

    #[test]
    fn test_download_keeps_traversal_for_resolver() {
        assert_eq!(
            Route::resolve(&Method::GET, "/f/..%2F..%2Fetc%2Fpasswd"),
            Route::Download("../../etc/passwd".to_string())
        );
        assert_eq!(
            Route::resolve(&Method::GET, "/f/%2Fetc%2Fpasswd"),
            Route::Download("/etc/passwd".to_string())
        );
    }

    #[test]
    fn test_download_invalid_utf8() {
        assert_eq!(Route::resolve(&Method::GET, "/f/%FF%FE"), Route::NotFound);
    }

    #[test]
    fn test_upload_requires_post() {
        assert_eq!(Route::resolve(&Method::POST, "/upload"), Route::Upload);
        assert_eq!(Route::resolve(&Method::GET, "/upload"), Route::NotFound);
        assert_eq!(Route::resolve(&Method::POST, "/upload/"), Route::NotFound);
    }

    #[test]
    fn test_everything_else_not_found() {
        for (method, path) in [
            (Method::GET, "/index.html"),
            (Method::GET, "/f"),
            (Method::GET, "/%66/a.txt"),
            (Method::DELETE, "/f/a.txt"),
            (Method::PUT, "/upload"),
        ] {
            assert_eq!(Route::resolve(&method, path), Route::NotFound, "{method} {path}");
        }
    }
}
