//! Favicon discovery and download.
//!
//! - [`extract`]: icon-link elements from an HTML document head
//! - [`discover`]: page retrieval, href resolution and the `/favicon.ico` fallback
//! - [`download`]: raw icon bytes for one absolute URL
//! - [`fetch`]: the composed per-target operation, [`FaviconFetcher::fetch_favicons`]
//!
//! Nothing here touches the file system or exits the process; callers get a
//! typed [`FaviconError`] and decide what to do with it.
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let http = faver_http::HttpClient::new()?;
//! let fetcher = faver_web::FaviconFetcher::new(http);
//! for icon in fetcher.fetch_favicons("https://www.rust-lang.org").await? {
//!     println!("{} bytes", icon.len());
//! }
//! # Ok(()) }
//! ```

use std::fmt;

use faver_http::HttpError;
use thiserror::Error;

pub mod discover;
pub mod download;
pub mod extract;
pub mod fetch;

pub use discover::Discoverer;
pub use download::{Downloader, MIN_URL_LEN};
pub use extract::IconLink;
pub use fetch::FaviconFetcher;

/// Raw content of one downloaded icon. Never decoded or validated.
pub type IconPayload = Vec<u8>;

/// Errors surfaced by discovery and download.
#[derive(Debug, Error)]
pub enum FaviconError {
    /// Transport failure on the page, fallback probe or icon GET.
    #[error("fetch failed: {0}")]
    Fetch(#[from] HttpError),

    /// The document could not be turned into icon URLs.
    #[error("parse error: {0}")]
    Parse(String),

    /// The icon URL failed the minimum-length sanity check.
    #[error("invalid icon URL {url:?}: shorter than {min} characters", min = MIN_URL_LEN)]
    Validation { url: String },

    /// Discovery finished without a single candidate.
    #[error("no favicons found for {target}")]
    NotFound { target: String },
}

/// Convenient alias for results that use [`FaviconError`].
pub type Result<T> = std::result::Result<T, FaviconError>;

/// Absolute URL of a candidate favicon.
///
/// Only [`Discoverer`] builds these, so a reference handed to the
/// [`Downloader`] never needs further resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconReference(String);

impl IconReference {
    pub(crate) fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for IconReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IconReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for IconReference {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for IconReference {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for IconReference {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}
