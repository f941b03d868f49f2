use faver_http::HttpClient;

use crate::{FaviconError, IconPayload, Result};

/// Length of `http://`, the shortest string worth sending.
pub const MIN_URL_LEN: usize = 7;

/// Fetches raw icon bytes.
#[derive(Clone, Debug)]
pub struct Downloader {
    http: HttpClient,
}

impl Downloader {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// GET `url` and return the whole body.
    ///
    /// The status code is not checked: an error page comes back as bytes like
    /// any other payload. Only transport failures are errors.
    pub async fn download(&self, url: &str) -> Result<IconPayload> {
        if url.chars().count() < MIN_URL_LEN {
            return Err(FaviconError::Validation {
                url: url.to_string(),
            });
        }

        let fetched = self.http.get(url).await?;
        if !fetched.status.is_success() {
            tracing::warn!(
                url = %url,
                status = %fetched.status,
                bytes = fetched.body.len(),
                "faver.download.non_success_status"
            );
        } else {
            tracing::debug!(url = %url, bytes = fetched.body.len(), "faver.download.done");
        }
        Ok(fetched.body)
    }
}
