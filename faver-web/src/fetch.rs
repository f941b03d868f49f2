use faver_http::HttpClient;

use crate::{Discoverer, Downloader, FaviconError, IconPayload, Result};

/// Discovery and download composed into one per-target operation.
///
/// Cheap to clone; clones share the underlying connection pool, so one
/// fetcher can serve many concurrent targets.
#[derive(Clone, Debug)]
pub struct FaviconFetcher {
    discoverer: Discoverer,
    downloader: Downloader,
}

impl FaviconFetcher {
    pub fn new(http: HttpClient) -> Self {
        Self {
            discoverer: Discoverer::new(http.clone()),
            downloader: Downloader::new(http),
        }
    }

    /// Discover every icon for `target` and download each, in order.
    ///
    /// All or nothing: the first failure is returned and bytes already
    /// downloaded for this target are dropped.
    pub async fn fetch_favicons(&self, target: &str) -> Result<Vec<IconPayload>> {
        let icons = self.discoverer.discover(target).await?;
        if icons.is_empty() {
            return Err(FaviconError::NotFound {
                target: target.to_string(),
            });
        }

        let mut payloads = Vec::with_capacity(icons.len());
        for icon in &icons {
            payloads.push(self.downloader.download(icon.as_str()).await?);
        }

        tracing::info!(
            target_url = %target,
            icons = payloads.len(),
            bytes = payloads.iter().map(Vec::len).sum::<usize>(),
            "faver.fetch.done"
        );
        Ok(payloads)
    }
}
