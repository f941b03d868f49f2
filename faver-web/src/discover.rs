use faver_http::{HttpClient, Url};

use crate::extract::{self, IconLink};
use crate::{FaviconError, IconReference, Result};

/// Conventional icon location tried when the document declares none.
pub const FALLBACK_PATH: &str = "/favicon.ico";

/// Finds candidate icon URLs for a target page.
#[derive(Clone, Debug)]
pub struct Discoverer {
    http: HttpClient,
}

impl Discoverer {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Fetch `target`, read the icon links in its head and resolve them.
    ///
    /// Root-relative hrefs are resolved against the *final* (post-redirect)
    /// scheme and host. Anything else is dropped. When nothing survives,
    /// `target + "/favicon.ico"` is probed and returned whatever its status.
    pub async fn discover(&self, target: &str) -> Result<Vec<IconReference>> {
        let page = self.http.get(target).await?;
        tracing::debug!(
            target_url = %target,
            final_url = %page.url,
            status = %page.status,
            "faver.discover.page"
        );

        let links = extract::icon_links(&page.text())?;
        let mut icons = resolve_links(target, &page.url, links)?;

        if icons.is_empty() {
            let fallback = format!("{target}{FALLBACK_PATH}");
            let status = self.http.probe(&fallback).await?;
            tracing::info!(
                target_url = %target,
                fallback = %fallback,
                %status,
                "faver.discover.fallback"
            );
            icons.push(IconReference::new(fallback));
        }

        tracing::info!(
            target_url = %target,
            count = icons.len(),
            "faver.discover.done"
        );
        Ok(icons)
    }
}

fn resolve_links(target: &str, final_url: &Url, links: Vec<IconLink>) -> Result<Vec<IconReference>> {
    let mut icons = Vec::with_capacity(links.len());
    for link in links {
        let Some(href) = link.href else {
            tracing::warn!(
                target_url = %target,
                rel = %link.rel,
                "faver.discover.link_without_href"
            );
            continue;
        };
        match resolve_root_relative(final_url, &href)? {
            Some(icon) => icons.push(icon),
            None => tracing::debug!(
                target_url = %target,
                href = %href,
                "faver.discover.href_not_root_relative"
            ),
        }
    }
    Ok(icons)
}

/// `scheme://host[:port]` of `base` joined with a root-relative `href`.
///
/// Returns `Ok(None)` for hrefs that do not start with `/`.
pub fn resolve_root_relative(base: &Url, href: &str) -> Result<Option<IconReference>> {
    if !href.starts_with('/') {
        return Ok(None);
    }
    let joined = format!("{}{}", base.origin().ascii_serialization(), href);
    let url = Url::parse(&joined)
        .map_err(|e| FaviconError::Parse(format!("icon href {href:?} against {base}: {e}")))?;
    Ok(Some(IconReference::new(url.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn root_relative_uses_scheme_and_host_only() {
        let icon = resolve_root_relative(&base("https://example.com/blog/post?id=1"), "/x.ico")
            .unwrap()
            .unwrap();
        assert_eq!(icon, "https://example.com/x.ico");
    }

    #[test]
    fn explicit_port_is_kept() {
        let icon = resolve_root_relative(&base("http://127.0.0.1:8080/page"), "/static/i.png")
            .unwrap()
            .unwrap();
        assert_eq!(icon, "http://127.0.0.1:8080/static/i.png");
    }

    #[test]
    fn default_port_is_dropped() {
        let icon = resolve_root_relative(&base("https://example.com:443/"), "/i.ico")
            .unwrap()
            .unwrap();
        assert_eq!(icon, "https://example.com/i.ico");
    }

    #[test]
    fn other_hrefs_are_discarded() {
        let page = base("https://example.com/dir/");
        for href in ["icon.ico", "img/icon.ico", "./icon.ico", "https://cdn.example.com/i.ico", ""] {
            assert_eq!(resolve_root_relative(&page, href).unwrap(), None, "{href}");
        }
    }

    #[test]
    fn opaque_base_is_a_parse_error() {
        let err = resolve_root_relative(&base("data:text/html,hi"), "/x.ico").unwrap_err();
        assert!(matches!(err, FaviconError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn links_without_href_are_skipped() {
        let links = vec![
            IconLink {
                rel: "icon".into(),
                href: None,
            },
            IconLink {
                rel: "shortcut icon".into(),
                href: Some("/b.ico".into()),
            },
        ];
        let icons = resolve_links("https://example.com", &base("https://example.com/"), links).unwrap();
        assert_eq!(icons, vec![IconReference::new("https://example.com/b.ico")]);
    }
}
