//! Icon-link extraction from HTML documents.
//!
//! Parsing is done with `scraper` (html5ever), which is error-tolerant: any
//! byte soup yields a document, so markup problems never fail extraction.

use scraper::{Html, Selector};

use crate::{FaviconError, Result};

const HEAD_LINKS: &str = "head link[rel]";
const ICON_TOKEN: &str = "icon";

/// One icon-link element found in the document head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconLink {
    pub rel: String,
    /// `None` when the element carries no `href` attribute.
    pub href: Option<String>,
}

/// True when a `rel` value marks an icon reference.
///
/// `rel` is a whitespace-separated, ASCII case-insensitive token list, so
/// `icon`, `shortcut icon` and `Shortcut Icon` all qualify while
/// `apple-touch-icon` and `stylesheet` do not.
pub fn is_icon_rel(rel: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|token| token.eq_ignore_ascii_case(ICON_TOKEN))
}

/// All icon-link elements inside `<head>`, in document order.
pub fn icon_links(html: &str) -> Result<Vec<IconLink>> {
    let selector = Selector::parse(HEAD_LINKS)
        .map_err(|e| FaviconError::Parse(format!("selector {HEAD_LINKS:?}: {e}")))?;
    let document = Html::parse_document(html);

    let links = document
        .select(&selector)
        .filter_map(|element| {
            let attrs = element.value();
            let rel = attrs.attr("rel")?;
            is_icon_rel(rel).then(|| IconLink {
                rel: rel.to_string(),
                href: attrs.attr("href").map(str::to_string),
            })
        })
        .collect();

    Ok(links)
}
