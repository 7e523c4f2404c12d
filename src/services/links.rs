// src/services/links.rs

//! Viewer link extraction from gallery pages.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SiteConfig;
use crate::utils::resolve_url;

/// Extracts viewer-page URLs from a gallery document.
///
/// Two tiers, the first one yielding anything wins:
/// 1. anchors inside the tooltip wrappers that already carry the canonical
///    viewer prefix;
/// 2. any anchor pointing at the canonical prefix or the root-relative
///    viewer path, resolved against the gallery URL.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    tooltip_anchor: Selector,
    anchor: Selector,
    viewer_prefix: String,
    viewer_path: String,
    viewer_root: Url,
}

impl LinkExtractor {
    /// Create an extractor for the given site layout.
    pub fn new(site: &SiteConfig) -> Result<Self> {
        let viewer_root = site.viewer_url()?;
        let tooltip = format!(".{} a[href]", site.tooltip_class.trim());
        Ok(Self {
            tooltip_anchor: parse_selector(&tooltip)?,
            anchor: parse_selector("a[href]")?,
            viewer_prefix: site.viewer_prefix.clone(),
            viewer_path: site.viewer_path(),
            viewer_root,
        })
    }

    /// Extract deduplicated viewer URLs in document order.
    pub fn extract(&self, html: &str, base_url: &Url) -> Vec<String> {
        let document = Html::parse_document(html);

        let links = self.tooltip_links(&document, base_url);
        if !links.is_empty() {
            log::debug!("Tier 1 matched {} tooltip links", links.len());
            return dedupe(links);
        }

        let links = self.direct_links(&document, base_url);
        log::debug!("Tier 2 matched {} direct links", links.len());
        dedupe(links)
    }

    fn tooltip_links(&self, document: &Html, base_url: &Url) -> Vec<String> {
        document
            .select(&self.tooltip_anchor)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| href.starts_with(&self.viewer_prefix))
            .map(|href| resolve_url(base_url, href))
            .collect()
    }

    fn direct_links(&self, document: &Html, base_url: &Url) -> Vec<String> {
        document
            .select(&self.anchor)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| {
                href.starts_with(&self.viewer_prefix) || href.starts_with(&self.viewer_path)
            })
            .filter(|href| *href != self.viewer_path)
            .map(|href| resolve_url(base_url, href))
            .filter(|url| !self.is_viewer_root(url))
            .collect()
    }

    fn is_viewer_root(&self, url: &str) -> bool {
        Url::parse(url).is_ok_and(|u| u == self.viewer_root)
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn dedupe(links: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
