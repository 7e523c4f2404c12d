// src/services/images.rs

//! Image resolution for viewer pages.
//!
//! A viewer page either embeds the full-size image directly or hides it
//! behind a "continue" form that has to be POSTed first.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::utils::http::{fetch_text, post_form};
use crate::utils::resolve_url;

/// Predicate over an `<img>` element. The second argument is the viewer
/// marker (host + viewer path, without scheme).
type ImagePredicate = fn(&ElementRef<'_>, &str) -> bool;

/// Ordered image passes; the first pass matching any `<img>` wins.
///
/// - `centred`: the reveal page marks the full-size image with this class.
/// - `image id`: older viewer template.
/// - `fallback`: inline `max-width` styling, the `centred` class, or any
///   image whose `src` leaves the viewer namespace. Thumbnails that point
///   back into the viewer namespace are what this pass has to skip, so it
///   must stay last.
const IMAGE_PASSES: [(&str, ImagePredicate); 3] = [
    ("centred", has_centred_class),
    ("image id", has_image_id),
    ("fallback", looks_like_full_image),
];

fn has_centred_class(img: &ElementRef<'_>, _marker: &str) -> bool {
    img.value().classes().any(|c| c == "centred")
}

fn has_image_id(img: &ElementRef<'_>, _marker: &str) -> bool {
    img.value().id() == Some("image")
}

fn looks_like_full_image(img: &ElementRef<'_>, marker: &str) -> bool {
    let element = img.value();
    element
        .attr("style")
        .is_some_and(|style| style.contains("max-width"))
        || has_centred_class(img, marker)
        || element.attr("src").is_some_and(|src| !src.contains(marker))
}

/// A POST form found on a viewer page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostForm {
    /// Absolute submission URL
    pub action: String,
    /// Named input fields, missing values as empty strings
    pub fields: BTreeMap<String, String>,
}

/// Resolves viewer pages to direct image URLs.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    client: Client,
    timeout: Duration,
    viewer_marker: String,
    form_sel: Selector,
    input_sel: Selector,
    img_sel: Selector,
}

impl ImageResolver {
    /// Create a resolver sharing the given client.
    pub fn new(client: Client, config: &Config) -> Result<Self> {
        Ok(Self {
            client,
            timeout: Duration::from_secs(config.http.page_timeout_secs),
            viewer_marker: config.site.viewer_marker(),
            form_sel: parse_selector("form[method]")?,
            input_sel: parse_selector("input")?,
            img_sel: parse_selector("img")?,
        })
    }

    /// Resolve a viewer page to its direct image URL.
    ///
    /// Failures are logged and reported as `None`; they never abort a batch.
    pub async fn resolve(&self, viewer_url: &str) -> Option<String> {
        log::debug!("Extracting image from viewer page: {}", viewer_url);
        match self.try_resolve(viewer_url).await {
            Ok(Some(image_url)) => {
                log::debug!("Found image URL: {}", image_url);
                Some(image_url)
            }
            Ok(None) => {
                log::warn!("No direct image found on {}", viewer_url);
                None
            }
            Err(error) => {
                log::error!("Request failed for viewer {}: {}", viewer_url, error);
                None
            }
        }
    }

    async fn try_resolve(&self, viewer_url: &str) -> Result<Option<String>> {
        let page_url = Url::parse(viewer_url)?;
        let mut html = fetch_text(&self.client, viewer_url, self.timeout).await?;

        if let Some(form) = self.find_post_form(&html, &page_url) {
            log::debug!(
                "Submitting {} form fields to {} for {}",
                form.fields.len(),
                form.action,
                viewer_url
            );
            html = post_form(&self.client, &form.action, &form.fields, self.timeout).await?;
        }

        Ok(self.find_image_src(&html, &page_url))
    }

    /// Find the first form whose method is POST.
    pub fn find_post_form(&self, html: &str, page_url: &Url) -> Option<PostForm> {
        let document = Html::parse_document(html);
        let form = document.select(&self.form_sel).find(|form| {
            form.value()
                .attr("method")
                .is_some_and(|m| m.trim().eq_ignore_ascii_case("post"))
        })?;

        let action = form.value().attr("action").unwrap_or("").trim();
        let fields = form
            .select(&self.input_sel)
            .filter_map(|input| {
                let element = input.value();
                let name = element.attr("name").filter(|n| !n.is_empty())?;
                let value = element.attr("value").unwrap_or("");
                Some((name.to_string(), value.to_string()))
            })
            .collect();

        Some(PostForm {
            action: resolve_url(page_url, action),
            fields,
        })
    }

    /// Pick the image element and resolve its `src` against the page URL.
    pub fn find_image_src(&self, html: &str, page_url: &Url) -> Option<String> {
        let document = Html::parse_document(html);

        let (pass, img) = IMAGE_PASSES.iter().find_map(|(name, predicate)| {
            document
                .select(&self.img_sel)
                .find(|img| predicate(img, &self.viewer_marker))
                .map(|img| (*name, img))
        })?;

        log::debug!("Image matched by '{}' pass", pass);
        img.value()
            .attr("src")
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(|src| resolve_url(page_url, src))
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
