// src/pipeline/discover.rs

//! Gallery discovery pipeline.

use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};
use crate::models::Discovery;
use crate::services::Pacer;
use crate::utils::http::fetch_text;

use super::PipelineContext;

/// Discover the direct image URLs of a gallery.
///
/// Creates a job once at least one viewer link is known and keeps it
/// updated while the viewer pages are resolved one at a time. With a
/// `limit`, only the first `limit` viewer links are resolved.
pub async fn run_discovery(
    ctx: &PipelineContext,
    gallery_url: &str,
    limit: Option<usize>,
) -> Result<Discovery> {
    let viewer_links = fetch_viewer_links(ctx, gallery_url).await;
    if viewer_links.is_empty() {
        log::warn!("No viewer links found for gallery: {}", gallery_url);
        return Err(AppError::no_viewer_links(gallery_url));
    }
    let viewer_links = apply_limit(viewer_links, limit);

    let job_id = ctx.jobs.create(gallery_url).await;
    log::info!(
        "Job {} started: {} viewer links for {}",
        job_id,
        viewer_links.len(),
        gallery_url
    );

    match resolve_viewers(ctx, &job_id, &viewer_links).await {
        Ok(image_urls) => {
            log::info!("Job {} completed. Found {} images.", job_id, image_urls.len());
            Ok(Discovery::new(job_id, image_urls))
        }
        Err(error) => {
            log::error!("Job {} failed: {}", job_id, error);
            if let Err(mark_error) = ctx.jobs.mark_failed(&job_id).await {
                log::warn!("Could not mark job {} as failed: {}", job_id, mark_error);
            }
            Err(error)
        }
    }
}

/// Fetch the gallery page and extract its viewer links.
///
/// An unreachable gallery is indistinguishable from an empty one to the
/// caller; the cause is logged here.
async fn fetch_viewer_links(ctx: &PipelineContext, gallery_url: &str) -> Vec<String> {
    log::info!("Fetching gallery page: {}", gallery_url);

    let base_url = match Url::parse(gallery_url) {
        Ok(url) => url,
        Err(error) => {
            log::error!("Invalid gallery URL {}: {}", gallery_url, error);
            return Vec::new();
        }
    };

    let timeout = Duration::from_secs(ctx.config.http.page_timeout_secs);
    match fetch_text(ctx.client(), gallery_url, timeout).await {
        Ok(html) => {
            let links = ctx.links.extract(&html, &base_url);
            log::info!("Found {} viewer links for {}", links.len(), gallery_url);
            links
        }
        Err(error) => {
            log::error!("Request failed for gallery {}: {}", gallery_url, error);
            Vec::new()
        }
    }
}

/// Keep the first `limit` items. `None` or `Some(0)` keeps everything.
pub fn apply_limit<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    match limit {
        Some(n) if n > 0 && n < items.len() => {
            log::info!("Limiting to the first {} of {} links", n, items.len());
            items.truncate(n);
            items
        }
        _ => items,
    }
}

async fn resolve_viewers(
    ctx: &PipelineContext,
    job_id: &str,
    viewer_links: &[String],
) -> Result<Vec<String>> {
    ctx.jobs.record_total(job_id, viewer_links.len()).await?;

    let pacer = Pacer::from_config(&ctx.config.pacing);
    let mut image_urls = Vec::new();

    for (idx, viewer_url) in viewer_links.iter().enumerate() {
        pacer.wait().await;

        let image_url = ctx.images.resolve(viewer_url).await;
        if let Some(url) = &image_url {
            image_urls.push(url.clone());
        }
        ctx.jobs.record_progress(job_id, image_url).await?;

        log::debug!(
            "Job {}: {}/{} viewer pages processed",
            job_id,
            idx + 1,
            viewer_links.len()
        );
    }

    ctx.jobs.mark_completed(job_id).await?;
    Ok(image_urls)
}
