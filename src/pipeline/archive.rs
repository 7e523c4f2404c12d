// src/pipeline/archive.rs

use crate::error::Result;
use crate::models::JobStatus;
use crate::services::Archive;

use super::discover::apply_limit;
use super::{PipelineContext, run_discovery};

/// Build an archive for a gallery.
///
/// A completed job with at least one image is reused as-is; anything else
/// (no job id, unknown id, unfinished job, empty job) runs a fresh discovery.
/// `limit` caps the viewer pages resolved, or the cached URLs reused.
pub async fn run_archive(
    ctx: &PipelineContext,
    gallery_url: &str,
    job_id: Option<&str>,
    limit: Option<usize>,
) -> Result<Archive> {
    let image_urls = match cached_image_urls(ctx, job_id).await {
        Some(urls) => apply_limit(urls, limit),
        None => {
            log::info!("Scraping gallery {} for archive", gallery_url);
            run_discovery(ctx, gallery_url, limit).await?.image_urls
        }
    };

    if image_urls.is_empty() {
        log::warn!("No image URLs compiled for gallery: {}", gallery_url);
    }

    ctx.archiver.build(&image_urls).await
}

async fn cached_image_urls(ctx: &PipelineContext, job_id: Option<&str>) -> Option<Vec<String>> {
    let job_id = job_id?;
    let job = match ctx.jobs.get(job_id).await {
        Ok(job) => job,
        Err(_) => {
            log::info!("Job {} not found; ignoring cache", job_id);
            return None;
        }
    };

    if job.status != JobStatus::Completed {
        log::info!("Job {} is {}; ignoring cache", job_id, job.status.as_str());
        return None;
    }
    if job.image_urls.is_empty() {
        log::warn!("Cached job {} has no image URLs. Re-scraping.", job_id);
        return None;
    }

    log::info!("Using {} cached image URLs from job {}", job.image_urls.len(), job_id);
    Some(job.image_urls)
}
