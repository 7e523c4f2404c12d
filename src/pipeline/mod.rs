//! Pipeline entry points for grabber operations.
//!
//! - `run_discovery`: Resolve every viewer page of a gallery to its image URL
//! - `run_archive`: Bundle a gallery's images into a ZIP, reusing a finished job when possible

pub mod archive;
pub mod discover;

use std::sync::Arc;

use reqwest::Client;

use crate::error::Result;
use crate::models::Config;
use crate::services::{ArchiveAssembler, ImageResolver, JobTracker, LinkExtractor};
use crate::utils::http;

pub use archive::run_archive;
pub use discover::run_discovery;

/// Everything a pipeline run needs, shared across concurrent runs.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub config: Arc<Config>,
    pub jobs: JobTracker,
    client: Client,
    links: Arc<LinkExtractor>,
    images: Arc<ImageResolver>,
    archiver: Arc<ArchiveAssembler>,
}

impl PipelineContext {
    /// Build the shared HTTP client and services for `config`.
    pub fn new(config: Arc<Config>, jobs: JobTracker) -> Result<Self> {
        let client = http::create_async_client(&config.http)?;
        let links = LinkExtractor::new(&config.site)?;
        let images = ImageResolver::new(client.clone(), &config)?;
        let archiver = ArchiveAssembler::new(client.clone(), &config.http);

        Ok(Self {
            config,
            jobs,
            client,
            links: Arc::new(links),
            images: Arc::new(images),
            archiver: Arc::new(archiver),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}
