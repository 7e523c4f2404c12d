// src/models/mod.rs

//! Domain models for the gallery grabber.

mod config;
mod job;

// Re-export all public types
pub use config::{Config, HttpConfig, JobConfig, PacingConfig, ServerConfig, SiteConfig};
pub use job::{Job, JobId, JobStatus};

/// Result of one discovery run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Discovery {
    pub job_id: JobId,
    pub count: usize,
    pub image_urls: Vec<String>,
}

impl Discovery {
    pub fn new(job_id: JobId, image_urls: Vec<String>) -> Self {
        Self {
            job_id,
            count: image_urls.len(),
            image_urls,
        }
    }
}
