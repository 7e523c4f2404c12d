// src/models/job.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque job identifier (UUID v4 string).
pub type JobId = String;

/// Lifecycle state of a discovery job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// Progress record of one discovery run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub gallery_url: String,
    pub total: usize,
    pub completed: usize,
    pub status: JobStatus,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip, default = "Utc::now")]
    pub last_accessed: DateTime<Utc>,
}

impl Job {
    pub fn new(job_id: JobId, gallery_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            gallery_url: gallery_url.into(),
            total: 0,
            completed: 0,
            status: JobStatus::Processing,
            image_urls: Vec::new(),
            created_at: now,
            updated_at: now,
            last_accessed: now,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status != JobStatus::Processing
    }

    /// `len(image_urls) <= completed <= total`
    pub fn is_consistent(&self) -> bool {
        self.image_urls.len() <= self.completed && self.completed <= self.total
    }
}
