// src/services/jobs.rs

//! In-memory job registry.
//!
//! Each job is written only by the discovery run that created it; every
//! reader gets a clone, so no reference to tracker state escapes the lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Job, JobId, JobStatus};

/// Shared handle to the job table. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new processing job and return its id.
    pub async fn create(&self, gallery_url: &str) -> JobId {
        let job_id = Uuid::new_v4().to_string();
        let mut jobs = self.jobs.write().await;
        jobs.insert(job_id.clone(), Job::new(job_id.clone(), gallery_url));
        job_id
    }

    /// Copy of the job's current state.
    pub async fn get(&self, job_id: &str) -> Result<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| AppError::JobNotFound(job_id.to_string()))?;
        job.last_accessed = Utc::now();
        Ok(job.clone())
    }

    /// Set the number of viewer links the job will process.
    pub async fn record_total(&self, job_id: &str, total: usize) -> Result<()> {
        self.update(job_id, |job| {
            job.total = total.max(job.completed);
        })
        .await
    }

    /// Count one processed viewer link, keeping its image URL if it resolved.
    pub async fn record_progress(&self, job_id: &str, image_url: Option<String>) -> Result<()> {
        self.update(job_id, |job| {
            if job.completed >= job.total {
                log::warn!(
                    "Job {} already processed {} of {} links; ignoring extra progress",
                    job.job_id,
                    job.completed,
                    job.total
                );
                return;
            }
            job.completed += 1;
            if let Some(url) = image_url {
                job.image_urls.push(url);
            }
        })
        .await
    }

    pub async fn mark_completed(&self, job_id: &str) -> Result<()> {
        self.update(job_id, |job| job.status = JobStatus::Completed)
            .await
    }

    pub async fn mark_failed(&self, job_id: &str) -> Result<()> {
        self.update(job_id, |job| job.status = JobStatus::Failed).await
    }

    /// Drop finished jobs not accessed within `ttl`. Returns how many went.
    pub async fn evict_expired(&self, ttl: Duration) -> usize {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return 0;
        };
        let cutoff = Utc::now() - ttl;
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !job.is_finished() || job.last_accessed > cutoff);
        before - jobs.len()
    }

    /// Copies of every job, without touching their access times.
    pub async fn snapshot(&self) -> Vec<Job> {
        self.jobs.read().await.values().cloned().collect()
    }

    /// Forget every job.
    pub async fn clear(&self) {
        self.jobs.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    async fn update(&self, job_id: &str, apply: impl FnOnce(&mut Job)) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| AppError::JobNotFound(job_id.to_string()))?;
        apply(job);
        let now = Utc::now();
        job.updated_at = now;
        job.last_accessed = now;
        debug_assert!(job.is_consistent());
        Ok(())
    }
}
