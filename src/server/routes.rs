// src/server/routes.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::models::{Discovery, Job};
use crate::pipeline::{PipelineContext, run_archive, run_discovery};

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    pub gallery_url: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ZipQuery {
    pub gallery_url: String,
    pub job_id: Option<String>,
    pub limit: Option<usize>,
}

/// Run `task` on its own tokio task so a dropped connection cannot cancel
/// it part way; the job it updates always reaches a final status.
async fn detached<T, F>(task: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(task)
        .await
        .map_err(|e| AppError::internal(format!("pipeline task failed: {e}")))?
}

/// `GET /images?gallery_url=&limit=` runs discovery to completion.
pub async fn images_handler(
    State(ctx): State<PipelineContext>,
    Query(query): Query<GalleryQuery>,
) -> Result<Json<Discovery>, AppError> {
    let discovery = detached(async move {
        run_discovery(&ctx, &query.gallery_url, query.limit).await
    })
    .await?;
    Ok(Json(discovery))
}

/// `GET /progress/{job_id}` returns a snapshot of the job.
pub async fn progress_handler(
    State(ctx): State<PipelineContext>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, AppError> {
    let job = ctx.jobs.get(&job_id).await.inspect_err(|_| {
        log::warn!("Progress job {} not found.", job_id);
    })?;
    Ok(Json(job))
}

/// `GET /zip?gallery_url=&job_id=&limit=` returns the finished archive.
pub async fn zip_handler(
    State(ctx): State<PipelineContext>,
    Query(query): Query<ZipQuery>,
) -> Result<Response, AppError> {
    let disposition = format!(
        "attachment; filename={}",
        ctx.config.server.archive_filename
    );
    let archive = detached(async move {
        let job_id = query.job_id.as_deref().filter(|id| !id.is_empty());
        run_archive(&ctx, &query.gallery_url, job_id, query.limit).await
    })
    .await?;

    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, archive.into_bytes()).into_response())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            log::error!("Internal server error: {:?}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
