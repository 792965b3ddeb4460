//! Video job repository: CRUD and lifecycle updates for the video_jobs table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use framepulse_core::models::{JobState, VideoJob};
use framepulse_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::traits::VideoJobStore;

/// Row type for the video_jobs table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct VideoJobRow {
    pub id: Uuid,
    pub content_id: Uuid,
    pub original_filename: String,
    pub storage_key: String,
    pub storage_url: String,
    pub file_size: i64,
    pub duration_ms: i64,
    pub frame_rate: Option<i32>,
    pub resolution: Option<String>,
    pub screenshots_count: i32,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoJobRow {
    fn into_video_job(self) -> VideoJob {
        VideoJob {
            id: self.id,
            content_id: self.content_id,
            original_filename: self.original_filename,
            storage_key: self.storage_key,
            storage_url: self.storage_url,
            file_size: self.file_size,
            duration_ms: self.duration_ms,
            frame_rate: self.frame_rate,
            resolution: self.resolution,
            screenshots_count: self.screenshots_count,
            state: self.state,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const JOB_COLUMNS: &str = "id, content_id, original_filename, storage_key, storage_url, \
     file_size, duration_ms, frame_rate, resolution, screenshots_count, state, \
     created_at, updated_at";

/// Repository for the video_jobs table.
#[derive(Clone)]
pub struct PgVideoJobRepository {
    pool: PgPool,
}

impl PgVideoJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn not_found(id: Uuid) -> AppError {
        AppError::NotFound(format!("Video job {} not found", id))
    }
}

#[async_trait]
impl VideoJobStore for PgVideoJobRepository {
    #[tracing::instrument(skip(self, job), fields(db.table = "video_jobs", db.operation = "insert", db.record_id = %job.id))]
    async fn create(&self, job: VideoJob) -> Result<VideoJob, AppError> {
        let row: VideoJobRow = sqlx::query_as::<Postgres, VideoJobRow>(&format!(
            r#"
            INSERT INTO video_jobs (
                id, content_id, original_filename, storage_key, storage_url,
                file_size, duration_ms, frame_rate, resolution, screenshots_count,
                state, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job.id)
        .bind(job.content_id)
        .bind(&job.original_filename)
        .bind(&job.storage_key)
        .bind(&job.storage_url)
        .bind(job.file_size)
        .bind(job.duration_ms)
        .bind(job.frame_rate)
        .bind(&job.resolution)
        .bind(job.screenshots_count)
        .bind(&job.state)
        .bind(job.created_at)
        .bind(job.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_video_job())
    }

    #[tracing::instrument(skip(self), fields(db.table = "video_jobs", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<VideoJob>, AppError> {
        let row: Option<VideoJobRow> = sqlx::query_as::<Postgres, VideoJobRow>(&format!(
            "SELECT {} FROM video_jobs WHERE id = $1",
            JOB_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.into_video_job()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "video_jobs", content_id = %content_id))]
    async fn list_by_content(&self, content_id: Uuid) -> Result<Vec<VideoJob>, AppError> {
        let rows: Vec<VideoJobRow> = sqlx::query_as::<Postgres, VideoJobRow>(&format!(
            "SELECT {} FROM video_jobs WHERE content_id = $1 ORDER BY created_at DESC",
            JOB_COLUMNS
        ))
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.into_video_job()).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "video_jobs", db.record_id = %id, state = %state))]
    async fn set_state(&self, id: Uuid, state: JobState) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE video_jobs SET state = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(&state)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "video_jobs", db.record_id = %id))]
    async fn set_probe_metadata(
        &self,
        id: Uuid,
        duration_ms: i64,
        frame_rate: i32,
        resolution: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE video_jobs
            SET duration_ms = $2, frame_rate = $3, resolution = $4, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(duration_ms)
        .bind(frame_rate)
        .bind(resolution)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "video_jobs", db.record_id = %id, screenshots_count))]
    async fn set_completed(&self, id: Uuid, screenshots_count: i32) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE video_jobs
            SET state = $2, screenshots_count = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(JobState::Completed)
        .bind(screenshots_count)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "video_jobs", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM video_jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
