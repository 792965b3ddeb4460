//! Frame repository: insert/list/delete for the frames table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use framepulse_core::models::{AspectClass, Frame};
use framepulse_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::traits::FrameStore;

/// Row type for the frames table (for FromRow). The aspect classification is
/// stored as its display string ("16:9", "9:16", ...).
#[derive(Debug, sqlx::FromRow)]
pub struct FrameRow {
    pub id: Uuid,
    pub video_id: Uuid,
    pub content_id: Uuid,
    pub filename: String,
    pub storage_key: String,
    pub storage_url: String,
    pub timestamp_seconds: i32,
    pub aspect: String,
    pub created_at: DateTime<Utc>,
}

impl FrameRow {
    fn into_frame(self) -> Frame {
        Frame {
            id: self.id,
            video_id: self.video_id,
            content_id: self.content_id,
            filename: self.filename,
            storage_key: self.storage_key,
            storage_url: self.storage_url,
            timestamp_seconds: self.timestamp_seconds,
            aspect: AspectClass::parse(&self.aspect).unwrap_or(AspectClass::Landscape16x9),
            created_at: self.created_at,
        }
    }
}

const FRAME_COLUMNS: &str = "id, video_id, content_id, filename, storage_key, storage_url, \
     timestamp_seconds, aspect, created_at";

/// Repository for the frames table.
#[derive(Clone)]
pub struct PgFrameRepository {
    pool: PgPool,
}

impl PgFrameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FrameStore for PgFrameRepository {
    #[tracing::instrument(skip(self, frame), fields(db.table = "frames", db.operation = "insert", video_id = %frame.video_id))]
    async fn create(&self, frame: Frame) -> Result<Frame, AppError> {
        let row: FrameRow = sqlx::query_as::<Postgres, FrameRow>(&format!(
            r#"
            INSERT INTO frames (
                id, video_id, content_id, filename, storage_key, storage_url,
                timestamp_seconds, aspect, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            FRAME_COLUMNS
        ))
        .bind(frame.id)
        .bind(frame.video_id)
        .bind(frame.content_id)
        .bind(&frame.filename)
        .bind(&frame.storage_key)
        .bind(&frame.storage_url)
        .bind(frame.timestamp_seconds)
        .bind(frame.aspect.as_str())
        .bind(frame.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_frame())
    }

    #[tracing::instrument(skip(self), fields(db.table = "frames", video_id = %video_id))]
    async fn list_by_video(&self, video_id: Uuid) -> Result<Vec<Frame>, AppError> {
        let rows: Vec<FrameRow> = sqlx::query_as::<Postgres, FrameRow>(&format!(
            "SELECT {} FROM frames WHERE video_id = $1 ORDER BY timestamp_seconds, created_at",
            FRAME_COLUMNS
        ))
        .bind(video_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.into_frame()).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "frames", db.operation = "delete", video_id = %video_id))]
    async fn delete_by_video(&self, video_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM frames WHERE video_id = $1")
            .bind(video_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
