//! Application setup: database, storage, pipeline wiring, and routes.

pub mod server;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use framepulse_core::Config;
use framepulse_db::{FrameStore, PgFrameRepository, PgVideoJobRepository, VideoJobStore};
use framepulse_processing::{
    FfmpegFrameExtractor, FfprobeProber, FrameExtractor, Prober, ScreenshotOrchestrator,
    VideoIngestService,
};
use framepulse_storage::{FileStore, LocalFileStore};
use framepulse_worker::{ExtractionContext, ExtractionQueue, QueueConfig};

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;

pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router), anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    framepulse_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let files: Arc<dyn FileStore> = Arc::new(
        LocalFileStore::new(config.storage_path.clone(), config.storage_base_url.clone())
            .await
            .context("Failed to initialize local file store")?,
    );

    let jobs: Arc<dyn VideoJobStore> = Arc::new(PgVideoJobRepository::new(pool.clone()));
    let frames: Arc<dyn FrameStore> = Arc::new(PgFrameRepository::new(pool.clone()));

    let prober: Arc<dyn Prober> = Arc::new(
        FfprobeProber::new(config.ffprobe_path.clone()).context("Invalid ffprobe path")?,
    );
    let extractor: Arc<dyn FrameExtractor> = Arc::new(
        FfmpegFrameExtractor::new(config.ffmpeg_path.clone()).context("Invalid ffmpeg path")?,
    );

    let pipeline = Arc::new(ScreenshotOrchestrator::new(
        jobs.clone(),
        frames.clone(),
        files.clone(),
        prober,
        extractor,
    ));
    let context: Arc<dyn ExtractionContext> = pipeline.clone();
    let queue = ExtractionQueue::new(
        QueueConfig {
            max_concurrent_jobs: config.extraction_max_concurrent_jobs,
        },
        Arc::downgrade(&context),
    );

    let ingest = VideoIngestService::new(jobs, frames, files, queue.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        ingest,
        pipeline,
        queue,
    });

    let router = build_router(state.clone(), &config);

    Ok((state, router))
}

fn build_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/api/v0/videos", post(handlers::video_upload::ingest_video))
        .route(
            "/api/v0/videos/{id}/status",
            get(handlers::video_status::video_status),
        )
        .route(
            "/api/v0/videos/{id}/retrigger",
            post(handlers::video_retrigger::retrigger_video),
        )
        .route(
            "/api/v0/videos/{id}/frames",
            get(handlers::video_frames::list_frames),
        )
        .route(
            "/api/v0/videos/{id}",
            delete(handlers::video_delete::delete_video),
        )
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/docs"))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(config.max_video_size_bytes))
        .with_state(state)
}
