//! Record store for video jobs and extracted frames.
//!
//! Store traits define the seam the pipeline works against; the Postgres
//! repositories are the production implementation, and the in-memory stores
//! back tests in downstream crates. Writes are durable and immediately
//! visible to subsequent reads; no cross-record transactions are assumed.

mod frames;
mod mem;
mod traits;
mod video_jobs;

pub use frames::PgFrameRepository;
pub use mem::{InMemoryFrameStore, InMemoryVideoJobStore};
pub use traits::{FrameStore, VideoJobStore};
pub use video_jobs::PgVideoJobRepository;

/// Run pending schema migrations.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
