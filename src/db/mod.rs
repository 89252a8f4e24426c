pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    month::Month,
    portal::Portal,
    submission::{Submission, SubmissionStatus},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Primary store for portals and submissions. Writes are last-write-wins.
#[async_trait]
pub trait MenuStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn ping(&self) -> anyhow::Result<()>;

    async fn get_portal(&self, month: Month) -> anyhow::Result<Option<Portal>>;

    async fn list_portals(&self) -> anyhow::Result<Vec<Portal>>;

    /// Create or fully replace the portal for `portal.month`.
    async fn save_portal(&self, portal: &Portal) -> anyhow::Result<()>;

    async fn insert_submission(&self, submission: &Submission) -> anyhow::Result<()>;

    /// Oldest first. `None` lists every month.
    async fn list_submissions(&self, month: Option<Month>) -> anyhow::Result<Vec<Submission>>;

    async fn get_submission(&self, id: Uuid) -> anyhow::Result<Option<Submission>>;

    async fn set_submission_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Submission>>;
}

pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Run the migrations embedded from ./migrations/
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
