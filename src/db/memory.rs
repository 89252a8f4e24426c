use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::MenuStore;
use crate::models::{
    month::Month,
    portal::Portal,
    submission::{Submission, SubmissionStatus},
};

/// Process-local store used for development runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    portals: RwLock<HashMap<Month, Portal>>,
    submissions: RwLock<Vec<Submission>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MenuStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn get_portal(&self, month: Month) -> anyhow::Result<Option<Portal>> {
        Ok(self.portals.read().await.get(&month).cloned())
    }

    async fn list_portals(&self) -> anyhow::Result<Vec<Portal>> {
        let mut portals: Vec<Portal> = self.portals.read().await.values().cloned().collect();
        portals.sort_by_key(|p| p.month);
        Ok(portals)
    }

    async fn save_portal(&self, portal: &Portal) -> anyhow::Result<()> {
        self.portals
            .write()
            .await
            .insert(portal.month, portal.clone());
        Ok(())
    }

    async fn insert_submission(&self, submission: &Submission) -> anyhow::Result<()> {
        self.submissions.write().await.push(submission.clone());
        Ok(())
    }

    async fn list_submissions(&self, month: Option<Month>) -> anyhow::Result<Vec<Submission>> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .iter()
            .filter(|s| month.map_or(true, |m| s.month == m))
            .cloned()
            .collect())
    }

    async fn get_submission(&self, id: Uuid) -> anyhow::Result<Option<Submission>> {
        let submissions = self.submissions.read().await;
        Ok(submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn set_submission_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Submission>> {
        let mut submissions = self.submissions.write().await;
        Ok(submissions.iter_mut().find(|s| s.id == id).map(|s| {
            s.status = status;
            s.updated_at = updated_at;
            s.clone()
        }))
    }
}
