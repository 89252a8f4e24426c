use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::MenuStore,
    error::AppError,
    models::{
        month::Month,
        submission::{NewSubmission, Submission, SubmissionStatus},
    },
    services::{mirror, portal::PortalService, sheets::SheetsClient},
};

/// What `accept` did with the submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accepted {
    pub submission: Submission,
    pub mirrored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror_error: Option<String>,
}

pub struct SubmissionService;

impl SubmissionService {
    /// Check the raw request body shape. Nothing is written here.
    pub fn validate(data: &Value) -> Result<NewSubmission, AppError> {
        let student_name =
            required_string(data, "studentName").ok_or_else(|| invalid("Invalid student name"))?;
        let student_id =
            required_string(data, "studentId").ok_or_else(|| invalid("Invalid student ID"))?;
        let month = required_string(data, "month")
            .and_then(|raw| raw.parse::<Month>().ok())
            .ok_or_else(|| invalid("Invalid month"))?;

        let raw = data
            .get("selections")
            .and_then(Value::as_object)
            .ok_or_else(|| invalid("Invalid selections"))?;
        let mut selections = BTreeMap::new();
        for (label, value) in raw {
            let selected = match value {
                Value::Bool(b) => *b,
                Value::String(s) => s.trim().eq_ignore_ascii_case("yes"),
                _ => return Err(invalid("Invalid selections")),
            };
            selections.insert(label.clone(), selected);
        }

        Ok(NewSubmission {
            student_name,
            student_id,
            month,
            selections,
        })
    }

    /// Validate, check the portal is accepting, store, then mirror.
    /// The store write and the sheet append are independent.
    pub async fn accept(
        store: &dyn MenuStore,
        sheets: Option<&SheetsClient>,
        data: &Value,
        now: DateTime<Utc>,
    ) -> Result<Accepted, AppError> {
        let draft = Self::validate(data)?;
        let portal = PortalService::accepting(store, draft.month, now).await?;

        let submission = draft.into_submission(now);
        store.insert_submission(&submission).await?;
        tracing::info!(
            "Stored submission {} for {} ({})",
            submission.id,
            submission.month,
            submission.student_id
        );

        let (mirrored, mirror_error) = match sheets {
            Some(client) => match mirror::mirror_submission(client, Some(&portal), &submission).await {
                Ok(mirrored) => (mirrored, None),
                Err(e) => {
                    tracing::warn!("Submission {} stored but not mirrored: {}", submission.id, e);
                    (false, Some(e.to_string()))
                }
            },
            None => (false, None),
        };

        Ok(Accepted {
            submission,
            mirrored,
            mirror_error,
        })
    }

    pub async fn list(
        store: &dyn MenuStore,
        month: Option<Month>,
    ) -> anyhow::Result<Vec<Submission>> {
        store.list_submissions(month).await
    }

    pub async fn get(store: &dyn MenuStore, id: Uuid) -> Result<Submission, AppError> {
        store
            .get_submission(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".into()))
    }

    pub async fn cancel(
        store: &dyn MenuStore,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Submission, AppError> {
        let submission = store
            .set_submission_status(id, SubmissionStatus::Cancelled, now)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".into()))?;
        tracing::info!("Cancelled submission {}", id);
        Ok(submission)
    }
}

fn required_string(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn invalid(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}
