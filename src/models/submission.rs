use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::month::Month;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    Cancelled,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(SubmissionStatus::Submitted),
            "cancelled" => Ok(SubmissionStatus::Cancelled),
            _ => Err(anyhow::anyhow!("Unknown submission status: {s}")),
        }
    }
}

/// One student's yes/no answers for a month, keyed by slot label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub student_name: String,
    pub student_id: String,
    pub month: Month,
    pub selections: BTreeMap<String, bool>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated submission that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub student_name: String,
    pub student_id: String,
    pub month: Month,
    pub selections: BTreeMap<String, bool>,
}

impl NewSubmission {
    pub fn into_submission(self, now: DateTime<Utc>) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            student_name: self.student_name,
            student_id: self.student_id,
            month: self.month,
            selections: self.selections,
            status: SubmissionStatus::Submitted,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Query params for GET /admin/submissions and GET /admin/export.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}
