use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::MenuStore;
use crate::models::{
    month::Month,
    portal::Portal,
    submission::{Submission, SubmissionStatus},
};

const PORTAL_COLUMNS: &str =
    "month, is_open, closing_date, spreadsheet_id, spreadsheet_url, created_at, updated_at";

const SUBMISSION_COLUMNS: &str =
    "id, student_name, student_id, month, selections, status, created_at, updated_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// DB row struct. Month and status are TEXT and parsed on the way out.
#[derive(Debug, FromRow)]
struct PortalRow {
    month: String,
    is_open: bool,
    closing_date: Option<DateTime<Utc>>,
    spreadsheet_id: Option<String>,
    spreadsheet_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PortalRow> for Portal {
    type Error = anyhow::Error;

    fn try_from(row: PortalRow) -> Result<Self, Self::Error> {
        Ok(Portal {
            month: row.month.parse()?,
            is_open: row.is_open,
            closing_date: row.closing_date,
            spreadsheet_id: row.spreadsheet_id,
            spreadsheet_url: row.spreadsheet_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Month keys are TEXT, so ordering happens after parsing.
fn portals_in_calendar_order(rows: Vec<PortalRow>) -> anyhow::Result<Vec<Portal>> {
    let mut portals = rows
        .into_iter()
        .map(Portal::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;
    portals.sort_by_key(|p| p.month);
    Ok(portals)
}

#[derive(Debug, FromRow)]
struct SubmissionRow {
    id: Uuid,
    student_name: String,
    student_id: String,
    month: String,
    selections: Json<BTreeMap<String, bool>>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = anyhow::Error;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        Ok(Submission {
            id: row.id,
            student_name: row.student_name,
            student_id: row.student_id,
            month: row.month.parse()?,
            selections: row.selections.0,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl MenuStore for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_portal(&self, month: Month) -> anyhow::Result<Option<Portal>> {
        let row: Option<PortalRow> = sqlx::query_as(&format!(
            "SELECT {PORTAL_COLUMNS} FROM portals WHERE month = $1"
        ))
        .bind(month.key())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Portal::try_from).transpose()
    }

    async fn list_portals(&self) -> anyhow::Result<Vec<Portal>> {
        let rows: Vec<PortalRow> =
            sqlx::query_as(&format!("SELECT {PORTAL_COLUMNS} FROM portals"))
                .fetch_all(&self.pool)
                .await?;
        portals_in_calendar_order(rows)
    }

    async fn save_portal(&self, portal: &Portal) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO portals
                   (month, is_open, closing_date, spreadsheet_id, spreadsheet_url, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT (month) DO UPDATE SET
                   is_open = EXCLUDED.is_open,
                   closing_date = EXCLUDED.closing_date,
                   spreadsheet_id = EXCLUDED.spreadsheet_id,
                   spreadsheet_url = EXCLUDED.spreadsheet_url,
                   updated_at = EXCLUDED.updated_at"#,
        )
        .bind(portal.month.key())
        .bind(portal.is_open)
        .bind(portal.closing_date)
        .bind(&portal.spreadsheet_id)
        .bind(&portal.spreadsheet_url)
        .bind(portal.created_at)
        .bind(portal.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_submission(&self, submission: &Submission) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO submissions
                   (id, student_name, student_id, month, selections, status, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(submission.id)
        .bind(&submission.student_name)
        .bind(&submission.student_id)
        .bind(submission.month.key())
        .bind(Json(&submission.selections))
        .bind(submission.status.to_string())
        .bind(submission.created_at)
        .bind(submission.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_submissions(&self, month: Option<Month>) -> anyhow::Result<Vec<Submission>> {
        let rows: Vec<SubmissionRow> = match month {
            Some(month) => {
                sqlx::query_as(&format!(
                    "SELECT {SUBMISSION_COLUMNS} FROM submissions
                     WHERE month = $1
                     ORDER BY created_at"
                ))
                .bind(month.key())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {SUBMISSION_COLUMNS} FROM submissions ORDER BY created_at"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(Submission::try_from).collect()
    }

    async fn get_submission(&self, id: Uuid) -> anyhow::Result<Option<Submission>> {
        let row: Option<SubmissionRow> = sqlx::query_as(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Submission::try_from).transpose()
    }

    async fn set_submission_status(
        &self,
        id: Uuid,
        status: SubmissionStatus,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Submission>> {
        let row: Option<SubmissionRow> = sqlx::query_as(&format!(
            "UPDATE submissions SET status = $2, updated_at = $3
             WHERE id = $1
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(id)
        .bind(status.to_string())
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Submission::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(month: &str) -> PortalRow {
        let at = Utc::now();
        PortalRow {
            month: month.into(),
            is_open: false,
            closing_date: None,
            spreadsheet_id: None,
            spreadsheet_url: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn portal_rows_come_back_in_calendar_order() {
        let rows = vec![row("september"), row("january"), row("june")];
        let months: Vec<Month> = portals_in_calendar_order(rows)
            .unwrap()
            .into_iter()
            .map(|p| p.month)
            .collect();
        assert_eq!(months, vec![Month::January, Month::June, Month::September]);
    }

    #[test]
    fn unknown_month_key_is_an_error() {
        assert!(portals_in_calendar_order(vec![row("smarch")]).is_err());
    }
}
