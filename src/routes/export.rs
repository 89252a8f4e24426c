use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    error::AppError,
    middleware::admin::AdminAuth,
    models::submission::MonthQuery,
    routes::parse_optional_month,
    services::{
        export::{export_filename, submissions_csv},
        submissions::SubmissionService,
    },
    AppState,
};

/// GET /admin/export?month=: CSV download of stored submissions.
pub async fn export_csv(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<MonthQuery>,
) -> Result<Response, AppError> {
    let month = parse_optional_month(query.month.as_deref())?;
    let submissions = SubmissionService::list(state.store.as_ref(), month).await?;
    let body = submissions_csv(&submissions)?;
    let filename = export_filename(month, Utc::now().date_naive());

    tracing::info!("Exported {} submission(s) as {}", submissions.len(), filename);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}
