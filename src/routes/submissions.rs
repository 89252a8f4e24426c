use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::admin::AdminAuth,
    models::submission::{MonthQuery, Submission},
    routes::parse_optional_month,
    services::submissions::{Accepted, SubmissionService},
    AppState,
};

/// POST /submissions. The body is validated field by field so that shape
/// errors come back with the same messages as the form shows.
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Accepted>), AppError> {
    let Json(body) = body?;
    let accepted = SubmissionService::accept(
        state.store.as_ref(),
        state.sheets.as_deref(),
        &body,
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(accepted)))
}

pub async fn list_submissions(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<Submission>>, AppError> {
    let month = parse_optional_month(query.month.as_deref())?;
    let submissions = SubmissionService::list(state.store.as_ref(), month).await?;
    Ok(Json(submissions))
}

pub async fn get_submission(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Submission>, AppError> {
    let submission = SubmissionService::get(state.store.as_ref(), id).await?;
    Ok(Json(submission))
}

/// Marks the record cancelled. The sheet row is left alone.
pub async fn cancel_submission(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Submission>, AppError> {
    let submission = SubmissionService::cancel(state.store.as_ref(), id, Utc::now()).await?;
    Ok(Json(submission))
}
