use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{
    error::AppError,
    middleware::admin::AdminAuth,
    routes::parse_month,
    services::{
        mirror::resolve_target,
        sheets::{a1_range, SheetsError},
    },
    AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRows {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// GET /admin/sheets/{month}/rows: the mirror sheet as the spreadsheet sees it.
pub async fn sheet_rows(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(month): Path<String>,
) -> Result<Json<SheetRows>, AppError> {
    let month = parse_month(&month)?;
    let client = state.sheets.as_deref().ok_or(SheetsError::NotConfigured)?;
    let portal = state.store.get_portal(month).await?;
    let target = resolve_target(client, portal.as_ref())
        .ok_or_else(|| AppError::NotFound(format!("No spreadsheet linked for {month}")))?;

    let mut values = client
        .read_values(&target.spreadsheet_id, &a1_range(&target.sheet_name, "A:N"))
        .await?
        .into_iter();
    let headers = values.next().unwrap_or_default();

    Ok(Json(SheetRows {
        spreadsheet_id: target.spreadsheet_id,
        sheet_name: target.sheet_name,
        headers,
        rows: values.collect(),
    }))
}
