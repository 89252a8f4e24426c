use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;

use crate::{
    error::AppError,
    middleware::admin::AdminAuth,
    models::submission::MonthQuery,
    routes::parse_optional_month,
    services::{
        diagnostics::{self, DiagnosticReport},
        mirror::resolve_target,
    },
    AppState,
};

const KEY_PREVIEW_CHARS: usize = 20;

/// GET /admin/diagnostics?month=: walk the Sheets connection step by step.
pub async fn run_diagnostics(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<MonthQuery>,
) -> Result<Json<DiagnosticReport>, AppError> {
    let month = parse_optional_month(query.month.as_deref())?;
    let portal = match month {
        Some(month) => state.store.get_portal(month).await?,
        None => None,
    };
    let target = state
        .sheets
        .as_deref()
        .and_then(|client| resolve_target(client, portal.as_ref()));

    let report = diagnostics::run(state.sheets.as_deref(), target.as_ref()).await;
    match report.failed_step() {
        Some(step) => tracing::warn!(
            "Sheets diagnostics failed at '{}': {}",
            step.name,
            report.error.as_deref().unwrap_or_default()
        ),
        None => tracing::info!("Sheets diagnostics passed"),
    }
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsConfigView {
    pub enabled: bool,
    pub client_email: String,
    pub private_key: String,
    pub access_token: bool,
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

/// GET /admin/diagnostics/config: which credentials are present, secrets masked.
pub async fn sheets_config(State(state): State<AppState>, _admin: AdminAuth) -> Json<SheetsConfigView> {
    let cfg = &state.config.sheets;
    Json(SheetsConfigView {
        enabled: cfg.is_enabled(),
        client_email: cfg
            .service_account_email
            .clone()
            .unwrap_or_else(|| "Not available".into()),
        private_key: cfg
            .private_key
            .as_deref()
            .map(mask_key)
            .unwrap_or_else(|| "Not available".into()),
        access_token: cfg.access_token.is_some(),
        spreadsheet_id: cfg
            .default_spreadsheet_id
            .clone()
            .unwrap_or_else(|| "Not available".into()),
        sheet_name: cfg.default_sheet_name.clone(),
    })
}

fn mask_key(key: &str) -> String {
    let preview: String = key.chars().take(KEY_PREVIEW_CHARS).collect();
    format!("{preview}...")
}
