pub mod diagnostics;
pub mod export;
pub mod health;
pub mod menu;
pub mod portals;
pub mod sheets;
pub mod submissions;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{error::AppError, models::month::Month, AppState};

/// Route table. Layers (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/menu", get(menu::list_slots))
        // Public portal + intake
        .route("/portals", get(portals::list_portals))
        .route("/portals/{month}", get(portals::get_portal))
        .route("/submissions", post(submissions::submit))
        // Admin
        .route("/admin/portals/{month}/open", post(portals::open_portal))
        .route("/admin/portals/{month}/close", post(portals::close_portal))
        .route("/admin/portals/{month}/activate", post(portals::activate_portal))
        .route("/admin/submissions", get(submissions::list_submissions))
        .route("/admin/submissions/{id}", get(submissions::get_submission))
        .route("/admin/submissions/{id}/cancel", post(submissions::cancel_submission))
        .route("/admin/export", get(export::export_csv))
        .route("/admin/sheets/{month}/rows", get(sheets::sheet_rows))
        .route("/admin/diagnostics", get(diagnostics::run_diagnostics))
        .route("/admin/diagnostics/config", get(diagnostics::sheets_config))
        .with_state(state)
}

pub(crate) fn parse_month(raw: &str) -> Result<Month, AppError> {
    Ok(raw.parse()?)
}

/// `?month=` is optional; an empty value means "all months".
pub(crate) fn parse_optional_month(raw: Option<&str>) -> Result<Option<Month>, AppError> {
    raw.filter(|m| !m.trim().is_empty()).map(parse_month).transpose()
}
