use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::Utc;

use crate::{
    error::AppError,
    middleware::admin::AdminAuth,
    models::portal::{ActivatePortalRequest, OpenPortalRequest, PortalView},
    routes::parse_month,
    services::portal::{Activation, PortalService},
    AppState,
};

pub async fn list_portals(State(state): State<AppState>) -> Result<Json<Vec<PortalView>>, AppError> {
    let portals = PortalService::list(state.store.as_ref(), Utc::now()).await?;
    Ok(Json(portals))
}

pub async fn get_portal(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Result<Json<PortalView>, AppError> {
    let month = parse_month(&month)?;
    let view = PortalService::status(state.store.as_ref(), month, Utc::now()).await?;
    Ok(Json(view))
}

/// POST /admin/portals/{month}/open. The body is optional; `{}` opens for the default window.
pub async fn open_portal(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(month): Path<String>,
    body: Result<Option<Json<OpenPortalRequest>>, JsonRejection>,
) -> Result<Json<PortalView>, AppError> {
    let month = parse_month(&month)?;
    let req = body?.map(|Json(b)| b).unwrap_or_default();
    let now = Utc::now();
    let portal = PortalService::open(
        state.store.as_ref(),
        state.sheets.as_deref(),
        month,
        &req,
        now,
    )
    .await?;
    Ok(Json(PortalView::from_portal(&portal, now)))
}

pub async fn close_portal(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(month): Path<String>,
) -> Result<Json<PortalView>, AppError> {
    let month = parse_month(&month)?;
    let now = Utc::now();
    let portal = PortalService::close(state.store.as_ref(), month, now).await?;
    Ok(Json(PortalView::from_portal(&portal, now)))
}

/// Close every other open month, then open this one.
pub async fn activate_portal(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(month): Path<String>,
    body: Result<Option<Json<ActivatePortalRequest>>, JsonRejection>,
) -> Result<Json<Activation>, AppError> {
    let month = parse_month(&month)?;
    let duration_days = body?.and_then(|Json(b)| b.duration_days);
    let activation = PortalService::activate_exclusive(
        state.store.as_ref(),
        state.sheets.as_deref(),
        month,
        duration_days,
        Utc::now(),
    )
    .await?;
    Ok(Json(activation))
}
