use chrono::{DateTime, Datelike, Duration, Utc};

use crate::{
    db::MenuStore,
    error::AppError,
    models::{
        month::Month,
        portal::{OpenPortalRequest, Portal, PortalView},
    },
    services::sheets::{spreadsheet_url, SheetsClient},
};

pub const DEFAULT_OPEN_DAYS: i64 = 30;
pub const DEFAULT_ACTIVATE_DAYS: i64 = 3;
const MAX_OPEN_DAYS: i64 = 365;

pub struct PortalService;

/// Result of an exclusive activation.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    pub portal: PortalView,
    pub closed: Vec<Month>,
    pub reopened: bool,
}

impl PortalService {
    /// All twelve months in calendar order, closed where nothing is stored.
    pub async fn list(store: &dyn MenuStore, now: DateTime<Utc>) -> anyhow::Result<Vec<PortalView>> {
        let stored = store.list_portals().await?;
        Ok(Month::ALL
            .into_iter()
            .map(|month| match stored.iter().find(|p| p.month == month) {
                Some(portal) => PortalView::from_portal(portal, now),
                None => PortalView::unopened(month),
            })
            .collect())
    }

    pub async fn status(
        store: &dyn MenuStore,
        month: Month,
        now: DateTime<Utc>,
    ) -> anyhow::Result<PortalView> {
        Ok(match store.get_portal(month).await? {
            Some(portal) => PortalView::from_portal(&portal, now),
            None => PortalView::unopened(month),
        })
    }

    /// Open `month` until now + duration. Reuses a linked spreadsheet, else
    /// creates one when the mirror is configured.
    pub async fn open(
        store: &dyn MenuStore,
        sheets: Option<&SheetsClient>,
        month: Month,
        req: &OpenPortalRequest,
        now: DateTime<Utc>,
    ) -> Result<Portal, AppError> {
        let days = duration_days(req.duration_days, DEFAULT_OPEN_DAYS)?;
        let existing = store.get_portal(month).await?;

        let linked = existing
            .as_ref()
            .and_then(|p| p.spreadsheet_id.clone().map(|id| (id, p.spreadsheet_url.clone())));

        let (spreadsheet_id, spreadsheet_url) = match (linked, sheets) {
            (Some((id, url)), _) => {
                tracing::info!("Portal {} reuses spreadsheet {}", month, id);
                let url = url.unwrap_or_else(|| spreadsheet_url(&id));
                (Some(id), Some(url))
            }
            (None, Some(client)) => {
                let title = format!("{} {} Menu Selections", month, now.year());
                let sheet_name = month.sheet_name();
                let created = client.create_spreadsheet(&title, &sheet_name).await?;
                client.ensure_sheet_exists(&created.id, &sheet_name).await?;

                if let Some(email) = req.admin_email.as_deref().filter(|e| !e.trim().is_empty()) {
                    if let Err(e) = client.share_with(&created.id, email.trim()).await {
                        tracing::warn!("Could not share spreadsheet {} with {}: {}", created.id, email, e);
                    }
                }
                (Some(created.id), Some(created.url))
            }
            (None, None) => {
                tracing::info!("Google Sheets not configured, opening {} without a mirror", month);
                (None, None)
            }
        };

        let portal = Portal {
            month,
            is_open: true,
            closing_date: Some(now + Duration::days(days)),
            spreadsheet_id,
            spreadsheet_url,
            created_at: existing.as_ref().map_or(now, |p| p.created_at),
            updated_at: now,
        };
        store.save_portal(&portal).await?;
        tracing::info!("Opened portal {} for {} day(s)", month, days);
        Ok(portal)
    }

    /// Close regardless of prior state. The spreadsheet link is kept.
    pub async fn close(
        store: &dyn MenuStore,
        month: Month,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Portal> {
        let portal = match store.get_portal(month).await? {
            Some(existing) => Portal {
                is_open: false,
                closing_date: None,
                updated_at: now,
                ..existing
            },
            None => Portal::closed(month, now),
        };
        store.save_portal(&portal).await?;
        tracing::info!("Closed portal {}", month);
        Ok(portal)
    }

    /// Close every other open portal, then open `month` unless it is already accepting.
    pub async fn activate_exclusive(
        store: &dyn MenuStore,
        sheets: Option<&SheetsClient>,
        month: Month,
        requested_days: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Activation, AppError> {
        let days = duration_days(requested_days, DEFAULT_ACTIVATE_DAYS)?;
        let mut closed = Vec::new();
        let mut current = None;

        for portal in store.list_portals().await? {
            if portal.month == month {
                current = Some(portal);
            } else if portal.is_open {
                Self::close(store, portal.month, now).await?;
                closed.push(portal.month);
            }
        }

        let (portal, reopened) = match current {
            Some(portal) if portal.is_accepting(now) => (portal, false),
            _ => {
                let req = OpenPortalRequest {
                    duration_days: Some(days),
                    admin_email: None,
                };
                (Self::open(store, sheets, month, &req, now).await?, true)
            }
        };

        Ok(Activation {
            portal: PortalView::from_portal(&portal, now),
            closed,
            reopened,
        })
    }

    /// The portal for `month` if it is accepting submissions right now.
    pub async fn accepting(
        store: &dyn MenuStore,
        month: Month,
        now: DateTime<Utc>,
    ) -> Result<Portal, AppError> {
        match store.get_portal(month).await? {
            Some(portal) if portal.is_accepting(now) => Ok(portal),
            _ => Err(AppError::Validation(format!("Portal for {month} is not open"))),
        }
    }

    /// Close every portal whose deadline has passed. Returns the months closed.
    pub async fn expire_overdue(
        store: &dyn MenuStore,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Month>> {
        let mut expired = Vec::new();
        for portal in store.list_portals().await? {
            if portal.is_overdue(now) {
                Self::close(store, portal.month, now).await?;
                expired.push(portal.month);
            }
        }
        Ok(expired)
    }
}

fn duration_days(requested: Option<i64>, default: i64) -> Result<i64, AppError> {
    let days = requested.unwrap_or(default);
    if !(1..=MAX_OPEN_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "durationDays must be between 1 and {MAX_OPEN_DAYS}"
        )));
    }
    Ok(days)
}
