use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::month::Month;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Stored portal record, one per calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portal {
    pub month: Month,
    pub is_open: bool,
    pub closing_date: Option<DateTime<Utc>>,
    pub spreadsheet_id: Option<String>,
    pub spreadsheet_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Portal {
    pub fn closed(month: Month, now: DateTime<Utc>) -> Self {
        Self {
            month,
            is_open: false,
            closing_date: None,
            spreadsheet_id: None,
            spreadsheet_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Open and not past its closing date. A missing closing date never expires.
    pub fn is_accepting(&self, now: DateTime<Utc>) -> bool {
        self.is_open && self.closing_date.map_or(true, |closing| closing > now)
    }

    /// Still flagged open although the deadline has passed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open && self.closing_date.is_some_and(|closing| closing <= now)
    }

    /// Whole days left, rounded up. `None` when closed or without a deadline.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        if !self.is_accepting(now) {
            return None;
        }
        let ms = (self.closing_date? - now).num_milliseconds();
        Some((ms + DAY_MS - 1) / DAY_MS)
    }
}

/// Portal as reported to clients, with expiry already applied.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalView {
    pub month: Month,
    pub is_open: bool,
    pub closing_date: Option<DateTime<Utc>>,
    pub days_remaining: Option<i64>,
    pub spreadsheet_id: Option<String>,
    pub spreadsheet_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PortalView {
    pub fn from_portal(portal: &Portal, now: DateTime<Utc>) -> Self {
        let accepting = portal.is_accepting(now);
        Self {
            month: portal.month,
            is_open: accepting,
            closing_date: if accepting { portal.closing_date } else { None },
            days_remaining: portal.days_remaining(now),
            spreadsheet_id: portal.spreadsheet_id.clone(),
            spreadsheet_url: portal.spreadsheet_url.clone(),
            created_at: Some(portal.created_at),
            updated_at: Some(portal.updated_at),
        }
    }

    /// A month that has never been opened.
    pub fn unopened(month: Month) -> Self {
        Self {
            month,
            is_open: false,
            closing_date: None,
            days_remaining: None,
            spreadsheet_id: None,
            spreadsheet_url: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Body for POST /admin/portals/{month}/open.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPortalRequest {
    pub duration_days: Option<i64>,
    pub admin_email: Option<String>,
}

/// Body for POST /admin/portals/{month}/activate.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivatePortalRequest {
    pub duration_days: Option<i64>,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn open_until(closing: DateTime<Utc>) -> Portal {
        Portal {
            is_open: true,
            closing_date: Some(closing),
            ..Portal::closed(Month::June, now())
        }
    }

    #[test]
    fn accepting_until_the_deadline() {
        let portal = open_until(now() + Duration::hours(1));
        assert!(portal.is_accepting(now()));
        assert!(!portal.is_accepting(now() + Duration::hours(1)));
        assert!(portal.is_overdue(now() + Duration::hours(1)));
    }

    #[test]
    fn closed_portal_never_accepts() {
        let portal = Portal::closed(Month::June, now());
        assert!(!portal.is_accepting(now()));
        assert!(!portal.is_overdue(now()));
        assert_eq!(portal.days_remaining(now()), None);
    }

    #[test]
    fn days_remaining_rounds_up() {
        let portal = open_until(now() + Duration::days(2) + Duration::minutes(1));
        assert_eq!(portal.days_remaining(now()), Some(3));

        let portal = open_until(now() + Duration::days(3));
        assert_eq!(portal.days_remaining(now()), Some(3));

        let portal = open_until(now() + Duration::seconds(5));
        assert_eq!(portal.days_remaining(now()), Some(1));
    }

    #[test]
    fn view_hides_expired_deadline() {
        let portal = open_until(now() - Duration::minutes(1));
        let view = PortalView::from_portal(&portal, now());
        assert!(!view.is_open);
        assert_eq!(view.closing_date, None);
        assert_eq!(view.days_remaining, None);
    }
}
