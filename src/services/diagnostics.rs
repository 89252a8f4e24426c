//! Step-by-step connectivity check against the Sheets mirror.
//!
//! Steps run in order and depend on each other; the first failure ends the
//! run, so later steps are neither attempted nor listed.

use serde::Serialize;

use crate::services::{
    mirror::MirrorTarget,
    sheets::{a1_range, SheetsClient},
};

pub const AUTHORIZE: &str = "Authorize client";
pub const ACCESS_SPREADSHEET: &str = "Access spreadsheet";
pub const LIST_SHEETS: &str = "List available sheets";
pub const CHECK_TARGET_SHEET: &str = "Check if target sheet exists";
pub const READ_SHEET_DATA: &str = "Read sheet data";

const SAMPLE_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Attempting,
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticStep {
    pub name: &'static str,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticConfig {
    pub spreadsheet_id: Option<String>,
    pub sheet_name: Option<String>,
    pub client_email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSample {
    pub row_count: usize,
    pub headers: Vec<String>,
    pub sample_rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub success: bool,
    pub config: DiagnosticConfig,
    pub steps: Vec<DiagnosticStep>,
    pub error: Option<String>,
    pub spreadsheet_title: Option<String>,
    pub available_sheets: Vec<String>,
    pub data: Option<SheetSample>,
}

impl DiagnosticReport {
    fn begin(&mut self, name: &'static str) {
        self.steps.push(DiagnosticStep {
            name,
            status: StepStatus::Attempting,
        });
    }

    fn finish(&mut self, status: StepStatus) {
        if let Some(step) = self.steps.last_mut() {
            step.status = status;
        }
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.finish(StepStatus::Error);
        self.error = Some(message.into());
    }

    pub fn failed_step(&self) -> Option<&DiagnosticStep> {
        self.steps.iter().find(|s| s.status == StepStatus::Error)
    }
}

pub async fn run(sheets: Option<&SheetsClient>, target: Option<&MirrorTarget>) -> DiagnosticReport {
    let mut report = DiagnosticReport {
        success: false,
        config: DiagnosticConfig {
            spreadsheet_id: target.map(|t| t.spreadsheet_id.clone()),
            sheet_name: target.map(|t| t.sheet_name.clone()),
            client_email: sheets.and_then(|s| s.client_email()).map(String::from),
        },
        steps: Vec::new(),
        error: None,
        spreadsheet_title: None,
        available_sheets: Vec::new(),
        data: None,
    };

    report.begin(AUTHORIZE);
    let Some(client) = sheets else {
        report.fail("Google Sheets is not configured");
        return report;
    };
    if let Err(e) = client.access_token().await {
        report.fail(e.to_string());
        return report;
    }
    report.finish(StepStatus::Success);

    report.begin(ACCESS_SPREADSHEET);
    let Some(target) = target else {
        report.fail("No spreadsheet is linked or configured");
        return report;
    };
    let info = match client.get_spreadsheet(&target.spreadsheet_id).await {
        Ok(info) => info,
        Err(e) => {
            report.fail(e.to_string());
            return report;
        }
    };
    report.spreadsheet_title = info.title;
    report.finish(StepStatus::Success);

    report.begin(LIST_SHEETS);
    if info.sheet_titles.is_empty() {
        report.fail("Could not retrieve sheet information from the spreadsheet");
        return report;
    }
    report.available_sheets = info.sheet_titles;
    report.finish(StepStatus::Success);

    report.begin(CHECK_TARGET_SHEET);
    if !report.available_sheets.contains(&target.sheet_name) {
        let message = format!(
            "Sheet '{}' does not exist in this spreadsheet. Available sheets: {}",
            target.sheet_name,
            report.available_sheets.join(", ")
        );
        report.fail(message);
        return report;
    }
    report.finish(StepStatus::Success);

    report.begin(READ_SHEET_DATA);
    let range = a1_range(&target.sheet_name, "A:Z");
    match client.read_values(&target.spreadsheet_id, &range).await {
        Err(e) => {
            report.fail(e.to_string());
        }
        Ok(rows) if rows.is_empty() => {
            report.finish(StepStatus::Warning);
            report.error = Some("Sheet exists but contains no data".into());
        }
        Ok(mut rows) => {
            report.finish(StepStatus::Success);
            let row_count = rows.len();
            let headers = rows.remove(0);
            report.data = Some(SheetSample {
                row_count,
                headers,
                sample_rows: rows.into_iter().take(SAMPLE_ROWS).collect(),
            });
            report.success = true;
        }
    }

    report
}
