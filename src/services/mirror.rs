use crate::{
    models::{
        menu::{slot_index, MEAL_SLOTS},
        portal::Portal,
        submission::Submission,
    },
    services::sheets::{SheetsClient, SheetsError},
};

const STATUS_COLUMN: usize = 2 + MEAL_SLOTS.len();
const TIMESTAMP_COLUMN: usize = STATUS_COLUMN + 1;

/// Spreadsheet and tab a month's rows are written to.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorTarget {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

/// The portal's own spreadsheet if linked, else the configured default.
pub fn resolve_target(sheets: &SheetsClient, portal: Option<&Portal>) -> Option<MirrorTarget> {
    if let Some((portal, id)) = portal.and_then(|p| p.spreadsheet_id.as_ref().map(|id| (p, id))) {
        return Some(MirrorTarget {
            spreadsheet_id: id.clone(),
            sheet_name: portal.month.sheet_name(),
        });
    }
    sheets.default_spreadsheet_id().map(|id| MirrorTarget {
        spreadsheet_id: id.to_string(),
        sheet_name: sheets.default_sheet_name().to_string(),
    })
}

/// Project a submission onto the fixed A..N columns.
pub fn submission_row(submission: &Submission) -> Vec<String> {
    let mut row = vec![String::new(); TIMESTAMP_COLUMN + 1];
    row[0] = submission.student_name.clone();
    row[1] = submission.student_id.clone();

    for (label, selected) in &submission.selections {
        match slot_index(label) {
            Some(index) => row[2 + index] = if *selected { "YES" } else { "NO" }.to_string(),
            None => tracing::warn!("No column mapping found for selection key: {}", label),
        }
    }

    row[STATUS_COLUMN] = "Submitted".to_string();
    row[TIMESTAMP_COLUMN] = submission.created_at.to_rfc3339();
    row
}

/// Append the submission to its mirror sheet. `Ok(false)` when no target is configured.
pub async fn mirror_submission(
    sheets: &SheetsClient,
    portal: Option<&Portal>,
    submission: &Submission,
) -> Result<bool, SheetsError> {
    let Some(target) = resolve_target(sheets, portal) else {
        tracing::debug!("No spreadsheet linked for {}, skipping mirror", submission.month);
        return Ok(false);
    };

    sheets
        .ensure_sheet_exists(&target.spreadsheet_id, &target.sheet_name)
        .await?;
    let range = sheets
        .append_row(&target.spreadsheet_id, &target.sheet_name, submission_row(submission))
        .await?;
    tracing::info!(
        "Mirrored submission {} to {} ({})",
        submission.id,
        target.spreadsheet_id,
        range.unwrap_or_default()
    );
    Ok(true)
}
