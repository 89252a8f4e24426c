use chrono::NaiveDate;

use crate::models::{menu::MEAL_SLOTS, month::Month, submission::Submission};

pub fn csv_headers() -> Vec<&'static str> {
    let mut headers = vec!["Student Name", "ID Number"];
    headers.extend(MEAL_SLOTS.iter().map(|slot| slot.header));
    headers.push("Submitted At");
    headers
}

/// One row per submission, selections rendered as Yes/No.
pub fn submissions_csv(submissions: &[Submission]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(csv_headers())?;

    for submission in submissions {
        let mut record = vec![submission.student_name.clone(), submission.student_id.clone()];
        record.extend(MEAL_SLOTS.iter().map(|slot| {
            let selected = submission.selections.get(slot.label).copied().unwrap_or(false);
            if selected { "Yes" } else { "No" }.to_string()
        }));
        record.push(submission.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn export_filename(month: Option<Month>, today: NaiveDate) -> String {
    let scope = month.map_or_else(|| "all".to_string(), Month::key);
    format!("menu-export-{scope}-{}.csv", today.format("%Y-%m-%d"))
}
