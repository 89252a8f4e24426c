//! Google Sheets mirror: a thin REST client over Sheets v4 and Drive v3.

mod auth;
mod types;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::SheetsConfig;
use crate::models::menu::MEAL_SLOTS;

use auth::TokenSource;
use types::{
    AddSheet, AppendResponse, BatchRequest, BatchUpdateRequest, CreateSpreadsheetRequest,
    CreatedSpreadsheet, GridProperties, NewSheetProperties, NewSpreadsheetProperties,
    PermissionRequest, SpreadsheetMetadata, ValueRange, ValueRangeInput,
};

/// Columns of a mirrored submission row, in order (A..N).
pub fn sheet_headers() -> Vec<String> {
    let mut headers = vec!["Student Name".to_string(), "ID Number".to_string()];
    headers.extend(MEAL_SLOTS.iter().map(|slot| slot.header.to_string()));
    headers.push("Status".to_string());
    headers.push("Timestamp".to_string());
    headers
}

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Google Sheets is not configured")]
    NotConfigured,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Spreadsheet not found. Please check the ID: {spreadsheet_id}")]
    SpreadsheetNotFound { spreadsheet_id: String },

    #[error("Permission denied. Make sure {principal} has access to the spreadsheet.")]
    PermissionDenied { principal: String },

    #[error("Google Sheets API request failed ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid Google API endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Google Sheets request error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpreadsheetInfo {
    pub title: Option<String>,
    pub sheet_titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkedSpreadsheet {
    pub id: String,
    pub url: String,
}

pub fn spreadsheet_url(spreadsheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}/edit")
}

/// A1 range on a named tab, quoting the tab name.
pub fn a1_range(sheet_name: &str, cells: &str) -> String {
    format!("'{}'!{}", sheet_name.replace('\'', "''"), cells)
}

pub struct SheetsClient {
    http: reqwest::Client,
    sheets_endpoint: String,
    drive_endpoint: String,
    tokens: TokenSource,
    default_spreadsheet_id: Option<String>,
    default_sheet_name: String,
}

impl SheetsClient {
    pub fn new(cfg: &SheetsConfig) -> Result<Self, SheetsError> {
        Ok(Self {
            http: reqwest::Client::new(),
            sheets_endpoint: cfg.sheets_endpoint.trim_end_matches('/').to_string(),
            drive_endpoint: cfg.drive_endpoint.trim_end_matches('/').to_string(),
            tokens: TokenSource::from_config(cfg)?,
            default_spreadsheet_id: cfg.default_spreadsheet_id.clone(),
            default_sheet_name: cfg.default_sheet_name.clone(),
        })
    }

    pub fn client_email(&self) -> Option<&str> {
        self.tokens.client_email()
    }

    pub fn default_spreadsheet_id(&self) -> Option<&str> {
        self.default_spreadsheet_id.as_deref()
    }

    pub fn default_sheet_name(&self) -> &str {
        &self.default_sheet_name
    }

    pub async fn access_token(&self) -> Result<String, SheetsError> {
        self.tokens.access_token(&self.http).await
    }

    pub async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, SheetsError> {
        let url = self.sheets_url(&["spreadsheets", spreadsheet_id])?;
        let request = self
            .http
            .get(url)
            .query(&[("fields", "properties.title,sheets.properties.title")]);
        let metadata: SpreadsheetMetadata = self.send(request, Some(spreadsheet_id)).await?;

        Ok(SpreadsheetInfo {
            title: metadata.properties.and_then(|p| p.title),
            sheet_titles: metadata
                .sheets
                .into_iter()
                .map(|sheet| sheet.properties.title)
                .collect(),
        })
    }

    /// Create the tab if missing and write the header row if `A1:N1` is empty.
    /// Returns whether the tab had to be created.
    pub async fn ensure_sheet_exists(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
    ) -> Result<bool, SheetsError> {
        let info = self.get_spreadsheet(spreadsheet_id).await?;
        let created = !info.sheet_titles.iter().any(|title| title == sheet_name);

        if created {
            tracing::info!("Creating sheet '{}' in {}", sheet_name, spreadsheet_id);
            let url = self.sheets_url(&["spreadsheets", &format!("{spreadsheet_id}:batchUpdate")])?;
            let body = BatchUpdateRequest {
                requests: vec![BatchRequest {
                    add_sheet: AddSheet {
                        properties: NewSheetProperties {
                            title: sheet_name.to_string(),
                            grid_properties: None,
                        },
                    },
                }],
            };
            let _: serde_json::Value = self
                .send(self.http.post(url).json(&body), Some(spreadsheet_id))
                .await?;
        }

        let header = self
            .read_values(spreadsheet_id, &a1_range(sheet_name, "A1:N1"))
            .await?;
        if header.is_empty() {
            tracing::info!("Writing header row to '{}'", sheet_name);
            self.write_values(spreadsheet_id, &a1_range(sheet_name, "A1"), vec![sheet_headers()])
                .await?;
        }

        Ok(created)
    }

    /// Append one positional row after the last row with data.
    pub async fn append_row(
        &self,
        spreadsheet_id: &str,
        sheet_name: &str,
        row: Vec<String>,
    ) -> Result<Option<String>, SheetsError> {
        let range = a1_range(sheet_name, "A1:N1");
        let url = self.sheets_url(&[
            "spreadsheets",
            spreadsheet_id,
            "values",
            &format!("{range}:append"),
        ])?;
        let body = ValueRangeInput {
            range,
            major_dimension: "ROWS",
            values: vec![row],
        };
        let request = self
            .http
            .post(url)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body);
        let response: AppendResponse = self.send(request, Some(spreadsheet_id)).await?;
        Ok(response.updates.and_then(|u| u.updated_range))
    }

    /// Cell values in `range`, stringified. Missing cells yield shorter rows.
    pub async fn read_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.sheets_url(&["spreadsheets", spreadsheet_id, "values", range])?;
        let response: ValueRange = self.send(self.http.get(url), Some(spreadsheet_id)).await?;

        Ok(response
            .values
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect())
    }

    pub async fn create_spreadsheet(
        &self,
        title: &str,
        sheet_name: &str,
    ) -> Result<LinkedSpreadsheet, SheetsError> {
        let url = self.sheets_url(&["spreadsheets"])?;
        let body = CreateSpreadsheetRequest {
            properties: NewSpreadsheetProperties {
                title: title.to_string(),
            },
            sheets: vec![AddSheet {
                properties: NewSheetProperties {
                    title: sheet_name.to_string(),
                    grid_properties: Some(GridProperties { frozen_row_count: 1 }),
                },
            }],
        };
        let created: CreatedSpreadsheet = self.send(self.http.post(url).json(&body), None).await?;
        tracing::info!("Created spreadsheet '{}' ({})", title, created.spreadsheet_id);

        let url = created
            .spreadsheet_url
            .unwrap_or_else(|| spreadsheet_url(&created.spreadsheet_id));
        Ok(LinkedSpreadsheet {
            id: created.spreadsheet_id,
            url,
        })
    }

    /// Grant `email` writer access through Drive.
    pub async fn share_with(&self, spreadsheet_id: &str, email: &str) -> Result<(), SheetsError> {
        let url = Self::url_with_segments(
            &self.drive_endpoint,
            &["files", spreadsheet_id, "permissions"],
        )?;
        let body = PermissionRequest {
            role: "writer",
            kind: "user",
            email_address: email.to_string(),
        };
        let request = self
            .http
            .post(url)
            .query(&[("sendNotificationEmail", "true")])
            .json(&body);
        let _: serde_json::Value = self.send(request, Some(spreadsheet_id)).await?;
        Ok(())
    }

    async fn write_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetsError> {
        let url = self.sheets_url(&["spreadsheets", spreadsheet_id, "values", range])?;
        let body = ValueRangeInput {
            range: range.to_string(),
            major_dimension: "ROWS",
            values,
        };
        let request = self
            .http
            .put(url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body);
        let _: serde_json::Value = self.send(request, Some(spreadsheet_id)).await?;
        Ok(())
    }

    fn sheets_url(&self, segments: &[&str]) -> Result<reqwest::Url, SheetsError> {
        Self::url_with_segments(&self.sheets_endpoint, segments)
    }

    fn url_with_segments(base: &str, segments: &[&str]) -> Result<reqwest::Url, SheetsError> {
        let invalid = |reason: String| SheetsError::InvalidEndpoint(format!("{base}: {reason}"));
        let mut url = reqwest::Url::parse(base).map_err(|e| invalid(e.to_string()))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| invalid("not an absolute URL".into()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        spreadsheet_id: Option<&str>,
    ) -> Result<T, SheetsError> {
        let token = self.access_token().await?;
        let response = request
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!("Google Sheets API error {}: {}", status, body);
        Err(match (status.as_u16(), spreadsheet_id) {
            (404, Some(id)) => SheetsError::SpreadsheetNotFound {
                spreadsheet_id: id.to_string(),
            },
            (403, _) => SheetsError::PermissionDenied {
                principal: self
                    .client_email()
                    .unwrap_or("the configured Google account")
                    .to_string(),
            },
            (code, _) => SheetsError::Api { status: code, body },
        })
    }
}
