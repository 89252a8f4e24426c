use std::env;

pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_DRIVE_ENDPOINT: &str = "https://www.googleapis.com/drive/v3";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL. When absent the API runs on the in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub admin_api_key: String,
    pub app_base_url: String,
    pub expiry_sweep_seconds: u64,
    pub sheets: SheetsConfig,
}

/// Google Sheets mirror settings.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub service_account_email: Option<String>,
    pub private_key: Option<String>,
    pub access_token: Option<String>,
    pub default_spreadsheet_id: Option<String>,
    pub default_sheet_name: String,
    pub sheets_endpoint: String,
    pub drive_endpoint: String,
    pub token_uri: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            service_account_email: None,
            private_key: None,
            access_token: None,
            default_spreadsheet_id: None,
            default_sheet_name: "Menu Selections".into(),
            sheets_endpoint: DEFAULT_SHEETS_ENDPOINT.into(),
            drive_endpoint: DEFAULT_DRIVE_ENDPOINT.into(),
            token_uri: DEFAULT_TOKEN_URI.into(),
        }
    }
}

impl SheetsConfig {
    /// Mirroring needs either a full service account or a pre-issued token.
    pub fn is_enabled(&self) -> bool {
        self.access_token.is_some()
            || (self.service_account_email.is_some() && self.private_key.is_some())
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: optional("DATABASE_URL"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            admin_api_key: required("ADMIN_API_KEY")?,
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            expiry_sweep_seconds: env::var("EXPIRY_SWEEP_SECONDS")
                .unwrap_or_else(|_| "60".into())
                .parse()?,
            sheets: SheetsConfig {
                service_account_email: optional("GOOGLE_SERVICE_ACCOUNT_EMAIL"),
                private_key: optional("GOOGLE_PRIVATE_KEY").map(unescape_newlines),
                access_token: optional("GOOGLE_ACCESS_TOKEN"),
                default_spreadsheet_id: optional("GOOGLE_SHEETS_ID"),
                default_sheet_name: env::var("GOOGLE_SHEET_NAME")
                    .unwrap_or_else(|_| "Menu Selections".into()),
                sheets_endpoint: env::var("GOOGLE_SHEETS_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_SHEETS_ENDPOINT.into()),
                drive_endpoint: env::var("GOOGLE_DRIVE_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_DRIVE_ENDPOINT.into()),
                token_uri: env::var("GOOGLE_TOKEN_URI")
                    .unwrap_or_else(|_| DEFAULT_TOKEN_URI.into()),
            },
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Keys pasted into .env files usually carry literal "\n" sequences.
fn unescape_newlines(raw: String) -> String {
    raw.replace("\\n", "\n")
}
