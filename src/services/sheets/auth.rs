use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::SheetsError;
use crate::config::SheetsConfig;

const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive.file";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

enum Credentials {
    ServiceAccount {
        client_email: String,
        private_key: String,
        token_uri: String,
    },
    Static(String),
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Claims of the self-signed assertion exchanged for an access token.
#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

/// Hands out bearer tokens for the Sheets and Drive APIs.
pub struct TokenSource {
    credentials: Credentials,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenSource {
    pub fn from_config(cfg: &SheetsConfig) -> Result<Self, SheetsError> {
        let credentials = match (&cfg.service_account_email, &cfg.private_key, &cfg.access_token) {
            (Some(email), Some(key), _) => Credentials::ServiceAccount {
                client_email: email.clone(),
                private_key: key.clone(),
                token_uri: cfg.token_uri.clone(),
            },
            (_, _, Some(token)) => Credentials::Static(token.clone()),
            _ => return Err(SheetsError::NotConfigured),
        };
        Ok(Self {
            credentials,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::ServiceAccount { client_email, .. } => Some(client_email),
            Credentials::Static(_) => None,
        }
    }

    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, SheetsError> {
        let (client_email, private_key, token_uri) = match &self.credentials {
            Credentials::Static(token) => return Ok(token.clone()),
            Credentials::ServiceAccount {
                client_email,
                private_key,
                token_uri,
            } => (client_email, private_key, token_uri),
        };

        let now = Utc::now();
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(token.token.clone());
            }
        }

        let assertion = sign_assertion(client_email, private_key, token_uri, now)?;
        let response = http
            .post(token_uri.as_str())
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SheetsError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::Auth(e.to_string()))?;
        tracing::debug!("Obtained Google access token for {}", client_email);

        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(token.access_token)
    }
}

fn sign_assertion(
    client_email: &str,
    private_key: &str,
    token_uri: &str,
    now: DateTime<Utc>,
) -> Result<String, SheetsError> {
    let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
        .map_err(|e| SheetsError::Auth(format!("invalid private key: {e}")))?;
    let claims = AssertionClaims {
        iss: client_email,
        scope: SCOPES,
        aud: token_uri,
        iat: now.timestamp(),
        exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
    };
    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| SheetsError::Auth(format!("failed to sign assertion: {e}")))
}
