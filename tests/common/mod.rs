#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use meal_portal_api::{
    config::{Config, SheetsConfig},
    db::MemoryStore,
    routes,
    services::sheets::SheetsClient,
    AppState,
};

pub const ADMIN_KEY: &str = "test-admin-key";

pub fn test_config(sheets: SheetsConfig) -> Config {
    Config {
        database_url: None,
        host: "127.0.0.1".into(),
        port: 0,
        admin_api_key: ADMIN_KEY.into(),
        app_base_url: "http://localhost:3000".into(),
        expiry_sweep_seconds: 60,
        sheets,
    }
}

/// Sheets settings pointed at a mock server, authenticated by a static token.
pub fn mock_sheets_config(base_uri: &str, default_spreadsheet_id: Option<&str>) -> SheetsConfig {
    SheetsConfig {
        access_token: Some("test-token".into()),
        default_spreadsheet_id: default_spreadsheet_id.map(String::from),
        sheets_endpoint: base_uri.to_string(),
        drive_endpoint: base_uri.to_string(),
        token_uri: format!("{base_uri}/token"),
        ..SheetsConfig::default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn without_sheets() -> Self {
        Self::build(SheetsConfig::default())
    }

    pub fn with_sheets(sheets: SheetsConfig) -> Self {
        Self::build(sheets)
    }

    fn build(sheets_config: SheetsConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let sheets = sheets_config
            .is_enabled()
            .then(|| SheetsClient::new(&sheets_config).expect("sheets client"))
            .map(Arc::new);
        let state = AppState {
            store: store.clone(),
            sheets,
            config: Arc::new(test_config(sheets_config)),
        };
        Self {
            router: routes::router(state),
            store,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn admin_get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, Some(ADMIN_KEY)).await
    }

    pub async fn get_with_key(&self, uri: &str, key: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, Some(key)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), None).await
    }

    pub async fn admin_post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), Some(ADMIN_KEY)).await
    }

    /// Raw response for non-JSON endpoints such as the CSV export.
    pub async fn admin_raw(&self, uri: &str) -> (StatusCode, header::HeaderMap, String) {
        let request = Request::builder()
            .uri(uri)
            .header("X-Admin-Key", ADMIN_KEY)
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        admin_key: Option<&str>,
    ) -> (StatusCode, Value) {
        match body {
            Some(json) => {
                self.send_raw(method, uri, Some("application/json"), json.to_string(), admin_key)
                    .await
            }
            None => self.send_raw(method, uri, None, String::new(), admin_key).await,
        }
    }

    /// Send `body` verbatim, with whatever content type the caller picks.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: String,
        admin_key: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = admin_key {
            builder = builder.header("X-Admin-Key", key);
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body)).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }
}

pub fn june_submission(name: &str, id: &str) -> Value {
    serde_json::json!({
        "studentName": name,
        "studentId": id,
        "month": "June",
        "selections": {
            "Monday Night - Chicken Curry": true,
            "Wednesday Night - Chicken Curry": false,
            "S - Night - Boiled Egg": "yes"
        }
    })
}
