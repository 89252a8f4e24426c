use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meal_portal_api::{
    config::Config,
    db::{self, MemoryStore, MenuStore, PgStore},
    routes,
    services::{expiry_scheduler, sheets::SheetsClient},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let store: Arc<dyn MenuStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            info!("Database connected and migrations applied");
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, submissions are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let sheets = if config.sheets.is_enabled() {
        let client = SheetsClient::new(&config.sheets)?;
        info!(
            "Google Sheets mirror configured ({})",
            client.client_email().unwrap_or("static token")
        );
        Some(Arc::new(client))
    } else {
        info!("Google Sheets not configured, mirror disabled");
        None
    };

    expiry_scheduler::start(store.clone(), config.expiry_sweep_seconds);

    let state = AppState {
        store,
        sheets,
        config: config.clone(),
    };

    // The portal front end and local development origins.
    let base = config.app_base_url.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let Ok(o) = origin.to_str() else {
            return false;
        };
        o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") || o == base
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-admin-key"),
        ]))
        .allow_origin(cors_origin);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(64 * 1024));

    let addr = format!("{}:{}", config.host, config.port);
    info!("Meal portal API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
