#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use std::sync::Arc;
use tourdesk::{
    api::{self, AppState},
    config::{database, settings},
    core::notify::TracingNotifier,
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Load settings (config.toml + environment overrides)
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    if settings.auth.admin_token_sha256.is_none() {
        warn!("No admin token digest configured; admin routes will reject every request");
    }

    // 4. Connect to the database and make sure the schema exists
    let db = database::create_connection(&database::get_database_url())
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Serve the API
    let notifier = Arc::new(TracingNotifier::new(
        settings.notifications.support_email.clone(),
    ));
    let state = AppState::new(db, notifier, &settings);
    let address = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", address, e))?;
    info!("Listening on {}", address);

    axum::serve(listener, api::app(state)).await?;
    Ok(())
}
