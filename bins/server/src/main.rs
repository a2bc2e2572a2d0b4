//! finadmin API server
//!
//! Main entry point for the finadmin backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use finadmin_api::{AppState, create_router};
use finadmin_core::archive::InvoiceArchive;
use finadmin_core::extraction::{GeminiClient, InvoiceProcessor};
use finadmin_db::connect_with;
use finadmin_shared::AppConfig;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "finadmin=debug,tower_http=debug".into());
    let json = std::env::var("FINADMIN_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let gemini = GeminiClient::from_config(&config.gemini).context("Invalid Gemini configuration")?;
    if !config.gemini.is_configured() {
        warn!("Gemini API key is not configured; PDF extraction is disabled");
    }
    let processor = InvoiceProcessor::new(Arc::new(gemini));
    info!(model = processor.model_name(), "Invoice processor ready");

    let archive = match config.upload.archive_dir.as_deref() {
        Some(dir) => {
            let archive = InvoiceArchive::local(dir).context("Failed to open invoice archive")?;
            info!(archive_dir = dir, "Archiving uploaded invoices");
            Some(archive)
        }
        None => None,
    };

    let state = AppState {
        db: Arc::new(db),
        processor,
        archive,
        app: Arc::new(config.app.clone()),
        upload: config.upload.clone(),
    };

    let app = create_router(state, &config.cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(environment = %config.app.environment, "Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
