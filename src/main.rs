use anyhow::Result;
use snippet_store::{
    clock::SystemClock,
    config::AppConfig,
    db,
    models::identifier::OsRngIdGenerator,
    routes,
    services::{paste_service::PasteService, paste_store::PasteStore},
};
use std::{path::Path, sync::Arc};
use tokio::fs;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + maintenance flags ---
    let (cfg, actions) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting snippet-store with config: {:?}", cfg);

    // --- Ensure the database directory exists ---
    let db_path = cfg
        .database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    // --- Initialize SQLite connection ---
    let pool = db::connect(&cfg.database_url).await?;
    db::run_migrations(&pool).await?;

    if actions.migrate {
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Initialize core service ---
    let service = PasteService::new(
        PasteStore::new(Arc::new(pool)),
        Arc::new(OsRngIdGenerator),
        Arc::new(SystemClock),
        cfg.limits,
    );

    if actions.purge_expired {
        let removed = service.purge_expired().await?;
        tracing::info!("Purge complete, {} pastes removed.", removed);
        return Ok(());
    }

    if let Some(path) = &actions.export {
        let archive = service.export_archive(false).await?;
        fs::write(path, &archive).await?;
        tracing::info!("Wrote archive to {}", path.display());
        return Ok(());
    }

    let app = routes::app(service);

    // --- Start server ---
    let listener = routes::bind_listener(&cfg).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
