use std::sync::Arc;

use anyhow::Context;
use pith_db::SqlitePlayStateStore;
use pith_server::config::Settings;
use pith_server::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = Settings::load().context("failed to load settings")?;

    info!(db_path = %settings.db_path, "connecting to database");
    let pool = pith_db::connect(&settings.db_path)
        .await
        .context("failed to connect to database")?;
    pith_db::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("migrations complete");

    let store = Arc::new(SqlitePlayStateStore::new(pool));
    let app_state =
        AppState::from_settings(&settings, store).context("failed to set up channels")?;
    for channel in app_state.registry.list() {
        info!(id = %channel.id, sequence = channel.sequence, "channel registered");
    }

    let app = pith_server::routes::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address)
        .await
        .context("failed to bind")?;
    info!(addr = %settings.bind_address, root_url = %settings.root_url, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
