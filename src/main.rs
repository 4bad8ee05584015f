use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use igreja_api::config::AppConfig;
use igreja_api::database::otp_store::PgOtpStore;
use igreja_api::database::profile_store::PgProfileStore;
use igreja_api::identity::AdminApiClient;
use igreja_api::messaging::HttpMessagingDispatcher;
use igreja_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let pool = PgPoolOptions::new()
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let state = AppState {
        profiles: Arc::new(PgProfileStore::new(pool.clone())),
        otps: Arc::new(PgOtpStore::new(pool)),
        identity: Arc::new(AdminApiClient::new(&config.identity)),
        messaging: Arc::new(HttpMessagingDispatcher::new(&config.messaging)),
    };

    let app = igreja_api::app(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Igreja API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
