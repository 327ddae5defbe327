use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use chitchat_api::config::AppConfig;
use chitchat_api::payment::{PaymentGateway, StripeGateway};
use chitchat_api::routes;
use chitchat_api::state::AppState;
use chitchat_api::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        "Starting {} in {} mode",
        config.app_name(),
        config.environment_name()
    );

    let store = Store::connect(&config.database_url)
        .await
        .context("failed to connect store")?;

    let payments = config
        .stripe_sk
        .clone()
        .map(|key| Arc::new(StripeGateway::new(key)) as Arc<dyn PaymentGateway>);
    if payments.is_none() {
        tracing::warn!("STRIPE_SK not set; payment initiation is disabled");
    }

    let state = AppState::new(config, store, payments);

    let bind_addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    routes::serve(listener, state).await.context("server")?;

    Ok(())
}
