//! Aluro gateway server binary

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aluro_gateway::{routes, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            // Configuration failures are fatal before any tenant work starts
            tracing::error!(error = %err, "invalid gateway configuration");
            std::process::exit(1);
        }
    };

    let pool = aluro_shared::db::create_pool(&config.database_url).await?;
    aluro_shared::db::run_migrations(&pool).await?;
    let bind_address = config.bind_address.clone();
    let state = AppState::new(config, pool);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(%bind_address, "aluro gateway listening");
    axum::serve(listener, routes::create_router(state)).await?;

    Ok(())
}
