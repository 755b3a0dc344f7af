//! Entry point: load config, wire dependencies, and run the server.

use accountd::auth::{Argon2Hasher, CookiePolicy, TokenIssuer};
use accountd::config::Config;
use accountd::db::{self, PgUserRepository};
use accountd::{create_app, AppState};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = db::create_pool(&config.database_url).await?;
    let users = Arc::new(PgUserRepository::new(db_pool));
    let tokens = TokenIssuer::new(config.jwt_secret.clone());
    let cookies = CookiePolicy::new(
        config.production,
        time::Duration::seconds(config.cookie_max_age_secs),
    );

    let state = AppState::new(users, Arc::new(Argon2Hasher), tokens, cookies);
    let app = create_app(state).layer(TraceLayer::new_for_http());

    tracing::info!(
        addr = %config.server_addr,
        production = config.production,
        "listening"
    );
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
