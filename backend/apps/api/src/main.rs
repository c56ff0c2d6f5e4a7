//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use anyhow::Context;
use auth::AuthConfig;
use axum::{
    http,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,audit=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_config = load_auth_config()?;
    tracing::info!(config = ?auth_config, "Auth configuration loaded");

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = auth::auth_router(pool, &auth_config)?
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("LISTEN_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the auth configuration from the environment
fn load_auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = match env::var("TOKEN_SECRET") {
        Ok(secret_b64) => AuthConfig {
            token_secret: platform::crypto::from_base64(&secret_b64)
                .context("TOKEN_SECRET must be base64")?,
            ..AuthConfig::default()
        },
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("TOKEN_SECRET not set, using a random key; tokens will not survive a restart");
            AuthConfig::with_random_secret()
        }
        Err(_) => anyhow::bail!("TOKEN_SECRET must be set in production"),
    };

    if let Ok(minutes) = env::var("TOKEN_TTL_MINUTES") {
        config.token_ttl = ttl_from_minutes(&minutes)?;
    }

    if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
        config.password_pepper = Some(pepper.into_bytes());
    }

    if let Ok(prefixes) = env::var("ADMIN_PATH_PREFIXES") {
        let prefixes: Vec<String> = prefixes
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if !prefixes.is_empty() {
            config.admin_path_prefixes = prefixes;
        }
    }

    Ok(config)
}

fn ttl_from_minutes(value: &str) -> anyhow::Result<Duration> {
    let minutes: u64 = value
        .trim()
        .parse()
        .context("TOKEN_TTL_MINUTES must be a whole number")?;
    let secs = minutes
        .checked_mul(60)
        .context("TOKEN_TTL_MINUTES is too large")?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_from_minutes() {
        assert_eq!(ttl_from_minutes(" 60\n").unwrap(), Duration::from_secs(3600));
        assert_eq!(ttl_from_minutes("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_ttl_from_minutes_rejects_bad_input() {
        assert!(ttl_from_minutes("sixty").is_err());
        assert!(ttl_from_minutes("-5").is_err());

        let err = ttl_from_minutes(&u64::MAX.to_string()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
