//! Family Moments API server
//!
//! Serves the REST API over Postgres and the Cloudinary media store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use family_core::domains::auth::JwtService;
use family_core::domains::family::reconcile_family_links;
use family_core::domains::posts::PgPostStore;
use family_core::domains::users::PgUserStore;
use family_core::kernel::{db, CloudinaryMediaStore, ServerDeps};
use family_core::server::{build_app, HttpSettings};
use family_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,family_core=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Family Moments server");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        environment = %config.environment,
        production = config.is_production(),
        media_folder = %config.cloudinary.folder,
        "Configuration loaded"
    );

    // Database setup
    let pool = db::connect(&config.database_url, config.db_timeout).await?;
    db::migrate(&pool).await?;
    tracing::info!("Database migrations applied");

    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));
    let media = CloudinaryMediaStore::new(config.cloudinary.clone())?;

    let deps = ServerDeps::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgPostStore::new(pool)),
        Arc::new(media),
        jwt_service,
    );

    // Repair memberships left one-sided by joins interrupted before the last restart
    if let Err(e) = reconcile_family_links(deps.users.as_ref(), false).await {
        tracing::error!(error = %e, "Family membership reconciliation failed");
    }

    let app = build_app(
        deps,
        HttpSettings {
            environment: config.environment.clone(),
            client_url: config.client_url.clone(),
            request_timeout: config.request_timeout,
            rate_limit_enabled: config.rate_limit_enabled,
        },
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind server address")?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
