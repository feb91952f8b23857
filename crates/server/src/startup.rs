use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use common::pagination::PaginationPolicy;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use sea_orm::DatabaseConnection;
use service::catalog::{repo::SeaOrmCatalogRepository, CatalogRepository, CatalogService};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth::TokenVerifier};
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// 优先读取 config.toml（CONFIG_PATH），缺失时回退到环境变量与默认值
pub fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(file_err) => {
            warn!(error = %file_err, "config file unavailable, falling back to environment");
            AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
        }
    }
}

/// Connect, then apply migrations and demo seed according to `[database]` flags
pub async fn prepare_database(cfg: &AppConfig) -> Result<DatabaseConnection, StartupError> {
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    models::db::test_connection(&db).await.map_err(|e| StartupError::Database(e.to_string()))?;

    if cfg.database.run_migrations {
        models::db::migrate(&db).await.map_err(|e| StartupError::Database(e.to_string()))?;
        info!("migrations applied");
    }
    if cfg.database.seed_demo_data {
        let inserted = models::seed::seed_if_empty(&db).await.map_err(|e| StartupError::Database(e.to_string()))?;
        info!(inserted, "demo seed checked");
    }
    Ok(db)
}

/// Wire state and router from configuration and an open connection
pub fn build_app(cfg: &AppConfig, db: DatabaseConnection) -> Router {
    let policy = PaginationPolicy {
        default_page_size: cfg.pagination.default_page_size,
        max_page_size: cfg.pagination.max_page_size,
    };
    let repo: Arc<dyn CatalogRepository> = Arc::new(SeaOrmCatalogRepository::new(db));
    let catalog = CatalogService::with_policy(repo, policy);

    if cfg.auth.static_tokens.is_empty() && cfg.auth.jwt_secret.trim().is_empty() {
        warn!("no static tokens and no JWT_SECRET configured; every catalog request will be rejected");
    }
    let verifier = TokenVerifier::from_config(&cfg.auth);

    let state = ServerState::new(catalog, verifier);
    let timeout = cfg.server.request_timeout_secs.map(Duration::from_secs);
    routes::build_router(state, build_cors(), timeout)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, draining connections");
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = load_config()?;
    let db = prepare_database(&cfg).await?;
    let app = build_app(&cfg, db);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))?;
    info!(%addr, "starting catalog server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("catalog server stopped");
    Ok(())
}
