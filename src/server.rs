use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::JwtKeys;
use crate::config::{AppConfig, Environment, SecurityConfig};
use crate::database::{DatabaseManager, ExpenseStore, MemoryExpenseStore, PgExpenseStore};
use crate::handlers::{protected, public};
use crate::state::AppState;

/// Build the full router for `state`
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected
        .merge(protected::expense_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Where expenses are kept for this process
#[derive(Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres(String),
    Memory,
}

/// Choose the backend for `database_url`.
///
/// `memory:` opts in to the in-memory store anywhere. An unset URL falls back
/// to it only in development; other environments refuse to start.
pub fn select_backend(
    environment: Environment,
    database_url: Option<&str>,
) -> anyhow::Result<StoreBackend> {
    match database_url.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) if DatabaseManager::is_memory_url(url) => Ok(StoreBackend::Memory),
        Some(url) => Ok(StoreBackend::Postgres(url.to_string())),
        None if environment == Environment::Development => Ok(StoreBackend::Memory),
        None => anyhow::bail!(
            "DATABASE_URL is required in {:?} (set DATABASE_URL=memory: to run without persistence)",
            environment
        ),
    }
}

/// Build the store selected by DATABASE_URL and the environment
pub async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ExpenseStore>> {
    let database_url = std::env::var("DATABASE_URL").ok();

    match select_backend(config.environment, database_url.as_deref())? {
        StoreBackend::Postgres(url) => {
            let pool = DatabaseManager::connect(&url, &config.database).await?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            Ok(Arc::new(PgExpenseStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory expense store (data is not persisted)");
            Ok(Arc::new(MemoryExpenseStore::new()))
        }
    }
}

/// Build state from config and serve until Ctrl-C or SIGTERM
pub async fn serve(config: &AppConfig, port: u16) -> anyhow::Result<()> {
    let jwt = JwtKeys::from_config(&config.security)
        .map_err(|e| anyhow::anyhow!("{} (set JWT_SECRET_KEY)", e))?;
    let store = build_store(config).await?;
    let app = app(AppState::new(store, jwt), config);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Expense API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Expense API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
