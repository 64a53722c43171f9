//! Fraud Risk Decision Engine - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # In-memory audit store, fallback scoring
//! cargo run --bin fraud-engine-api
//!
//! # PostgreSQL audit store and a local model
//! API_DATABASE_URL=postgres://... API_MODEL_PATH=/models/fraud.json cargo run --bin fraud-engine-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` / `API_PORT` - Bind address (default: 0.0.0.0:8080)
//! * `API_AUTH_ENABLED` - Require bearer tokens on `/api/v1` (default: false)
//! * `API_JWT_SECRET` / `API_JWT_EXPIRATION_SECS` - Token settings
//! * `API_DATABASE_URL` - PostgreSQL audit store; in-memory when unset
//! * `API_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `API_LOG_FORMAT` - `json` or `pretty` (default: pretty)
//! * `API_MODEL_PATH` / `API_INFERENCE_ENDPOINT` - Probability backend
//! * `API_VENDOR_API_URL` / `API_VENDOR_API_KEY` - External vendor risk service
//! * `API_WEATHER_API_KEY` - OpenWeather key
//! * `API_ENGINE__RULES__HIGH_AMOUNT_THRESHOLD` etc. - Engine settings

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_fraud::adapters::{
    BlacklistVendorRisk, HttpVendorRisk, HttpVendorRiskConfig, OpenWeatherConfig, OpenWeatherLookup,
};
use domain_fraud::{AuditSink, FraudEngine, FraudEngineBuilder};
use infra_db::{connect, run_migrations, PgAuditStore};
use interface_api::config::{ApiConfig, LogFormat};
use interface_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();
    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        auth_enabled = config.auth_enabled,
        "Starting Fraud Risk Decision Engine API Server"
    );

    let engine_config = config.engine_config();
    let mut builder = FraudEngine::builder(engine_config.clone());
    builder = with_external_signals(builder, &config, &engine_config)?;

    let mut store_health = None;
    if let Some(url) = config.database_url() {
        let pool = connect(url, &config.database_pool)
            .await
            .context("failed to connect to the audit database")?;
        run_migrations(&pool)
            .await
            .context("failed to run audit store migrations")?;
        let store = Arc::new(PgAuditStore::new(pool));
        builder = builder.with_audit_sink(Arc::clone(&store) as Arc<dyn AuditSink>);
        store_health = Some(store);
        tracing::info!("Using PostgreSQL audit store");
    } else {
        tracing::warn!("API_DATABASE_URL not set, using the in-memory audit store");
    }

    let engine = builder.build().context("invalid engine configuration")?;
    let mut state = AppState::new(Arc::new(engine), config.clone());
    if let Some(store) = store_health {
        state = state.with_store_health(store);
    }
    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server_addr()))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads configuration from `API_*` variables
///
/// Falls back to reading the variables one at a time if the structured
/// load fails, e.g. on a malformed nested engine setting.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|error| {
        eprintln!("Structured configuration failed ({error}), falling back to individual variables");
        let defaults = ApiConfig::default();
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        ApiConfig {
            host: var("API_HOST").unwrap_or(defaults.host),
            port: var("API_PORT").and_then(|p| p.parse().ok()).unwrap_or(defaults.port),
            jwt_secret: var("API_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expiration_secs: var("API_JWT_EXPIRATION_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.jwt_expiration_secs),
            auth_enabled: var("API_AUTH_ENABLED")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.auth_enabled),
            database_url: var("API_DATABASE_URL").or_else(|| var("DATABASE_URL")),
            database_pool: defaults.database_pool,
            log_level: var("API_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: var("API_LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
            model_path: var("API_MODEL_PATH"),
            inference_endpoint: var("API_INFERENCE_ENDPOINT"),
            vendor_api_url: var("API_VENDOR_API_URL"),
            vendor_api_key: var("API_VENDOR_API_KEY"),
            weather_api_key: var("API_WEATHER_API_KEY"),
            engine: defaults.engine,
        }
    })
}

/// Installs the tracing subscriber, JSON or human-readable
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Plugs in the HTTP vendor and weather providers when configured
fn with_external_signals(
    mut builder: FraudEngineBuilder,
    config: &ApiConfig,
    engine: &domain_fraud::EngineConfig,
) -> anyhow::Result<FraudEngineBuilder> {
    let signal_timeout = engine.timeouts.signal();
    let breaker = engine.scorer.circuit_breaker.clone();

    if let Some(base_url) = config.vendor_api_url() {
        let vendor = HttpVendorRisk::new(
            HttpVendorRiskConfig {
                base_url: base_url.to_string(),
                api_key: config.vendor_api_key.clone(),
                timeout: signal_timeout,
                circuit_breaker: breaker.clone(),
            },
            BlacklistVendorRisk::new(engine.rules.blacklist.clone()),
        )
        .context("failed to build the vendor risk client")?;
        builder = builder.with_vendor_risk(Arc::new(vendor));
        tracing::info!(base_url, "Using external vendor risk service");
    }

    if let Some(api_key) = config.weather_api_key() {
        let weather = OpenWeatherLookup::new(OpenWeatherConfig {
            timeout: signal_timeout,
            circuit_breaker: breaker,
            ..OpenWeatherConfig::new(api_key)
        })
        .context("failed to build the weather client")?;
        builder = builder.with_weather(Arc::new(weather));
        tracing::info!("Using OpenWeather lookups");
    }

    Ok(builder)
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
