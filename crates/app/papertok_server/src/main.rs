//! PaperTok API server binary.
//!
//! Reads configuration from the environment (and `.env`), picks the user
//! store and cache implementations, and serves the HTTP API until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use papertok_api::config::ApiConfig;
use papertok_core::arxiv::ArxivClient;
use papertok_core::cache::{Cache, NoopCache, TtlCache};
use papertok_core::papers::PaperEntry;
use papertok_core::users::{MemoryUserStore, PgUserStore, UserStore};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// CLI arguments. Anything not given here comes from the environment.
#[derive(Parser, Debug)]
#[command(name = "papertok_server", about = "PaperTok API server", version)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR")]
    bind_addr: Option<String>,

    /// PostgreSQL connection URL. Users are kept in memory when unset.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,papertok_api=debug,papertok_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env()?;
    if let Some(addr) = args.bind_addr {
        config.bind_addr = addr;
    }
    if let Some(url) = args.database_url.filter(|u| !u.is_empty()) {
        config.database_url = Some(url);
    }
    info!(?config, "starting papertok_server");

    let users: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            info!(max_connections = args.max_connections, "connecting to PostgreSQL");
            let pool = PgPoolOptions::new()
                .max_connections(args.max_connections)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(url)
                .await?;

            info!("running database migrations");
            papertok_api::migrate(&pool).await?;
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, user accounts will not survive a restart");
            Arc::new(MemoryUserStore::new())
        }
    };

    let source = Arc::new(ArxivClient::new(config.arxiv_config())?);

    let mut sweeper = None;
    let cache: Arc<dyn Cache<PaperEntry>> = if config.cache_enabled {
        let ttl_cache = Arc::new(TtlCache::<PaperEntry>::new());
        sweeper = Some(ttl_cache.spawn_sweeper(config.cache_sweep_interval));
        ttl_cache
    } else {
        info!("paper cache disabled");
        Arc::new(NoopCache)
    };

    let bind_addr = config.bind_addr.clone();
    let state = papertok_api::AppState::new(config, users, source, cache)?;
    let pruner = state
        .config
        .rate_limit
        .enabled
        .then(|| state.rate_limiter.spawn_pruner(state.config.cache_sweep_interval));
    let app = papertok_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    for task in [sweeper, pruner].into_iter().flatten() {
        task.abort();
    }
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
