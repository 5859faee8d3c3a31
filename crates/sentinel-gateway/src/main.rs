use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use sentinel_core::config::AppConfig;
use sentinel_core::types::{Plan, TenantId};
use sentinel_gateway::app::{build_router, AppState};
use sentinel_retention::RetentionPolicy;

#[derive(Parser)]
#[command(name = "sentinel-gateway")]
struct Cli {
    /// Explicit config file path; falls back to SENTINEL_CONFIG then ~/.sentinel/sentinel.toml.
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway (default if no subcommand is given).
    Serve,
    /// Apply pending database migrations and exit.
    Migrate,
    /// Run one retention sweep for a single tenant and exit.
    Cleanup {
        #[arg(long)]
        tenant_id: String,
        #[arg(long)]
        plan: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentinel_gateway=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.or_else(|| std::env::var("SENTINEL_CONFIG").ok());
    let config = AppConfig::load(config_path.as_deref())
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => migrate(config).await,
        Command::Cleanup { tenant_id, plan } => cleanup_once(config, tenant_id, plan).await,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let state = Arc::new(AppState::connect(config).await?);
    let sweeper = state.retention_sweeper();
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(sweeper.run(shutdown_rx));

    let router = build_router(state.clone());
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!("sentinel gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await?;

    let _ = shutdown_tx.send(true);
    Ok(())
}

async fn migrate(config: AppConfig) -> anyhow::Result<()> {
    let history = sentinel_history::HistoryStore::connect(
        &config.database.url,
        config.database.max_connections,
        config.database.connect_timeout_secs,
    )
    .await?;
    history.migrate().await?;
    info!("migrations applied");
    Ok(())
}

async fn cleanup_once(config: AppConfig, tenant_id: String, plan: Option<String>) -> anyhow::Result<()> {
    let history = sentinel_history::HistoryStore::connect(
        &config.database.url,
        config.database.max_connections,
        config.database.connect_timeout_secs,
    )
    .await?;
    let plan: Plan = plan.and_then(|p| p.parse().ok()).unwrap_or_default();
    let policy = RetentionPolicy::for_plan(plan, &config.retention);
    let report = sentinel_retention::cleanup_tenant(
        &history,
        &TenantId::from(tenant_id),
        policy,
        config.retention.batch_size,
    )
    .await?;
    info!(messages_deleted = report.messages_deleted, sessions_deleted = report.sessions_deleted, "cleanup complete");
    Ok(())
}
