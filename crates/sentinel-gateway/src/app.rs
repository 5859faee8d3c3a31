use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use redis::aio::ConnectionManager;
use sentinel_core::config::AppConfig;
use sentinel_history::HistoryStore;
use sentinel_llm::{LlmProvider, OpenAiProvider};
use sentinel_orchestrator::Orchestrator;
use sentinel_retention::RetentionSweeper;
use sentinel_sessions::SessionStore;
use sentinel_tenants::TenantRegistry;
use sentinel_vault::SecretVault;

use crate::rate_limit::RateLimiter;

/// Central shared state — passed as `Arc<AppState>` to every handler.
pub struct AppState {
    pub config: AppConfig,
    pub tenant_registry: Arc<TenantRegistry>,
    pub vault: Arc<SecretVault>,
    pub history: Arc<HistoryStore>,
    pub orchestrator: Arc<Orchestrator>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let history = Arc::new(HistoryStore::connect(
            &config.database.url,
            config.database.max_connections,
            config.database.connect_timeout_secs,
        ).await?);
        history.migrate().await?;

        let session_store = SessionStore::connect(&config.hot_store.url).await?;

        let tenant_registry = Arc::new(TenantRegistry::new(history.pool().clone()));
        let vault = Arc::new(SecretVault::new(
            &config.security.master_key,
            sentinel_core::config::MASTER_KEY_PBKDF2_ITERATIONS,
        ));

        let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(
            config.llm.api_key.clone(),
            Some(config.llm.base_url.clone()),
            config.llm.model.clone(),
        ));

        let orchestrator = Arc::new(Orchestrator::new(
            tenant_registry.clone(),
            vault.clone(),
            session_store,
            (*history).clone(),
            llm,
        ));

        let redis_client = redis::Client::open(config.hot_store.url.clone())?;
        let redis_conn = ConnectionManager::new(redis_client).await?;
        let rate_limiter = Arc::new(RateLimiter::new(redis_conn));

        Ok(Self {
            config,
            tenant_registry,
            vault,
            history,
            orchestrator,
            rate_limiter,
        })
    }

    pub fn retention_sweeper(&self) -> RetentionSweeper {
        RetentionSweeper::new(self.history.clone(), self.config.retention.clone())
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/api/v1/telegram/webhook/{token}",
            post(crate::http::webhooks::telegram_webhook),
        )
        .route(
            "/api/v1/whatsapp/webhook/{token}",
            get(crate::http::webhooks::whatsapp_verify).post(crate::http::webhooks::whatsapp_webhook),
        )
        .route("/api/v1/messages", post(crate::http::webhooks::generic_ingress))
        .route("/process", post(crate::http::webhooks::process_internal))
        .route("/sessions", get(crate::http::history::list_sessions))
        .route("/sessions/{id}", get(crate::http::history::get_session))
        .route("/messages", get(crate::http::history::list_messages))
        .route("/analytics", get(crate::http::history::analytics))
        .route("/analytics/daily", get(crate::http::history::analytics_daily))
        .route("/cleanup", post(crate::http::retention::cleanup))
        .route("/cleanup/estimate", post(crate::http::retention::cleanup_estimate))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
