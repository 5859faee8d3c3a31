use std::sync::Arc;
use std::time::Duration;

use sentinel_core::config::RetentionConfig;
use sentinel_core::types::Plan;
use sentinel_history::HistoryStore;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::engine::cleanup_tenant;
use crate::types::RetentionPolicy;

/// Polls every hour and sweeps every tenant on file, via the usual
/// `tokio::select! { interval.tick(), shutdown.changed() }` loop. A tenant's
/// plan is not modeled in the durable store yet, so the sweep applies the
/// free-tier policy to every tenant unless a future plan lookup is wired
/// in; callers that need per-plan accuracy should call `cleanup_tenant`
/// directly with a resolved `RetentionPolicy`.
pub struct RetentionSweeper {
    history: Arc<HistoryStore>,
    config: RetentionConfig,
    interval: Duration,
}

impl RetentionSweeper {
    pub fn new(history: Arc<HistoryStore>, config: RetentionConfig) -> Self {
        Self { history, config, interval: Duration::from_secs(3600) }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[instrument(skip(self, shutdown))]
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if !self.config.enabled {
            info!("retention sweeper disabled by config");
            return;
        }

        info!("retention sweeper started");
        let mut interval = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick().await,
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("retention sweeper shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One sweep pass. Per-tenant failures are caught and logged without
    /// aborting the batch.
    async fn tick(&self) {
        let tenants = match self.history.list_active_tenants().await {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, "retention sweep failed to list tenants");
                return;
            }
        };

        for tenant_id in tenants {
            let policy = RetentionPolicy::for_plan(Plan::Free, &self.config);
            match cleanup_tenant(&self.history, &tenant_id, policy, self.config.batch_size).await {
                Ok(report) => {
                    if report.messages_deleted > 0 || report.sessions_deleted > 0 {
                        info!(
                            tenant = %tenant_id,
                            messages_deleted = report.messages_deleted,
                            sessions_deleted = report.sessions_deleted,
                            "retention sweep cleaned tenant"
                        );
                    }
                }
                Err(e) => warn!(tenant = %tenant_id, error = %e, "retention sweep failed for tenant"),
            }
        }
    }
}
