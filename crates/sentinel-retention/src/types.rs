use sentinel_core::config::RetentionConfig;
use sentinel_core::types::Plan;

/// Per-tenant retention window, derived from the tenant's plan but
/// overridable per request (e.g. a `POST /cleanup` body).
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub messages_retention_days: i64,
    pub sessions_retention_days: i64,
}

impl RetentionPolicy {
    /// Plan-default policy, per the mandated retention table.
    pub fn for_plan(plan: Plan, cfg: &RetentionConfig) -> Self {
        let days = match plan {
            Plan::Free => cfg.free_days,
            Plan::Starter => cfg.starter_days,
            Plan::Pro => cfg.pro_days,
            Plan::Enterprise => cfg.enterprise_days,
        };
        Self { messages_retention_days: days, sessions_retention_days: days }
    }

    /// Clamp caller-supplied retention windows to the enforced minimum.
    pub fn clamped(messages_days: i64, sessions_days: i64, cfg: &RetentionConfig) -> Self {
        Self {
            messages_retention_days: messages_days.max(cfg.min_retention_days),
            sessions_retention_days: sessions_days.max(cfg.min_retention_days),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct CleanupReport {
    pub messages_deleted: u64,
    pub sessions_deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_policy_matches_the_mandated_table() {
        let cfg = RetentionConfig::default();
        assert_eq!(RetentionPolicy::for_plan(Plan::Free, &cfg).messages_retention_days, 30);
        assert_eq!(RetentionPolicy::for_plan(Plan::Starter, &cfg).messages_retention_days, 90);
        assert_eq!(RetentionPolicy::for_plan(Plan::Pro, &cfg).messages_retention_days, 365);
        assert_eq!(RetentionPolicy::for_plan(Plan::Enterprise, &cfg).messages_retention_days, 730);
    }

    #[test]
    fn clamped_policy_enforces_minimum() {
        let cfg = RetentionConfig::default();
        let policy = RetentionPolicy::clamped(5, 5, &cfg);
        assert_eq!(policy.messages_retention_days, 30);
    }
}
