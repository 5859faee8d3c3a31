use chrono::{DateTime, Utc};
use sentinel_core::types::{ChannelKind, SessionState, TenantId};
use serde::Serialize;

use crate::error::Result;
use crate::store::HistoryStore;

const CONVERSION_WINDOW_DAYS: i32 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct TenantAnalytics {
    pub total_messages: i64,
    pub messages_last_30d: i64,
    pub by_channel: Vec<(ChannelKind, i64)>,
    pub by_state: Vec<(SessionState, i64)>,
    pub daily_series_30d: Vec<(DateTime<Utc>, i64)>,
    pub conversion_rate: f64,
}

/// Aggregations over the durable message log. Reads the same pool as
/// `HistoryStore` — folded in as a module rather than a separate crate
/// given its small share of the overall system.
pub async fn tenant_analytics(store: &HistoryStore, tenant_id: &TenantId) -> Result<TenantAnalytics> {
    let by_channel = store.count_by_channel(tenant_id).await?;
    let by_state = store.count_by_state(tenant_id).await?;
    let daily_series_30d = store.daily_message_counts(tenant_id, 30).await?;

    let total_messages: i64 = by_channel.iter().map(|(_, n)| n).sum();
    let messages_last_30d: i64 = daily_series_30d.iter().map(|(_, n)| n).sum();

    let converted_in_window = store.count_converted_in_window(tenant_id, CONVERSION_WINDOW_DAYS).await?;
    let total_in_window = store.count_sessions_in_window(tenant_id, CONVERSION_WINDOW_DAYS).await?;
    let conversion_rate = if total_in_window > 0 {
        ((converted_in_window as f64 / total_in_window as f64) * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    };

    Ok(TenantAnalytics {
        total_messages,
        messages_last_30d,
        by_channel,
        by_state,
        daily_series_30d,
        conversion_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_rate_is_zero_with_no_sessions() {
        let analytics = TenantAnalytics {
            total_messages: 0,
            messages_last_30d: 0,
            by_channel: vec![],
            by_state: vec![],
            daily_series_30d: vec![],
            conversion_rate: 0.0,
        };
        assert_eq!(analytics.conversion_rate, 0.0);
    }
}
