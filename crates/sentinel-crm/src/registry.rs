use std::sync::Arc;

use sentinel_core::types::CrmKind;

use crate::adapter::CrmAdapter;
use crate::mock::MockCrmAdapter;
use crate::vendors::altegio::AltegioAdapter;
use crate::vendors::amocrm::AmoCrmAdapter;
use crate::vendors::bitrix24::Bitrix24Adapter;
use crate::vendors::dikidi::DikidiAdapter;
use crate::vendors::easyweek::EasyWeekAdapter;
use crate::vendors::onec::OneCAdapter;
use crate::vendors::yclients::YclientsAdapter;

/// Per-tenant credentials needed to build a vendor adapter. `base_url` is
/// optional; when absent the vendor's public API host is used.
pub struct CrmCredentials {
    pub base_url: Option<String>,
    pub api_key: String,
}

/// Vendors with a single public API host. Bitrix24, 1C, and AmoCRM are
/// self-hosted / per-tenant-portal by nature, so they have no sensible
/// default and require `base_url` in the tenant's credentials.
fn default_base_url(kind: CrmKind) -> Option<&'static str> {
    match kind {
        CrmKind::Yclients => Some("https://api.yclients.com/api/v1"),
        CrmKind::Altegio => Some("https://api.alteg.io/v2"),
        CrmKind::Dikidi => Some("https://api.dikidi.ru"),
        CrmKind::EasyWeek => Some("https://api.easyweek.io"),
        CrmKind::Bitrix24 | CrmKind::OneC | CrmKind::AmoCrm | CrmKind::Mock => None,
    }
}

/// Builds the adapter for a tenant's bound CRM. Performs no network I/O:
/// adapters dial out lazily on first call.
pub fn build(kind: CrmKind, credentials: Option<&CrmCredentials>) -> Arc<dyn CrmAdapter> {
    if matches!(kind, CrmKind::Mock) {
        return Arc::new(MockCrmAdapter::default());
    }

    let creds = credentials.expect("non-mock CRM binding requires credentials");
    let base_url = creds
        .base_url
        .as_deref()
        .or_else(|| default_base_url(kind))
        .unwrap_or_else(|| panic!("{kind} requires an explicit base_url in tenant credentials"));

    match kind {
        CrmKind::Yclients => Arc::new(YclientsAdapter::new(base_url, &creds.api_key)),
        CrmKind::Altegio => Arc::new(AltegioAdapter::new(base_url, &creds.api_key)),
        CrmKind::Bitrix24 => Arc::new(Bitrix24Adapter::new(base_url, &creds.api_key)),
        CrmKind::OneC => Arc::new(OneCAdapter::new(base_url, &creds.api_key)),
        CrmKind::AmoCrm => Arc::new(AmoCrmAdapter::new(base_url, &creds.api_key)),
        CrmKind::Dikidi => Arc::new(DikidiAdapter::new(base_url, &creds.api_key)),
        CrmKind::EasyWeek => Arc::new(EasyWeekAdapter::new(base_url, &creds.api_key)),
        CrmKind::Mock => unreachable!("handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_builds_without_credentials() {
        let adapter = build(CrmKind::Mock, None);
        assert_eq!(adapter.crm_name(), "mock");
    }

    #[test]
    fn vendor_build_performs_no_network_io() {
        let creds = CrmCredentials {
            base_url: None,
            api_key: "test-key".into(),
        };
        let adapter = build(CrmKind::Yclients, Some(&creds));
        assert_eq!(adapter.crm_name(), "yclients");
    }
}
