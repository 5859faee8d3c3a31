pub mod analytics;
pub mod error;
pub mod store;
pub mod types;

pub use analytics::{tenant_analytics, TenantAnalytics};
pub use error::HistoryStoreError;
pub use store::HistoryStore;
pub use types::{MessageFilter, MessageRecord, Page, SessionFilter, SessionSnapshot};
