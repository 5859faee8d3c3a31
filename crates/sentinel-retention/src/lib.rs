pub mod engine;
pub mod error;
pub mod sweep;
pub mod types;

pub use engine::{cleanup_tenant, delete_all_tenant_data, estimate};
pub use error::RetentionError;
pub use sweep::RetentionSweeper;
pub use types::{CleanupReport, RetentionPolicy};
