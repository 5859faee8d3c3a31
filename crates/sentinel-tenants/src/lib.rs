pub mod error;
pub mod registry;
pub mod types;

pub use error::TenantRegistryError;
pub use registry::{ResolveOutcome, TenantRegistry};
