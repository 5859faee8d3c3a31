use thiserror::Error;

#[derive(Debug, Error)]
pub enum TenantRegistryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CRM binding not configured for tenant {tenant_id}")]
    CrmNotConfigured { tenant_id: String },
}
