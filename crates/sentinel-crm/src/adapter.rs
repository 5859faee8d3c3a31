use async_trait::async_trait;

use crate::domain::{CrmAppointment, CrmClient, CrmEmployee, CrmService, CrmTimeSlot};
use crate::error::CrmError;

/// Common interface implemented by every vendor CRM adapter.
///
/// Construction (via `sentinel_crm::registry`) MUST NOT perform network
/// I/O — adapters dial out lazily, on first call, the same way channel
/// adapters defer `connect()` until the manager drives it.
#[async_trait]
pub trait CrmAdapter: Send + Sync {
    fn crm_name(&self) -> &'static str;

    async fn get_client_by_phone(&self, phone: &str) -> Result<Option<CrmClient>, CrmError>;
    async fn create_client(&self, client: CrmClient) -> Result<CrmClient, CrmError>;
    async fn update_client(&self, client: CrmClient) -> Result<CrmClient, CrmError>;

    async fn get_services(&self, category: Option<&str>) -> Result<Vec<CrmService>, CrmError>;
    async fn get_service_by_id(&self, service_id: &str) -> Result<Option<CrmService>, CrmError>;

    async fn get_employees(&self, service_id: Option<&str>) -> Result<Vec<CrmEmployee>, CrmError>;
    async fn get_employee_by_id(&self, employee_id: &str) -> Result<Option<CrmEmployee>, CrmError>;

    async fn get_available_slots(
        &self,
        service_id: &str,
        start_date: &str,
        end_date: &str,
        employee_id: Option<&str>,
    ) -> Result<Vec<CrmTimeSlot>, CrmError>;

    async fn create_appointment(
        &self,
        appointment: CrmAppointment,
        idempotency_key: Option<String>,
    ) -> Result<CrmAppointment, CrmError>;
    async fn get_appointment_by_id(&self, appointment_id: &str) -> Result<Option<CrmAppointment>, CrmError>;
    async fn cancel_appointment(&self, appointment_id: &str) -> Result<bool, CrmError>;
    async fn get_client_appointments(&self, client_id: &str) -> Result<Vec<CrmAppointment>, CrmError>;

    async fn health_check(&self) -> Result<bool, CrmError>;

    /// Whether `create_appointment`'s `idempotency_key` is honored by this
    /// adapter. Vendors that don't support one silently ignore the key.
    fn supports_idempotency_key(&self) -> bool {
        false
    }
}
