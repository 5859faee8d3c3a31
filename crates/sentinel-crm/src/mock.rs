use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::adapter::CrmAdapter;
use crate::domain::{CrmAppointment, CrmClient, CrmEmployee, CrmService, CrmTimeSlot};
use crate::error::CrmError;

/// In-memory adapter used for seed test scenarios and local development —
/// always registered alongside the real vendor leaves so a tenant can be
/// onboarded before a vendor contract exists.
pub struct MockCrmAdapter {
    clients: Mutex<Vec<CrmClient>>,
    services: Mutex<Vec<CrmService>>,
    employees: Mutex<Vec<CrmEmployee>>,
    appointments: Mutex<Vec<CrmAppointment>>,
}

impl Default for MockCrmAdapter {
    fn default() -> Self {
        Self {
            clients: Mutex::new(Vec::new()),
            services: Mutex::new(vec![
                CrmService {
                    id: "svc-haircut".into(),
                    name: "Haircut".into(),
                    category: Some("hair".into()),
                    price: Some(30.0),
                    duration_minutes: Some(45),
                    is_active: true,
                },
                CrmService {
                    id: "svc-manicure".into(),
                    name: "Manicure".into(),
                    category: Some("nails".into()),
                    price: Some(25.0),
                    duration_minutes: Some(60),
                    is_active: true,
                },
            ]),
            employees: Mutex::new(vec![CrmEmployee {
                id: "emp-1".into(),
                name: "Jordan".into(),
                is_active: true,
            }]),
            appointments: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CrmAdapter for MockCrmAdapter {
    fn crm_name(&self) -> &'static str {
        "mock"
    }

    async fn get_client_by_phone(&self, phone: &str) -> Result<Option<CrmClient>, CrmError> {
        Ok(self.clients.lock().unwrap().iter().find(|c| c.phone == phone).cloned())
    }

    async fn create_client(&self, mut client: CrmClient) -> Result<CrmClient, CrmError> {
        client.id = Some(Uuid::now_v7().to_string());
        self.clients.lock().unwrap().push(client.clone());
        Ok(client)
    }

    async fn update_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let mut clients = self.clients.lock().unwrap();
        let existing = clients
            .iter_mut()
            .find(|c| c.id == client.id)
            .ok_or(CrmError::NotFound)?;
        *existing = client.clone();
        Ok(client)
    }

    async fn get_services(&self, category: Option<&str>) -> Result<Vec<CrmService>, CrmError> {
        Ok(self
            .services
            .lock()
            .unwrap()
            .iter()
            .filter(|s| match category {
                Some(c) => s.category.as_deref() == Some(c),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get_service_by_id(&self, service_id: &str) -> Result<Option<CrmService>, CrmError> {
        Ok(self.services.lock().unwrap().iter().find(|s| s.id == service_id).cloned())
    }

    async fn get_employees(&self, _service_id: Option<&str>) -> Result<Vec<CrmEmployee>, CrmError> {
        Ok(self.employees.lock().unwrap().clone())
    }

    async fn get_employee_by_id(&self, employee_id: &str) -> Result<Option<CrmEmployee>, CrmError> {
        Ok(self
            .employees
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == employee_id)
            .cloned())
    }

    async fn get_available_slots(
        &self,
        _service_id: &str,
        start_date: &str,
        _end_date: &str,
        employee_id: Option<&str>,
    ) -> Result<Vec<CrmTimeSlot>, CrmError> {
        Ok(vec![
            CrmTimeSlot {
                date: start_date.to_string(),
                time: "10:00".into(),
                duration_minutes: 45,
                employee_id: employee_id.map(str::to_string),
            },
            CrmTimeSlot {
                date: start_date.to_string(),
                time: "14:30".into(),
                duration_minutes: 45,
                employee_id: employee_id.map(str::to_string),
            },
        ])
    }

    async fn create_appointment(
        &self,
        mut appointment: CrmAppointment,
        _idempotency_key: Option<String>,
    ) -> Result<CrmAppointment, CrmError> {
        appointment.id = Some(Uuid::now_v7().to_string());
        self.appointments.lock().unwrap().push(appointment.clone());
        Ok(appointment)
    }

    async fn get_appointment_by_id(&self, appointment_id: &str) -> Result<Option<CrmAppointment>, CrmError> {
        Ok(self
            .appointments
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id.as_deref() == Some(appointment_id))
            .cloned())
    }

    async fn cancel_appointment(&self, appointment_id: &str) -> Result<bool, CrmError> {
        let mut appointments = self.appointments.lock().unwrap();
        match appointments.iter_mut().find(|a| a.id.as_deref() == Some(appointment_id)) {
            Some(a) => {
                a.is_cancelled = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_client_appointments(&self, client_id: &str) -> Result<Vec<CrmAppointment>, CrmError> {
        Ok(self
            .appointments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.client_id == client_id && !a.is_cancelled)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<bool, CrmError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_find_client_by_phone() {
        let adapter = MockCrmAdapter::default();
        adapter
            .create_client(CrmClient {
                id: None,
                phone: "+15550100".into(),
                name: "Alice".into(),
                email: None,
            })
            .await
            .unwrap();

        let found = adapter.get_client_by_phone("+15550100").await.unwrap();
        assert_eq!(found.unwrap().name, "Alice");
    }

    #[tokio::test]
    async fn cancel_appointment_excludes_it_from_client_list() {
        let adapter = MockCrmAdapter::default();
        let appt = adapter
            .create_appointment(
                CrmAppointment {
                    id: None,
                    client_id: "c1".into(),
                    service_id: "svc-haircut".into(),
                    employee_id: None,
                    appointment_date: "2026-08-01".into(),
                    appointment_time: "10:00".into(),
                    notes: None,
                    is_cancelled: false,
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(adapter.get_client_appointments("c1").await.unwrap().len(), 1);
        assert!(adapter.cancel_appointment(appt.id.as_ref().unwrap()).await.unwrap());
        assert_eq!(adapter.get_client_appointments("c1").await.unwrap().len(), 0);
    }
}
