use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapter::CrmAdapter;
use crate::domain::{CrmAppointment, CrmClient, CrmEmployee, CrmService, CrmTimeSlot};
use crate::error::CrmError;

use super::rest_base::{AuthStyle, RestClient};

pub struct YclientsAdapter {
    client: RestClient,
}

impl YclientsAdapter {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: RestClient::new(base_url, api_key, AuthStyle::Bearer, Duration::from_millis(200)),
        }
    }
}

#[derive(Serialize)]
struct ClientPayload<'a> {
    phone: &'a str,
    name: &'a str,
    email: Option<&'a str>,
}

#[derive(Deserialize)]
struct ClientDto {
    id: String,
    phone: String,
    name: String,
    email: Option<String>,
}

impl From<ClientDto> for CrmClient {
    fn from(d: ClientDto) -> Self {
        CrmClient {
            id: Some(d.id),
            phone: d.phone,
            name: d.name,
            email: d.email,
        }
    }
}

#[derive(Deserialize)]
struct ServiceDto {
    id: String,
    title: String,
    category: Option<String>,
    cost: Option<f64>,
    duration_min: Option<i32>,
    active: bool,
}

impl From<ServiceDto> for CrmService {
    fn from(d: ServiceDto) -> Self {
        CrmService {
            id: d.id,
            name: d.title,
            category: d.category,
            price: d.cost,
            duration_minutes: d.duration_min,
            is_active: d.active,
        }
    }
}

#[derive(Deserialize)]
struct StaffDto {
    id: String,
    name: String,
    active: bool,
}

impl From<StaffDto> for CrmEmployee {
    fn from(d: StaffDto) -> Self {
        CrmEmployee {
            id: d.id,
            name: d.name,
            is_active: d.active,
        }
    }
}

#[derive(Deserialize)]
struct SlotDto {
    date: String,
    time: String,
    seance_length: i32,
    staff_id: Option<String>,
}

impl From<SlotDto> for CrmTimeSlot {
    fn from(d: SlotDto) -> Self {
        CrmTimeSlot {
            date: d.date,
            time: d.time,
            duration_minutes: d.seance_length,
            employee_id: d.staff_id,
        }
    }
}

#[derive(Serialize)]
struct AppointmentPayload<'a> {
    client_id: &'a str,
    service_id: &'a str,
    staff_id: Option<&'a str>,
    date: &'a str,
    time: &'a str,
    comment: Option<&'a str>,
}

#[derive(Deserialize)]
struct AppointmentDto {
    id: String,
    client_id: String,
    service_id: String,
    staff_id: Option<String>,
    date: String,
    time: String,
    comment: Option<String>,
    cancelled: bool,
}

impl From<AppointmentDto> for CrmAppointment {
    fn from(d: AppointmentDto) -> Self {
        CrmAppointment {
            id: Some(d.id),
            client_id: d.client_id,
            service_id: d.service_id,
            employee_id: d.staff_id,
            appointment_date: d.date,
            appointment_time: d.time,
            notes: d.comment,
            is_cancelled: d.cancelled,
        }
    }
}

#[async_trait]
impl CrmAdapter for YclientsAdapter {
    fn crm_name(&self) -> &'static str {
        "yclients"
    }

    async fn get_client_by_phone(&self, phone: &str) -> Result<Option<CrmClient>, CrmError> {
        match self.client.get::<ClientDto>("/clients/search", &[("phone", phone)]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let payload = ClientPayload {
            phone: &client.phone,
            name: &client.name,
            email: client.email.as_deref(),
        };
        let dto: ClientDto = self.client.post("/clients", &payload).await?;
        Ok(dto.into())
    }

    async fn update_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let id = client.id.clone().ok_or_else(|| CrmError::Invalid("missing client id".into()))?;
        let payload = ClientPayload {
            phone: &client.phone,
            name: &client.name,
            email: client.email.as_deref(),
        };
        let dto: ClientDto = self.client.put(&format!("/clients/{id}"), &payload).await?;
        Ok(dto.into())
    }

    async fn get_services(&self, category: Option<&str>) -> Result<Vec<CrmService>, CrmError> {
        let query: Vec<(&str, &str)> = category.map(|c| vec![("category", c)]).unwrap_or_default();
        let dtos: Vec<ServiceDto> = self.client.get("/services", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_service_by_id(&self, service_id: &str) -> Result<Option<CrmService>, CrmError> {
        match self.client.get::<ServiceDto>(&format!("/services/{service_id}"), &[]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_employees(&self, service_id: Option<&str>) -> Result<Vec<CrmEmployee>, CrmError> {
        let query: Vec<(&str, &str)> = service_id.map(|s| vec![("service_id", s)]).unwrap_or_default();
        let dtos: Vec<StaffDto> = self.client.get("/staff", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_employee_by_id(&self, employee_id: &str) -> Result<Option<CrmEmployee>, CrmError> {
        match self.client.get::<StaffDto>(&format!("/staff/{employee_id}"), &[]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_available_slots(
        &self,
        service_id: &str,
        start_date: &str,
        end_date: &str,
        employee_id: Option<&str>,
    ) -> Result<Vec<CrmTimeSlot>, CrmError> {
        let mut query = vec![("service_id", service_id), ("from", start_date), ("to", end_date)];
        if let Some(emp) = employee_id {
            query.push(("staff_id", emp));
        }
        let dtos: Vec<SlotDto> = self.client.get("/book_times", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn create_appointment(
        &self,
        appointment: CrmAppointment,
        _idempotency_key: Option<String>,
    ) -> Result<CrmAppointment, CrmError> {
        let payload = AppointmentPayload {
            client_id: &appointment.client_id,
            service_id: &appointment.service_id,
            staff_id: appointment.employee_id.as_deref(),
            date: &appointment.appointment_date,
            time: &appointment.appointment_time,
            comment: appointment.notes.as_deref(),
        };
        let dto: AppointmentDto = self.client.post("/records", &payload).await?;
        Ok(dto.into())
    }

    async fn get_appointment_by_id(&self, appointment_id: &str) -> Result<Option<CrmAppointment>, CrmError> {
        match self.client.get::<AppointmentDto>(&format!("/records/{appointment_id}"), &[]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn cancel_appointment(&self, appointment_id: &str) -> Result<bool, CrmError> {
        match self.client.delete(&format!("/records/{appointment_id}")).await {
            Ok(()) => Ok(true),
            Err(CrmError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get_client_appointments(&self, client_id: &str) -> Result<Vec<CrmAppointment>, CrmError> {
        let dtos: Vec<AppointmentDto> = self.client.get("/records", &[("client_id", client_id)]).await?;
        Ok(dtos.into_iter().map(Into::into).filter(|a: &CrmAppointment| !a.is_cancelled).collect())
    }

    async fn health_check(&self) -> Result<bool, CrmError> {
        let _: serde_json::Value = self.client.get("/health", &[]).await?;
        Ok(true)
    }
}
