use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapter::CrmAdapter;
use crate::domain::{CrmAppointment, CrmClient, CrmEmployee, CrmService, CrmTimeSlot};
use crate::error::CrmError;

use super::rest_base::{AuthStyle, RestClient};

/// Altegio is API-compatible in spirit with Yclients (same product family)
/// but exposes a flatter `/v2` surface with its own field names.
pub struct AltegioAdapter {
    client: RestClient,
}

impl AltegioAdapter {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: RestClient::new(base_url, api_key, AuthStyle::Header("X-Api-Key"), Duration::from_millis(200)),
        }
    }
}

#[derive(Serialize)]
struct ClientPayload<'a> {
    phone_number: &'a str,
    full_name: &'a str,
    email: Option<&'a str>,
}

#[derive(Deserialize)]
struct ClientDto {
    client_id: String,
    phone_number: String,
    full_name: String,
    email: Option<String>,
}

impl From<ClientDto> for CrmClient {
    fn from(d: ClientDto) -> Self {
        CrmClient {
            id: Some(d.client_id),
            phone: d.phone_number,
            name: d.full_name,
            email: d.email,
        }
    }
}

#[derive(Deserialize)]
struct ServiceDto {
    service_id: String,
    name: String,
    category_name: Option<String>,
    price: Option<f64>,
    duration_min: Option<i32>,
    is_active: bool,
}

impl From<ServiceDto> for CrmService {
    fn from(d: ServiceDto) -> Self {
        CrmService {
            id: d.service_id,
            name: d.name,
            category: d.category_name,
            price: d.price,
            duration_minutes: d.duration_min,
            is_active: d.is_active,
        }
    }
}

#[derive(Deserialize)]
struct MasterDto {
    master_id: String,
    name: String,
    is_active: bool,
}

impl From<MasterDto> for CrmEmployee {
    fn from(d: MasterDto) -> Self {
        CrmEmployee {
            id: d.master_id,
            name: d.name,
            is_active: d.is_active,
        }
    }
}

#[derive(Deserialize)]
struct SlotDto {
    slot_date: String,
    slot_time: String,
    duration_min: i32,
    master_id: Option<String>,
}

impl From<SlotDto> for CrmTimeSlot {
    fn from(d: SlotDto) -> Self {
        CrmTimeSlot {
            date: d.slot_date,
            time: d.slot_time,
            duration_minutes: d.duration_min,
            employee_id: d.master_id,
        }
    }
}

#[derive(Serialize)]
struct BookingPayload<'a> {
    client_id: &'a str,
    service_id: &'a str,
    master_id: Option<&'a str>,
    date: &'a str,
    time: &'a str,
    note: Option<&'a str>,
}

#[derive(Deserialize)]
struct BookingDto {
    booking_id: String,
    client_id: String,
    service_id: String,
    master_id: Option<String>,
    date: String,
    time: String,
    note: Option<String>,
    is_cancelled: bool,
}

impl From<BookingDto> for CrmAppointment {
    fn from(d: BookingDto) -> Self {
        CrmAppointment {
            id: Some(d.booking_id),
            client_id: d.client_id,
            service_id: d.service_id,
            employee_id: d.master_id,
            appointment_date: d.date,
            appointment_time: d.time,
            notes: d.note,
            is_cancelled: d.is_cancelled,
        }
    }
}

#[async_trait]
impl CrmAdapter for AltegioAdapter {
    fn crm_name(&self) -> &'static str {
        "altegio"
    }

    async fn get_client_by_phone(&self, phone: &str) -> Result<Option<CrmClient>, CrmError> {
        match self.client.get::<ClientDto>("/v2/clients/find", &[("phone_number", phone)]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let payload = ClientPayload {
            phone_number: &client.phone,
            full_name: &client.name,
            email: client.email.as_deref(),
        };
        let dto: ClientDto = self.client.post("/v2/clients", &payload).await?;
        Ok(dto.into())
    }

    async fn update_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let id = client.id.clone().ok_or_else(|| CrmError::Invalid("missing client id".into()))?;
        let payload = ClientPayload {
            phone_number: &client.phone,
            full_name: &client.name,
            email: client.email.as_deref(),
        };
        let dto: ClientDto = self.client.put(&format!("/v2/clients/{id}"), &payload).await?;
        Ok(dto.into())
    }

    async fn get_services(&self, category: Option<&str>) -> Result<Vec<CrmService>, CrmError> {
        let query: Vec<(&str, &str)> = category.map(|c| vec![("category_name", c)]).unwrap_or_default();
        let dtos: Vec<ServiceDto> = self.client.get("/v2/services", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_service_by_id(&self, service_id: &str) -> Result<Option<CrmService>, CrmError> {
        match self.client.get::<ServiceDto>(&format!("/v2/services/{service_id}"), &[]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_employees(&self, service_id: Option<&str>) -> Result<Vec<CrmEmployee>, CrmError> {
        let query: Vec<(&str, &str)> = service_id.map(|s| vec![("service_id", s)]).unwrap_or_default();
        let dtos: Vec<MasterDto> = self.client.get("/v2/masters", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_employee_by_id(&self, employee_id: &str) -> Result<Option<CrmEmployee>, CrmError> {
        match self.client.get::<MasterDto>(&format!("/v2/masters/{employee_id}"), &[]).await {
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
            query.push(("master_id", emp));
        }
        let dtos: Vec<SlotDto> = self.client.get("/v2/slots", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn create_appointment(
        &self,
        appointment: CrmAppointment,
        _idempotency_key: Option<String>,
    ) -> Result<CrmAppointment, CrmError> {
        let payload = BookingPayload {
            client_id: &appointment.client_id,
            service_id: &appointment.service_id,
            master_id: appointment.employee_id.as_deref(),
            date: &appointment.appointment_date,
            time: &appointment.appointment_time,
            note: appointment.notes.as_deref(),
        };
        let dto: BookingDto = self.client.post("/v2/bookings", &payload).await?;
        Ok(dto.into())
    }

    async fn get_appointment_by_id(&self, appointment_id: &str) -> Result<Option<CrmAppointment>, CrmError> {
        match self.client.get::<BookingDto>(&format!("/v2/bookings/{appointment_id}"), &[]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn cancel_appointment(&self, appointment_id: &str) -> Result<bool, CrmError> {
        match self.client.delete(&format!("/v2/bookings/{appointment_id}")).await {
            Ok(()) => Ok(true),
            Err(CrmError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get_client_appointments(&self, client_id: &str) -> Result<Vec<CrmAppointment>, CrmError> {
        let dtos: Vec<BookingDto> = self.client.get("/v2/bookings", &[("client_id", client_id)]).await?;
        Ok(dtos.into_iter().map(Into::into).filter(|a: &CrmAppointment| !a.is_cancelled).collect())
    }

    async fn health_check(&self) -> Result<bool, CrmError> {
        let _: serde_json::Value = self.client.get("/v2/ping", &[]).await?;
        Ok(true)
    }
}
