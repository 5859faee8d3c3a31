use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapter::CrmAdapter;
use crate::domain::{CrmAppointment, CrmClient, CrmEmployee, CrmService, CrmTimeSlot};
use crate::error::CrmError;

use super::rest_base::{AuthStyle, RestClient};

pub struct AmoCrmAdapter {
    client: RestClient,
}

impl AmoCrmAdapter {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: RestClient::new(base_url, api_key, AuthStyle::Bearer, Duration::from_millis(250)),
        }
    }
}

#[derive(Serialize)]
struct ContactPayload<'a> {
    name: &'a str,
    phone: &'a str,
    email: Option<&'a str>,
}

#[derive(Deserialize)]
struct ContactDto {
    id: i64,
    name: String,
    phone: String,
    email: Option<String>,
}

impl From<ContactDto> for CrmClient {
    fn from(d: ContactDto) -> Self {
        CrmClient {
            id: Some(d.id.to_string()),
            phone: d.phone,
            name: d.name,
            email: d.email,
        }
    }
}

#[derive(Deserialize)]
struct CatalogElementDto {
    id: i64,
    name: String,
    category: Option<String>,
    price: Option<f64>,
    duration_minutes: Option<i32>,
    is_active: bool,
}

impl From<CatalogElementDto> for CrmService {
    fn from(d: CatalogElementDto) -> Self {
        CrmService {
            id: d.id.to_string(),
            name: d.name,
            category: d.category,
            price: d.price,
            duration_minutes: d.duration_minutes,
            is_active: d.is_active,
        }
    }
}

#[derive(Deserialize)]
struct UserDto {
    id: i64,
    name: String,
    is_active: bool,
}

impl From<UserDto> for CrmEmployee {
    fn from(d: UserDto) -> Self {
        CrmEmployee {
            id: d.id.to_string(),
            name: d.name,
            is_active: d.is_active,
        }
    }
}

#[derive(Deserialize)]
struct TaskSlotDto {
    date: String,
    time: String,
    duration_minutes: i32,
    responsible_user_id: Option<i64>,
}

impl From<TaskSlotDto> for CrmTimeSlot {
    fn from(d: TaskSlotDto) -> Self {
        CrmTimeSlot {
            date: d.date,
            time: d.time,
            duration_minutes: d.duration_minutes,
            employee_id: d.responsible_user_id.map(|id| id.to_string()),
        }
    }
}

#[derive(Serialize)]
struct LeadPayload<'a> {
    contact_id: &'a str,
    catalog_element_id: &'a str,
    responsible_user_id: Option<&'a str>,
    date: &'a str,
    time: &'a str,
    note: Option<&'a str>,
}

#[derive(Deserialize)]
struct LeadDto {
    id: i64,
    contact_id: i64,
    catalog_element_id: i64,
    responsible_user_id: Option<i64>,
    date: String,
    time: String,
    note: Option<String>,
    status: String,
}

impl From<LeadDto> for CrmAppointment {
    fn from(d: LeadDto) -> Self {
        CrmAppointment {
            id: Some(d.id.to_string()),
            client_id: d.contact_id.to_string(),
            service_id: d.catalog_element_id.to_string(),
            employee_id: d.responsible_user_id.map(|id| id.to_string()),
            appointment_date: d.date,
            appointment_time: d.time,
            notes: d.note,
            is_cancelled: d.status == "closed_lost",
        }
    }
}

#[async_trait]
impl CrmAdapter for AmoCrmAdapter {
    fn crm_name(&self) -> &'static str {
        "amocrm"
    }

    async fn get_client_by_phone(&self, phone: &str) -> Result<Option<CrmClient>, CrmError> {
        match self.client.get::<ContactDto>("/api/v4/contacts", &[("query", phone)]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let payload = ContactPayload {
            name: &client.name,
            phone: &client.phone,
            email: client.email.as_deref(),
        };
        let dto: ContactDto = self.client.post("/api/v4/contacts", &payload).await?;
        Ok(dto.into())
    }

    async fn update_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let id = client.id.clone().ok_or_else(|| CrmError::Invalid("missing client id".into()))?;
        let payload = ContactPayload {
            name: &client.name,
            phone: &client.phone,
            email: client.email.as_deref(),
        };
        let dto: ContactDto = self.client.put(&format!("/api/v4/contacts/{id}"), &payload).await?;
        Ok(dto.into())
    }

    async fn get_services(&self, category: Option<&str>) -> Result<Vec<CrmService>, CrmError> {
        let query: Vec<(&str, &str)> = category.map(|c| vec![("category", c)]).unwrap_or_default();
        let dtos: Vec<CatalogElementDto> = self.client.get("/api/v4/catalogs/elements", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_service_by_id(&self, service_id: &str) -> Result<Option<CrmService>, CrmError> {
        match self
            .client
            .get::<CatalogElementDto>(&format!("/api/v4/catalogs/elements/{service_id}"), &[])
            .await
        {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_employees(&self, _service_id: Option<&str>) -> Result<Vec<CrmEmployee>, CrmError> {
        let dtos: Vec<UserDto> = self.client.get("/api/v4/users", &[]).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_employee_by_id(&self, employee_id: &str) -> Result<Option<CrmEmployee>, CrmError> {
        match self.client.get::<UserDto>(&format!("/api/v4/users/{employee_id}"), &[]).await {
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
        let mut query = vec![("catalog_element_id", service_id), ("from", start_date), ("to", end_date)];
        if let Some(emp) = employee_id {
            query.push(("responsible_user_id", emp));
        }
        let dtos: Vec<TaskSlotDto> = self.client.get("/api/v4/calendar/slots", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn create_appointment(
        &self,
        appointment: CrmAppointment,
        _idempotency_key: Option<String>,
    ) -> Result<CrmAppointment, CrmError> {
        let payload = LeadPayload {
            contact_id: &appointment.client_id,
            catalog_element_id: &appointment.service_id,
            responsible_user_id: appointment.employee_id.as_deref(),
            date: &appointment.appointment_date,
            time: &appointment.appointment_time,
            note: appointment.notes.as_deref(),
        };
        let dto: LeadDto = self.client.post("/api/v4/leads", &payload).await?;
        Ok(dto.into())
    }

    async fn get_appointment_by_id(&self, appointment_id: &str) -> Result<Option<CrmAppointment>, CrmError> {
        match self.client.get::<LeadDto>(&format!("/api/v4/leads/{appointment_id}"), &[]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn cancel_appointment(&self, appointment_id: &str) -> Result<bool, CrmError> {
        match self.client.delete(&format!("/api/v4/leads/{appointment_id}")).await {
            Ok(()) => Ok(true),
            Err(CrmError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get_client_appointments(&self, client_id: &str) -> Result<Vec<CrmAppointment>, CrmError> {
        let dtos: Vec<LeadDto> = self.client.get("/api/v4/leads", &[("filter[contact_id]", client_id)]).await?;
        Ok(dtos.into_iter().map(Into::into).filter(|a: &CrmAppointment| !a.is_cancelled).collect())
    }

    async fn health_check(&self) -> Result<bool, CrmError> {
        let _: serde_json::Value = self.client.get("/api/v4/account", &[]).await?;
        Ok(true)
    }
}
