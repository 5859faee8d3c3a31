use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapter::CrmAdapter;
use crate::domain::{CrmAppointment, CrmClient, CrmEmployee, CrmService, CrmTimeSlot};
use crate::error::CrmError;

use super::rest_base::{AuthStyle, RestClient};

/// Bitrix24 webhook integrations carry the auth token as part of the URL
/// path rather than a header; `base_url` is expected to already include
/// the incoming-webhook prefix (`.../rest/1/<token>`), so the key itself
/// travels as a query param for parity with the shared `RestClient`.
pub struct Bitrix24Adapter {
    client: RestClient,
}

impl Bitrix24Adapter {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: RestClient::new(base_url, api_key, AuthStyle::QueryParam("auth"), Duration::from_millis(500)),
        }
    }
}

#[derive(Serialize)]
struct ContactPayload<'a> {
    #[serde(rename = "PHONE")]
    phone: &'a str,
    #[serde(rename = "NAME")]
    name: &'a str,
    #[serde(rename = "EMAIL")]
    email: Option<&'a str>,
}

#[derive(Deserialize)]
struct ContactDto {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "PHONE")]
    phone: String,
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "EMAIL")]
    email: Option<String>,
}

impl From<ContactDto> for CrmClient {
    fn from(d: ContactDto) -> Self {
        CrmClient {
            id: Some(d.id),
            phone: d.phone,
            name: d.name,
            email: d.email,
        }
    }
}

#[derive(Deserialize)]
struct ProductDto {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "SECTION")]
    section: Option<String>,
    #[serde(rename = "PRICE")]
    price: Option<f64>,
    #[serde(rename = "ACTIVE")]
    active: bool,
}

impl From<ProductDto> for CrmService {
    fn from(d: ProductDto) -> Self {
        CrmService {
            id: d.id,
            name: d.name,
            category: d.section,
            price: d.price,
            duration_minutes: None,
            is_active: d.active,
        }
    }
}

#[derive(Deserialize)]
struct UserDto {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "ACTIVE")]
    active: bool,
}

impl From<UserDto> for CrmEmployee {
    fn from(d: UserDto) -> Self {
        CrmEmployee {
            id: d.id,
            name: d.name,
            is_active: d.active,
        }
    }
}

#[derive(Deserialize)]
struct CalendarSlotDto {
    date: String,
    time: String,
    responsible_id: Option<String>,
}

impl From<CalendarSlotDto> for CrmTimeSlot {
    fn from(d: CalendarSlotDto) -> Self {
        CrmTimeSlot {
            date: d.date,
            time: d.time,
            duration_minutes: 60,
            employee_id: d.responsible_id,
        }
    }
}

#[derive(Serialize)]
struct DealPayload<'a> {
    contact_id: &'a str,
    product_id: &'a str,
    responsible_id: Option<&'a str>,
    date: &'a str,
    time: &'a str,
    comments: Option<&'a str>,
}

#[derive(Deserialize)]
struct DealDto {
    #[serde(rename = "ID")]
    id: String,
    contact_id: String,
    product_id: String,
    responsible_id: Option<String>,
    date: String,
    time: String,
    comments: Option<String>,
    #[serde(rename = "STAGE_ID")]
    stage_id: String,
}

impl From<DealDto> for CrmAppointment {
    fn from(d: DealDto) -> Self {
        CrmAppointment {
            id: Some(d.id),
            client_id: d.contact_id,
            service_id: d.product_id,
            employee_id: d.responsible_id,
            appointment_date: d.date,
            appointment_time: d.time,
            notes: d.comments,
            is_cancelled: d.stage_id == "LOSE",
        }
    }
}

#[async_trait]
impl CrmAdapter for Bitrix24Adapter {
    fn crm_name(&self) -> &'static str {
        "bitrix24"
    }

    async fn get_client_by_phone(&self, phone: &str) -> Result<Option<CrmClient>, CrmError> {
        match self.client.get::<ContactDto>("/crm.contact.list", &[("filter[PHONE]", phone)]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let payload = ContactPayload {
            phone: &client.phone,
            name: &client.name,
            email: client.email.as_deref(),
        };
        let dto: ContactDto = self.client.post("/crm.contact.add", &payload).await?;
        Ok(dto.into())
    }

    async fn update_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let id = client.id.clone().ok_or_else(|| CrmError::Invalid("missing client id".into()))?;
        let payload = ContactPayload {
            phone: &client.phone,
            name: &client.name,
            email: client.email.as_deref(),
        };
        let dto: ContactDto = self.client.put(&format!("/crm.contact.update?id={id}"), &payload).await?;
        Ok(dto.into())
    }

    async fn get_services(&self, category: Option<&str>) -> Result<Vec<CrmService>, CrmError> {
        let query: Vec<(&str, &str)> = category.map(|c| vec![("filter[SECTION]", c)]).unwrap_or_default();
        let dtos: Vec<ProductDto> = self.client.get("/crm.product.list", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_service_by_id(&self, service_id: &str) -> Result<Option<CrmService>, CrmError> {
        match self.client.get::<ProductDto>("/crm.product.get", &[("id", service_id)]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_employees(&self, _service_id: Option<&str>) -> Result<Vec<CrmEmployee>, CrmError> {
        let dtos: Vec<UserDto> = self.client.get("/user.get", &[]).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_employee_by_id(&self, employee_id: &str) -> Result<Option<CrmEmployee>, CrmError> {
        match self.client.get::<UserDto>("/user.get", &[("ID", employee_id)]).await {
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
        let mut query = vec![("product_id", service_id), ("from", start_date), ("to", end_date)];
        if let Some(emp) = employee_id {
            query.push(("responsible_id", emp));
        }
        let dtos: Vec<CalendarSlotDto> = self.client.get("/calendar.slot.list", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn create_appointment(
        &self,
        appointment: CrmAppointment,
        _idempotency_key: Option<String>,
    ) -> Result<CrmAppointment, CrmError> {
        let payload = DealPayload {
            contact_id: &appointment.client_id,
            product_id: &appointment.service_id,
            responsible_id: appointment.employee_id.as_deref(),
            date: &appointment.appointment_date,
            time: &appointment.appointment_time,
            comments: appointment.notes.as_deref(),
        };
        let dto: DealDto = self.client.post("/crm.deal.add", &payload).await?;
        Ok(dto.into())
    }

    async fn get_appointment_by_id(&self, appointment_id: &str) -> Result<Option<CrmAppointment>, CrmError> {
        match self.client.get::<DealDto>("/crm.deal.get", &[("id", appointment_id)]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn cancel_appointment(&self, appointment_id: &str) -> Result<bool, CrmError> {
        match self.client.delete(&format!("/crm.deal.delete?id={appointment_id}")).await {
            Ok(()) => Ok(true),
            Err(CrmError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get_client_appointments(&self, client_id: &str) -> Result<Vec<CrmAppointment>, CrmError> {
        let dtos: Vec<DealDto> = self.client.get("/crm.deal.list", &[("filter[CONTACT_ID]", client_id)]).await?;
        Ok(dtos.into_iter().map(Into::into).filter(|a: &CrmAppointment| !a.is_cancelled).collect())
    }

    async fn health_check(&self) -> Result<bool, CrmError> {
        let _: serde_json::Value = self.client.get("/app.info", &[]).await?;
        Ok(true)
    }
}
