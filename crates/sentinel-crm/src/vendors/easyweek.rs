use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapter::CrmAdapter;
use crate::domain::{CrmAppointment, CrmClient, CrmEmployee, CrmService, CrmTimeSlot};
use crate::error::CrmError;

use super::rest_base::{AuthStyle, RestClient};

pub struct EasyWeekAdapter {
    client: RestClient,
}

impl EasyWeekAdapter {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: RestClient::new(base_url, api_key, AuthStyle::Bearer, Duration::from_millis(300)),
        }
    }
}

#[derive(Serialize)]
struct CustomerPayload<'a> {
    phone: &'a str,
    #[serde(rename = "fullName")]
    full_name: &'a str,
    email: Option<&'a str>,
}

#[derive(Deserialize)]
struct CustomerDto {
    id: String,
    phone: String,
    #[serde(rename = "fullName")]
    full_name: String,
    email: Option<String>,
}

impl From<CustomerDto> for CrmClient {
    fn from(d: CustomerDto) -> Self {
        CrmClient {
            id: Some(d.id),
            phone: d.phone,
            name: d.full_name,
            email: d.email,
        }
    }
}

#[derive(Deserialize)]
struct ServiceDto {
    id: String,
    title: String,
    #[serde(rename = "categoryName")]
    category_name: Option<String>,
    price: Option<f64>,
    #[serde(rename = "durationMinutes")]
    duration_minutes: Option<i32>,
    visible: bool,
}

impl From<ServiceDto> for CrmService {
    fn from(d: ServiceDto) -> Self {
        CrmService {
            id: d.id,
            name: d.title,
            category: d.category_name,
            price: d.price,
            duration_minutes: d.duration_minutes,
            is_active: d.visible,
        }
    }
}

#[derive(Deserialize)]
struct SpecialistDto {
    id: String,
    #[serde(rename = "fullName")]
    full_name: String,
    visible: bool,
}

impl From<SpecialistDto> for CrmEmployee {
    fn from(d: SpecialistDto) -> Self {
        CrmEmployee {
            id: d.id,
            name: d.full_name,
            is_active: d.visible,
        }
    }
}

#[derive(Deserialize)]
struct WindowDto {
    date: String,
    time: String,
    #[serde(rename = "durationMinutes")]
    duration_minutes: i32,
    #[serde(rename = "specialistId")]
    specialist_id: Option<String>,
}

impl From<WindowDto> for CrmTimeSlot {
    fn from(d: WindowDto) -> Self {
        CrmTimeSlot {
            date: d.date,
            time: d.time,
            duration_minutes: d.duration_minutes,
            employee_id: d.specialist_id,
        }
    }
}

#[derive(Serialize)]
struct AppointmentPayload<'a> {
    #[serde(rename = "customerId")]
    customer_id: &'a str,
    #[serde(rename = "serviceId")]
    service_id: &'a str,
    #[serde(rename = "specialistId")]
    specialist_id: Option<&'a str>,
    date: &'a str,
    time: &'a str,
    comment: Option<&'a str>,
}

#[derive(Deserialize)]
struct AppointmentDto {
    id: String,
    #[serde(rename = "customerId")]
    customer_id: String,
    #[serde(rename = "serviceId")]
    service_id: String,
    #[serde(rename = "specialistId")]
    specialist_id: Option<String>,
    date: String,
    time: String,
    comment: Option<String>,
    status: String,
}

impl From<AppointmentDto> for CrmAppointment {
    fn from(d: AppointmentDto) -> Self {
        CrmAppointment {
            id: Some(d.id),
            client_id: d.customer_id,
            service_id: d.service_id,
            employee_id: d.specialist_id,
            appointment_date: d.date,
            appointment_time: d.time,
            notes: d.comment,
            is_cancelled: d.status == "cancelled",
        }
    }
}

#[async_trait]
impl CrmAdapter for EasyWeekAdapter {
    fn crm_name(&self) -> &'static str {
        "easyweek"
    }

    async fn get_client_by_phone(&self, phone: &str) -> Result<Option<CrmClient>, CrmError> {
        match self.client.get::<CustomerDto>("/v1/customers", &[("phone", phone)]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let payload = CustomerPayload {
            phone: &client.phone,
            full_name: &client.name,
            email: client.email.as_deref(),
        };
        let dto: CustomerDto = self.client.post("/v1/customers", &payload).await?;
        Ok(dto.into())
    }

    async fn update_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let id = client.id.clone().ok_or_else(|| CrmError::Invalid("missing client id".into()))?;
        let payload = CustomerPayload {
            phone: &client.phone,
            full_name: &client.name,
            email: client.email.as_deref(),
        };
        let dto: CustomerDto = self.client.put(&format!("/v1/customers/{id}"), &payload).await?;
        Ok(dto.into())
    }

    async fn get_services(&self, category: Option<&str>) -> Result<Vec<CrmService>, CrmError> {
        let query: Vec<(&str, &str)> = category.map(|c| vec![("categoryName", c)]).unwrap_or_default();
        let dtos: Vec<ServiceDto> = self.client.get("/v1/services", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_service_by_id(&self, service_id: &str) -> Result<Option<CrmService>, CrmError> {
        match self.client.get::<ServiceDto>(&format!("/v1/services/{service_id}"), &[]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_employees(&self, service_id: Option<&str>) -> Result<Vec<CrmEmployee>, CrmError> {
        let query: Vec<(&str, &str)> = service_id.map(|s| vec![("serviceId", s)]).unwrap_or_default();
        let dtos: Vec<SpecialistDto> = self.client.get("/v1/specialists", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_employee_by_id(&self, employee_id: &str) -> Result<Option<CrmEmployee>, CrmError> {
        match self
            .client
            .get::<SpecialistDto>(&format!("/v1/specialists/{employee_id}"), &[])
            .await
        {
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
        let mut query = vec![("serviceId", service_id), ("from", start_date), ("to", end_date)];
        if let Some(emp) = employee_id {
            query.push(("specialistId", emp));
        }
        let dtos: Vec<WindowDto> = self.client.get("/v1/windows", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn create_appointment(
        &self,
        appointment: CrmAppointment,
        _idempotency_key: Option<String>,
    ) -> Result<CrmAppointment, CrmError> {
        let payload = AppointmentPayload {
            customer_id: &appointment.client_id,
            service_id: &appointment.service_id,
            specialist_id: appointment.employee_id.as_deref(),
            date: &appointment.appointment_date,
            time: &appointment.appointment_time,
            comment: appointment.notes.as_deref(),
        };
        let dto: AppointmentDto = self.client.post("/v1/appointments", &payload).await?;
        Ok(dto.into())
    }

    async fn get_appointment_by_id(&self, appointment_id: &str) -> Result<Option<CrmAppointment>, CrmError> {
        match self
            .client
            .get::<AppointmentDto>(&format!("/v1/appointments/{appointment_id}"), &[])
            .await
        {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn cancel_appointment(&self, appointment_id: &str) -> Result<bool, CrmError> {
        match self.client.delete(&format!("/v1/appointments/{appointment_id}")).await {
            Ok(()) => Ok(true),
            Err(CrmError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get_client_appointments(&self, client_id: &str) -> Result<Vec<CrmAppointment>, CrmError> {
        let dtos: Vec<AppointmentDto> = self
            .client
            .get("/v1/appointments", &[("customerId", client_id)])
            .await?;
        Ok(dtos.into_iter().map(Into::into).filter(|a: &CrmAppointment| !a.is_cancelled).collect())
    }

    async fn health_check(&self) -> Result<bool, CrmError> {
        let _: serde_json::Value = self.client.get("/v1/account", &[]).await?;
        Ok(true)
    }
}
