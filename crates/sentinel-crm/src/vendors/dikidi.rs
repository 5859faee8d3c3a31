use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapter::CrmAdapter;
use crate::domain::{CrmAppointment, CrmClient, CrmEmployee, CrmService, CrmTimeSlot};
use crate::error::CrmError;

use super::rest_base::{AuthStyle, RestClient};

pub struct DikidiAdapter {
    client: RestClient,
}

impl DikidiAdapter {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: RestClient::new(base_url, api_key, AuthStyle::QueryParam("api_key"), Duration::from_millis(400)),
        }
    }
}

#[derive(Serialize)]
struct UserPayload<'a> {
    phone: &'a str,
    name: &'a str,
    email: Option<&'a str>,
}

#[derive(Deserialize)]
struct UserDto {
    user_id: String,
    phone: String,
    name: String,
    email: Option<String>,
}

impl From<UserDto> for CrmClient {
    fn from(d: UserDto) -> Self {
        CrmClient {
            id: Some(d.user_id),
            phone: d.phone,
            name: d.name,
            email: d.email,
        }
    }
}

#[derive(Deserialize)]
struct ServiceDto {
    service_id: String,
    title: String,
    category_id: Option<String>,
    cost: Option<f64>,
    time_min: Option<i32>,
    enabled: bool,
}

impl From<ServiceDto> for CrmService {
    fn from(d: ServiceDto) -> Self {
        CrmService {
            id: d.service_id,
            name: d.title,
            category: d.category_id,
            price: d.cost,
            duration_minutes: d.time_min,
            is_active: d.enabled,
        }
    }
}

#[derive(Deserialize)]
struct StaffDto {
    staff_id: String,
    name: String,
    enabled: bool,
}

impl From<StaffDto> for CrmEmployee {
    fn from(d: StaffDto) -> Self {
        CrmEmployee {
            id: d.staff_id,
            name: d.name,
            is_active: d.enabled,
        }
    }
}

#[derive(Deserialize)]
struct FreeTimeDto {
    day: String,
    time: String,
    dur: i32,
    staff_id: Option<String>,
}

impl From<FreeTimeDto> for CrmTimeSlot {
    fn from(d: FreeTimeDto) -> Self {
        CrmTimeSlot {
            date: d.day,
            time: d.time,
            duration_minutes: d.dur,
            employee_id: d.staff_id,
        }
    }
}

#[derive(Serialize)]
struct RecordPayload<'a> {
    user_id: &'a str,
    service_id: &'a str,
    staff_id: Option<&'a str>,
    day: &'a str,
    time: &'a str,
    comment: Option<&'a str>,
}

#[derive(Deserialize)]
struct RecordDto {
    record_id: String,
    user_id: String,
    service_id: String,
    staff_id: Option<String>,
    day: String,
    time: String,
    comment: Option<String>,
    deleted: bool,
}

impl From<RecordDto> for CrmAppointment {
    fn from(d: RecordDto) -> Self {
        CrmAppointment {
            id: Some(d.record_id),
            client_id: d.user_id,
            service_id: d.service_id,
            employee_id: d.staff_id,
            appointment_date: d.day,
            appointment_time: d.time,
            notes: d.comment,
            is_cancelled: d.deleted,
        }
    }
}

#[async_trait]
impl CrmAdapter for DikidiAdapter {
    fn crm_name(&self) -> &'static str {
        "dikidi"
    }

    async fn get_client_by_phone(&self, phone: &str) -> Result<Option<CrmClient>, CrmError> {
        match self.client.get::<UserDto>("/users/search", &[("phone", phone)]).await {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let payload = UserPayload {
            phone: &client.phone,
            name: &client.name,
            email: client.email.as_deref(),
        };
        let dto: UserDto = self.client.post("/users", &payload).await?;
        Ok(dto.into())
    }

    async fn update_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let id = client.id.clone().ok_or_else(|| CrmError::Invalid("missing client id".into()))?;
        let payload = UserPayload {
            phone: &client.phone,
            name: &client.name,
            email: client.email.as_deref(),
        };
        let dto: UserDto = self.client.put(&format!("/users/{id}"), &payload).await?;
        Ok(dto.into())
    }

    async fn get_services(&self, category: Option<&str>) -> Result<Vec<CrmService>, CrmError> {
        let query: Vec<(&str, &str)> = category.map(|c| vec![("category_id", c)]).unwrap_or_default();
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
        let dtos: Vec<FreeTimeDto> = self.client.get("/free_time", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn create_appointment(
        &self,
        appointment: CrmAppointment,
        _idempotency_key: Option<String>,
    ) -> Result<CrmAppointment, CrmError> {
        let payload = RecordPayload {
            user_id: &appointment.client_id,
            service_id: &appointment.service_id,
            staff_id: appointment.employee_id.as_deref(),
            day: &appointment.appointment_date,
            time: &appointment.appointment_time,
            comment: appointment.notes.as_deref(),
        };
        let dto: RecordDto = self.client.post("/records", &payload).await?;
        Ok(dto.into())
    }

    async fn get_appointment_by_id(&self, appointment_id: &str) -> Result<Option<CrmAppointment>, CrmError> {
        match self.client.get::<RecordDto>(&format!("/records/{appointment_id}"), &[]).await {
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
        let dtos: Vec<RecordDto> = self.client.get("/records", &[("user_id", client_id)]).await?;
        Ok(dtos.into_iter().map(Into::into).filter(|a: &CrmAppointment| !a.is_cancelled).collect())
    }

    async fn health_check(&self) -> Result<bool, CrmError> {
        let _: serde_json::Value = self.client.get("/ping", &[]).await?;
        Ok(true)
    }
}
