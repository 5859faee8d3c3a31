use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapter::CrmAdapter;
use crate::domain::{CrmAppointment, CrmClient, CrmEmployee, CrmService, CrmTimeSlot};
use crate::error::CrmError;

use super::rest_base::{AuthStyle, RestClient};

/// 1C OData endpoints are typically reached behind an nginx/IIS proxy with
/// HTTP Basic auth; the pre-encoded `Authorization: Basic ...` value is
/// passed in as `api_key` and placed verbatim on the header.
pub struct OneCAdapter {
    client: RestClient,
}

impl OneCAdapter {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: RestClient::new(base_url, api_key, AuthStyle::Header("Authorization"), Duration::from_millis(300)),
        }
    }
}

#[derive(Serialize)]
struct KontragentPayload<'a> {
    #[serde(rename = "Телефон")]
    phone: &'a str,
    #[serde(rename = "Наименование")]
    name: &'a str,
    #[serde(rename = "Email")]
    email: Option<&'a str>,
}

#[derive(Deserialize)]
struct KontragentDto {
    #[serde(rename = "Ref_Key")]
    key: String,
    #[serde(rename = "Телефон")]
    phone: String,
    #[serde(rename = "Наименование")]
    name: String,
    #[serde(rename = "Email")]
    email: Option<String>,
}

impl From<KontragentDto> for CrmClient {
    fn from(d: KontragentDto) -> Self {
        CrmClient {
            id: Some(d.key),
            phone: d.phone,
            name: d.name,
            email: d.email,
        }
    }
}

#[derive(Deserialize)]
struct NomenklaturaDto {
    #[serde(rename = "Ref_Key")]
    key: String,
    #[serde(rename = "Наименование")]
    name: String,
    group: Option<String>,
    price: Option<f64>,
    duration_min: Option<i32>,
    #[serde(rename = "ПометкаУдаления")]
    marked_for_deletion: bool,
}

impl From<NomenklaturaDto> for CrmService {
    fn from(d: NomenklaturaDto) -> Self {
        CrmService {
            id: d.key,
            name: d.name,
            category: d.group,
            price: d.price,
            duration_minutes: d.duration_min,
            is_active: !d.marked_for_deletion,
        }
    }
}

#[derive(Deserialize)]
struct SotrudnikDto {
    #[serde(rename = "Ref_Key")]
    key: String,
    #[serde(rename = "Наименование")]
    name: String,
    #[serde(rename = "ПометкаУдаления")]
    marked_for_deletion: bool,
}

impl From<SotrudnikDto> for CrmEmployee {
    fn from(d: SotrudnikDto) -> Self {
        CrmEmployee {
            id: d.key,
            name: d.name,
            is_active: !d.marked_for_deletion,
        }
    }
}

#[derive(Deserialize)]
struct ScheduleSlotDto {
    date: String,
    time: String,
    duration_min: i32,
    employee_ref: Option<String>,
}

impl From<ScheduleSlotDto> for CrmTimeSlot {
    fn from(d: ScheduleSlotDto) -> Self {
        CrmTimeSlot {
            date: d.date,
            time: d.time,
            duration_minutes: d.duration_min,
            employee_id: d.employee_ref,
        }
    }
}

#[derive(Serialize)]
struct DocumentPayload<'a> {
    client_ref: &'a str,
    service_ref: &'a str,
    employee_ref: Option<&'a str>,
    date: &'a str,
    time: &'a str,
    comment: Option<&'a str>,
}

#[derive(Deserialize)]
struct DocumentDto {
    #[serde(rename = "Ref_Key")]
    key: String,
    client_ref: String,
    service_ref: String,
    employee_ref: Option<String>,
    date: String,
    time: String,
    comment: Option<String>,
    #[serde(rename = "ПометкаУдаления")]
    marked_for_deletion: bool,
}

impl From<DocumentDto> for CrmAppointment {
    fn from(d: DocumentDto) -> Self {
        CrmAppointment {
            id: Some(d.key),
            client_id: d.client_ref,
            service_id: d.service_ref,
            employee_id: d.employee_ref,
            appointment_date: d.date,
            appointment_time: d.time,
            notes: d.comment,
            is_cancelled: d.marked_for_deletion,
        }
    }
}

#[async_trait]
impl CrmAdapter for OneCAdapter {
    fn crm_name(&self) -> &'static str {
        "1c"
    }

    async fn get_client_by_phone(&self, phone: &str) -> Result<Option<CrmClient>, CrmError> {
        match self
            .client
            .get::<KontragentDto>("/Catalog_Контрагенты", &[("Телефон", phone)])
            .await
        {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let payload = KontragentPayload {
            phone: &client.phone,
            name: &client.name,
            email: client.email.as_deref(),
        };
        let dto: KontragentDto = self.client.post("/Catalog_Контрагенты", &payload).await?;
        Ok(dto.into())
    }

    async fn update_client(&self, client: CrmClient) -> Result<CrmClient, CrmError> {
        let id = client.id.clone().ok_or_else(|| CrmError::Invalid("missing client id".into()))?;
        let payload = KontragentPayload {
            phone: &client.phone,
            name: &client.name,
            email: client.email.as_deref(),
        };
        let dto: KontragentDto = self
            .client
            .put(&format!("/Catalog_Контрагенты(guid'{id}')"), &payload)
            .await?;
        Ok(dto.into())
    }

    async fn get_services(&self, category: Option<&str>) -> Result<Vec<CrmService>, CrmError> {
        let query: Vec<(&str, &str)> = category.map(|c| vec![("group", c)]).unwrap_or_default();
        let dtos: Vec<NomenklaturaDto> = self.client.get("/Catalog_Номенклатура", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_service_by_id(&self, service_id: &str) -> Result<Option<CrmService>, CrmError> {
        match self
            .client
            .get::<NomenklaturaDto>(&format!("/Catalog_Номенклатура(guid'{service_id}')"), &[])
            .await
        {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_employees(&self, _service_id: Option<&str>) -> Result<Vec<CrmEmployee>, CrmError> {
        let dtos: Vec<SotrudnikDto> = self.client.get("/Catalog_Сотрудники", &[]).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn get_employee_by_id(&self, employee_id: &str) -> Result<Option<CrmEmployee>, CrmError> {
        match self
            .client
            .get::<SotrudnikDto>(&format!("/Catalog_Сотрудники(guid'{employee_id}')"), &[])
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
        let mut query = vec![("service_ref", service_id), ("from", start_date), ("to", end_date)];
        if let Some(emp) = employee_id {
            query.push(("employee_ref", emp));
        }
        let dtos: Vec<ScheduleSlotDto> = self.client.get("/InformationRegister_РасписаниеСвободно", &query).await?;
        Ok(dtos.into_iter().map(Into::into).collect())
    }

    async fn create_appointment(
        &self,
        appointment: CrmAppointment,
        _idempotency_key: Option<String>,
    ) -> Result<CrmAppointment, CrmError> {
        let payload = DocumentPayload {
            client_ref: &appointment.client_id,
            service_ref: &appointment.service_id,
            employee_ref: appointment.employee_id.as_deref(),
            date: &appointment.appointment_date,
            time: &appointment.appointment_time,
            comment: appointment.notes.as_deref(),
        };
        let dto: DocumentDto = self.client.post("/Document_ЗаписьНаУслугу", &payload).await?;
        Ok(dto.into())
    }

    async fn get_appointment_by_id(&self, appointment_id: &str) -> Result<Option<CrmAppointment>, CrmError> {
        match self
            .client
            .get::<DocumentDto>(&format!("/Document_ЗаписьНаУслугу(guid'{appointment_id}')"), &[])
            .await
        {
            Ok(dto) => Ok(Some(dto.into())),
            Err(CrmError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn cancel_appointment(&self, appointment_id: &str) -> Result<bool, CrmError> {
        match self
            .client
            .delete(&format!("/Document_ЗаписьНаУслугу(guid'{appointment_id}')"))
            .await
        {
            Ok(()) => Ok(true),
            Err(CrmError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn get_client_appointments(&self, client_id: &str) -> Result<Vec<CrmAppointment>, CrmError> {
        let dtos: Vec<DocumentDto> = self
            .client
            .get("/Document_ЗаписьНаУслугу", &[("client_ref", client_id)])
            .await?;
        Ok(dtos.into_iter().map(Into::into).filter(|a: &CrmAppointment| !a.is_cancelled).collect())
    }

    async fn health_check(&self) -> Result<bool, CrmError> {
        let _: serde_json::Value = self.client.get("/$metadata", &[]).await?;
        Ok(true)
    }
}
