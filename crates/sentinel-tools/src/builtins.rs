use async_trait::async_trait;
use sentinel_crm::{CrmAdapter, CrmAppointment, CrmClient};
use serde_json::{json, Map, Value};

use crate::args::{optional_str, required_str, strict_date, strict_time};
use crate::tool::Tool;

pub struct GetServices;

#[async_trait]
impl Tool for GetServices {
    fn name(&self) -> &'static str {
        "get_services"
    }

    fn description(&self) -> &'static str {
        "List the services the business offers, optionally filtered by category."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "category": { "type": "string" } },
        })
    }

    async fn call(&self, adapter: &dyn CrmAdapter, args: &Map<String, Value>) -> Result<Value, String> {
        let category = optional_str(args, "category");
        let services = adapter.get_services(category).await.map_err(|e| e.to_string())?;
        Ok(json!(services))
    }
}

pub struct GetServiceById;

#[async_trait]
impl Tool for GetServiceById {
    fn name(&self) -> &'static str {
        "get_service_by_id"
    }

    fn description(&self) -> &'static str {
        "Look up a single service by its id."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "service_id": { "type": "string" } },
            "required": ["service_id"],
        })
    }

    async fn call(&self, adapter: &dyn CrmAdapter, args: &Map<String, Value>) -> Result<Value, String> {
        let service_id = required_str(args, "service_id")?;
        let service = adapter.get_service_by_id(service_id).await.map_err(|e| e.to_string())?;
        Ok(json!(service))
    }
}

pub struct GetEmployees;

#[async_trait]
impl Tool for GetEmployees {
    fn name(&self) -> &'static str {
        "get_employees"
    }

    fn description(&self) -> &'static str {
        "List employees, optionally filtered to those who perform a given service."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "service_id": { "type": "string" } },
        })
    }

    async fn call(&self, adapter: &dyn CrmAdapter, args: &Map<String, Value>) -> Result<Value, String> {
        let service_id = optional_str(args, "service_id");
        let employees = adapter.get_employees(service_id).await.map_err(|e| e.to_string())?;
        Ok(json!(employees))
    }
}

pub struct GetAvailableSlots;

#[async_trait]
impl Tool for GetAvailableSlots {
    fn name(&self) -> &'static str {
        "get_available_slots"
    }

    fn description(&self) -> &'static str {
        "List open appointment slots for a service within a date range."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "service_id": { "type": "string" },
                "start_date": { "type": "string", "description": "YYYY-MM-DD" },
                "end_date": { "type": "string", "description": "YYYY-MM-DD" },
                "employee_id": { "type": "string" },
            },
            "required": ["service_id", "start_date", "end_date"],
        })
    }

    async fn call(&self, adapter: &dyn CrmAdapter, args: &Map<String, Value>) -> Result<Value, String> {
        let service_id = required_str(args, "service_id")?;
        let start_date = required_str(args, "start_date")?;
        let end_date = required_str(args, "end_date")?;
        strict_date(start_date, "start_date")?;
        strict_date(end_date, "end_date")?;
        let employee_id = optional_str(args, "employee_id");

        let slots = adapter
            .get_available_slots(service_id, start_date, end_date, employee_id)
            .await
            .map_err(|e| e.to_string())?;
        Ok(json!(slots))
    }
}

pub struct GetClientByPhone;

#[async_trait]
impl Tool for GetClientByPhone {
    fn name(&self) -> &'static str {
        "get_client_by_phone"
    }

    fn description(&self) -> &'static str {
        "Look up an existing client by phone number."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "phone": { "type": "string" } },
            "required": ["phone"],
        })
    }

    async fn call(&self, adapter: &dyn CrmAdapter, args: &Map<String, Value>) -> Result<Value, String> {
        let phone = required_str(args, "phone")?;
        let client = adapter.get_client_by_phone(phone).await.map_err(|e| e.to_string())?;
        Ok(json!(client))
    }
}

pub struct CreateClient;

#[async_trait]
impl Tool for CreateClient {
    fn name(&self) -> &'static str {
        "create_client"
    }

    fn description(&self) -> &'static str {
        "Create a new client record."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "phone": { "type": "string" },
                "name": { "type": "string" },
                "email": { "type": "string" },
            },
            "required": ["phone", "name"],
        })
    }

    async fn call(&self, adapter: &dyn CrmAdapter, args: &Map<String, Value>) -> Result<Value, String> {
        let phone = required_str(args, "phone")?;
        let name = required_str(args, "name")?;
        let email = optional_str(args, "email");

        let client = CrmClient {
            id: None,
            phone: phone.to_string(),
            name: name.to_string(),
            email: email.map(str::to_string),
        };
        let created = adapter.create_client(client).await.map_err(|e| e.to_string())?;
        Ok(json!(created))
    }
}

pub struct CreateAppointment;

#[async_trait]
impl Tool for CreateAppointment {
    fn name(&self) -> &'static str {
        "create_appointment"
    }

    fn description(&self) -> &'static str {
        "Book an appointment for a client."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "client_id": { "type": "string" },
                "service_id": { "type": "string" },
                "appointment_date": { "type": "string", "description": "YYYY-MM-DD" },
                "appointment_time": { "type": "string", "description": "HH:MM" },
                "employee_id": { "type": "string" },
                "notes": { "type": "string" },
            },
            "required": ["client_id", "service_id", "appointment_date", "appointment_time"],
        })
    }

    async fn call(&self, adapter: &dyn CrmAdapter, args: &Map<String, Value>) -> Result<Value, String> {
        let client_id = required_str(args, "client_id")?;
        let service_id = required_str(args, "service_id")?;
        let appointment_date = required_str(args, "appointment_date")?;
        let appointment_time = required_str(args, "appointment_time")?;
        strict_date(appointment_date, "appointment_date")?;
        strict_time(appointment_time, "appointment_time")?;
        let employee_id = optional_str(args, "employee_id");
        let notes = optional_str(args, "notes");

        let appointment = CrmAppointment {
            id: None,
            client_id: client_id.to_string(),
            service_id: service_id.to_string(),
            employee_id: employee_id.map(str::to_string),
            appointment_date: appointment_date.to_string(),
            appointment_time: appointment_time.to_string(),
            notes: notes.map(str::to_string),
            is_cancelled: false,
        };
        let created = adapter
            .create_appointment(appointment, None)
            .await
            .map_err(|e| e.to_string())?;
        Ok(json!(created))
    }
}

pub struct GetClientAppointments;

#[async_trait]
impl Tool for GetClientAppointments {
    fn name(&self) -> &'static str {
        "get_client_appointments"
    }

    fn description(&self) -> &'static str {
        "List a client's future appointments."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "client_id": { "type": "string" } },
            "required": ["client_id"],
        })
    }

    async fn call(&self, adapter: &dyn CrmAdapter, args: &Map<String, Value>) -> Result<Value, String> {
        let client_id = required_str(args, "client_id")?;
        let appointments = adapter.get_client_appointments(client_id).await.map_err(|e| e.to_string())?;
        Ok(json!(appointments))
    }
}

pub struct CancelAppointment;

#[async_trait]
impl Tool for CancelAppointment {
    fn name(&self) -> &'static str {
        "cancel_appointment"
    }

    fn description(&self) -> &'static str {
        "Cancel an existing appointment."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "appointment_id": { "type": "string" } },
            "required": ["appointment_id"],
        })
    }

    async fn call(&self, adapter: &dyn CrmAdapter, args: &Map<String, Value>) -> Result<Value, String> {
        let appointment_id = required_str(args, "appointment_id")?;
        let cancelled = adapter.cancel_appointment(appointment_id).await.map_err(|e| e.to_string())?;
        Ok(json!(cancelled))
    }
}

pub fn all() -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(GetServices),
        Box::new(GetServiceById),
        Box::new(GetEmployees),
        Box::new(GetAvailableSlots),
        Box::new(GetClientByPhone),
        Box::new(CreateClient),
        Box::new(CreateAppointment),
        Box::new(GetClientAppointments),
        Box::new(CancelAppointment),
    ]
}
