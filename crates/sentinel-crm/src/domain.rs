use serde::{Deserialize, Serialize};

/// Neutral domain records every adapter translates vendor payloads to/from.
/// Fields are intentionally permissive (`Option`) since not every vendor
/// exposes every attribute.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrmClient {
    pub id: Option<String>,
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrmService {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub duration_minutes: Option<i32>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrmEmployee {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmTimeSlot {
    pub date: String,
    pub time: String,
    pub duration_minutes: i32,
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrmAppointment {
    pub id: Option<String>,
    pub client_id: String,
    pub service_id: String,
    pub employee_id: Option<String>,
    pub appointment_date: String,
    pub appointment_time: String,
    pub notes: Option<String>,
    pub is_cancelled: bool,
}
