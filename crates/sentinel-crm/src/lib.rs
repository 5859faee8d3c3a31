pub mod adapter;
pub mod domain;
pub mod error;
pub mod mock;
pub mod rate_gate;
pub mod registry;
pub mod vendors;

pub use adapter::CrmAdapter;
pub use domain::{CrmAppointment, CrmClient, CrmEmployee, CrmService, CrmTimeSlot};
pub use error::CrmError;
pub use mock::MockCrmAdapter;
pub use rate_gate::RateGate;
pub use registry::{build, CrmCredentials};
