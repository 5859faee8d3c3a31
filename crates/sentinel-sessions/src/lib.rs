pub mod error;
pub mod store;
pub mod types;

pub use error::SessionStoreError;
pub use store::SessionStore;
pub use types::{HistoryEntry, HistoryRole, Session, SessionContext};
