pub mod dispatcher;
pub mod message;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use dispatcher::{DispatchConfig, Dispatcher};
pub use message::compose_sos_message;
pub use models::{AckOutcome, AlertSession, AlertTarget, DeliveryState, SessionStatus};
pub use store::{SessionCell, SessionStore};
