pub mod session;
pub mod target;

pub use session::{
    AckOutcome, AlertSession, DeliveryCounts, DispatchPlan, PendingDelivery, SessionStatus,
};
pub use target::{AlertTarget, DeliveryState};
