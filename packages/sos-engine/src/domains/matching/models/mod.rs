pub mod candidate;
pub mod request;

pub use candidate::{Candidate, LocalityMatch};
pub use request::{BloodRequest, SosRequest, Urgency};
