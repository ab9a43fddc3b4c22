// Common types shared across the engine

pub mod entity_ids;
pub mod id;

pub use entity_ids::{DonorId, SessionId};
pub use id::{Id, V4, V7};
