//! Typed ID definitions for engine entities.

pub use super::id::{Id, V4, V7};

/// Marker type for donor records owned by the registry.
pub struct Donor;

/// Marker type for alert sessions.
pub struct AlertSession;

/// Donor identifiers are assigned by the registry, so no ordering is implied.
pub type DonorId = Id<Donor, V4>;

/// Session ids are time-ordered so a listing sorts by creation.
pub type SessionId = Id<AlertSession>;
