// Lifeline SOS Engine - core
//
// Matches an urgent blood request against the donor registry, ranks the
// compatible and eligible donors, fans out to a bounded subset and tracks
// delivery and acknowledgement per session.
//
// Business rules live in domains/*; infrastructure seams live in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod error;
pub mod kernel;

pub use config::{Config, EngineConfig};
pub use error::{DeliveryError, SosError};
