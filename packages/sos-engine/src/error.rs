use thiserror::Error;

use crate::common::{DonorId, SessionId};

/// Errors surfaced to callers of the engine.
///
/// Delivery problems are not here: they are recorded per target and never
/// returned from `raise_sos`.
#[derive(Error, Debug)]
pub enum SosError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Alert session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Donor {donor_id} is not a target of session {session_id}")]
    TargetNotFound {
        session_id: SessionId,
        donor_id: DonorId,
    },

    #[error("Donor registry error: {0}")]
    Registry(#[source] anyhow::Error),
}

/// Why a single delivery attempt did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("delivery attempt timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("delivery channel error: {0}")]
    Channel(String),

    #[error("donor has no reachable contact")]
    NoChannel,
}

pub type Result<T, E = SosError> = std::result::Result<T, E>;
