// Trait definitions for collaborator injection
//
// These are INFRASTRUCTURE seams only - matching and fan-out rules live in
// domains/ and reach storage, messaging and time exclusively through them.
//
// Naming convention: Base* for trait names (e.g., BaseNotifier, BaseClock)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domains::donor::{Contact, Donor, DonorFilter};

// =============================================================================
// Donor Registry Trait (Infrastructure - storage layer)
// =============================================================================

#[async_trait]
pub trait BaseDonorRegistry: Send + Sync {
    /// List donors matching the filter. An empty filter lists every donor.
    async fn list_donors(&self, filter: &DonorFilter) -> Result<Vec<Donor>>;
}

// =============================================================================
// Notifier Trait (Infrastructure - SMS/email provider)
// =============================================================================

#[async_trait]
pub trait BaseNotifier: Send + Sync {
    /// Hand one message to the delivery channel for `contact`.
    ///
    /// `Ok` means the provider accepted the message, not that the donor read it.
    async fn send(&self, contact: &Contact, message: &str) -> Result<()>;
}

// =============================================================================
// Clock Trait (Infrastructure)
// =============================================================================

pub trait BaseClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl BaseClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
