//! How many ranked candidates an SOS notifies.

use serde::{Deserialize, Serialize};

use crate::domains::matching::models::{BloodRequest, Candidate, Urgency};

/// Donors notified per unit needed, by urgency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanOutPolicy {
    pub normal: u32,
    pub high: u32,
    pub critical: u32,
}

impl Default for FanOutPolicy {
    fn default() -> Self {
        Self {
            normal: 3,
            high: 5,
            critical: 8,
        }
    }
}

impl FanOutPolicy {
    pub fn multiplier(&self, urgency: Urgency) -> u32 {
        match urgency {
            Urgency::Normal => self.normal,
            Urgency::High => self.high,
            Urgency::Critical => self.critical,
        }
    }

    /// `min(available, units_needed × multiplier(urgency))`.
    pub fn target_count(&self, available: usize, request: &BloodRequest) -> usize {
        let wanted = u64::from(request.units_needed) * u64::from(self.multiplier(request.urgency));
        usize::try_from(wanted).map_or(available, |wanted| wanted.min(available))
    }

    /// Top of the ranked list; never pads beyond what was ranked.
    pub fn select_targets(&self, mut ranked: Vec<Candidate>, request: &BloodRequest) -> Vec<Candidate> {
        let count = self.target_count(ranked.len(), request);
        ranked.truncate(count);
        ranked
    }
}
