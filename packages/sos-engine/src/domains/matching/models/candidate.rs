use serde::Serialize;

use crate::common::DonorId;
use crate::domains::donor::Donor;

/// How a donor's city relates to the request's city filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalityMatch {
    /// Request has no city, or the donor's city does not match.
    None,
    /// Donor city contains the requested city (case-insensitive).
    Partial,
    /// Donor city equals the requested city (case-insensitive).
    Exact,
}

impl LocalityMatch {
    pub fn classify(requested: Option<&str>, donor_city: Option<&str>) -> Self {
        let (Some(requested), Some(city)) = (requested, donor_city) else {
            return LocalityMatch::None;
        };
        let requested = requested.trim().to_lowercase();
        let city = city.trim().to_lowercase();
        if requested.is_empty() || city.is_empty() {
            LocalityMatch::None
        } else if city == requested {
            LocalityMatch::Exact
        } else if city.contains(&requested) {
            LocalityMatch::Partial
        } else {
            LocalityMatch::None
        }
    }
}

/// A donor viewed against one request. Transient, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub donor: Donor,
    pub compatible: bool,
    pub eligible: bool,
    pub locality: LocalityMatch,
    /// Whole days past the 56-day line; `None` if the donor never donated.
    pub days_since_eligible: Option<i64>,
    /// Filled in by ranking.
    pub score: f64,
}

impl Candidate {
    pub fn donor_id(&self) -> DonorId {
        self.donor.id
    }
}
