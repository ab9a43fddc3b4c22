//! Pure ranking functions for candidate donors.
//!
//! These contain NO side effects. A score is the weighted sum of three bounded
//! components, each in `[0, 1]` before weighting:
//!
//! - recency: `min(days_since_eligible, 365) / 365`, full credit if never donated
//! - locality: 1.0 on exact city match, 0.5 on substring match
//! - reliability: acknowledged / notified over the donor's alert history
//!
//! Equal scores are ordered by donor id ascending so repeated runs produce the
//! same order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domains::matching::models::{Candidate, LocalityMatch};

/// Days past eligibility after which the recency bonus stops growing.
pub const RECENCY_CAP_DAYS: i64 = 365;

/// Ranking weights. Defaults: recency 1.0, exact locality 1.0, partial
/// locality 0.5, reliability 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    pub recency: f64,
    pub locality_exact: f64,
    pub locality_partial: f64,
    pub reliability: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            recency: 1.0,
            locality_exact: 1.0,
            locality_partial: 0.5,
            reliability: 0.5,
        }
    }
}

/// Recency component in `[0, 1]`.
pub fn recency_bonus(days_since_eligible: Option<i64>) -> f64 {
    let days = days_since_eligible.unwrap_or(RECENCY_CAP_DAYS);
    days.clamp(0, RECENCY_CAP_DAYS) as f64 / RECENCY_CAP_DAYS as f64
}

/// Score a single candidate.
pub fn score(candidate: &Candidate, weights: &RankingWeights) -> f64 {
    let locality = match candidate.locality {
        LocalityMatch::Exact => weights.locality_exact,
        LocalityMatch::Partial => weights.locality_partial,
        LocalityMatch::None => 0.0,
    };

    weights.recency * recency_bonus(candidate.days_since_eligible)
        + locality
        + weights.reliability * candidate.donor.history.reliability()
}

/// Total order used by [`rank`]: score descending, then donor id ascending.
pub fn compare(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.donor.id.cmp(&b.donor.id))
}

/// Score every candidate and sort best-first.
pub fn rank(mut candidates: Vec<Candidate>, weights: &RankingWeights) -> Vec<Candidate> {
    for candidate in &mut candidates {
        candidate.score = score(candidate, weights);
    }
    candidates.sort_by(compare);
    candidates
}
