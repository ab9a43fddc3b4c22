use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domains::donor::Donor;
use crate::domains::matching::models::{BloodRequest, Candidate, LocalityMatch};
use crate::domains::matching::utils::{can_serve, days_since_eligible, is_eligible};

/// Reduce the registry's donors to compatible, eligible candidates for `request`.
///
/// With a city filter, exact city matches win; substring matches are used only
/// when no exact match survives. Read-only over `donors`.
pub fn select_candidates(donors: &[Donor], request: &BloodRequest, as_of: DateTime<Utc>) -> Vec<Candidate> {
    let requested_city = request.city.as_deref();

    let pool: Vec<Candidate> = donors
        .iter()
        .filter_map(|donor| {
            let compatible = can_serve(donor.blood_type, request.blood_type);
            let eligible = is_eligible(donor.last_donation, as_of);
            if !(compatible && eligible) {
                debug!(
                    donor_id = %donor.id,
                    blood_type = %donor.blood_type,
                    compatible,
                    eligible,
                    "Donor excluded"
                );
                return None;
            }
            Some(Candidate {
                donor: donor.clone(),
                compatible,
                eligible,
                locality: LocalityMatch::classify(requested_city, donor.city.as_deref()),
                days_since_eligible: days_since_eligible(donor.last_donation, as_of),
                score: 0.0,
            })
        })
        .collect();

    if requested_city.is_none() {
        return pool;
    }

    let has_exact = pool.iter().any(|c| c.locality == LocalityMatch::Exact);
    let wanted = if has_exact {
        LocalityMatch::Exact
    } else {
        debug!(city = ?requested_city, "No exact city match, falling back to substring");
        LocalityMatch::Partial
    };

    pool.into_iter().filter(|c| c.locality == wanted).collect()
}
