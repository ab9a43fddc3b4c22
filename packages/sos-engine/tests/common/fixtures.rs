//! Donor and request fixtures shared by the integration tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use sos_core::domains::donor::{BloodType, Contact, Donor};
use sos_core::domains::matching::SosRequest;

/// Reference "now" for every test.
pub fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    as_of() - Duration::days(days)
}

/// Phone number for the n-th fixture donor.
pub fn phone(n: usize) -> String {
    format!("+1555000{:04}", n)
}

/// Eligible donor who has never donated, reachable by SMS.
pub fn donor(n: usize, blood_type: BloodType) -> Donor {
    Donor::new(blood_type).with_contact(Contact::phone(phone(n)))
}

pub fn donor_in(n: usize, blood_type: BloodType, city: &str) -> Donor {
    donor(n, blood_type).with_city(city)
}

pub fn donor_last_donated(n: usize, blood_type: BloodType, days: i64) -> Donor {
    donor(n, blood_type).with_last_donation(days_ago(days))
}

/// `count` universal donors, numbered from 1.
pub fn universal_donors(count: usize) -> Vec<Donor> {
    (1..=count).map(|n| donor(n, BloodType::ONeg)).collect()
}

pub fn sos(blood_type: &str, units: i64, urgency: &str) -> SosRequest {
    SosRequest {
        blood_type: Some(blood_type.to_string()),
        units_needed: units,
        city: None,
        urgency: Some(urgency.to_string()),
    }
}
