use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BloodType;
use crate::common::DonorId;

/// How a donor can be reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Contact {
    pub fn phone(phone: impl Into<String>) -> Self {
        Self {
            email: None,
            phone: Some(phone.into()),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.phone.as_deref().is_some_and(|p| !p.trim().is_empty())
            || self.email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

/// Past alert outcomes for a donor, maintained by the surrounding service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHistory {
    pub notified: u32,
    pub acknowledged: u32,
}

impl ResponseHistory {
    /// Fraction of past alerts the donor answered, in `[0, 1]`. Zero when never notified.
    pub fn reliability(&self) -> f64 {
        if self.notified == 0 {
            return 0.0;
        }
        (self.acknowledged.min(self.notified) as f64) / (self.notified as f64)
    }
}

/// Donor record as supplied by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub id: DonorId,
    #[serde(default)]
    pub name: Option<String>,
    pub blood_type: BloodType,
    #[serde(default)]
    pub last_donation: Option<DateTime<Utc>>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub history: ResponseHistory,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DonorValidationError {
    #[error("donor {donor_id} has a last donation date in the future ({last_donation})")]
    DonationInFuture {
        donor_id: DonorId,
        last_donation: DateTime<Utc>,
    },
}

impl Donor {
    pub fn new(blood_type: BloodType) -> Self {
        Self {
            id: DonorId::new(),
            name: None,
            blood_type,
            last_donation: None,
            city: None,
            state: None,
            contact: Contact::default(),
            history: ResponseHistory::default(),
        }
    }

    pub fn with_last_donation(mut self, at: DateTime<Utc>) -> Self {
        self.last_donation = Some(at);
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = contact;
        self
    }

    pub fn with_history(mut self, history: ResponseHistory) -> Self {
        self.history = history;
        self
    }

    /// Checks record invariants relative to `as_of`.
    pub fn validate(&self, as_of: DateTime<Utc>) -> Result<(), DonorValidationError> {
        match self.last_donation {
            Some(last) if last > as_of => Err(DonorValidationError::DonationInFuture {
                donor_id: self.id,
                last_donation: last,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn reliability_is_zero_without_history() {
        assert_eq!(ResponseHistory::default().reliability(), 0.0);
    }

    #[test]
    fn reliability_is_clamped() {
        let h = ResponseHistory {
            notified: 4,
            acknowledged: 9,
        };
        assert_eq!(h.reliability(), 1.0);
        let h = ResponseHistory {
            notified: 4,
            acknowledged: 1,
        };
        assert_eq!(h.reliability(), 0.25);
    }

    #[test]
    fn future_donation_fails_validation() {
        let now = Utc::now();
        let donor = Donor::new(BloodType::APos).with_last_donation(now + Duration::days(1));
        assert!(matches!(
            donor.validate(now),
            Err(DonorValidationError::DonationInFuture { .. })
        ));
        let donor = Donor::new(BloodType::APos).with_last_donation(now);
        assert!(donor.validate(now).is_ok());
    }

    #[test]
    fn contact_reachability() {
        assert!(!Contact::default().is_reachable());
        assert!(Contact::phone("+15551234567").is_reachable());
        assert!(!Contact::phone("   ").is_reachable());
    }

    #[test]
    fn deserializes_sparse_registry_record() {
        let json = r#"{
            "id": "6f1c1e0e-4c55-4b0e-9a55-3d9a2d2b7c11",
            "blood_type": "B+",
            "city": "Pune"
        }"#;
        let donor: Donor = serde_json::from_str(json).unwrap();
        assert_eq!(donor.blood_type, BloodType::BPos);
        assert_eq!(donor.last_donation, None);
        assert_eq!(donor.city.as_deref(), Some("Pune"));
        assert_eq!(donor.history, ResponseHistory::default());
    }
}
