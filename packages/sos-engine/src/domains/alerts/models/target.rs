use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::DonorId;
use crate::domains::donor::{BloodType, Contact};
use crate::domains::matching::Candidate;

/// Delivery state of one notified donor.
///
/// ```text
/// pending ──► sent ──► acknowledged
///    │                      ▲
///    └──► failed ───────────┘
/// ```
///
/// Transitions only move forward. A donor who answers after their delivery was
/// reported failed still counts as acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    Pending,
    Sent,
    Failed,
    Acknowledged,
}

impl DeliveryState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DeliveryState::Failed | DeliveryState::Acknowledged)
    }

    pub fn can_transition_to(self, next: DeliveryState) -> bool {
        use DeliveryState::*;
        matches!(
            (self, next),
            (Pending, Sent)
                | (Pending, Failed)
                | (Pending, Acknowledged)
                | (Sent, Acknowledged)
                | (Failed, Acknowledged)
        )
    }
}

/// One donor selected for notification, owned by its session.
#[derive(Debug, Clone, Serialize)]
pub struct AlertTarget {
    pub donor_id: DonorId,
    pub name: Option<String>,
    pub blood_type: BloodType,
    pub contact: Contact,
    /// 1-based position in the ranked list.
    pub rank: usize,
    pub score: f64,
    pub state: DeliveryState,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl AlertTarget {
    pub fn from_candidate(candidate: Candidate, rank: usize, now: DateTime<Utc>) -> Self {
        Self {
            donor_id: candidate.donor.id,
            name: candidate.donor.name,
            blood_type: candidate.donor.blood_type,
            contact: candidate.donor.contact,
            rank,
            score: candidate.score,
            state: DeliveryState::Pending,
            attempts: 0,
            last_error: None,
            sent_at: None,
            acknowledged_at: None,
            updated_at: now,
        }
    }

    /// Apply `next` if it moves the state forward. Returns whether anything changed.
    pub(crate) fn advance(&mut self, next: DeliveryState, now: DateTime<Utc>) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        self.state = next;
        self.updated_at = now;
        match next {
            DeliveryState::Sent => self.sent_at = Some(now),
            DeliveryState::Acknowledged => self.acknowledged_at = Some(now),
            DeliveryState::Pending | DeliveryState::Failed => {}
        }
        true
    }
}
