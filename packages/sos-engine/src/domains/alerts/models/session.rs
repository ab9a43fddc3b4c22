use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::target::{AlertTarget, DeliveryState};
use crate::common::{DonorId, SessionId};
use crate::domains::donor::Contact;
use crate::domains::matching::{BloodRequest, Candidate};
use crate::error::SosError;

/// Lifecycle of one SOS.
///
/// `queued -> dispatching -> completed | expired`. A session completes when
/// every target is terminal, or when its TTL passes with at least one
/// acknowledgement; it expires when the TTL passes with none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Queued,
    Dispatching,
    Completed,
    Expired,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Expired)
    }
}

/// Result of recording an acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AckOutcome {
    Recorded,
    /// The donor had already acknowledged; nothing changed.
    Duplicate,
}

/// Per-state target counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryCounts {
    pub pending: usize,
    pub sent: usize,
    pub failed: usize,
    pub acknowledged: usize,
}

/// What the dispatcher needs to start delivering.
#[derive(Debug, Clone)]
pub struct DispatchPlan {
    pub session_id: SessionId,
    pub request: BloodRequest,
    /// Pending targets in rank order.
    pub targets: Vec<PendingDelivery>,
    /// Time left before the session TTL.
    pub remaining: std::time::Duration,
}

#[derive(Debug, Clone)]
pub struct PendingDelivery {
    pub donor_id: DonorId,
    pub contact: Contact,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertSession {
    pub id: SessionId,
    pub request: BloodRequest,
    pub status: SessionStatus,
    /// Ranked targets, best first.
    pub targets: Vec<AlertTarget>,
    /// Compatible, eligible donors found before fan-out.
    pub candidate_count: usize,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl AlertSession {
    /// Build a session from already-ranked targets. With no targets the session
    /// is closed as completed immediately.
    pub fn new(
        request: BloodRequest,
        targets: Vec<Candidate>,
        candidate_count: usize,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let targets: Vec<AlertTarget> = targets
            .into_iter()
            .enumerate()
            .map(|(i, c)| AlertTarget::from_candidate(c, i + 1, now))
            .collect();

        let (status, closed_at) = if targets.is_empty() {
            (SessionStatus::Completed, Some(now))
        } else {
            (SessionStatus::Queued, None)
        };

        Self {
            id: SessionId::new(),
            request,
            status,
            targets,
            candidate_count,
            created_at: now,
            expires_at: now + ttl,
            closed_at,
        }
    }

    pub fn target(&self, donor_id: DonorId) -> Option<&AlertTarget> {
        self.targets.iter().find(|t| t.donor_id == donor_id)
    }

    fn target_mut(&mut self, donor_id: DonorId) -> Result<&mut AlertTarget, SosError> {
        let session_id = self.id;
        self.targets
            .iter_mut()
            .find(|t| t.donor_id == donor_id)
            .ok_or(SosError::TargetNotFound {
                session_id,
                donor_id,
            })
    }

    pub fn counts(&self) -> DeliveryCounts {
        self.targets
            .iter()
            .fold(DeliveryCounts::default(), |mut acc, t| {
                match t.state {
                    DeliveryState::Pending => acc.pending += 1,
                    DeliveryState::Sent => acc.sent += 1,
                    DeliveryState::Failed => acc.failed += 1,
                    DeliveryState::Acknowledged => acc.acknowledged += 1,
                }
                acc
            })
    }

    pub fn success_count(&self) -> usize {
        self.counts().acknowledged
    }

    pub fn all_targets_terminal(&self) -> bool {
        self.targets.iter().all(|t| t.state.is_terminal())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// `queued -> dispatching`. Returns `None` if the session was already picked
    /// up or closed.
    pub fn begin_dispatch(&mut self, now: DateTime<Utc>) -> Option<DispatchPlan> {
        if self.status != SessionStatus::Queued {
            return None;
        }
        self.status = SessionStatus::Dispatching;

        let targets = self
            .targets
            .iter()
            .filter(|t| t.state == DeliveryState::Pending)
            .map(|t| PendingDelivery {
                donor_id: t.donor_id,
                contact: t.contact.clone(),
            })
            .collect();

        Some(DispatchPlan {
            session_id: self.id,
            request: self.request.clone(),
            targets,
            remaining: (self.expires_at - now).to_std().unwrap_or_default(),
        })
    }

    /// Count a new delivery attempt. Returns `None` when no attempt may start:
    /// the session is closed or the target already left `pending`.
    pub fn begin_attempt(&mut self, donor_id: DonorId, now: DateTime<Utc>) -> Result<Option<u32>, SosError> {
        let closed = self.status.is_terminal();
        let target = self.target_mut(donor_id)?;
        if closed || target.state != DeliveryState::Pending {
            return Ok(None);
        }
        target.attempts += 1;
        target.updated_at = now;
        Ok(Some(target.attempts))
    }

    pub fn record_error(&mut self, donor_id: DonorId, error: String, now: DateTime<Utc>) -> Result<(), SosError> {
        let target = self.target_mut(donor_id)?;
        target.last_error = Some(error);
        target.updated_at = now;
        Ok(())
    }

    /// Returns whether the target moved to `sent`.
    pub fn mark_sent(&mut self, donor_id: DonorId, now: DateTime<Utc>) -> Result<bool, SosError> {
        Ok(self.target_mut(donor_id)?.advance(DeliveryState::Sent, now))
    }

    /// Returns whether the target moved to `failed`.
    pub fn mark_failed(&mut self, donor_id: DonorId, error: String, now: DateTime<Utc>) -> Result<bool, SosError> {
        let target = self.target_mut(donor_id)?;
        let changed = target.advance(DeliveryState::Failed, now);
        if changed {
            target.last_error = Some(error);
        }
        Ok(changed)
    }

    /// Record a donor's response. Accepted in any session status; never
    /// reopens a closed session.
    pub fn acknowledge(&mut self, donor_id: DonorId, now: DateTime<Utc>) -> Result<AckOutcome, SosError> {
        let target = self.target_mut(donor_id)?;
        if target.state == DeliveryState::Acknowledged {
            return Ok(AckOutcome::Duplicate);
        }
        target.advance(DeliveryState::Acknowledged, now);
        Ok(AckOutcome::Recorded)
    }

    /// Close the session as completed once every target is terminal.
    ///
    /// Returns the status if the session is (now) closed.
    pub fn try_complete(&mut self, now: DateTime<Utc>) -> Option<SessionStatus> {
        if self.status.is_terminal() {
            return Some(self.status);
        }
        if !self.all_targets_terminal() {
            return None;
        }
        self.close(SessionStatus::Completed, now);
        Some(self.status)
    }

    /// Close the session because its TTL elapsed.
    pub fn close_on_ttl(&mut self, now: DateTime<Utc>) -> SessionStatus {
        if !self.status.is_terminal() {
            let status = if self.success_count() > 0 {
                SessionStatus::Completed
            } else {
                SessionStatus::Expired
            };
            self.close(status, now);
        }
        self.status
    }

    /// Apply the TTL if it has passed. Used when reading sessions whose
    /// dispatcher is no longer watching them.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> SessionStatus {
        if !self.status.is_terminal() && now >= self.expires_at {
            return self.close_on_ttl(now);
        }
        self.status
    }

    fn close(&mut self, status: SessionStatus, now: DateTime<Utc>) {
        self.status = status;
        self.closed_at = Some(now);
    }
}
