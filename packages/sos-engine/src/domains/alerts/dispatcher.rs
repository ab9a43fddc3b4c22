//! Concurrent, bounded delivery of one session's notifications.
//!
//! ```text
//! dispatch(session)
//!     │
//!     ├─► queued -> dispatching, snapshot pending targets
//!     ├─► spawn delivery task
//!     │       └─► per target (rank order, ≤ max_concurrent at once)
//!     │               attempt ─► timeout / error ─► one retry ─► failed
//!     └─► select! { all targets terminal, TTL timer }
//!             └─► completed | expired
//! ```
//!
//! The TTL cancels the delivery task cooperatively: attempts already in flight
//! finish and record their outcome, no new attempt starts. The same happens when
//! another caller closes the session first (`get_session` or `acknowledge`
//! applying an overdue TTL).

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::message::compose_sos_message;
use super::models::{AlertSession, PendingDelivery, SessionStatus};
use super::store::SessionCell;
use crate::domains::donor::Contact;
use crate::error::{DeliveryError, SosError};
use crate::kernel::{BaseClock, BaseNotifier};

/// Configuration for the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Deliveries in flight at once, per session
    pub max_concurrent_deliveries: usize,
    /// Limit for a single send attempt
    pub attempt_timeout: Duration,
    /// Attempts per target, including the first
    pub max_attempts: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_deliveries: 10,
            attempt_timeout: Duration::from_secs(5),
            max_attempts: 2,
        }
    }
}

/// Stateless across sessions; holds only its collaborators.
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn BaseNotifier>,
    clock: Arc<dyn BaseClock>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn BaseNotifier>, clock: Arc<dyn BaseClock>, config: DispatchConfig) -> Self {
        Self {
            notifier,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Deliver to every pending target and wait until the session closes.
    ///
    /// Returns the terminal status. Calling it again on a session that was
    /// already dispatched sends nothing and returns the current status.
    #[instrument(skip(self, cell), fields(session_id = %cell.id()))]
    pub async fn dispatch(&self, cell: Arc<SessionCell>) -> SessionStatus {
        let now = self.clock.now();
        let Some(plan) = cell.update(|s| s.begin_dispatch(now)).await else {
            let status = cell.snapshot().await.status;
            debug!(status = ?status, "Session already dispatched, skipping");
            return status;
        };

        info!(
            targets = plan.targets.len(),
            ttl_secs = plan.remaining.as_secs(),
            "Dispatching SOS"
        );

        let message: Arc<str> = compose_sos_message(&plan.request, plan.session_id).into();
        let deadline = Instant::now() + plan.remaining;
        let cancel = CancellationToken::new();

        // Detached: in-flight attempts outlive the TTL and still record outcomes.
        let deliveries = {
            let worker = self.clone();
            let cell = cell.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { worker.deliver_all(cell, plan.targets, message, cancel).await })
        };
        tokio::pin!(deliveries);

        let ttl = tokio::time::sleep_until(deadline);
        tokio::pin!(ttl);
        let mut status_rx = cell.subscribe();
        let mut deliveries_done = false;

        loop {
            let now = self.clock.now();
            if let Some(status) = cell.update(|s| s.try_complete(now)).await {
                cancel.cancel();
                info!(status = ?status, "SOS session closed");
                return status;
            }

            tokio::select! {
                _ = &mut ttl => {
                    cancel.cancel();
                    let now = self.clock.now();
                    let status = cell.update(|s| s.close_on_ttl(now)).await;
                    let counts = cell.snapshot().await.counts();
                    info!(
                        status = ?status,
                        acknowledged = counts.acknowledged,
                        sent = counts.sent,
                        failed = counts.failed,
                        pending = counts.pending,
                        "SOS session TTL reached"
                    );
                    return status;
                }
                joined = &mut deliveries, if !deliveries_done => {
                    deliveries_done = true;
                    if let Err(e) = joined {
                        error!(error = %e, "Delivery task failed");
                    }
                    debug!("All delivery attempts finished, waiting for acknowledgements");
                }
                _ = cell.settled() => {}
                // closed elsewhere: picked up by try_complete above
                _ = status_rx.changed() => {}
            }
        }
    }

    async fn deliver_all(
        self,
        cell: Arc<SessionCell>,
        targets: Vec<PendingDelivery>,
        message: Arc<str>,
        cancel: CancellationToken,
    ) {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_deliveries.max(1)));
        let mut workers = JoinSet::new();

        // Permits are taken in rank order, so better-ranked donors go first.
        for target in targets {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let worker = self.clone();
            let cell = cell.clone();
            let message = message.clone();
            let cancel = cancel.clone();
            workers.spawn(async move {
                let _permit = permit;
                worker.deliver(&cell, target, &message, &cancel).await;
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Delivery worker panicked");
            }
        }
    }

    /// Up to `max_attempts` tries for one target.
    ///
    /// Every attempt is claimed under the session lock and only starts while the
    /// session is open and the target is still `pending`. A target whose attempt
    /// fails after the session closed stays `pending` with the error recorded:
    /// it was never retried, so it is not reported as terminally failed.
    #[instrument(skip_all, fields(donor_id = %target.donor_id))]
    async fn deliver(
        &self,
        cell: &SessionCell,
        target: PendingDelivery,
        message: &str,
        cancel: &CancellationToken,
    ) {
        let donor_id = target.donor_id;
        let max_attempts = self.config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                debug!(attempt, "Session closed, not starting attempt");
                return;
            }

            let now = self.clock.now();
            match cell.update(|s| s.begin_attempt(donor_id, now)).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    debug!(attempt, "Target answered or session closed, not starting attempt");
                    return;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Could not claim delivery attempt");
                    return;
                }
            }

            match self.attempt(&target.contact, message).await {
                Ok(()) => {
                    let now = self.clock.now();
                    record_outcome(cell, "sent", |s| s.mark_sent(donor_id, now)).await;
                    debug!(attempt, "Notification sent");
                    return;
                }
                Err(e) => {
                    warn!(attempt, max_attempts, error = %e, "Delivery attempt failed");
                    let now = self.clock.now();
                    let reason = e.to_string();
                    record_outcome(cell, "error", |s| s.record_error(donor_id, reason, now)).await;
                    let retryable = !matches!(e, DeliveryError::NoChannel);
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        if let Some(e) = last_error {
            let now = self.clock.now();
            let reason = e.to_string();
            record_outcome(cell, "failed", |s| s.mark_failed(donor_id, reason, now)).await;
            warn!(error = %e, "Target marked failed");
        }
    }

    async fn attempt(&self, contact: &Contact, message: &str) -> Result<(), DeliveryError> {
        if !contact.is_reachable() {
            return Err(DeliveryError::NoChannel);
        }

        match tokio::time::timeout(self.config.attempt_timeout, self.notifier.send(contact, message)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(DeliveryError::Channel(format!("{:#}", e))),
            Err(_) => Err(DeliveryError::Timeout(self.config.attempt_timeout)),
        }
    }
}

/// Apply a target update; a failure is logged rather than dropped.
async fn record_outcome<T>(
    cell: &SessionCell,
    outcome: &'static str,
    f: impl FnOnce(&mut AlertSession) -> Result<T, SosError>,
) {
    if let Err(e) = cell.update(f).await {
        warn!(outcome, error = %e, "Failed to record delivery outcome");
    }
}
