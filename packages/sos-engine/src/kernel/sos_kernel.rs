// SosKernel - the engine's entry points
//
// Wires the donor registry, notifier, clock and configuration together and
// owns the in-process session store. Matching runs inline on the caller's task;
// delivery is handed to a background dispatch so callers get a session handle
// immediately.

use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::EngineDeps;
use crate::common::{DonorId, SessionId};
use crate::config::EngineConfig;
use crate::domains::alerts::{AckOutcome, AlertSession, Dispatcher, SessionCell, SessionStatus, SessionStore};
use crate::domains::donor::{Donor, DonorFilter};
use crate::domains::matching::utils::{donor_types_for, rank};
use crate::domains::matching::{select_candidates, BloodRequest, SosRequest};
use crate::error::{Result, SosError};

pub struct SosKernel {
    deps: EngineDeps,
    config: EngineConfig,
    sessions: SessionStore,
    dispatcher: Dispatcher,
}

impl SosKernel {
    pub fn new(deps: EngineDeps, config: EngineConfig) -> Self {
        let dispatcher = Dispatcher::new(deps.notifier.clone(), deps.clock.clone(), config.dispatch);
        Self {
            deps,
            config,
            sessions: SessionStore::new(),
            dispatcher,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate raw caller input and raise an SOS.
    pub async fn raise_sos(&self, request: SosRequest) -> Result<AlertSession> {
        let request = BloodRequest::try_from(request)?;
        self.raise(request).await
    }

    /// Match, rank and fan out, then start delivery in the background.
    ///
    /// Returns the session as created (`queued`, or `completed` with no
    /// targets). Delivery outcomes are observed through [`Self::get_session`].
    #[instrument(skip(self, request), fields(blood_type = %request.blood_type, urgency = ?request.urgency))]
    pub async fn raise(&self, request: BloodRequest) -> Result<AlertSession> {
        let now = self.deps.clock.now();
        let donors = self.load_donors(&request).await?;

        let candidates = select_candidates(&donors, &request, now);
        let candidate_count = candidates.len();
        let ranked = rank(candidates, &self.config.ranking);
        let targets = self.config.fan_out.select_targets(ranked, &request);

        let session = AlertSession::new(
            request,
            targets,
            candidate_count,
            now,
            self.config.session_ttl_chrono(),
        );
        let cell = self.sessions.insert(session).await;
        let snapshot = cell.snapshot().await;

        info!(
            session_id = %snapshot.id,
            scanned = donors.len(),
            candidates = candidate_count,
            targets = snapshot.targets.len(),
            "SOS raised"
        );

        if snapshot.is_terminal() {
            info!(session_id = %snapshot.id, "No donors found, session completed empty");
        } else {
            let dispatcher = self.dispatcher.clone();
            tokio::spawn(async move {
                dispatcher.dispatch(cell).await;
            });
        }

        Ok(snapshot)
    }

    /// Run the dispatcher for a session and wait for it to close. A session
    /// that was already dispatched is left untouched.
    pub async fn dispatch(&self, session_id: SessionId) -> Result<SessionStatus> {
        let cell = self.cell(session_id).await?;
        Ok(self.dispatcher.dispatch(cell).await)
    }

    /// Record a donor's response. Repeats and late responses are accepted
    /// without reopening the session.
    #[instrument(skip_all, fields(session_id = %session_id, donor_id = %donor_id))]
    pub async fn acknowledge(&self, session_id: SessionId, donor_id: DonorId) -> Result<AckOutcome> {
        let cell = self.cell(session_id).await?;
        let now = self.deps.clock.now();

        let (outcome, status) = cell
            .update(|s| {
                s.refresh(now);
                let outcome = s.acknowledge(donor_id, now)?;
                if s.status == SessionStatus::Dispatching {
                    s.try_complete(now);
                }
                Ok::<_, SosError>((outcome, s.status))
            })
            .await?;

        match outcome {
            AckOutcome::Recorded => info!(status = ?status, "Acknowledgement recorded"),
            AckOutcome::Duplicate => debug!("Duplicate acknowledgement ignored"),
        }
        Ok(outcome)
    }

    /// Current view of a session, with an overdue TTL applied.
    pub async fn get_session(&self, session_id: SessionId) -> Result<AlertSession> {
        let cell = self.cell(session_id).await?;
        let now = self.deps.clock.now();
        let session = cell
            .update(|s| {
                s.refresh(now);
                s.clone()
            })
            .await;
        Ok(session)
    }

    /// Wait until the session reaches `completed` or `expired`, or `timeout`
    /// passes. Returns the status at that point.
    pub async fn wait_for_settlement(&self, session_id: SessionId, timeout: Duration) -> Result<SessionStatus> {
        let cell = self.cell(session_id).await?;
        let mut status = cell.subscribe();

        let settled = tokio::time::timeout(timeout, status.wait_for(|s| s.is_terminal())).await;
        match settled {
            Ok(Ok(s)) => Ok(*s),
            _ => Ok(cell.snapshot().await.status),
        }
    }

    async fn cell(&self, session_id: SessionId) -> Result<Arc<SessionCell>> {
        self.sessions
            .get(session_id)
            .await
            .ok_or(SosError::SessionNotFound(session_id))
    }

    /// One registry lookup per compatible donor type, run concurrently.
    /// Invalid records are skipped.
    async fn load_donors(&self, request: &BloodRequest) -> Result<Vec<Donor>> {
        let now = self.deps.clock.now();
        let filters: Vec<DonorFilter> = donor_types_for(request.blood_type)
            .into_iter()
            .map(DonorFilter::by_blood_type)
            .collect();

        let batches = try_join_all(
            filters
                .iter()
                .map(|filter| self.deps.registry.list_donors(filter)),
        )
        .await
        .map_err(SosError::Registry)?;

        let mut seen = HashSet::new();
        let mut donors = Vec::new();
        for donor in batches.into_iter().flatten() {
            if let Err(e) = donor.validate(now) {
                warn!(donor_id = %donor.id, error = %e, "Skipping invalid donor record");
                continue;
            }
            if seen.insert(donor.id) {
                donors.push(donor);
            }
        }

        Ok(donors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::donor::BloodType;
    use crate::kernel::{BaseDonorRegistry, MockNotifier, TestDependencies};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FailingRegistry;

    #[async_trait]
    impl BaseDonorRegistry for FailingRegistry {
        async fn list_donors(&self, _filter: &DonorFilter) -> anyhow::Result<Vec<Donor>> {
            Err(anyhow::anyhow!("document store unavailable"))
        }
    }

    /// Records every filter it is asked for.
    struct RecordingRegistry {
        donors: Vec<Donor>,
        filters: Mutex<Vec<DonorFilter>>,
    }

    #[async_trait]
    impl BaseDonorRegistry for RecordingRegistry {
        async fn list_donors(&self, filter: &DonorFilter) -> anyhow::Result<Vec<Donor>> {
            self.filters.lock().unwrap().push(filter.clone());
            Ok(self.donors.iter().filter(|d| filter.matches(d)).cloned().collect())
        }
    }

    #[tokio::test]
    async fn registry_failure_blocks_session_creation() {
        let mut deps = TestDependencies::new().into_deps();
        deps.registry = Arc::new(FailingRegistry);
        let kernel = SosKernel::new(deps, EngineConfig::default());

        let request = BloodRequest::new(BloodType::APos, 1).unwrap();
        let err = kernel.raise(request).await.unwrap_err();
        assert!(matches!(err, SosError::Registry(_)));
        assert!(kernel.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn registry_is_queried_once_per_compatible_donor_type() {
        let registry = Arc::new(RecordingRegistry {
            donors: vec![Donor::new(BloodType::ONeg), Donor::new(BloodType::BPos)],
            filters: Mutex::new(Vec::new()),
        });
        let mut deps = TestDependencies::new()
            .mock_notifier(MockNotifier::new())
            .into_deps();
        deps.registry = registry.clone();
        let kernel = SosKernel::new(deps, EngineConfig::default());

        let session = kernel
            .raise(BloodRequest::new(BloodType::ANeg, 1).unwrap())
            .await
            .unwrap();

        let mut asked: Vec<_> = registry
            .filters
            .lock()
            .unwrap()
            .iter()
            .filter_map(|f| f.blood_type)
            .collect();
        asked.sort();
        assert_eq!(asked, vec![BloodType::ONeg, BloodType::ANeg]);
        assert_eq!(session.candidate_count, 1);
    }
}
