//! Kernel wired to mock collaborators.

use sos_core::common::SessionId;
use sos_core::config::EngineConfig;
use sos_core::domains::alerts::{AlertSession, DeliveryState};
use sos_core::domains::donor::Donor;
use sos_core::kernel::{FixedClock, MockNotifier, SosKernel, TestDependencies};
use std::sync::Arc;
use std::time::Duration;

use super::fixtures::as_of;

pub struct TestHarness {
    pub kernel: SosKernel,
    pub notifier: Arc<MockNotifier>,
    pub clock: Arc<FixedClock>,
}

impl TestHarness {
    pub fn new(donors: Vec<Donor>, notifier: MockNotifier) -> Self {
        Self::with_config(donors, notifier, EngineConfig::default())
    }

    pub fn with_config(donors: Vec<Donor>, notifier: MockNotifier, config: EngineConfig) -> Self {
        let deps = TestDependencies::new()
            .donors(donors)
            .mock_notifier(notifier)
            .clock_at(as_of());
        let notifier = deps.notifier.clone();
        let clock = deps.clock.clone();

        Self {
            kernel: SosKernel::new(deps.into_deps(), config),
            notifier,
            clock,
        }
    }

    /// Poll until no target is pending any more.
    pub async fn wait_for_deliveries(&self, id: SessionId) -> AlertSession {
        for _ in 0..10_000 {
            let session = self.kernel.get_session(id).await.expect("session exists");
            if session
                .targets
                .iter()
                .all(|t| t.state != DeliveryState::Pending)
            {
                return session;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("deliveries for session {} never finished", id);
    }
}

/// Engine config with a one hour TTL.
pub fn fast_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.session_ttl = Duration::from_secs(60 * 60);
    config
}
