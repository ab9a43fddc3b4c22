// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into SosKernel for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BaseClock, BaseNotifier, EngineDeps};
use crate::domains::donor::{Contact, Donor, InMemoryDonorRegistry};

// =============================================================================
// Mock Notifier
// =============================================================================

/// What a scripted send does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendBehavior {
    Succeed,
    Fail(String),
    /// Never completes; the dispatcher's attempt timeout has to cut it off.
    Hang,
}

/// A message handed to the mock
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub recipient: String,
    pub message: String,
}

pub struct MockNotifier {
    scripts: Arc<Mutex<HashMap<String, VecDeque<SendBehavior>>>>,
    fallback: SendBehavior,
    delay: Duration,
    calls: Arc<Mutex<Vec<SentMessage>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            fallback: SendBehavior::Succeed,
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Outcomes for successive sends to `recipient`; the fallback applies once
    /// the script runs out.
    pub fn with_script(self, recipient: &str, behaviors: Vec<SendBehavior>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(recipient.to_string(), behaviors.into());
        self
    }

    /// Behavior for recipients without a script
    pub fn with_fallback(mut self, behavior: SendBehavior) -> Self {
        self.fallback = behavior;
        self
    }

    /// Simulated provider latency for every send
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Get all messages handed to the mock, in call order
    pub fn calls(&self) -> Vec<SentMessage> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of sends attempted for one recipient
    pub fn calls_to(&self, recipient: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.recipient == recipient)
            .count()
    }

    /// Highest number of sends observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_behavior(&self, recipient: &str) -> SendBehavior {
        self.scripts
            .lock()
            .unwrap()
            .get_mut(recipient)
            .and_then(|script| script.pop_front())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter even when the send future is dropped by a timeout.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BaseNotifier for MockNotifier {
    async fn send(&self, contact: &Contact, message: &str) -> Result<()> {
        let recipient = contact
            .phone
            .clone()
            .or_else(|| contact.email.clone())
            .unwrap_or_default();

        // Record the call
        self.calls.lock().unwrap().push(SentMessage {
            recipient: recipient.clone(),
            message: message.to_string(),
        });

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlight(self.in_flight.clone());

        let behavior = self.next_behavior(&recipient);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match behavior {
            SendBehavior::Succeed => Ok(()),
            SendBehavior::Fail(reason) => Err(anyhow!(reason)),
            SendBehavior::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}

// =============================================================================
// Fixed Clock
// =============================================================================

/// Clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: ChronoDuration) {
        *self.now.lock().unwrap() += by;
    }
}

impl BaseClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub registry: Arc<InMemoryDonorRegistry>,
    pub notifier: Arc<MockNotifier>,
    pub clock: Arc<FixedClock>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(InMemoryDonorRegistry::default()),
            notifier: Arc::new(MockNotifier::new()),
            clock: Arc::new(FixedClock::new(Utc::now())),
        }
    }

    /// Seed the donor registry
    pub fn donors(mut self, donors: Vec<Donor>) -> Self {
        self.registry = Arc::new(InMemoryDonorRegistry::new(donors));
        self
    }

    /// Set a mock notifier
    pub fn mock_notifier(mut self, notifier: MockNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Pin the clock
    pub fn clock_at(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Arc::new(FixedClock::new(now));
        self
    }

    pub fn into_deps(self) -> EngineDeps {
        EngineDeps {
            registry: self.registry,
            notifier: self.notifier,
            clock: self.clock,
        }
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripts_run_in_order_then_fall_back() {
        let mock = MockNotifier::new()
            .with_script("+1", vec![SendBehavior::Fail("busy".into())])
            .with_fallback(SendBehavior::Succeed);
        let contact = Contact::phone("+1");

        assert!(mock.send(&contact, "sos").await.is_err());
        assert!(mock.send(&contact, "sos").await.is_ok());
        assert_eq!(mock.calls_to("+1"), 2);
        assert_eq!(mock.calls()[0].message, "sos");
    }

    #[tokio::test(start_paused = true)]
    async fn hang_is_released_by_a_timeout() {
        let mock = MockNotifier::new().with_fallback(SendBehavior::Hang);
        let contact = Contact::phone("+1");

        let result = tokio::time::timeout(Duration::from_secs(5), mock.send(&contact, "sos")).await;
        assert!(result.is_err());
        assert_eq!(mock.in_flight.load(Ordering::SeqCst), 0);
        assert_eq!(mock.max_in_flight(), 1);
    }

    #[test]
    fn fixed_clock_advances_on_request() {
        let start = Utc::now();
        let clock = FixedClock::new(start);
        clock.advance(ChronoDuration::hours(2));
        assert_eq!(clock.now(), start + ChronoDuration::hours(2));
    }
}
