//! Engine dependencies (using traits for testability)
//!
//! This module provides the dependency container handed to the kernel. All
//! external services sit behind trait abstractions so tests can swap them out.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;
use twilio::TwilioService;

use crate::domains::donor::Contact;
use crate::kernel::{BaseClock, BaseDonorRegistry, BaseNotifier, SystemClock};

// =============================================================================
// TwilioService Adapter (implements BaseNotifier trait)
// =============================================================================

/// SMS delivery through Twilio. Donors without a phone number cannot be reached.
pub struct TwilioNotifier(pub Arc<TwilioService>);

impl TwilioNotifier {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseNotifier for TwilioNotifier {
    async fn send(&self, contact: &Contact, message: &str) -> Result<()> {
        let phone = contact
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| anyhow!("contact has no phone number"))?;

        self.0
            .send_sms(phone, message)
            .await
            .map(|_| ())
            .map_err(|e| anyhow!("{}", e))
    }
}

// =============================================================================
// LogNotifier (dry-run)
// =============================================================================

/// Logs each message instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl BaseNotifier for LogNotifier {
    async fn send(&self, contact: &Contact, message: &str) -> Result<()> {
        info!(
            phone = contact.phone.as_deref().unwrap_or("-"),
            email = contact.email.as_deref().unwrap_or("-"),
            message,
            "[dry-run] SOS notification"
        );
        Ok(())
    }
}

// =============================================================================
// EngineDeps
// =============================================================================

#[derive(Clone)]
pub struct EngineDeps {
    pub registry: Arc<dyn BaseDonorRegistry>,
    pub notifier: Arc<dyn BaseNotifier>,
    pub clock: Arc<dyn BaseClock>,
}

impl EngineDeps {
    /// Dependencies on the wall clock.
    pub fn new(registry: Arc<dyn BaseDonorRegistry>, notifier: Arc<dyn BaseNotifier>) -> Self {
        Self {
            registry,
            notifier,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn BaseClock>) -> Self {
        self.clock = clock;
        self
    }
}
