use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use twilio::TwilioOptions;

use crate::domains::alerts::DispatchConfig;
use crate::domains::matching::{FanOutPolicy, RankingWeights};

/// Engine tuning. `Default` is the production policy.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub session_ttl: Duration,
    pub dispatch: DispatchConfig,
    pub fan_out: FanOutPolicy,
    pub ranking: RankingWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(24 * 60 * 60),
            dispatch: DispatchConfig::default(),
            fan_out: FanOutPolicy::default(),
            ranking: RankingWeights::default(),
        }
    }
}

impl EngineConfig {
    pub fn session_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session_ttl).unwrap_or(chrono::Duration::MAX)
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub engine: EngineConfig,
    pub twilio: Option<TwilioOptions>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = EngineConfig::default();

        let engine = EngineConfig {
            session_ttl: Duration::from_secs(parse_or(
                &lookup,
                "SOS_SESSION_TTL_SECS",
                defaults.session_ttl.as_secs(),
            )?),
            dispatch: DispatchConfig {
                max_concurrent_deliveries: parse_or(
                    &lookup,
                    "SOS_MAX_CONCURRENT_DELIVERIES",
                    defaults.dispatch.max_concurrent_deliveries,
                )?,
                attempt_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "SOS_ATTEMPT_TIMEOUT_SECS",
                    defaults.dispatch.attempt_timeout.as_secs(),
                )?),
                max_attempts: defaults.dispatch.max_attempts,
            },
            fan_out: FanOutPolicy {
                normal: parse_or(&lookup, "SOS_FANOUT_NORMAL", defaults.fan_out.normal)?,
                high: parse_or(&lookup, "SOS_FANOUT_HIGH", defaults.fan_out.high)?,
                critical: parse_or(&lookup, "SOS_FANOUT_CRITICAL", defaults.fan_out.critical)?,
            },
            ranking: RankingWeights {
                recency: parse_or(&lookup, "SOS_WEIGHT_RECENCY", defaults.ranking.recency)?,
                locality_exact: parse_or(
                    &lookup,
                    "SOS_WEIGHT_LOCALITY_EXACT",
                    defaults.ranking.locality_exact,
                )?,
                locality_partial: parse_or(
                    &lookup,
                    "SOS_WEIGHT_LOCALITY_PARTIAL",
                    defaults.ranking.locality_partial,
                )?,
                reliability: parse_or(
                    &lookup,
                    "SOS_WEIGHT_RELIABILITY",
                    defaults.ranking.reliability,
                )?,
            },
        };

        if engine.session_ttl.is_zero() {
            bail!("SOS_SESSION_TTL_SECS must be greater than zero");
        }
        if engine.dispatch.max_concurrent_deliveries == 0 {
            bail!("SOS_MAX_CONCURRENT_DELIVERIES must be greater than zero");
        }
        for (name, multiplier) in [
            ("SOS_FANOUT_NORMAL", engine.fan_out.normal),
            ("SOS_FANOUT_HIGH", engine.fan_out.high),
            ("SOS_FANOUT_CRITICAL", engine.fan_out.critical),
        ] {
            if multiplier == 0 {
                bail!("{} must be greater than zero", name);
            }
        }

        let twilio = match (
            lookup("TWILIO_ACCOUNT_SID"),
            lookup("TWILIO_AUTH_TOKEN"),
            lookup("TWILIO_FROM_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioOptions {
                account_sid,
                auth_token,
                from_number,
            }),
            (None, None, None) => None,
            _ => bail!(
                "TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_FROM_NUMBER must be set together"
            ),
        };

        Ok(Self { engine, twilio })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got '{}'", name, raw)),
        None => Ok(default),
    }
}
