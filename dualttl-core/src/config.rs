//! Memoizer configuration.
//!
//! TTLs are signed milliseconds so that configuration sources can express
//! "never cache this polarity" with any non-positive value; they are clamped
//! to zero when turned into a [`TtlPolicy`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FALSE_TTL_MS, DEFAULT_SWEEP_FLOOR_MS, DEFAULT_TRUE_TTL_MS, ENV_FALSE_TTL_MS,
    ENV_SWEEP_FLOOR_MS, ENV_TRUE_TTL_MS,
};
use crate::error::{DualTtlError, Result};
use crate::types::TtlPolicy;

/// Memoizer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoizerConfig {
    /// TTL for `true` verdicts in milliseconds
    pub true_ttl_ms: i64,
    /// TTL for `false` verdicts in milliseconds
    pub false_ttl_ms: i64,
    /// Minimum janitor sweep interval in milliseconds
    pub sweep_floor_ms: u64,
}

impl Default for MemoizerConfig {
    fn default() -> Self {
        Self {
            true_ttl_ms: DEFAULT_TRUE_TTL_MS,
            false_ttl_ms: DEFAULT_FALSE_TTL_MS,
            sweep_floor_ms: DEFAULT_SWEEP_FLOOR_MS,
        }
    }
}

impl MemoizerConfig {
    /// Loads configuration from `DUALTTL_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse_var::<i64, _>(&lookup, ENV_TRUE_TTL_MS)? {
            config.true_ttl_ms = v;
        }
        if let Some(v) = parse_var::<i64, _>(&lookup, ENV_FALSE_TTL_MS)? {
            config.false_ttl_ms = v;
        }
        if let Some(v) = parse_var::<u64, _>(&lookup, ENV_SWEEP_FLOOR_MS)? {
            config.sweep_floor_ms = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can drive a memoizer.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_floor_ms == 0 {
            return Err(DualTtlError::ConfigError(
                "sweep_floor_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// TTL policy with negative values clamped to zero.
    pub fn policy(&self) -> TtlPolicy {
        TtlPolicy::from_millis(self.true_ttl_ms, self.false_ttl_ms)
    }

    /// Minimum janitor sweep interval.
    pub fn sweep_floor(&self) -> Duration {
        Duration::from_millis(self.sweep_floor_ms)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| DualTtlError::InvalidEnvVar {
                name: name.to_string(),
                reason: e.to_string(),
            }),
    }
}
