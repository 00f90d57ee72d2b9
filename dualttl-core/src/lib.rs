//! # dualttl Core
//!
//! Core types, errors, configuration, and traits for the dual-TTL boolean memoizer.
//!
//! This crate provides the building blocks used by `dualttl-cache`:
//!
//! - **Types**: TTL policy, verdict polarity, and statistics snapshots
//! - **Errors**: A single error enum for configuration and setup failures
//! - **Config**: Serde-backed configuration with env and JSON loaders
//! - **Traits**: The `Clock` and `Predicate` seams
//! - **Clocks**: System and manually driven time sources
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use dualttl_core::{MemoizerConfig, TtlPolicy};
//!
//! let config = MemoizerConfig::from_json(r#"{"true_ttl_ms": 30000, "false_ttl_ms": -5}"#).unwrap();
//! let policy: TtlPolicy = config.policy();
//! assert_eq!(policy.false_ttl(), Duration::ZERO);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use clock::{ManualClock, SystemClock};
pub use config::MemoizerConfig;
pub use constants::*;
pub use error::{DualTtlError, Result};
pub use traits::*;
pub use types::*;
