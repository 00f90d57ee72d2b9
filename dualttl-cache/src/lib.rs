//! # dualttl Cache
//!
//! Concurrent memoizer for boolean predicates, with separate expiration
//! windows for `true` and `false` verdicts.
//!
//! ## Features
//!
//! - **Polarity TTLs**: remember confirmations long, retry refusals soon (or the reverse)
//! - **Single-flight**: concurrent misses on a key invoke the predicate once
//! - **Janitor**: a background thread purges expired verdicts, stoppable at any time
//! - **Generic keys**: any `Eq + Hash + Clone` type
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use dualttl_cache::Memoizer;
//!
//! let host_is_down = Memoizer::builder(|host: &&str| host.ends_with(".invalid"))
//!     .true_ttl(Duration::from_secs(600)) // broken hosts stay marked
//!     .false_ttl(Duration::from_secs(10)) // healthy ones are re-checked
//!     .build();
//!
//! assert!(host_is_down.lookup(&"db.invalid"));
//! assert!(!host_is_down.lookup(&"db.internal"));
//! assert_eq!(host_is_down.stats().misses, 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod entry;
mod janitor;
mod memoizer;

pub use memoizer::{Memoizer, MemoizerBuilder};

pub use dualttl_core::{
    Clock, DualTtlError, ManualClock, MemoStats, MemoizerConfig, Polarity, Predicate, Result,
    SystemClock, TtlPolicy,
};
