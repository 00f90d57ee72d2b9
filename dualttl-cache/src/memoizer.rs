//! The dual-TTL memoizer.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use dualttl_core::{
    Clock, MemoStats, MemoizerConfig, Polarity, Predicate, Result, SystemClock, TtlPolicy,
    DEFAULT_SWEEP_FLOOR, MIN_SWEEP_FLOOR,
};

use crate::entry::Entry;
use crate::janitor::Janitor;

/// Everything the lock protects: the verdict map and the janitor handle.
pub(crate) struct State<K> {
    entries: HashMap<K, Entry>,
    /// `None` once stopped (or if the janitor never started).
    janitor: Option<Janitor>,
}

/// State shared between a memoizer and its janitor thread.
pub(crate) struct Shared<K> {
    state: RwLock<State<K>>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    sweeps: AtomicU64,
    evicted: AtomicU64,
}

impl<K: Eq + Hash> Shared<K> {
    /// One janitor firing. Returns false when the janitor has been stopped,
    /// in which case nothing is swept and the thread must exit.
    pub(crate) fn janitor_sweep(&self) -> bool {
        let mut state = self.state.write();
        if state.janitor.is_none() {
            return false;
        }
        let evicted = self.sweep_locked(&mut state);
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        debug!(evicted, remaining = state.entries.len(), "janitor sweep");
        true
    }

    fn sweep_locked(&self, state: &mut State<K>) -> usize {
        let now = self.clock.now();
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired(now));
        let evicted = before - state.entries.len();
        self.evicted.fetch_add(evicted as u64, Ordering::Relaxed);
        evicted
    }
}

/// Concurrent cache of a boolean predicate with one TTL per verdict polarity.
///
/// A `true` verdict is remembered for `true_ttl`, a `false` verdict for
/// `false_ttl`. Concurrent lookups of a missing key invoke the predicate once.
///
/// # Locking
///
/// The predicate runs while the memoizer's exclusive lock is held, so a slow
/// predicate stalls every other operation on this memoizer for its duration.
/// In exchange, callers racing on a missing key block instead of recomputing.
/// The predicate must not call back into the same memoizer; doing so deadlocks.
///
/// # Janitor
///
/// A background thread removes expired entries every
/// `max(sweep_floor, min(true_ttl, false_ttl) / 2)`. [`stop`](Self::stop)
/// ends it; dropping the memoizer stops it too. Cached verdicts stay readable
/// after stop.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use dualttl_cache::Memoizer;
///
/// let is_admin = Memoizer::new(
///     |user: &String| user == "root",
///     Duration::from_secs(300), // remember "yes" for five minutes
///     Duration::from_secs(5),   // retry "no" quickly
/// );
///
/// assert!(is_admin.lookup(&"root".to_string()));
/// assert!(!is_admin.lookup(&"guest".to_string()));
/// is_admin.stop();
/// ```
pub struct Memoizer<K, P>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    P: Predicate<K>,
{
    predicate: P,
    policy: TtlPolicy,
    sweep_interval: Duration,
    stopped: AtomicBool,
    shared: Arc<Shared<K>>,
}

impl<K, P> Memoizer<K, P>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    P: Predicate<K>,
{
    /// Creates a memoizer on the system clock with the default 1 s sweep floor.
    ///
    /// The janitor is scheduled immediately.
    pub fn new(predicate: P, true_ttl: Duration, false_ttl: Duration) -> Self {
        Self::builder(predicate)
            .policy(TtlPolicy::new(true_ttl, false_ttl))
            .build()
    }

    /// Like [`new`](Self::new), but fails if the janitor thread cannot be spawned.
    pub fn try_new(predicate: P, true_ttl: Duration, false_ttl: Duration) -> Result<Self> {
        Self::builder(predicate)
            .policy(TtlPolicy::new(true_ttl, false_ttl))
            .try_build()
    }

    /// Starts a builder for finer control (clock, sweep floor).
    pub fn builder(predicate: P) -> MemoizerBuilder<K, P> {
        MemoizerBuilder::new(predicate)
    }

    /// Creates a memoizer from a loaded configuration.
    pub fn from_config(predicate: P, config: &MemoizerConfig) -> Result<Self> {
        config.validate()?;
        Self::builder(predicate)
            .policy(config.policy())
            .sweep_floor(config.sweep_floor())
            .try_build()
    }

    /// Returns the verdict for `key`, computing it on a miss.
    ///
    /// A live cached verdict is returned as-is. Otherwise the predicate is
    /// invoked under the exclusive lock, its result stored with the TTL for
    /// its polarity, and returned. A panicking predicate unwinds through this
    /// call and stores nothing.
    pub fn lookup(&self, key: &K) -> bool {
        if let Some(value) = self.peek(key) {
            self.shared.hits.fetch_add(1, Ordering::Relaxed);
            trace!("verdict served from cache");
            return value;
        }

        let mut state = self.shared.state.write();

        // Another caller may have stored while we waited for the write lock
        let now = self.shared.clock.now();
        if let Some(entry) = state.entries.get(key) {
            if entry.is_live(now) {
                self.shared.hits.fetch_add(1, Ordering::Relaxed);
                trace!("verdict stored by a concurrent caller");
                return entry.value;
            }
        }

        let value = self.predicate.test(key);

        let ttl = self.policy.ttl_for(value);
        let created_at = self.shared.clock.now();
        state
            .entries
            .insert(key.clone(), Entry::new(value, created_at, ttl));
        self.shared.misses.fetch_add(1, Ordering::Relaxed);

        debug!(
            polarity = %Polarity::from(value),
            ttl_ms = ttl.as_millis() as u64,
            "verdict computed"
        );
        value
    }

    /// Returns the live cached verdict for `key`, if any. Never invokes the predicate.
    pub fn peek(&self, key: &K) -> Option<bool> {
        let state = self.shared.state.read();
        let now = self.shared.clock.now();
        state
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value)
    }

    /// Forgets any verdict for `key`. The next lookup recomputes.
    pub fn invalidate(&self, key: &K) {
        if self.shared.state.write().entries.remove(key).is_some() {
            trace!("verdict invalidated");
        }
    }

    /// Forgets every verdict in one step.
    pub fn clear(&self) {
        let old = std::mem::take(&mut self.shared.state.write().entries);
        debug!(cleared = old.len(), "memoizer cleared");
    }

    /// Stops background sweeping. Idempotent.
    ///
    /// Waits for the janitor thread to exit. Lookups, invalidation and
    /// clearing keep working; expired entries are only removed by
    /// [`sweep_expired`](Self::sweep_expired) or replaced on lookup.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let janitor = self.shared.state.write().janitor.take();
        if let Some(janitor) = janitor {
            janitor.cancel();
            info!("janitor stopped");
        }
    }

    /// Returns true once [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Removes expired entries now, returning how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let mut state = self.shared.state.write();
        self.shared.sweep_locked(&mut state)
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.shared.state.read().entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.shared.state.read().entries.is_empty()
    }

    /// The TTL policy fixed at construction.
    pub fn policy(&self) -> TtlPolicy {
        self.policy
    }

    /// Period of the background janitor.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Returns a statistics snapshot.
    pub fn stats(&self) -> MemoStats {
        let state = self.shared.state.read();
        let now = self.shared.clock.now();
        let live = state.entries.values().filter(|e| e.is_live(now)).count();
        MemoStats {
            hits: self.shared.hits.load(Ordering::Relaxed),
            misses: self.shared.misses.load(Ordering::Relaxed),
            sweeps: self.shared.sweeps.load(Ordering::Relaxed),
            evicted: self.shared.evicted.load(Ordering::Relaxed),
            entries: state.entries.len(),
            live_entries: live,
            stopped: self.is_stopped(),
        }
    }

    fn start_janitor(&self) -> Result<()> {
        // Hold the lock across spawn so the first firing sees the handle
        let mut state = self.shared.state.write();
        let janitor = Janitor::spawn(&self.shared, self.sweep_interval)?;
        state.janitor = Some(janitor);
        info!(
            interval_ms = self.sweep_interval.as_millis() as u64,
            "janitor scheduled"
        );
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn shared(&self) -> &Arc<Shared<K>> {
        &self.shared
    }
}

impl<K, P> Drop for Memoizer<K, P>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    P: Predicate<K>,
{
    fn drop(&mut self) {
        self.stop();
    }
}

impl<K, P> fmt::Debug for Memoizer<K, P>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    P: Predicate<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoizer")
            .field("policy", &self.policy)
            .field("sweep_interval", &self.sweep_interval)
            .field("entries", &self.len())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Builder for [`Memoizer`].
pub struct MemoizerBuilder<K, P> {
    predicate: P,
    policy: TtlPolicy,
    sweep_floor: Duration,
    clock: Arc<dyn Clock>,
    _key: PhantomData<fn(&K)>,
}

impl<K, P> MemoizerBuilder<K, P>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    P: Predicate<K>,
{
    /// Creates a builder with both TTLs zero, the default sweep floor, and the system clock.
    pub fn new(predicate: P) -> Self {
        Self {
            predicate,
            policy: TtlPolicy::new(Duration::ZERO, Duration::ZERO),
            sweep_floor: DEFAULT_SWEEP_FLOOR,
            clock: Arc::new(SystemClock),
            _key: PhantomData,
        }
    }

    /// Sets the TTL for `true` verdicts.
    pub fn true_ttl(mut self, ttl: Duration) -> Self {
        self.policy = TtlPolicy::new(ttl, self.policy.false_ttl());
        self
    }

    /// Sets the TTL for `false` verdicts.
    pub fn false_ttl(mut self, ttl: Duration) -> Self {
        self.policy = TtlPolicy::new(self.policy.true_ttl(), ttl);
        self
    }

    /// Sets both TTLs.
    pub fn policy(mut self, policy: TtlPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the minimum janitor period. Values below 1 ms are raised to 1 ms.
    pub fn sweep_floor(mut self, floor: Duration) -> Self {
        self.sweep_floor = floor.max(MIN_SWEEP_FLOOR);
        self
    }

    /// Sets the time source used for expiry decisions.
    ///
    /// The janitor's period is always measured in real time.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the memoizer and schedules its janitor.
    ///
    /// If the janitor thread cannot be spawned the memoizer still works;
    /// expired entries are then only replaced on lookup.
    pub fn build(self) -> Memoizer<K, P> {
        let memo = self.assemble();
        if let Err(e) = memo.start_janitor() {
            warn!(error = %e, "janitor unavailable, expired entries will not be swept");
        }
        memo
    }

    /// Builds the memoizer, failing if the janitor thread cannot be spawned.
    pub fn try_build(self) -> Result<Memoizer<K, P>> {
        let memo = self.assemble();
        memo.start_janitor()?;
        Ok(memo)
    }

    fn assemble(self) -> Memoizer<K, P> {
        Memoizer {
            predicate: self.predicate,
            policy: self.policy,
            sweep_interval: self.policy.sweep_interval(self.sweep_floor),
            stopped: AtomicBool::new(false),
            shared: Arc::new(Shared {
                state: RwLock::new(State {
                    entries: HashMap::new(),
                    janitor: None,
                }),
                clock: self.clock,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                sweeps: AtomicU64::new(0),
                evicted: AtomicU64::new(0),
            }),
        }
    }
}
