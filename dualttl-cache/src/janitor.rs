//! Background sweeper for expired entries.
//!
//! One dedicated thread per memoizer. It sleeps on a cancellable deadline,
//! then takes the memoizer's exclusive lock and drops every expired entry.
//!
//! # Teardown
//!
//! The janitor handle lives inside the memoizer state, behind the same lock
//! the sweep takes. `stop` removes the handle under that lock before waking
//! and joining the thread, and a sweep only runs while the handle is present,
//! so a wake-up that races `stop` can never sweep or re-arm afterwards.

use std::hash::Hash;
use std::io;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use dualttl_core::JANITOR_THREAD_NAME;

use crate::memoizer::Shared;

/// Handle to a running janitor thread.
pub(crate) struct Janitor {
    signal: Arc<StopSignal>,
    handle: JoinHandle<()>,
}

impl Janitor {
    /// Starts a janitor sweeping `shared` every `interval` of real time.
    ///
    /// The thread only holds a weak reference, so it never keeps the state alive.
    pub(crate) fn spawn<K>(shared: &Arc<Shared<K>>, interval: Duration) -> io::Result<Self>
    where
        K: Eq + Hash + Send + Sync + 'static,
    {
        let signal = Arc::new(StopSignal::new());
        let weak = Arc::downgrade(shared);
        let thread_signal = Arc::clone(&signal);

        let handle = thread::Builder::new()
            .name(JANITOR_THREAD_NAME.to_string())
            .spawn(move || run(weak, thread_signal, interval))?;

        Ok(Self { signal, handle })
    }

    /// Wakes the thread for good and waits for it to exit.
    ///
    /// Must be called without holding the memoizer lock.
    pub(crate) fn cancel(self) {
        self.signal.cancel();
        if self.handle.join().is_err() {
            debug!("janitor thread exited by panicking");
        }
    }
}

fn run<K>(shared: Weak<Shared<K>>, signal: Arc<StopSignal>, interval: Duration)
where
    K: Eq + Hash + Send + Sync + 'static,
{
    trace!(interval_ms = interval.as_millis() as u64, "janitor running");
    loop {
        if signal.wait(interval) {
            break;
        }
        let Some(shared) = shared.upgrade() else {
            break;
        };
        if !shared.janitor_sweep() {
            break;
        }
    }
    trace!("janitor exiting");
}

/// Cancelled flag plus a condvar to cut the current wait short.
struct StopSignal {
    cancelled: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    fn new() -> Self {
        Self {
            cancelled: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    fn cancel(&self) {
        *self.cancelled.lock() = true;
        self.condvar.notify_all();
    }

    /// Sleeps for `timeout` or until cancelled. Returns true if cancelled.
    fn wait(&self, timeout: Duration) -> bool {
        let mut cancelled = self.cancelled.lock();
        match Instant::now().checked_add(timeout) {
            Some(deadline) => {
                while !*cancelled {
                    if self.condvar.wait_until(&mut cancelled, deadline).timed_out() {
                        break;
                    }
                }
            }
            None => {
                while !*cancelled {
                    self.condvar.wait(&mut cancelled);
                }
            }
        }
        *cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, Memoizer};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn test_signal_times_out() {
        let signal = StopSignal::new();
        let start = Instant::now();
        assert!(!signal.wait(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_signal_cancel_wakes_waiter() {
        let signal = Arc::new(StopSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || signal.wait(Duration::from_secs(60)))
        };
        thread::sleep(Duration::from_millis(10));
        signal.cancel();
        assert!(waiter.join().unwrap());
        // Stays cancelled
        assert!(signal.wait(Duration::from_secs(60)));
    }

    #[test]
    fn test_janitor_purges_expired_without_lookups() {
        let memo = Memoizer::builder(|k: &u32| k % 2 == 0)
            .true_ttl(Duration::from_millis(20))
            .false_ttl(Duration::from_millis(20))
            .sweep_floor(Duration::from_millis(10))
            .build();
        assert_eq!(memo.sweep_interval(), Duration::from_millis(10));

        for k in 0..50 {
            memo.lookup(&k);
        }

        // Two intervals past the TTL is enough; leave slack for slow CI
        assert!(wait_until(Duration::from_secs(2), || memo.is_empty()));
        let stats = memo.stats();
        assert!(stats.sweeps >= 1);
        assert_eq!(stats.evicted, 50);
    }

    #[test]
    fn test_janitor_never_deletes_live_entries() {
        let memo = Memoizer::builder(|_: &&str| true)
            .true_ttl(Duration::from_secs(3600))
            .false_ttl(Duration::from_millis(10))
            .sweep_floor(Duration::from_millis(5))
            .build();
        memo.lookup(&"admin");

        assert!(wait_until(Duration::from_secs(2), || memo.stats().sweeps >= 3));
        assert_eq!(memo.peek(&"admin"), Some(true));
        assert_eq!(memo.stats().evicted, 0);
    }

    #[test]
    fn test_no_sweeps_after_stop() {
        let clock = Arc::new(ManualClock::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let memo = Memoizer::builder(move |_: &u8| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        })
        .true_ttl(Duration::from_millis(30))
        .false_ttl(Duration::from_millis(30))
        .sweep_floor(Duration::from_millis(5))
        .clock(clock.clone())
        .build();

        memo.lookup(&1);
        memo.lookup(&2);
        memo.stop();
        assert!(memo.is_stopped());

        // Expire both entries only once the janitor is gone
        clock.advance(Duration::from_millis(31));
        let sweeps = memo.stats().sweeps;
        thread::sleep(Duration::from_millis(60));
        assert_eq!(memo.stats().sweeps, sweeps);
        assert_eq!(memo.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert_eq!(memo.sweep_expired(), 2);
        assert!(memo.is_empty());
    }

    #[test]
    fn test_dropping_memoizer_ends_janitor() {
        let memo = Memoizer::builder(|_: &u8| true)
            .true_ttl(Duration::from_millis(10))
            .false_ttl(Duration::from_millis(10))
            .sweep_floor(Duration::from_millis(5))
            .build();
        let weak = Arc::downgrade(memo.shared());
        drop(memo);
        // Drop joined the thread, so nothing can still hold the state
        assert!(weak.upgrade().is_none());
    }
}
