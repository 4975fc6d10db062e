//! Background expiry sweeper.
//!
//! One long-lived thread per cache, woken every cleanup interval. Each pass
//! delegates to [`CacheShared::sweep_expired`], which scans under the read
//! lock and removes under the write lock with a per-key double-check.
//!
//! The thread holds only a `Weak` reference to the cache state: dropping the
//! last cache handle both signals the stop flag and makes the next upgrade
//! fail, so an abandoned cache never pins its memory or its thread.

use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use crate::cache::CacheShared;

/// Stop flag + wakeup, shared between the cache and its sweeper thread.
struct Signal {
    stop: Mutex<bool>,
    wake: Condvar,
}

impl Signal {
    fn request_stop(&self) {
        *self.stop.lock() = true;
        self.wake.notify_all();
    }
}

/// Owning handle to a running sweeper thread.
pub(crate) struct SweeperHandle {
    signal: Arc<Signal>,
    thread: JoinHandle<()>,
}

impl SweeperHandle {
    /// Spawns the sweeper thread for the given cache state.
    pub(crate) fn spawn<K, V>(
        shared: Weak<CacheShared<K, V>>,
        interval: Duration,
    ) -> SweeperHandle
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        let signal = Arc::new(Signal {
            stop: Mutex::new(false),
            wake: Condvar::new(),
        });
        let thread_signal = Arc::clone(&signal);
        let thread = thread::Builder::new()
            .name("lrukit-sweeper".into())
            .spawn(move || run(shared, thread_signal, interval))
            .expect("failed to spawn lrukit-sweeper thread");
        SweeperHandle { signal, thread }
    }

    /// Signals the thread to stop without waiting for it.
    pub(crate) fn request_stop(&self) {
        self.signal.request_stop();
    }

    /// Signals the thread to stop and joins it.
    pub(crate) fn stop_and_join(self) {
        self.signal.request_stop();
        let _ = self.thread.join();
    }
}

fn run<K, V>(shared: Weak<CacheShared<K, V>>, signal: Arc<Signal>, interval: Duration)
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    loop {
        {
            let mut stop = signal.stop.lock();
            if !*stop {
                let _ = signal.wake.wait_for(&mut stop, interval);
            }
            if *stop {
                break;
            }
        }
        // Upgrade only for the duration of one pass; holding a strong
        // reference across the sleep would keep a dropped cache alive.
        let Some(shared) = shared.upgrade() else {
            break;
        };
        let removed = shared.sweep_expired();
        if removed > 0 {
            debug!(removed, "sweeper removed expired entries");
        } else {
            trace!("sweeper pass found nothing expired");
        }
    }
    trace!("sweeper thread exiting");
}
