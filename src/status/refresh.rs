//! Refresh scheduling: a single-flight guard per status buffer and a
//! generation-counter debounce so only the last save in a burst triggers a
//! refresh.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Clone)]
pub struct RefreshScheduler {
    in_flight: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    debounce: Duration,
}

impl RefreshScheduler {
    pub fn new(debounce: Duration) -> Self {
        RefreshScheduler {
            in_flight: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            debounce,
        }
    }

    /// Claim the refresh slot. Returns false when a refresh is already in
    /// flight; the caller must not fetch in that case.
    pub fn try_begin(&self) -> bool {
        !self.in_flight.swap(true, Ordering::SeqCst)
    }

    /// Release the slot once the render has completed (or was abandoned).
    pub fn finish(&self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Note a save and schedule `f` after the debounce interval; `f` runs
    /// only if no newer save arrived in the meantime, so a burst of saves
    /// yields exactly one callback.
    pub fn debounced_after_save<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let generation = Arc::clone(&self.generation);
        let this_save = generation.fetch_add(1, Ordering::SeqCst) + 1;
        let debounce = self.debounce;
        thread::spawn(move || {
            thread::sleep(debounce);
            if generation.load(Ordering::SeqCst) == this_save {
                f();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn single_flight_admits_one_refresh() {
        let sched = RefreshScheduler::new(DEFAULT_DEBOUNCE);
        assert!(sched.try_begin());
        assert!(!sched.try_begin());
        assert!(sched.is_in_flight());
        sched.finish();
        assert!(sched.try_begin());
        sched.finish();
    }

    #[test]
    fn burst_of_saves_fires_once() {
        let sched = RefreshScheduler::new(Duration::from_millis(30));
        let fired = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let fired = Arc::clone(&fired);
            sched.debounced_after_save(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
            thread::sleep(Duration::from_millis(5));
        }
        thread::sleep(Duration::from_millis(120));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn spaced_saves_each_fire() {
        let sched = RefreshScheduler::new(Duration::from_millis(10));
        let fired = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let fired = Arc::clone(&fired);
            sched.debounced_after_save(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
            thread::sleep(Duration::from_millis(50));
        }
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
