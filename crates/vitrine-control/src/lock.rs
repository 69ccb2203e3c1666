//! Cross-modal action lock.
//!
//! A short-lived mutual exclusion token between the voice and gesture
//! pipelines. It is best-effort and timeout-bounded, not a queue: at most one
//! source may be mutating the store at a time, and a denied caller drops its
//! action. A lock nobody released expires on its own after the timeout.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vitrine_core::{InputSource, LockSettings, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    pub holder: Option<InputSource>,
    pub acquired_at: Timestamp,
    pub timeout_ms: u64,
}

impl LockState {
    pub fn held(&self) -> bool {
        self.holder.is_some()
    }

    fn expired(&self, now: Timestamp) -> bool {
        now.millis_since(self.acquired_at) >= self.timeout_ms as f64
    }
}

pub struct ActionLock {
    state: Mutex<LockState>,
}

impl ActionLock {
    pub fn new(settings: &LockSettings) -> Self {
        Self::with_timeout(settings.timeout_ms)
    }

    pub fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            state: Mutex::new(LockState {
                holder: None,
                acquired_at: Timestamp::from_nanos(0),
                timeout_ms,
            }),
        }
    }

    /// Take or refresh the lock. `Some(true)` when this call created the
    /// hold, `Some(false)` when `source` already held it, `None` when denied.
    fn take(&self, source: InputSource, now: Timestamp) -> Option<bool> {
        let mut state = self.state.lock();

        if let Some(holder) = state.holder {
            if !state.expired(now) {
                if holder == source {
                    state.acquired_at = now;
                    return Some(false);
                }
                debug!(
                    "Action lock held by {} for {:.0}ms, denying {}",
                    holder,
                    now.millis_since(state.acquired_at),
                    source
                );
                return None;
            }
            warn!(
                "Clearing stale action lock held by {} for {:.0}ms",
                holder,
                now.millis_since(state.acquired_at)
            );
        }

        state.holder = Some(source);
        state.acquired_at = now;
        Some(true)
    }

    /// Try to take the lock for `source` at `now`.
    ///
    /// Fails while a different source holds it inside the timeout window. The
    /// current holder re-acquiring refreshes its hold. A holder past the
    /// timeout is evicted.
    pub fn acquire_at(&self, source: InputSource, now: Timestamp) -> bool {
        self.take(source, now).is_some()
    }

    pub fn acquire(&self, source: InputSource) -> bool {
        self.acquire_at(source, Timestamp::now())
    }

    /// Release if `source` is the holder. Returns whether the lock was released.
    pub fn release(&self, source: InputSource) -> bool {
        let mut state = self.state.lock();
        if state.holder != Some(source) {
            return false;
        }
        state.holder = None;
        true
    }

    /// Held and not yet expired
    pub fn is_locked_at(&self, now: Timestamp) -> bool {
        let state = self.state.lock();
        state.held() && !state.expired(now)
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked_at(Timestamp::now())
    }

    pub fn snapshot(&self) -> LockState {
        *self.state.lock()
    }

    /// Acquire with a guard that releases on every exit path, including
    /// unwinding. Inside a hold `source` already owns, the guard only refreshes
    /// it and leaves the release to the outer owner.
    pub fn guard_at(&self, source: InputSource, now: Timestamp) -> Option<ActionLockGuard<'_>> {
        let owned = self.take(source, now)?;
        Some(ActionLockGuard {
            lock: self,
            source,
            owned,
        })
    }

    pub fn guard(&self, source: InputSource) -> Option<ActionLockGuard<'_>> {
        self.guard_at(source, Timestamp::now())
    }
}

impl Default for ActionLock {
    fn default() -> Self {
        Self::new(&LockSettings::default())
    }
}

/// Scoped hold on the [`ActionLock`]
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct ActionLockGuard<'a> {
    lock: &'a ActionLock,
    source: InputSource,
    owned: bool,
}

impl ActionLockGuard<'_> {
    pub fn source(&self) -> InputSource {
        self.source
    }

    /// Whether dropping this guard releases the lock
    pub fn owns_hold(&self) -> bool {
        self.owned
    }
}

impl Drop for ActionLockGuard<'_> {
    fn drop(&mut self) {
        // No-op if the hold expired and someone else took over
        if self.owned {
            self.lock.release(self.source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn at(ms: i64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn test_mutual_exclusion_within_timeout() {
        let lock = ActionLock::default();
        assert!(lock.acquire_at(InputSource::Gesture, at(1000)));
        assert!(!lock.acquire_at(InputSource::Voice, at(1100)));
        assert!(!lock.acquire_at(InputSource::Voice, at(1299)));
        assert_eq!(lock.snapshot().holder, Some(InputSource::Gesture));
    }

    #[test]
    fn test_same_source_refreshes_hold() {
        let lock = ActionLock::default();
        assert!(lock.acquire_at(InputSource::Voice, at(0)));
        assert!(lock.acquire_at(InputSource::Voice, at(200)));
        assert_eq!(lock.snapshot().acquired_at, at(200));

        // Timeout counts from the refresh
        assert!(!lock.acquire_at(InputSource::Gesture, at(400)));
        assert!(lock.acquire_at(InputSource::Gesture, at(500)));
    }

    #[test]
    fn test_nested_guard_leaves_outer_hold() {
        let lock = ActionLock::default();
        let outer = lock.guard_at(InputSource::Voice, at(0)).unwrap();
        assert!(outer.owns_hold());
        {
            let inner = lock.guard_at(InputSource::Voice, at(50)).unwrap();
            assert!(!inner.owns_hold());
        }
        assert_eq!(lock.snapshot().holder, Some(InputSource::Voice));
        drop(outer);
        assert!(!lock.snapshot().held());
    }

    #[test]
    fn test_guard_inside_manual_hold_keeps_it() {
        let lock = ActionLock::default();
        assert!(lock.acquire_at(InputSource::Voice, at(0)));
        drop(lock.guard_at(InputSource::Voice, at(20)));
        assert!(lock.is_locked_at(at(40)));
        assert!(!lock.acquire_at(InputSource::Gesture, at(40)));
        assert!(lock.release(InputSource::Voice));
    }

    #[test]
    fn test_stale_lock_self_heals() {
        let lock = ActionLock::default();
        assert!(lock.acquire_at(InputSource::Gesture, at(1000)));
        // Never released
        assert!(lock.acquire_at(InputSource::Voice, at(1300)));
        assert_eq!(lock.snapshot().holder, Some(InputSource::Voice));
        assert_eq!(lock.snapshot().acquired_at, at(1300));
    }

    #[test]
    fn test_only_holder_releases() {
        let lock = ActionLock::default();
        lock.acquire_at(InputSource::Voice, at(0));
        assert!(!lock.release(InputSource::Gesture));
        assert!(lock.is_locked_at(at(50)));
        assert!(lock.release(InputSource::Voice));
        assert!(!lock.is_locked_at(at(50)));
        assert!(lock.acquire_at(InputSource::Gesture, at(60)));
    }

    #[test]
    fn test_expired_lock_reads_unlocked() {
        let lock = ActionLock::with_timeout(100);
        lock.acquire_at(InputSource::Gesture, at(0));
        assert!(lock.is_locked_at(at(99)));
        assert!(!lock.is_locked_at(at(100)));
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let lock = ActionLock::default();
        {
            let guard = lock.guard_at(InputSource::Gesture, at(0)).unwrap();
            assert_eq!(guard.source(), InputSource::Gesture);
            assert!(lock.guard_at(InputSource::Voice, at(5)).is_none());
        }
        assert!(lock.guard_at(InputSource::Voice, at(10)).is_some());
    }

    #[test]
    fn test_guard_releases_on_panic() {
        let lock = ActionLock::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = lock.guard_at(InputSource::Voice, at(0));
            panic!("action failed");
        }));
        assert!(result.is_err());
        assert!(!lock.snapshot().held());
    }

    #[test]
    fn test_stale_guard_does_not_release_new_holder() {
        let lock = ActionLock::default();
        let stale = lock.guard_at(InputSource::Gesture, at(0)).unwrap();
        assert!(lock.acquire_at(InputSource::Voice, at(400)));
        drop(stale);
        assert_eq!(lock.snapshot().holder, Some(InputSource::Voice));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquire_single_source_wins() {
        let lock = Arc::new(ActionLock::default());
        let voice_wins = Arc::new(AtomicUsize::new(0));
        let gesture_wins = Arc::new(AtomicUsize::new(0));
        let now = at(5_000);

        let mut handles = Vec::new();
        for i in 0..16 {
            let lock = lock.clone();
            let (source, wins) = if i % 2 == 0 {
                (InputSource::Voice, voice_wins.clone())
            } else {
                (InputSource::Gesture, gesture_wins.clone())
            };
            handles.push(tokio::spawn(async move {
                if lock.acquire_at(source, now) {
                    wins.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // The first source in keeps refreshing; the other never gets in
        let voice = voice_wins.load(Ordering::SeqCst);
        let gesture = gesture_wins.load(Ordering::SeqCst);
        assert!(voice == 0 || gesture == 0, "voice {} gesture {}", voice, gesture);
        assert_eq!(voice + gesture, 8);
    }
}
