//! Ad-slot initialization guard.
//!
//! Third-party ad scripts break when a slot is initialized twice or when many
//! slots are pushed at once. [`AdGuard`] remembers which slots are live and
//! runs pending initializations one at a time with a pause in between.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

/// Pause between two initializations.
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(100);

type InitFn = Box<dyn FnOnce() -> Result<(), String> + Send>;

struct PendingAd {
    ad_id: String,
    init: InitFn,
}

#[derive(Default)]
struct GuardState {
    initialized: HashSet<String>,
    queue: VecDeque<PendingAd>,
    draining: bool,
    /// Bumped by `reset`; a drain started under an older generation stops.
    generation: u64,
}

/// What happened to an initialization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The slot was already live; nothing was queued
    AlreadyInitialized,
    /// Queued behind a drain that another caller is running
    Queued,
    /// This call ran the drain until the queue emptied
    Drained,
}

/// Tracks initialized ad slots for one page session.
///
/// Clones share state. Construct one per session controller; tests can hold
/// independent instances.
#[derive(Clone)]
pub struct AdGuard {
    state: Arc<Mutex<GuardState>>,
    pause: Duration,
}

impl AdGuard {
    /// Create a guard with the default pause.
    pub fn new() -> Self {
        Self::with_pause(DEFAULT_PAUSE)
    }

    /// Create a guard with a custom pause between initializations.
    pub fn with_pause(pause: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(GuardState::default())),
            pause,
        }
    }

    /// Queue `init` for `ad_id` unless the slot is already live.
    ///
    /// If no drain is running, this call starts one and waits for the queue
    /// to empty. The drain runs on its own task, so dropping this future does
    /// not stall it. A failing or panicking `init` is logged and leaves the
    /// slot eligible for a later attempt.
    pub async fn initialize<F, E>(&self, ad_id: impl Into<String>, init: F) -> Admission
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: fmt::Display,
    {
        let ad_id = ad_id.into();

        let generation = {
            let mut state = self.state.lock().await;
            if state.initialized.contains(&ad_id) {
                tracing::warn!("Ad {} already initialized, skipping", ad_id);
                return Admission::AlreadyInitialized;
            }

            state.queue.push_back(PendingAd {
                ad_id,
                init: Box::new(move || init().map_err(|e| e.to_string())),
            });

            if state.draining {
                return Admission::Queued;
            }
            state.draining = true;
            state.generation
        };

        let guard = self.clone();
        let drain = tokio::spawn(async move { guard.drain(generation).await });
        if let Err(e) = drain.await {
            tracing::error!("Ad drain task failed: {}", e);
            self.stop_draining(generation).await;
        }
        Admission::Drained
    }

    async fn stop_draining(&self, generation: u64) {
        let mut state = self.state.lock().await;
        if state.generation == generation {
            state.draining = false;
        }
    }

    async fn drain(&self, generation: u64) {
        loop {
            let pending = {
                let mut state = self.state.lock().await;
                if state.generation != generation {
                    return;
                }
                match state.queue.pop_front() {
                    Some(pending) => pending,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };

            if self.is_initialized(&pending.ad_id).await {
                continue;
            }

            let init = pending.init;
            match panic::catch_unwind(AssertUnwindSafe(init)) {
                Ok(Ok(())) => {
                    let mut state = self.state.lock().await;
                    if state.generation == generation {
                        state.initialized.insert(pending.ad_id);
                    }
                }
                Ok(Err(e)) => {
                    tracing::error!("Failed to initialize ad {}: {}", pending.ad_id, e);
                }
                Err(_) => {
                    tracing::error!("Initializer for ad {} panicked", pending.ad_id);
                }
            }

            tokio::time::sleep(self.pause).await;
        }
    }

    /// Whether `ad_id` has been initialized since the last reset.
    pub async fn is_initialized(&self, ad_id: &str) -> bool {
        self.state.lock().await.initialized.contains(ad_id)
    }

    /// Number of initializations waiting in the queue.
    pub async fn pending(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    /// Forget every initialized slot and drop pending work.
    ///
    /// Used on page navigation so stale marks do not block the new page.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.initialized.clear();
        state.queue.clear();
        state.draining = false;
        state.generation += 1;
    }
}

impl Default for AdGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    fn counting(counter: &Arc<AtomicUsize>) -> impl FnOnce() -> Result<(), String> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn initializes_each_slot_once() {
        let guard = AdGuard::with_pause(Duration::ZERO);
        let calls = Arc::new(AtomicUsize::new(0));

        assert_eq!(guard.initialize("x", counting(&calls)).await, Admission::Drained);
        assert_eq!(
            guard.initialize("x", counting(&calls)).await,
            Admission::AlreadyInitialized
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(guard.is_initialized("x").await);
    }

    #[tokio::test]
    async fn reset_allows_reinitialization() {
        let guard = AdGuard::with_pause(Duration::ZERO);
        let calls = Arc::new(AtomicUsize::new(0));

        guard.initialize("x", counting(&calls)).await;
        guard.reset().await;
        assert!(!guard.is_initialized("x").await);

        guard.initialize("x", counting(&calls)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_init_leaves_slot_unmarked() {
        let guard = AdGuard::with_pause(Duration::ZERO);

        guard
            .initialize("x", || Err::<(), _>("script not loaded"))
            .await;
        assert!(!guard.is_initialized("x").await);

        let calls = Arc::new(AtomicUsize::new(0));
        assert_eq!(guard.initialize("x", counting(&calls)).await, Admission::Drained);
        assert!(guard.is_initialized("x").await);
    }

    #[tokio::test]
    async fn concurrent_requests_join_running_drain() {
        let guard = AdGuard::with_pause(Duration::from_millis(100));
        let order = Arc::new(StdMutex::new(Vec::new()));

        let record = |id: &'static str| {
            let order = Arc::clone(&order);
            move || {
                order.lock().unwrap().push(id);
                Ok::<(), String>(())
            }
        };

        let first = {
            let guard = guard.clone();
            let init = record("a");
            tokio::spawn(async move { guard.initialize("a", init).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(guard.initialize("b", record("b")).await, Admission::Queued);

        assert_eq!(first.await.unwrap(), Admission::Drained);
        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
        assert_eq!(guard.pending().await, 0);
    }

    #[tokio::test]
    async fn panicking_init_does_not_block_later_slots() {
        let guard = AdGuard::with_pause(Duration::ZERO);
        let calls = Arc::new(AtomicUsize::new(0));

        let admission = guard
            .initialize("x", || -> Result<(), String> { panic!("ad script crashed") })
            .await;
        assert_eq!(admission, Admission::Drained);
        assert!(!guard.is_initialized("x").await);

        assert_eq!(guard.initialize("y", counting(&calls)).await, Admission::Drained);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(guard.is_initialized("y").await);
    }

    #[tokio::test]
    async fn dropped_caller_does_not_stall_drain() {
        let guard = AdGuard::with_pause(Duration::from_millis(100));
        let calls = Arc::new(AtomicUsize::new(0));

        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), guard.initialize("x", counting(&calls)))
                .await;
        assert!(timed_out.is_err());

        guard.initialize("y", counting(&calls)).await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(guard.is_initialized("x").await);
        assert!(guard.is_initialized("y").await);
        assert_eq!(guard.pending().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_between_initializations() {
        let pause = Duration::from_millis(100);
        let guard = AdGuard::with_pause(pause);
        let times = Arc::new(StdMutex::new(Vec::new()));

        let stamp = || {
            let times = Arc::clone(&times);
            move || {
                times.lock().unwrap().push(tokio::time::Instant::now());
                Ok::<(), String>(())
            }
        };

        let first = {
            let guard = guard.clone();
            let init = stamp();
            tokio::spawn(async move { guard.initialize("a", init).await })
        };

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(guard.initialize("b", stamp()).await, Admission::Queued);
        assert_eq!(guard.initialize("c", stamp()).await, Admission::Queued);
        assert_eq!(first.await.unwrap(), Admission::Drained);

        let times = times.lock().unwrap();
        assert_eq!(times.len(), 3);
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= pause);
        }
    }

    #[tokio::test]
    async fn reset_stops_running_drain() {
        let guard = AdGuard::with_pause(Duration::from_millis(100));
        let calls = Arc::new(AtomicUsize::new(0));

        let first = {
            let guard = guard.clone();
            let init = counting(&calls);
            tokio::spawn(async move { guard.initialize("a", init).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        guard.initialize("b", counting(&calls)).await;
        guard.reset().await;
        first.await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!guard.is_initialized("b").await);
        assert_eq!(guard.pending().await, 0);

        let fresh = Arc::new(AtomicUsize::new(0));
        assert_eq!(
            guard.initialize("c", counting(&fresh)).await,
            Admission::Drained
        );
    }
}
