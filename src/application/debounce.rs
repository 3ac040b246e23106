//! Debounced free-text search input.
//!
//! Each keystroke reschedules a single pending commit; only the last term of
//! a burst reaches the receiver, and only once input has been quiet for the
//! configured period.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::util::lock::mutex_lock;

const SOURCE: &str = "application::debounce";

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Rate-limits search input before it may trigger a new query.
///
/// Dropping the debouncer cancels the pending commit, so nothing is delivered
/// after its owner is gone.
pub struct SearchDebouncer {
    quiet: Duration,
    commits: mpsc::UnboundedSender<String>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchDebouncer {
    /// Create a debouncer and the receiver its committed terms arrive on.
    pub fn new(quiet: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (commits, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            quiet,
            commits,
            pending: Mutex::new(None),
        };
        (debouncer, receiver)
    }

    /// Schedule `term` for commit, replacing any commit still waiting.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_input(&self, term: impl Into<String>) {
        let term = term.into();
        let commits = self.commits.clone();
        let quiet = self.quiet;

        let mut pending = mutex_lock(&self.pending, SOURCE, "on_input");
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            if commits.send(term).is_err() {
                debug!("search commit dropped; receiver closed");
            }
        }));
    }

    /// Cancel the pending commit. Returns whether one was still waiting.
    pub fn cancel(&self) -> bool {
        match mutex_lock(&self.pending, SOURCE, "cancel").take() {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        mutex_lock(&self.pending, SOURCE, "is_pending")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_commits_only_the_final_term() {
        let (debouncer, mut commits) = SearchDebouncer::new(DEFAULT_QUIET_PERIOD);

        debouncer.on_input("a");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.on_input("ab");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.on_input("abc");

        assert_eq!(commits.recv().await.as_deref(), Some("abc"));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(commits.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_commit_separately() {
        let (debouncer, mut commits) = SearchDebouncer::new(DEFAULT_QUIET_PERIOD);

        debouncer.on_input("roma");
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.on_input("rhodes park");

        assert_eq!(commits.recv().await.as_deref(), Some("roma"));
        assert_eq!(commits.recv().await.as_deref(), Some("rhodes park"));
    }

    #[tokio::test(start_paused = true)]
    async fn commit_waits_for_the_quiet_period() {
        let (debouncer, mut commits) = SearchDebouncer::new(DEFAULT_QUIET_PERIOD);

        debouncer.on_input("ibex");
        assert!(debouncer.is_pending());
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(commits.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(commits.recv().await.as_deref(), Some("ibex"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_commit() {
        let (debouncer, mut commits) = SearchDebouncer::new(DEFAULT_QUIET_PERIOD);

        debouncer.on_input("olympia");
        assert!(debouncer.cancel());
        assert!(!debouncer.is_pending());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(commits.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_debouncer_cancels_the_timer() {
        let (debouncer, mut commits) = SearchDebouncer::new(DEFAULT_QUIET_PERIOD);

        debouncer.on_input("kalundu");
        drop(debouncer);

        assert_eq!(commits.recv().await, None);
    }
}
