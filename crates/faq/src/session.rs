use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::navigator::{Completion, Navigator, SelectRejection, TYPING_DELAY, WidgetState};
use crate::thread::Thread;
use crate::topic::TopicTable;

/// Point-in-time copy of the widget, published after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub state: WidgetState,
    pub thread: Thread,
}

struct Shared {
    navigator: Mutex<Navigator>,
    updates: watch::Sender<SessionSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Navigator> {
        // Every navigator mutation completes before returning, so poisoned state is still consistent.
        self.navigator
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, navigator: &Navigator) {
        self.updates.send_replace(SessionSnapshot {
            state: navigator.state().clone(),
            thread: navigator.thread().clone(),
        });
    }
}

/// Drives a [`Navigator`] on the tokio runtime with a real typing delay.
///
/// Pending answers run as detached tasks and are never cancelled. After a reopen the
/// navigator's session guard discards their result.
#[derive(Clone)]
pub struct FaqSession {
    shared: Arc<Shared>,
    typing_delay: Duration,
}

impl FaqSession {
    pub fn new(table: Arc<TopicTable>) -> Self {
        Self::with_typing_delay(table, TYPING_DELAY)
    }

    pub fn with_typing_delay(table: Arc<TopicTable>, typing_delay: Duration) -> Self {
        let (updates, _) = watch::channel(SessionSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                navigator: Mutex::new(Navigator::new(table)),
                updates,
            }),
            typing_delay,
        }
    }

    pub fn typing_delay(&self) -> Duration {
        self.typing_delay
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.updates.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let navigator = self.shared.lock();
        SessionSnapshot {
            state: navigator.state().clone(),
            thread: navigator.thread().clone(),
        }
    }

    pub fn open(&self) -> bool {
        self.mutate(Navigator::open)
    }

    pub fn close(&self) -> bool {
        self.mutate(Navigator::close)
    }

    pub fn toggle(&self) -> bool {
        self.mutate(Navigator::toggle)
    }

    /// Selects a label and schedules its answer after the typing delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn select(&self, label: &str) -> Result<JoinHandle<Completion>, SelectRejection> {
        let pending = self.mutate(|navigator| navigator.select(label))?;

        let shared = Arc::clone(&self.shared);
        let delay = self.typing_delay;
        Ok(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut navigator = shared.lock();
            let completion = navigator.complete(&pending);
            if matches!(completion, Completion::Applied(_)) {
                shared.publish(&navigator);
            }
            completion
        }))
    }

    fn mutate<T>(&self, apply: impl FnOnce(&mut Navigator) -> T) -> T {
        let mut navigator = self.shared.lock();
        let before = navigator.thread().len();
        let was_open = navigator.is_open();
        let result = apply(&mut navigator);
        if navigator.thread().len() != before || navigator.is_open() != was_open {
            self.shared.publish(&navigator);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> FaqSession {
        FaqSession::new(Arc::new(TopicTable::builtin()))
    }

    #[tokio::test(start_paused = true)]
    async fn answer_arrives_after_typing_delay() {
        let session = session();
        session.open();
        let handle = session.select("Amira's Skills").unwrap();

        tokio::time::sleep(TYPING_DELAY - Duration::from_millis(1)).await;
        assert!(session.snapshot().thread.last().is_some_and(|m| m.is_typing()));

        let completion = handle.await.unwrap();
        assert!(matches!(completion, Completion::Applied(_)));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, WidgetState::OpenIdle);
        assert_eq!(snapshot.thread.len(), 3);
        assert!(
            snapshot.thread.messages()[2]
                .text
                .starts_with("Amira's skills include")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reopen_mid_delay_leaves_new_thread_untouched() {
        let session = session();
        session.open();
        let stale = session.select("Amira's Skills").unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        session.close();
        session.open();
        let fresh = session.snapshot();

        assert_eq!(stale.await.unwrap(), Completion::Stale);
        assert_eq!(session.snapshot(), fresh);
        assert_eq!(fresh.thread.len(), 1);
        assert_eq!(fresh.thread.active_choices().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_each_mutation() {
        let session = session();
        let mut updates = session.subscribe();

        session.open();
        assert!(updates.has_changed().unwrap());
        assert_eq!(updates.borrow_and_update().thread.len(), 1);

        let handle = session.select("Contact Amira").unwrap();
        assert_eq!(updates.borrow_and_update().thread.len(), 3);

        handle.await.unwrap();
        updates.changed().await.unwrap();
        let snapshot = updates.borrow_and_update().clone();
        assert!(snapshot.thread.last().is_some_and(|m| m.is_bot()));
        assert_eq!(snapshot.state, WidgetState::OpenIdle);
    }

    #[tokio::test(start_paused = true)]
    async fn second_selection_is_rejected_while_pending() {
        let session = session();
        session.open();
        let handle = session.select("Who is Amira?").unwrap();
        assert!(matches!(
            session.select("Amira's Skills"),
            Err(SelectRejection::AwaitingResponse { .. })
        ));
        handle.await.unwrap();
        assert!(session.select("Amira's Skills").is_ok());
    }
}
