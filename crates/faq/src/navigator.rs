//! Explicit widget state machine over a [`TopicTable`].
//!
//! The navigator never sleeps. [`Navigator::select`] hands out a [`PendingResolution`]
//! ticket and the host fires [`Navigator::complete`] once its typing delay elapses.
//! Tickets are checked against the current session and the thread contents, so a timer
//! that outlives a close/reopen cycle drops its update instead of corrupting the new
//! thread.

use std::sync::Arc;
use std::time::Duration;

use crate::thread::{MessageId, Thread};
use crate::topic::{Resolution, TopicTable, normalize_label};

/// Simulated "thinking" time before an answer replaces the placeholder.
pub const TYPING_DELAY: Duration = Duration::from_millis(700);

/// Identifier for one closed-to-open lifetime of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl SessionId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Ticket for one in-flight answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingResolution {
    pub session: SessionId,
    pub placeholder: MessageId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Closed,
    OpenIdle,
    OpenAwaitingResponse(PendingResolution),
}

impl WidgetState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn pending(&self) -> Option<&PendingResolution> {
        match self {
            Self::OpenAwaitingResponse(pending) => Some(pending),
            Self::Closed | Self::OpenIdle => None,
        }
    }
}

/// Why a selection was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectRejection {
    Closed,
    AwaitingResponse { pending: PendingResolution },
    NotOffered { label: String },
}

/// Result of firing a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The placeholder was replaced by this answer.
    Applied(Resolution),
    /// The ticket belonged to an earlier session or its placeholder is gone.
    Stale,
}

pub struct Navigator {
    table: Arc<TopicTable>,
    state: WidgetState,
    thread: Thread,
    session: SessionId,
}

impl Navigator {
    pub fn new(table: Arc<TopicTable>) -> Self {
        Self {
            table,
            state: WidgetState::Closed,
            thread: Thread::new(),
            session: SessionId::new(0),
        }
    }

    pub fn table(&self) -> &Arc<TopicTable> {
        &self.table
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn thread(&self) -> &Thread {
        &self.thread
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Opens the widget with a freshly seeded thread. No-op while already open.
    pub fn open(&mut self) -> bool {
        if self.state.is_open() {
            return false;
        }

        self.session = SessionId::new(self.session.0.saturating_add(1));
        self.thread.reset();
        let root = self.table.root();
        self.thread.push_bot(root.answer.clone(), root.next_topics.clone());
        self.state = WidgetState::OpenIdle;

        tracing::info!(session = self.session.0, "faq widget opened");
        true
    }

    /// Closes the widget. The thread stays as-is until the next open discards it.
    pub fn close(&mut self) -> bool {
        if !self.state.is_open() {
            return false;
        }

        self.state = WidgetState::Closed;
        tracing::info!(session = self.session.0, "faq widget closed");
        true
    }

    /// Opens when closed, closes otherwise. Returns whether the widget is now open.
    pub fn toggle(&mut self) -> bool {
        if self.state.is_open() {
            self.close();
        } else {
            self.open();
        }
        self.state.is_open()
    }

    /// Records the visitor's choice and parks a typing placeholder.
    pub fn select(&mut self, label: &str) -> Result<PendingResolution, SelectRejection> {
        match &self.state {
            WidgetState::Closed => return Err(SelectRejection::Closed),
            WidgetState::OpenAwaitingResponse(pending) => {
                return Err(SelectRejection::AwaitingResponse {
                    pending: pending.clone(),
                });
            }
            WidgetState::OpenIdle => {}
        }

        let wanted = normalize_label(label);
        let offered = self
            .thread
            .active_choices()
            .iter()
            .any(|choice| normalize_label(choice) == wanted);
        if !offered {
            return Err(SelectRejection::NotOffered {
                label: label.to_string(),
            });
        }

        self.thread.retire_choices();
        self.thread.push_user(label);
        let placeholder = self.thread.push_typing();

        let pending = PendingResolution {
            session: self.session,
            placeholder,
            label: label.to_string(),
        };
        self.state = WidgetState::OpenAwaitingResponse(pending.clone());

        tracing::debug!(
            session = self.session.0,
            placeholder = placeholder.0,
            label,
            "topic selected"
        );
        Ok(pending)
    }

    /// Resolves a ticket into an answer, guarded against stale sessions.
    pub fn complete(&mut self, pending: &PendingResolution) -> Completion {
        if pending.session != self.session || !self.thread.contains(pending.placeholder) {
            tracing::debug!(
                ticket_session = pending.session.0,
                current_session = self.session.0,
                placeholder = pending.placeholder.0,
                "dropping stale resolution"
            );
            return Completion::Stale;
        }

        let resolution = self.table.resolve(&pending.label);
        if !self.thread.replace_typing(
            pending.placeholder,
            resolution.answer.clone(),
            resolution.choices.clone(),
        ) {
            return Completion::Stale;
        }

        if self.state.pending() == Some(pending) {
            self.state = WidgetState::OpenIdle;
        }

        tracing::debug!(
            session = self.session.0,
            placeholder = pending.placeholder.0,
            matched = resolution.matched,
            "resolution applied"
        );
        Completion::Applied(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::MessageKind;
    use crate::topic::{APOLOGY_ANSWER, ROOT_TOPIC_KEY, TopicEntry};

    fn navigator() -> Navigator {
        Navigator::new(Arc::new(TopicTable::builtin()))
    }

    fn assert_fresh_thread(navigator: &Navigator) {
        let table = navigator.table().clone();
        let thread = navigator.thread();
        assert_eq!(thread.len(), 1);
        assert_eq!(thread.messages()[0].text, table.root().answer);
        assert_eq!(thread.messages()[0].choices(), table.root_choices());
        assert_eq!(navigator.state(), &WidgetState::OpenIdle);
    }

    #[test]
    fn opening_seeds_root_message() {
        let mut navigator = navigator();
        assert!(navigator.open());
        assert_fresh_thread(&navigator);
        assert_eq!(
            navigator.thread().messages()[0].text,
            "Hello! How can I assist you today?"
        );
        assert_eq!(navigator.thread().active_choices().len(), 4);
    }

    #[test]
    fn opening_twice_is_noop() {
        let mut navigator = navigator();
        navigator.open();
        let session = navigator.session();
        assert!(!navigator.open());
        assert_eq!(navigator.session(), session);
    }

    #[test]
    fn skills_scenario_matches_expected_thread() {
        let mut navigator = navigator();
        navigator.open();

        let pending = navigator.select("Amira's Skills").unwrap();
        {
            let messages = navigator.thread().messages();
            assert_eq!(messages.len(), 3);
            assert!(messages[0].is_bot() && messages[0].choices().is_empty());
            assert_eq!(messages[1].kind, MessageKind::User);
            assert_eq!(messages[1].text, "Amira's Skills");
            assert!(messages[2].is_typing());
            assert_eq!(messages[2].id, pending.placeholder);
        }
        assert!(matches!(
            navigator.state(),
            WidgetState::OpenAwaitingResponse(_)
        ));

        let completion = navigator.complete(&pending);
        assert!(matches!(completion, Completion::Applied(ref r) if r.matched));

        let messages = navigator.thread().messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].choices().is_empty());
        assert_eq!(messages[1].text, "Amira's Skills");
        assert!(messages[2].text.starts_with("Amira's skills include"));
        assert_eq!(
            messages[2].choices(),
            [
                "Who is Amira?",
                "Amira's Services",
                "Contact Amira",
                "Go Back to Main Menu"
            ]
        );
        assert_eq!(navigator.thread().messages_with_choices(), 1);
        assert_eq!(navigator.state(), &WidgetState::OpenIdle);
    }

    #[test]
    fn go_back_returns_root_answer_and_choices() {
        let mut navigator = navigator();
        navigator.open();
        let pending = navigator.select("Amira's Skills").unwrap();
        navigator.complete(&pending);

        let pending = navigator.select("Go Back to Main Menu").unwrap();
        navigator.complete(&pending);

        let table = navigator.table().clone();
        let last = navigator.thread().last().unwrap();
        assert_eq!(last.text, table.root().answer);
        assert_eq!(last.choices(), table.root_choices());
        assert_eq!(navigator.thread().len(), 5);
        assert_eq!(navigator.thread().messages_with_choices(), 1);
    }

    #[test]
    fn selection_appends_exactly_one_user_and_one_placeholder() {
        let mut navigator = navigator();
        navigator.open();
        let pending = navigator.select("Contact Amira").unwrap();
        navigator.complete(&pending);
        let before = navigator.thread().len();

        navigator.select("Who is Amira?").unwrap();
        let messages = navigator.thread().messages();
        assert_eq!(messages.len(), before + 2);
        assert_eq!(messages.iter().filter(|m| m.is_typing()).count(), 1);
        assert_eq!(navigator.thread().messages_with_choices(), 0);
    }

    #[test]
    fn rejects_selection_while_closed_pending_or_not_offered() {
        let mut navigator = navigator();
        assert_eq!(
            navigator.select("Amira's Skills"),
            Err(SelectRejection::Closed)
        );

        navigator.open();
        assert!(matches!(
            navigator.select("Educational Background"),
            Err(SelectRejection::NotOffered { .. })
        ));
        assert_eq!(navigator.thread().len(), 1);

        let pending = navigator.select("Amira's Skills").unwrap();
        assert_eq!(
            navigator.select("Who is Amira?"),
            Err(SelectRejection::AwaitingResponse { pending })
        );
        assert_eq!(navigator.thread().len(), 3);
    }

    #[test]
    fn reopen_resets_to_fresh_state() {
        let mut navigator = navigator();
        navigator.open();
        for label in ["Who is Amira?", "Educational Background", "Amira's Services"] {
            let pending = navigator.select(label).unwrap();
            navigator.complete(&pending);
        }
        navigator.close();
        assert_eq!(navigator.state(), &WidgetState::Closed);
        assert_eq!(navigator.thread().len(), 7);

        navigator.open();
        assert_fresh_thread(&navigator);
    }

    #[test]
    fn stale_resolution_after_reopen_is_dropped() {
        let mut navigator = navigator();
        navigator.open();
        let stale = navigator.select("Amira's Skills").unwrap();

        navigator.close();
        navigator.open();
        let snapshot = navigator.thread().clone();

        assert_eq!(navigator.complete(&stale), Completion::Stale);
        assert_eq!(navigator.thread(), &snapshot);
        assert_fresh_thread(&navigator);

        // The fresh session is still fully usable.
        let pending = navigator.select("Amira's Skills").unwrap();
        assert!(matches!(navigator.complete(&pending), Completion::Applied(_)));
    }

    #[test]
    fn completion_after_close_still_fills_hidden_thread() {
        let mut navigator = navigator();
        navigator.open();
        let pending = navigator.select("Contact Amira").unwrap();
        navigator.close();

        assert!(matches!(navigator.complete(&pending), Completion::Applied(_)));
        assert_eq!(navigator.state(), &WidgetState::Closed);
        assert!(navigator.thread().last().is_some_and(|m| m.is_bot()));
    }

    #[test]
    fn completing_twice_is_stale_the_second_time() {
        let mut navigator = navigator();
        navigator.open();
        let pending = navigator.select("Amira's Services").unwrap();
        assert!(matches!(navigator.complete(&pending), Completion::Applied(_)));
        assert_eq!(navigator.complete(&pending), Completion::Stale);
    }

    #[test]
    fn toggle_alternates_and_reseeds() {
        let mut navigator = navigator();
        assert!(navigator.toggle());
        navigator.select("Amira's Skills").unwrap();
        assert!(!navigator.toggle());
        assert!(navigator.toggle());
        assert_fresh_thread(&navigator);
    }

    #[test]
    fn empty_follow_ups_fall_back_to_root_choices() {
        let table = TopicTable::from_entries(vec![
            TopicEntry::new(ROOT_TOPIC_KEY, "hi", ["Leaf"]),
            TopicEntry::new("Leaf", "leaf answer", Vec::<String>::new()),
        ])
        .unwrap();
        let mut navigator = Navigator::new(Arc::new(table));
        navigator.open();
        let pending = navigator.select("leaf").unwrap();
        navigator.complete(&pending);

        let last = navigator.thread().last().unwrap();
        assert_eq!(last.text, "leaf answer");
        assert_eq!(last.choices(), ["Leaf"]);
        assert_ne!(last.text, APOLOGY_ANSWER);
    }
}
