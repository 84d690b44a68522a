use folio_faq::SessionId;

/// Emitted when the visitor clicks a quick-reply button.
///
/// Carries the session the button was rendered in so clicks on a thread that has since
/// been reset are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSelected {
    pub session: SessionId,
    pub label: String,
}

impl TopicSelected {
    pub fn new(session: SessionId, label: impl Into<String>) -> Self {
        Self {
            session,
            label: label.into(),
        }
    }

    /// Whether the click came from the thread currently on screen.
    ///
    /// Buttons from a thread that was reset by reopening carry the old session.
    pub fn is_for(&self, current: SessionId) -> bool {
        self.session == current
    }
}

/// Emitted whenever the widget opens or closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityChanged {
    pub open: bool,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use folio_faq::{Navigator, TopicTable};

    use super::*;

    #[test]
    fn selection_from_current_thread_is_accepted() {
        let mut navigator = Navigator::new(Arc::new(TopicTable::builtin()));
        navigator.open();

        let event = TopicSelected::new(navigator.session(), "Amira's Skills");
        assert!(event.is_for(navigator.session()));
    }

    #[test]
    fn selection_from_thread_before_reopen_is_dropped() {
        let mut navigator = Navigator::new(Arc::new(TopicTable::builtin()));
        navigator.open();
        let old_click = TopicSelected::new(navigator.session(), "Amira's Skills");

        navigator.close();
        navigator.open();

        assert!(!old_click.is_for(navigator.session()));
        let new_click = TopicSelected::new(navigator.session(), "Amira's Skills");
        assert!(new_click.is_for(navigator.session()));
    }
}
