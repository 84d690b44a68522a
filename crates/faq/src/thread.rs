/// Stable identifier for one message within a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Creates a typed message identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Who a message came from, and what it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Echo of a label the visitor selected. Never carries choices.
    User,
    /// Canned answer with the follow-up labels it currently offers.
    Bot { choices: Vec<String> },
    /// Transient "typing" indicator shown while a response is pending.
    Typing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub id: MessageId,
    pub text: String,
    pub kind: MessageKind,
}

impl ThreadMessage {
    pub fn is_user(&self) -> bool {
        matches!(self.kind, MessageKind::User)
    }

    pub fn is_bot(&self) -> bool {
        matches!(self.kind, MessageKind::Bot { .. })
    }

    pub fn is_typing(&self) -> bool {
        matches!(self.kind, MessageKind::Typing)
    }

    /// Offered labels; empty for user messages, placeholders and retired bot messages.
    pub fn choices(&self) -> &[String] {
        match &self.kind {
            MessageKind::Bot { choices } => choices,
            MessageKind::User | MessageKind::Typing => &[],
        }
    }
}

/// Ordered, session-scoped list of rendered messages.
///
/// Ids keep increasing across [`Thread::reset`] so a placeholder id from an earlier
/// session can never address a message in a later one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Thread {
    messages: Vec<ThreadMessage>,
    next_message_id: u64,
}

impl Thread {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ThreadMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ThreadMessage> {
        self.messages.last()
    }

    pub fn get(&self, id: MessageId) -> Option<&ThreadMessage> {
        self.messages.iter().find(|message| message.id == id)
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.get(id).is_some()
    }

    /// Drops every message. Id allocation continues where it left off.
    pub fn reset(&mut self) {
        self.messages.clear();
    }

    pub fn push_bot(&mut self, text: impl Into<String>, choices: Vec<String>) -> MessageId {
        self.push(text.into(), MessageKind::Bot { choices })
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> MessageId {
        self.push(text.into(), MessageKind::User)
    }

    pub fn push_typing(&mut self) -> MessageId {
        self.push(String::new(), MessageKind::Typing)
    }

    /// Labels offered by the one bot message with live choices, if any.
    pub fn active_choices(&self) -> &[String] {
        self.messages
            .iter()
            .rev()
            .find(|message| !message.choices().is_empty())
            .map(ThreadMessage::choices)
            .unwrap_or(&[])
    }

    /// Number of bot messages currently offering choices. At most one by construction.
    pub fn messages_with_choices(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| !message.choices().is_empty())
            .count()
    }

    /// Removes the choices of the latest bot message. Returns the retired message id.
    pub fn retire_choices(&mut self) -> Option<MessageId> {
        let message = self
            .messages
            .iter_mut()
            .rev()
            .find(|message| message.is_bot())?;

        match &mut message.kind {
            MessageKind::Bot { choices } if !choices.is_empty() => {
                choices.clear();
                Some(message.id)
            }
            _ => None,
        }
    }

    /// Swaps a typing placeholder for a bot answer at the same position.
    ///
    /// Returns `false` without touching the thread when `placeholder` is gone or is not a
    /// placeholder anymore.
    pub fn replace_typing(
        &mut self,
        placeholder: MessageId,
        text: impl Into<String>,
        choices: Vec<String>,
    ) -> bool {
        let Some(message) = self
            .messages
            .iter_mut()
            .find(|message| message.id == placeholder && message.is_typing())
        else {
            return false;
        };

        message.text = text.into();
        message.kind = MessageKind::Bot { choices };
        true
    }

    fn push(&mut self, text: String, kind: MessageKind) -> MessageId {
        let id = self.alloc_message_id();
        self.messages.push(ThreadMessage { id, text, kind });
        id
    }

    fn alloc_message_id(&mut self) -> MessageId {
        self.next_message_id = self.next_message_id.saturating_add(1);
        MessageId::new(self.next_message_id)
    }
}
