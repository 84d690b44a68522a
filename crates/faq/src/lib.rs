#![deny(unsafe_code)]

//! Scripted FAQ navigator for the portfolio chat widget.
//!
//! The crate is toolkit-independent: [`navigator::Navigator`] is a plain state machine
//! that any front end drives, and [`session::FaqSession`] runs it on tokio with the real
//! typing delay.

pub mod config;
pub mod error;
pub mod navigator;
pub mod session;
pub mod thread;
/// Typed-text headline animation.
pub mod typewriter;
pub mod topic;

pub use config::{TopicTableFile, load_or_builtin, load_topic_table};
pub use error::{TopicTableError, TopicTableResult};
pub use navigator::{
    Completion, Navigator, PendingResolution, SelectRejection, SessionId, TYPING_DELAY,
    WidgetState,
};
pub use session::{FaqSession, SessionSnapshot};
pub use thread::{MessageId, MessageKind, Thread, ThreadMessage};
pub use topic::{
    APOLOGY_ANSWER, ROOT_TOPIC_KEY, Resolution, TopicEntry, TopicTable, normalize_label,
};
pub use typewriter::{Typewriter, TypewriterFrame};
