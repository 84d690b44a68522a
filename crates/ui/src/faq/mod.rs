pub mod events;
pub mod message_list;
pub mod scroll_manager;
pub mod view;

pub use events::{TopicSelected, VisibilityChanged};
pub use message_list::MessageList;
pub use scroll_manager::ScrollManager;
pub use view::FaqWidget;
