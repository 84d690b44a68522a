use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    ActiveTheme, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};

use folio_faq::{MessageKind, SessionId, ThreadMessage};

use crate::faq::events::TopicSelected;
use crate::faq::scroll_manager::ScrollManager;

const USER_BUBBLE_MAX_WIDTH: Pixels = px(260.);
const BOT_BUBBLE_MAX_WIDTH: Pixels = px(300.);
const BUBBLE_PADDING_X: Pixels = px(12.);
const BUBBLE_PADDING_Y: Pixels = px(8.);
const TYPING_DOT_SIZE: Pixels = px(6.);

/// Scrollable rendering of one conversation thread.
pub struct MessageList {
    session: SessionId,
    messages: Vec<ThreadMessage>,
    scroll_manager: ScrollManager,
}

impl EventEmitter<TopicSelected> for MessageList {}

impl MessageList {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            session: SessionId::new(0),
            messages: Vec::new(),
            scroll_manager: ScrollManager::new(),
        }
    }

    /// Replaces the rendered thread and scrolls to its newest message.
    pub fn set_thread(
        &mut self,
        session: SessionId,
        messages: Vec<ThreadMessage>,
        cx: &mut Context<Self>,
    ) {
        if session != self.session {
            self.scroll_manager.reset();
        }

        self.session = session;
        self.messages = messages;
        self.scroll_manager.request_scroll_to_bottom();
        cx.notify();
    }

    fn select(&mut self, label: String, cx: &mut Context<Self>) {
        cx.emit(TopicSelected::new(self.session, label));
    }

    fn render_message_row(&self, message: &ThreadMessage, cx: &mut Context<Self>) -> AnyElement {
        let theme = cx.theme();

        match &message.kind {
            MessageKind::User => v_flex()
                .w_full()
                .items_end()
                .child(
                    div()
                        .max_w(USER_BUBBLE_MAX_WIDTH)
                        .px(BUBBLE_PADDING_X)
                        .py(BUBBLE_PADDING_Y)
                        .rounded_lg()
                        .bg(theme.primary)
                        .text_color(theme.primary_foreground)
                        .child(Label::new(message.text.clone()).text_sm()),
                )
                .into_any_element(),
            MessageKind::Typing => h_flex()
                .w_full()
                .gap_2()
                .items_center()
                .child(self.render_bot_badge(cx))
                .child(
                    h_flex()
                        .px(BUBBLE_PADDING_X)
                        .py(BUBBLE_PADDING_Y)
                        .gap_1()
                        .rounded_lg()
                        .bg(theme.muted)
                        .children((0..3).map(|_| {
                            div()
                                .size(TYPING_DOT_SIZE)
                                .rounded_full()
                                .bg(theme.muted_foreground)
                        })),
                )
                .into_any_element(),
            MessageKind::Bot { choices } => {
                let message_id = message.id.0;
                v_flex()
                    .w_full()
                    .gap_2()
                    .child(
                        h_flex()
                            .w_full()
                            .gap_2()
                            .items_start()
                            .child(self.render_bot_badge(cx))
                            .child(
                                div()
                                    .max_w(BOT_BUBBLE_MAX_WIDTH)
                                    .px(BUBBLE_PADDING_X)
                                    .py(BUBBLE_PADDING_Y)
                                    .rounded_lg()
                                    .bg(theme.muted)
                                    .text_color(theme.foreground)
                                    .child(Label::new(message.text.clone()).text_sm()),
                            ),
                    )
                    .when(!choices.is_empty(), |column| {
                        column.child(
                            h_flex()
                                .w_full()
                                .flex_wrap()
                                .gap_2()
                                .pl_8()
                                .children(choices.iter().enumerate().map(|(index, choice)| {
                                    let label = choice.clone();
                                    Button::new(format!("faq-quick-reply-{message_id}-{index}"))
                                        .small()
                                        .ghost()
                                        .label(choice.clone())
                                        .on_click(cx.listener(
                                            move |this, _: &ClickEvent, _window, cx| {
                                                this.select(label.clone(), cx);
                                            },
                                        ))
                                })),
                        )
                    })
                    .into_any_element()
            }
        }
    }

    fn render_bot_badge(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .flex_shrink_0()
            .size(px(24.))
            .rounded_full()
            .bg(theme.primary)
            .text_color(theme.primary_foreground)
            .flex()
            .items_center()
            .justify_center()
            .child(Label::new("FAQ").text_xs())
    }
}

impl Render for MessageList {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.scroll_manager.update_follow_state();
        self.scroll_manager.apply_pending_scroll();

        let rows = self
            .messages
            .iter()
            .map(|message| self.render_message_row(message, cx))
            .collect::<Vec<_>>();

        div()
            .id("faq-message-list")
            .size_full()
            .min_h_0()
            .overflow_y_scroll()
            .track_scroll(self.scroll_manager.handle())
            .child(v_flex().w_full().px_3().py_3().gap_3().children(rows))
    }
}
