use std::sync::Arc;
use std::time::Duration;

use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};

use folio_faq::{Completion, Navigator, PendingResolution, TopicTable};

use crate::faq::events::{TopicSelected, VisibilityChanged};
use crate::faq::message_list::MessageList;

pub const WIDGET_WIDTH: Pixels = px(380.);
pub const WIDGET_HEIGHT: Pixels = px(520.);

/// Chat widget coordinator: owns the navigator and feeds its thread to the message list.
pub struct FaqWidget {
    navigator: Navigator,
    message_list: Entity<MessageList>,
    typing_delay: Duration,
}

impl EventEmitter<VisibilityChanged> for FaqWidget {}

impl FaqWidget {
    pub fn new(table: Arc<TopicTable>, typing_delay: Duration, cx: &mut Context<Self>) -> Self {
        let message_list = cx.new(MessageList::new);

        cx.subscribe(&message_list, |this, _, event: &TopicSelected, cx| {
            this.handle_topic_selected(event.clone(), cx);
        })
        .detach();

        Self {
            navigator: Navigator::new(table),
            message_list,
            typing_delay,
        }
    }

    pub fn is_open(&self) -> bool {
        self.navigator.is_open()
    }

    pub fn open(&mut self, cx: &mut Context<Self>) {
        if !self.navigator.open() {
            return;
        }

        self.sync_thread(cx);
        cx.emit(VisibilityChanged { open: true });
        cx.notify();
    }

    pub fn close(&mut self, cx: &mut Context<Self>) {
        if !self.navigator.close() {
            return;
        }

        cx.emit(VisibilityChanged { open: false });
        cx.notify();
    }

    pub fn toggle(&mut self, cx: &mut Context<Self>) {
        if self.navigator.is_open() {
            self.close(cx);
        } else {
            self.open(cx);
        }
    }

    fn handle_topic_selected(&mut self, event: TopicSelected, cx: &mut Context<Self>) {
        if !event.is_for(self.navigator.session()) {
            return;
        }

        match self.navigator.select(&event.label) {
            Ok(pending) => {
                self.sync_thread(cx);
                self.schedule_resolution(pending, cx);
            }
            Err(rejection) => {
                tracing::debug!(?rejection, label = %event.label, "ignored topic selection");
            }
        }
    }

    fn schedule_resolution(&mut self, pending: PendingResolution, cx: &mut Context<Self>) {
        let delay = self.typing_delay;

        // Never cancelled; `Navigator::complete` drops the answer if the thread was reset.
        cx.spawn(async move |this, cx| {
            cx.background_executor().timer(delay).await;

            let _ = this.update(cx, |this, cx| {
                this.finish_resolution(&pending, cx);
            });
        })
        .detach();
    }

    fn finish_resolution(&mut self, pending: &PendingResolution, cx: &mut Context<Self>) {
        match self.navigator.complete(pending) {
            Completion::Applied(_) => {
                self.sync_thread(cx);
                cx.notify();
            }
            Completion::Stale => {}
        }
    }

    fn sync_thread(&mut self, cx: &mut Context<Self>) {
        let session = self.navigator.session();
        let messages = self.navigator.thread().messages().to_vec();

        self.message_list.update(cx, |list, cx| {
            list.set_thread(session, messages, cx);
        });
    }
}

impl Render for FaqWidget {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("faq-widget")
            .w(WIDGET_WIDTH)
            .h(WIDGET_HEIGHT)
            .overflow_hidden()
            .rounded_lg()
            .border_1()
            .border_color(theme.border)
            .bg(theme.background)
            .shadow_lg()
            .child(
                h_flex()
                    .id("faq-widget-header")
                    .w_full()
                    .flex_shrink_0()
                    .px_3()
                    .py_2()
                    .items_center()
                    .justify_between()
                    .bg(theme.primary)
                    .child(
                        Label::new("Chatbot")
                            .text_sm()
                            .text_color(theme.primary_foreground),
                    )
                    .child(
                        Button::new("faq-widget-close")
                            .ghost()
                            .small()
                            .icon(IconName::Close)
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.close(cx);
                            })),
                    ),
            )
            .child(
                div()
                    .id("faq-widget-thread")
                    .flex_1()
                    .min_h_0()
                    .child(self.message_list.clone()),
            )
    }
}
