use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};

use folio_faq::Typewriter;

use crate::faq::{FaqWidget, VisibilityChanged};
use crate::settings::{SettingsStore, ThemePreference};

/// Returns the default themes directory path.
pub fn default_themes_path() -> PathBuf {
    PathBuf::from("./themes")
}

pub const SITE_NAME: &str = "Folio";
pub const HEADLINE_PREFIX: &str = "I'm a ";
const FLOATING_INSET: Pixels = px(24.);
#[cfg(target_os = "macos")]
const WINDOW_TOOLBAR_LEFT_SAFE_PADDING: f32 = 78.0;
#[cfg(not(target_os = "macos"))]
const WINDOW_TOOLBAR_LEFT_SAFE_PADDING: f32 = 16.0;
#[cfg(target_os = "windows")]
const WINDOW_TOOLBAR_RIGHT_SAFE_PADDING: f32 = 120.0;
#[cfg(not(target_os = "windows"))]
const WINDOW_TOOLBAR_RIGHT_SAFE_PADDING: f32 = 16.0;

/// Computes the top toolbar height using a Zed-style responsive formula.
fn window_toolbar_height(window: &Window) -> Pixels {
    (1.75 * window.rem_size()).max(px(34.0))
}

/// Label of the floating button that opens and closes the chat widget.
pub fn toggle_button_label(open: bool) -> &'static str {
    if open { "Close chat" } else { "Ask me" }
}

/// Label of the title bar button that switches to the other theme.
pub fn theme_toggle_label(current: ThemePreference) -> &'static str {
    match current {
        ThemePreference::Light => "Dark mode",
        ThemePreference::Dark => "Light mode",
    }
}

/// Headline text with a trailing caret.
pub fn headline_with_caret(text: &str) -> String {
    format!("{HEADLINE_PREFIX}{text}|")
}

gpui::actions!(folio, [ToggleFaq, CloseFaq, ToggleTheme, Quit,]);

/// Portfolio landing window: typed headline plus the floating FAQ widget.
pub struct PortfolioShell {
    settings: Arc<SettingsStore>,
    faq_widget: Entity<FaqWidget>,
    typewriter: Typewriter,
    headline: SharedString,
    title_bar_should_move: bool,
}

impl PortfolioShell {
    pub fn new(store: Arc<SettingsStore>, _window: &mut Window, cx: &mut Context<Self>) -> Self {
        let settings = store.settings();
        let table = Arc::new(settings.topic_table());
        let typing_delay = settings.typing_delay();
        let faq_widget = cx.new(|cx| FaqWidget::new(table, typing_delay, cx));

        cx.subscribe(&faq_widget, |_, _, event: &VisibilityChanged, cx| {
            tracing::debug!(open = event.open, "faq widget visibility changed");
            cx.notify();
        })
        .detach();

        let shell = Self {
            settings: store,
            faq_widget,
            typewriter: Typewriter::new(settings.headline_phrases.iter().cloned()),
            headline: SharedString::default(),
            title_bar_should_move: false,
        };
        shell.start_headline(cx);
        shell
    }

    /// Routes the shell actions to the shell entity.
    ///
    /// Bound at app level so the shortcuts work without any element holding focus.
    pub fn register_actions(shell: &Entity<Self>, cx: &mut App) {
        let weak = shell.downgrade();
        cx.on_action(move |_: &ToggleFaq, cx| {
            let _ = weak.update(cx, |shell, cx| shell.toggle_faq(cx));
        });

        let weak = shell.downgrade();
        cx.on_action(move |_: &CloseFaq, cx| {
            let _ = weak.update(cx, |shell, cx| shell.close_faq(cx));
        });

        let weak = shell.downgrade();
        cx.on_action(move |_: &ToggleTheme, cx| {
            let _ = weak.update(cx, |shell, cx| shell.toggle_theme(None, cx));
        });
    }

    pub fn toggle_faq(&mut self, cx: &mut Context<Self>) {
        self.faq_widget.update(cx, |widget, cx| widget.toggle(cx));
    }

    pub fn close_faq(&mut self, cx: &mut Context<Self>) {
        self.faq_widget.update(cx, |widget, cx| widget.close(cx));
    }

    pub fn toggle_theme(&mut self, window: Option<&mut Window>, cx: &mut Context<Self>) {
        match self.settings.toggle_theme() {
            Ok(settings) => {
                settings.apply_theme(window, cx);
                tracing::info!(theme = ?settings.theme_mode, "theme switched");
            }
            Err(error) => {
                tracing::warn!("failed to save theme preference: {}", error);
            }
        }
        cx.notify();
    }

    fn start_headline(&self, cx: &mut Context<Self>) {
        cx.spawn(async move |this, cx| {
            loop {
                let Ok(delay) = this.update(cx, |this, cx| this.advance_headline(cx)) else {
                    break;
                };
                cx.background_executor().timer(delay).await;
            }
        })
        .detach();
    }

    fn advance_headline(&mut self, cx: &mut Context<Self>) -> Duration {
        let frame = self.typewriter.tick();
        self.headline = frame.text.into();
        cx.notify();
        frame.next_delay
    }
}

impl Render for PortfolioShell {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let toolbar_height = window_toolbar_height(window);

        div()
            .size_full()
            .relative()
            .bg(theme.background)
            .child(
                v_flex()
                    .id("portfolio-hero")
                    .size_full()
                    .pt(toolbar_height)
                    .items_center()
                    .justify_center()
                    .gap_2()
                    .child(
                        div()
                            .text_3xl()
                            .text_color(theme.foreground)
                            .child(SITE_NAME),
                    )
                    .child(
                        div()
                            .id("portfolio-headline")
                            .text_xl()
                            .text_color(theme.muted_foreground)
                            .child(headline_with_caret(&self.headline)),
                    ),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .right_0()
                    .child(self.render_top_bar(window, toolbar_height, cx)),
            )
            .child(self.render_floating_faq(cx))
    }
}

impl PortfolioShell {
    fn render_floating_faq(&self, cx: &Context<Self>) -> impl IntoElement {
        let open = self.faq_widget.read(cx).is_open();

        v_flex()
            .id("faq-floating-area")
            .absolute()
            .bottom(FLOATING_INSET)
            .right(FLOATING_INSET)
            .items_end()
            .gap_3()
            .when(open, |column| column.child(self.faq_widget.clone()))
            .child(
                Button::new("faq-toggle")
                    .primary()
                    .icon(if open {
                        IconName::Close
                    } else {
                        IconName::CircleUser
                    })
                    .label(toggle_button_label(open))
                    .on_click(cx.listener(|this, _, _window, cx| {
                        this.toggle_faq(cx);
                    })),
            )
    }

    fn render_top_bar(
        &self,
        window: &Window,
        toolbar_height: Pixels,
        cx: &Context<Self>,
    ) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .id("app-top-bar")
            .window_control_area(WindowControlArea::Drag)
            .on_mouse_down_out(cx.listener(|this, _, _window, _cx| {
                this.title_bar_should_move = false;
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, _, _window, _cx| {
                    this.title_bar_should_move = false;
                }),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _, _window, _cx| {
                    this.title_bar_should_move = true;
                }),
            )
            .on_mouse_move(cx.listener(|this, _, window, _cx| {
                if this.title_bar_should_move {
                    this.title_bar_should_move = false;
                    window.start_window_move();
                }
            }))
            .w_full()
            .h(toolbar_height)
            .flex_shrink_0()
            .pl(px(WINDOW_TOOLBAR_LEFT_SAFE_PADDING))
            .pr(px(WINDOW_TOOLBAR_RIGHT_SAFE_PADDING))
            .items_center()
            .justify_between()
            .bg(theme.background)
            .border_b_1()
            .border_color(theme.border)
            .child(Label::new(SITE_NAME).text_sm())
            .when(
                cfg!(target_os = "linux") && window.window_controls().window_menu,
                |title_bar| {
                    title_bar.on_mouse_down(MouseButton::Right, |event, window, _| {
                        window.show_window_menu(event.position);
                    })
                },
            )
            .child(
                h_flex()
                    .items_center()
                    .gap_2()
                    .on_mouse_down(MouseButton::Left, |_, _, cx| cx.stop_propagation())
                    .child(
                        Button::new("theme-toggle")
                            .ghost()
                            .small()
                            .label(theme_toggle_label(self.settings.settings().theme_mode))
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.toggle_theme(Some(window), cx);
                            })),
                    )
                    .child(self.render_linux_window_controls(window, cx)),
            )
    }

    fn render_linux_window_controls(&self, window: &Window, cx: &Context<Self>) -> AnyElement {
        #[cfg(target_os = "linux")]
        {
            let maximize_icon = if window.is_maximized() {
                IconName::WindowRestore
            } else {
                IconName::WindowMaximize
            };

            h_flex()
                .id("linux-window-controls")
                .items_center()
                // Clicks on the controls must not reach the title bar drag handlers.
                .on_mouse_down(MouseButton::Left, |_, _, cx| cx.stop_propagation())
                .on_mouse_down(MouseButton::Right, |_, _, cx| cx.stop_propagation())
                .gap_2()
                .ml_2()
                .child(
                    Button::new("linux-window-minimize")
                        .ghost()
                        .small()
                        .icon(IconName::WindowMinimize)
                        .on_click(cx.listener(|_, _, window, _| {
                            window.minimize_window();
                        })),
                )
                .child(
                    Button::new("linux-window-maximize")
                        .ghost()
                        .small()
                        .icon(maximize_icon)
                        .on_click(cx.listener(|_, _, window, _| {
                            window.zoom_window();
                        })),
                )
                .child(
                    Button::new("linux-window-close")
                        .ghost()
                        .small()
                        .icon(IconName::WindowClose)
                        .on_click(cx.listener(|_, _, window, _| {
                            window.remove_window();
                        })),
                )
                .into_any_element()
        }

        #[cfg(not(target_os = "linux"))]
        {
            let _ = (window, cx);
            div().into_any_element()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_label_tracks_visibility() {
        assert_eq!(toggle_button_label(false), "Ask me");
        assert_eq!(toggle_button_label(true), "Close chat");
    }

    #[test]
    fn theme_label_offers_the_other_mode() {
        assert_eq!(theme_toggle_label(ThemePreference::Light), "Dark mode");
        assert_eq!(theme_toggle_label(ThemePreference::Dark), "Light mode");
    }

    #[test]
    fn headline_keeps_caret_when_empty() {
        assert_eq!(headline_with_caret(""), "I'm a |");
        assert_eq!(headline_with_caret("Web"), "I'm a Web|");
    }

    #[test]
    fn themes_path_is_relative() {
        assert_eq!(default_themes_path(), PathBuf::from("./themes"));
    }
}
