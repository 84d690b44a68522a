use std::sync::Arc;

use gpui::*;
use gpui_component::{Root, ThemeRegistry};

use folio::app::{CloseFaq, PortfolioShell, Quit, ToggleFaq, ToggleTheme, default_themes_path};
use folio::settings::SettingsStore;

/// Boots the portfolio window.
///
/// A missing settings file is written with defaults so it can be edited. Theme watching is
/// non-fatal when `./themes` is absent.
fn main() {
    tracing_subscriber::fmt::init();

    let settings_store = Arc::new(SettingsStore::load());
    tracing::info!(path = ?settings_store.config_path(), "settings loaded");
    if let Err(error) = settings_store.ensure_persisted() {
        tracing::warn!("failed to write default settings: {}", error);
    }

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(move |cx| {
        gpui_component::init(cx);

        let theme_store = settings_store.clone();
        if let Err(err) = ThemeRegistry::watch_dir(default_themes_path(), cx, move |cx| {
            theme_store.settings().apply_theme(None, cx);
            tracing::info!("theme directory watch initialized");
        }) {
            tracing::warn!(
                "failed to watch themes directory: {}. using default themes",
                err
            );
            settings_store.settings().apply_theme(None, cx);
        }

        cx.on_action(|_: &Quit, cx| {
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("cmd-k", ToggleFaq, None),
            KeyBinding::new("escape", CloseFaq, None),
            KeyBinding::new("cmd-shift-t", ToggleTheme, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(1100.), px(760.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        appears_transparent: true,
                        traffic_light_position: Some(point(px(9.), px(9.))),
                        ..Default::default()
                    }),
                    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
                    window_decorations: Some(WindowDecorations::Client),
                    #[cfg(not(any(target_os = "linux", target_os = "freebsd")))]
                    window_decorations: None,
                    ..Default::default()
                };

                let opened = cx.open_window(options, |window, cx| {
                    let store = settings_store.clone();
                    let shell = cx.new(|cx| PortfolioShell::new(store, window, cx));
                    PortfolioShell::register_actions(&shell, cx);

                    // Root is required by gpui-component for its overlay layers.
                    cx.new(|cx| Root::new(shell, window, cx))
                });

                match opened {
                    Ok(_) => cx.activate(true),
                    Err(error) => {
                        tracing::error!("failed to open main window: {}", error);
                        cx.quit();
                    }
                }
            })
        })
        .detach();
    });
}
