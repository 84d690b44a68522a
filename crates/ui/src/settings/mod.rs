pub mod state;

pub use state::{SettingsError, SettingsStore, ThemePreference, WidgetSettings};
