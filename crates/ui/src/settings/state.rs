use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use folio_faq::typewriter::DEFAULT_PHRASES;
use folio_faq::{TYPING_DELAY, TopicTable};
use gpui::*;
use gpui_component::{Theme, ThemeMode};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

pub const SETTINGS_DIRECTORY_NAME: &str = "folio";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// Upper bound for the simulated typing delay.
pub const MAX_TYPING_DELAY_MS: u64 = 10_000;

/// Persisted light/dark choice, stored as `"light"` or `"dark"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn mode(self) -> ThemeMode {
        match self {
            Self::Light => ThemeMode::Light,
            Self::Dark => ThemeMode::Dark,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,
    #[serde(default)]
    pub topic_table_path: Option<PathBuf>,
    #[serde(default = "default_headline_phrases")]
    pub headline_phrases: Vec<String>,
    #[serde(default)]
    pub theme_mode: ThemePreference,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            typing_delay_ms: default_typing_delay_ms(),
            topic_table_path: None,
            headline_phrases: default_headline_phrases(),
            theme_mode: ThemePreference::default(),
        }
    }
}

impl WidgetSettings {
    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    /// Loads the configured FAQ, or the built-in one when none is configured or it is unusable.
    pub fn topic_table(&self) -> TopicTable {
        folio_faq::load_or_builtin(self.topic_table_path.as_deref())
    }

    pub fn normalized(mut self) -> Self {
        self.typing_delay_ms = self.typing_delay_ms.min(MAX_TYPING_DELAY_MS);
        self.topic_table_path = self
            .topic_table_path
            .filter(|path| !path.as_os_str().is_empty());

        self.headline_phrases = self
            .headline_phrases
            .into_iter()
            .map(|phrase| phrase.trim().to_string())
            .filter(|phrase| !phrase.is_empty())
            .collect();
        if self.headline_phrases.is_empty() {
            self.headline_phrases = default_headline_phrases();
        }

        self
    }

    pub fn apply_theme(&self, window: Option<&mut Window>, cx: &mut App) {
        Theme::change(self.theme_mode.mode(), window, cx);
    }
}

/// Live settings plus the file they persist to.
///
/// Readers take a snapshot with [`SettingsStore::settings`]; writes go to disk first and
/// only then replace the snapshot.
pub struct SettingsStore {
    current: ArcSwap<WidgetSettings>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".folio"))
            .join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = read_settings_file(&config_path);
        Self {
            current: ArcSwap::from_pointee(settings),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<WidgetSettings> {
        self.current.load_full()
    }

    pub fn update(&self, settings: WidgetSettings) -> Result<Arc<WidgetSettings>, SettingsError> {
        let settings = Arc::new(settings.normalized());
        write_settings_file(&self.config_path, &settings)?;
        self.current.store(settings.clone());
        Ok(settings)
    }

    /// Flips light/dark and persists the result.
    pub fn toggle_theme(&self) -> Result<Arc<WidgetSettings>, SettingsError> {
        let mut next = WidgetSettings::clone(&self.settings());
        next.theme_mode = next.theme_mode.toggled();
        self.update(next)
    }

    /// Writes the current settings when no file exists yet, so there is something to edit.
    pub fn ensure_persisted(&self) -> Result<(), SettingsError> {
        if self.config_path.exists() {
            return Ok(());
        }
        write_settings_file(&self.config_path, &self.settings())
    }
}

fn read_settings_file(path: &Path) -> WidgetSettings {
    if !path.exists() {
        tracing::info!(?path, "no settings file, using defaults");
        return WidgetSettings::default();
    }

    Figment::from(Serialized::defaults(WidgetSettings::default()))
        .merge(Json::file(path))
        .extract::<WidgetSettings>()
        .map(WidgetSettings::normalized)
        .unwrap_or_else(|error| {
            tracing::warn!(?path, %error, "unreadable settings file, using defaults");
            WidgetSettings::default()
        })
}

/// Replaces `path` atomically: the JSON goes to a sibling temp file which is then renamed.
fn write_settings_file(path: &Path, settings: &WidgetSettings) -> Result<(), SettingsError> {
    if let Some(directory) = path.parent() {
        std::fs::create_dir_all(directory).context(PrepareDirectorySnafu {
            stage: "settings-prepare-directory",
            directory: directory.to_path_buf(),
        })?;
    }

    let encoded = serde_json::to_vec_pretty(settings).context(EncodeSnafu {
        stage: "settings-encode",
    })?;

    let staged = path.with_extension("json.tmp");
    std::fs::write(&staged, encoded).context(StageSnafu {
        stage: "settings-stage",
        staged: staged.clone(),
    })?;
    std::fs::rename(&staged, path).context(CommitSnafu {
        stage: "settings-commit",
        target: path.to_path_buf(),
    })?;

    tracing::info!(?path, "settings saved");
    Ok(())
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("cannot create settings directory {directory:?} on `{stage}`: {source}"))]
    PrepareDirectory {
        stage: &'static str,
        directory: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("cannot encode settings on `{stage}`: {source}"))]
    Encode {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("cannot write staged settings {staged:?} on `{stage}`: {source}"))]
    Stage {
        stage: &'static str,
        staged: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("cannot move staged settings onto {target:?} on `{stage}`: {source}"))]
    Commit {
        stage: &'static str,
        target: PathBuf,
        source: std::io::Error,
    },
}

fn default_typing_delay_ms() -> u64 {
    TYPING_DELAY.as_millis() as u64
}

fn default_headline_phrases() -> Vec<String> {
    DEFAULT_PHRASES.iter().map(|phrase| phrase.to_string()).collect()
}
