use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::hotkeys::Bindings;
use crate::models::Action;
use crate::notify::NotifierKind;
use crate::player::Backend;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub volume: VolumeConfig,
    #[serde(default = "default_hotkeys")]
    /// Action name -> binding, e.g. `next-album = "ctrl+alt+cmd+shift+right"`.
    pub hotkeys: BTreeMap<String, String>,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            alerts: AlertConfig::default(),
            navigation: NavigationConfig::default(),
            display: DisplayConfig::default(),
            volume: VolumeConfig::default(),
            hotkeys: default_hotkeys(),
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub app: String,
    pub backend: Backend,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            app: "Music".to_string(),
            backend: Backend::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Seconds an alert stays on screen.
    pub duration: f64,
    pub notifier: NotifierKind,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            duration: 2.0,
            notifier: NotifierKind::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub max_album_skip_attempts: u32,
    /// Seconds between a skip and the poll that follows it.
    pub album_skip_delay: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_album_skip_attempts: 50,
            album_skip_delay: 0.25,
        }
    }
}

impl NavigationConfig {
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.album_skip_delay).unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: "{name} - {artist} [{album}]".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    pub step: u8,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self { step: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: home.join(".albumhop"),
        }
    }
}

fn default_hotkeys() -> BTreeMap<String, String> {
    [
        (Action::TogglePlayPause, "ctrl+alt+cmd+space"),
        (Action::NextTrack, "ctrl+alt+cmd+right"),
        (Action::PreviousTrack, "ctrl+alt+cmd+left"),
        (Action::ShowTrack, "ctrl+alt+cmd+i"),
        (Action::NextAlbum, "ctrl+alt+cmd+shift+right"),
        (Action::PreviousAlbum, "ctrl+alt+cmd+shift+left"),
        (Action::VolumeUp, "ctrl+alt+cmd+up"),
        (Action::VolumeDown, "ctrl+alt+cmd+down"),
    ]
    .into_iter()
    .map(|(action, binding)| (action.name().to_string(), binding.to_string()))
    .collect()
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("albumhop")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load from `path`, or the default location when `None`. A missing
    /// default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::read(path)?,
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::read(&default_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config file")
    }

    pub fn validate(&self) -> Result<()> {
        if self.navigation.max_album_skip_attempts < 1 {
            bail!("navigation.max_album_skip_attempts must be at least 1");
        }
        if !self.navigation.album_skip_delay.is_finite() || self.navigation.album_skip_delay < 0.0
        {
            bail!("navigation.album_skip_delay must be a non-negative number of seconds");
        }
        if !self.alerts.duration.is_finite() || self.alerts.duration < 0.0 {
            bail!("alerts.duration must be a non-negative number of seconds");
        }
        if self.display.format.trim().is_empty() {
            bail!("display.format must not be empty");
        }
        if self.player.app.trim().is_empty() {
            bail!("player.app must not be empty");
        }
        self.bindings()?;
        Ok(())
    }

    pub fn bindings(&self) -> Result<Bindings> {
        Bindings::from_config(&self.hotkeys).with_context(|| "Invalid [hotkeys] section")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).with_context(|| "Failed to serialize config")
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.storage.path).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                self.storage.path.display()
            )
        })
    }

    pub fn socket_path(&self) -> PathBuf {
        self.storage.path.join("albumhop.sock")
    }

    pub fn pid_path(&self) -> PathBuf {
        self.storage.path.join("albumhop.pid")
    }

    pub fn alert_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.alerts.duration).unwrap_or(Duration::ZERO)
    }
}
