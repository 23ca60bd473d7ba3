//! Configuration file support for Mapty.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/mapty/config.toml`.

use crate::app::Settings;
use crate::ports::TileLayer;
use crate::render::PanOptions;
use crate::{Coords, Error, IdScheme, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub form: FormConfig,

    #[serde(default)]
    pub ids: IdConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationConfig>,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Map view configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_zoom_level")]
    pub zoom_level: u8,

    #[serde(default = "default_pan_duration_secs")]
    pub pan_duration_secs: f64,

    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    #[serde(default = "default_attribution")]
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom_level: default_zoom_level(),
            pan_duration_secs: default_pan_duration_secs(),
            tile_url: default_tile_url(),
            attribution: default_attribution(),
        }
    }
}

/// Key-value storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: default_storage_key(),
        }
    }
}

/// Input form configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default = "default_reset_delay_ms")]
    pub reset_delay_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            reset_delay_ms: default_reset_delay_ms(),
        }
    }
}

/// Workout id generation
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct IdConfig {
    #[serde(default)]
    pub scheme: IdScheme,
}

/// Fixed position used when the host has no position service
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationConfig {
    pub fn coords(&self) -> Coords {
        Coords::new(self.latitude, self.longitude)
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("mapty")
}

fn default_zoom_level() -> u8 {
    13
}

fn default_pan_duration_secs() -> f64 {
    1.0
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png".into()
}

fn default_attribution() -> String {
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
        .into()
}

fn default_storage_key() -> String {
    "workouts".into()
}

fn default_reset_delay_ms() -> u64 {
    1000
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("mapty").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the controller cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.storage.key.trim().is_empty() {
            return Err(Error::Config("storage.key must not be empty".into()));
        }
        if !self.map.pan_duration_secs.is_finite() || self.map.pan_duration_secs < 0.0 {
            return Err(Error::Config(format!(
                "map.pan_duration_secs must be a non-negative number, got {}",
                self.map.pan_duration_secs
            )));
        }
        if let Some(location) = &self.location {
            if !location.coords().in_range() {
                return Err(Error::Config(format!(
                    "location {},{} is out of range",
                    location.latitude, location.longitude
                )));
            }
        }
        Ok(())
    }

    /// Controller settings derived from this configuration
    pub fn settings(&self) -> Settings {
        settings_from(&self.map, &self.storage, &self.form, &self.ids)
    }

    /// Fixed position from the `[location]` section, if any
    pub fn home(&self) -> Option<Coords> {
        self.location.map(|l| l.coords())
    }
}

fn settings_from(
    map: &MapConfig,
    storage: &StorageConfig,
    form: &FormConfig,
    ids: &IdConfig,
) -> Settings {
    Settings {
        zoom_level: map.zoom_level,
        pan: PanOptions {
            animate: true,
            duration: map.pan_duration_secs,
        },
        tiles: TileLayer {
            url: map.tile_url.clone(),
            attribution: map.attribution.clone(),
        },
        storage_key: storage.key.clone(),
        form_reset_delay: Duration::from_millis(form.reset_delay_ms),
        id_scheme: ids.scheme,
    }
}

impl Default for Settings {
    fn default() -> Self {
        settings_from(
            &MapConfig::default(),
            &StorageConfig::default(),
            &FormConfig::default(),
            &IdConfig::default(),
        )
    }
}
