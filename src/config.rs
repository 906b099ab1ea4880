use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DojoConfig {
    pub countdown: CountdownConfig,
    pub capture: CaptureConfig,
    pub playback: PlaybackConfig,
    pub storage: StorageConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CountdownConfig {
    /// Seconds counted down before recording starts
    #[serde(default = "default_countdown_seconds")]
    pub seconds: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CaptureConfig {
    /// Largest edge of the reference video preview shown over the camera
    #[serde(default = "default_preview_max_dimension")]
    pub preview_max_dimension: u32,

    /// Record without audio
    #[serde(default = "default_mute")]
    pub mute: bool,

    /// Start with the front-facing camera
    #[serde(default = "default_front_camera")]
    pub front_camera: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlaybackConfig {
    /// Ordered playback speed ladder, slowest first
    #[serde(default = "default_rates")]
    pub rates: Vec<f64>,

    /// Speed each review screen starts at; must be on the ladder
    #[serde(default = "default_rate")]
    pub default_rate: f64,

    /// Track height as a fraction of the screen width
    #[serde(default = "default_video_height_ratio")]
    pub video_height_ratio: f64,

    /// Logical screen width used for layout
    #[serde(default = "default_screen_width")]
    pub screen_width: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Object-storage base URI that content video paths are relative to
    #[serde(default = "default_base_uri")]
    pub base_uri: String,

    /// Directory holding locally cached content videos
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    /// JSON content catalog
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl DojoConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("dojo.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("countdown.seconds", default_countdown_seconds())?
            .set_default(
                "capture.preview_max_dimension",
                default_preview_max_dimension(),
            )?
            .set_default("capture.mute", default_mute())?
            .set_default("capture.front_camera", default_front_camera())?
            .set_default("playback.rates", default_rates())?
            .set_default("playback.default_rate", default_rate())?
            .set_default("playback.video_height_ratio", default_video_height_ratio())?
            .set_default("playback.screen_width", default_screen_width())?
            .set_default("storage.base_uri", default_base_uri())?
            .set_default("storage.cache_dir", default_cache_dir())?
            .set_default("storage.catalog_path", default_catalog_path())?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .add_source(File::with_name(&path_str).required(false))
            // Nested keys use a double underscore, e.g. DOJO_COUNTDOWN__SECONDS
            .add_source(Environment::with_prefix("DOJO").separator("__"))
            .build()?;

        let config: DojoConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Render as a TOML document that [`DojoConfig::load_from_file`] accepts
    pub fn to_toml(&self) -> crate::error::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.countdown.seconds == 0 {
            return Err(ConfigError::Message(
                "Countdown seconds must be greater than 0".to_string(),
            ));
        }

        if self.capture.preview_max_dimension == 0 {
            return Err(ConfigError::Message(
                "Preview max dimension must be greater than 0".to_string(),
            ));
        }

        let rates = &self.playback.rates;
        if rates.is_empty() {
            return Err(ConfigError::Message(
                "Playback rate ladder must not be empty".to_string(),
            ));
        }
        if rates.iter().any(|rate| !rate.is_finite() || *rate <= 0.0) {
            return Err(ConfigError::Message(
                "Playback rates must be positive".to_string(),
            ));
        }
        if rates.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::Message(
                "Playback rates must be strictly ascending".to_string(),
            ));
        }
        if !rates.contains(&self.playback.default_rate) {
            return Err(ConfigError::Message(format!(
                "Default rate {} is not on the rate ladder",
                self.playback.default_rate
            )));
        }

        if self.playback.video_height_ratio <= 0.0 || self.playback.screen_width <= 0.0 {
            return Err(ConfigError::Message(
                "Playback layout dimensions must be greater than 0".to_string(),
            ));
        }

        if self.storage.base_uri.is_empty() {
            return Err(ConfigError::Message(
                "Storage base URI must be set".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for DojoConfig {
    fn default() -> Self {
        Self {
            countdown: CountdownConfig {
                seconds: default_countdown_seconds(),
            },
            capture: CaptureConfig {
                preview_max_dimension: default_preview_max_dimension(),
                mute: default_mute(),
                front_camera: default_front_camera(),
            },
            playback: PlaybackConfig {
                rates: default_rates(),
                default_rate: default_rate(),
                video_height_ratio: default_video_height_ratio(),
                screen_width: default_screen_width(),
            },
            storage: StorageConfig {
                base_uri: default_base_uri(),
                cache_dir: default_cache_dir(),
                catalog_path: default_catalog_path(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
            },
        }
    }
}

// Default value functions
fn default_countdown_seconds() -> u32 {
    5
}

fn default_preview_max_dimension() -> u32 {
    300
}
fn default_mute() -> bool {
    true
}
fn default_front_camera() -> bool {
    true
}

fn default_rates() -> Vec<f64> {
    vec![0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0]
}
fn default_rate() -> f64 {
    1.0
}
fn default_video_height_ratio() -> f64 {
    0.5265
}
fn default_screen_width() -> f64 {
    390.0
}

fn default_base_uri() -> String {
    "https://ttkd-test-s3.s3.amazonaws.com/ttkd".to_string()
}
fn default_cache_dir() -> String {
    "./video_cache".to_string()
}
fn default_catalog_path() -> String {
    "./catalog.json".to_string()
}

fn default_event_bus_capacity() -> usize {
    100
}
