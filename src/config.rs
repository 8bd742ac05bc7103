//! config.rs
//!
//! Fixed scene constants plus the user-facing TOML configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::systems::bodies::BodyDescriptor;

// Camera
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_DISTANCE: f32 = 80.0;

// Central body
pub const CENTRAL_RADIUS: f32 = 15.0;
pub const CENTRAL_COLOR: u32 = 0xffcc00;
pub const CENTRAL_EMISSIVE: u32 = 0xffaa00;
pub const CENTRAL_EMISSIVE_INTENSITY: f32 = 1.2;

// Orbiting bodies
pub const BODY_EMISSIVE_INTENSITY: f32 = 0.3;
pub const SPHERE_SEGMENTS: u32 = 32;
pub const BODY_PALETTE: [u32; 9] = [
    0xff5733, 0x33ff57, 0x3357ff, 0xff33a8, 0xffff33, 0xa833ff, 0x33fff5, 0xff9633, 0xaaaaff,
];

// Starfield
pub const STAR_COUNT: usize = 1000;
pub const STAR_EXTENT: f32 = 500.0;

// Motion (radians per frame, and ms -> angular units)
pub const BODY_SPIN_PER_FRAME: f32 = 0.02;
pub const STARFIELD_SPIN_PER_FRAME: f32 = 0.0005;
pub const TIME_SCALE: f64 = 1e-4;

// Ambient fill tint
pub const AMBIENT_COLOR: u32 = 0x404040;

pub const DEFAULT_CONFIG_PATH: &str = "orrery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level configuration file layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrreryConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub starfield: StarfieldConfig,
    #[serde(default)]
    pub store: StoreConfig,
    /// Initial descriptor list
    #[serde(default = "default_bodies", rename = "body")]
    pub bodies: Vec<BodyDescriptor>,
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            lighting: LightingConfig::default(),
            starfield: StarfieldConfig::default(),
            store: StoreConfig::default(),
            bodies: default_bodies(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_title() -> String {
    "Orrery".to_string()
}

fn default_width() -> f32 {
    1280.0
}

fn default_height() -> f32 {
    720.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LightingConfig {
    /// Point light at the origin, in lumens
    #[serde(default = "default_point_intensity")]
    pub point_intensity: f32,
    #[serde(default = "default_point_range")]
    pub point_range: f32,
    /// Ambient fill, in cd/m^2
    #[serde(default = "default_ambient_brightness")]
    pub ambient_brightness: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            point_intensity: default_point_intensity(),
            point_range: default_point_range(),
            ambient_brightness: default_ambient_brightness(),
        }
    }
}

fn default_point_intensity() -> f32 {
    50_000_000.0
}

fn default_point_range() -> f32 {
    500.0
}

fn default_ambient_brightness() -> f32 {
    300.0
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StarfieldConfig {
    /// Fixed seed for a reproducible starfield; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// JSON file used by the file backend
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Base URL of the document service used by the remote backend
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
            endpoint: default_endpoint(),
            collection: default_collection(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./orrery-saves.json")
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_collection() -> String {
    "solarSystems".to_string()
}

pub fn default_bodies() -> Vec<BodyDescriptor> {
    vec![
        BodyDescriptor::new("Mercury", 2.0, Some("#ff5733"), 1.0, 21.0),
        BodyDescriptor::new("Venus", 3.0, Some("#33ff57"), 0.8, 24.0),
        BodyDescriptor::new("Earth", 4.0, Some("#3357ff"), 0.6, 22.0),
        BodyDescriptor::new("Mars", 3.5, Some("#ff33a8"), 0.5, 24.0),
        BodyDescriptor::new("Jupiter", 1.0, Some("#ffff33"), 0.3, 25.0),
        BodyDescriptor::new("Saturn", 2.0, Some("#a833ff"), 0.2, 45.0),
        BodyDescriptor::new("Uranus", 2.0, Some("#33fff5"), 0.15, 55.0),
        BodyDescriptor::new("Neptune", 4.5, Some("#ff9633"), 0.1, 65.0),
    ]
}

/// Load configuration from file, falling back to defaults when it does not exist
pub fn load_config(path: &Path) -> Result<OrreryConfig, ConfigError> {
    if !path.exists() {
        info!(path = %path.display(), "Configuration file not found, using defaults");
        return Ok(OrreryConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: OrreryConfig = toml::from_str(&content)?;
    info!(path = %path.display(), bodies = config.bodies.len(), "Loaded configuration");
    Ok(config)
}
