//! Level configuration for cube map generation.
//!
//! A `LevelConfig` is validated when it is built or loaded, so every value
//! that reaches the generator has a positive relief, max height and map size.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::color::ColorRamp;

/// Parameters for one generation pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Number of cells along x
    #[serde(deserialize_with = "deserialize_dimension")]
    pub width: usize,
    /// Number of cells along z
    #[serde(deserialize_with = "deserialize_dimension")]
    pub depth: usize,
    /// Uniform scale applied to every cube when the map is presented
    pub map_size: f32,
    /// Offset into noise space along x
    pub seed_x: f32,
    /// Offset into noise space along z
    pub seed_z: f32,
    /// Noise frequency divisor (larger = smoother, lower-frequency terrain)
    pub relief: f32,
    /// Upper bound of generated heights
    pub max_height: f32,
    /// Sample coherent noise (true) or draw uniform random heights (false)
    pub perlin_noise: bool,
    /// Keep continuous heights (true) or round to whole units (false)
    pub smoothness: bool,
    /// Attach a collision volume to each presented cube
    pub need_collider: bool,
    /// Permutation seed for the noise function
    pub noise_seed: u32,
    /// Colors for the lowest and highest cells
    pub colors: ColorRamp,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: 50,
            depth: 50,
            map_size: 1.0,
            seed_x: 0.0,
            seed_z: 0.0,
            relief: 15.0,
            max_height: 10.0,
            perlin_noise: true,
            smoothness: false,
            need_collider: true,
            noise_seed: 0,
            colors: ColorRamp::default(),
        }
    }
}

impl LevelConfig {
    /// Create a validated configuration with default offsets, scale and toggles.
    pub fn new(width: usize, depth: usize, max_height: f32, relief: f32) -> Result<Self, ConfigError> {
        Self::builder()
            .width(width)
            .depth(depth)
            .max_height(max_height)
            .relief(relief)
            .build()
    }

    /// Create a builder starting from the default configuration.
    pub fn builder() -> LevelConfigBuilder {
        LevelConfigBuilder::new()
    }

    /// Check the values the height and color functions divide by.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.relief.is_finite() || self.relief <= 0.0 {
            return Err(ConfigError::InvalidRelief(self.relief));
        }
        if !self.max_height.is_finite() || self.max_height <= 0.0 {
            return Err(ConfigError::InvalidMaxHeight(self.max_height));
        }
        if !self.map_size.is_finite() || self.map_size <= 0.0 {
            return Err(ConfigError::InvalidMapSize(self.map_size));
        }
        if !self.seed_x.is_finite() || !self.seed_z.is_finite() {
            return Err(ConfigError::InvalidSeed {
                seed_x: self.seed_x,
                seed_z: self.seed_z,
            });
        }
        Ok(())
    }

    /// Total number of cells a generation pass produces.
    pub fn cell_count(&self) -> usize {
        self.width * self.depth
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: LevelConfig = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Negative dimensions describe an empty grid rather than an error.
fn deserialize_dimension<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    Ok(value.max(0) as usize)
}

/// Builder for overriding individual fields before validation
pub struct LevelConfigBuilder {
    config: LevelConfig,
}

impl LevelConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: LevelConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: LevelConfig) -> Self {
        Self { config }
    }

    /// Configuration as set so far, before validation
    pub fn current(&self) -> &LevelConfig {
        &self.config
    }

    pub fn width(mut self, width: usize) -> Self {
        self.config.width = width;
        self
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.config.depth = depth;
        self
    }

    pub fn map_size(mut self, map_size: f32) -> Self {
        self.config.map_size = map_size;
        self
    }

    /// Set both noise-space offsets
    pub fn seed_offset(mut self, seed_x: f32, seed_z: f32) -> Self {
        self.config.seed_x = seed_x;
        self.config.seed_z = seed_z;
        self
    }

    pub fn relief(mut self, relief: f32) -> Self {
        self.config.relief = relief;
        self
    }

    pub fn max_height(mut self, max_height: f32) -> Self {
        self.config.max_height = max_height;
        self
    }

    pub fn perlin_noise(mut self, enabled: bool) -> Self {
        self.config.perlin_noise = enabled;
        self
    }

    pub fn smoothness(mut self, enabled: bool) -> Self {
        self.config.smoothness = enabled;
        self
    }

    pub fn need_collider(mut self, enabled: bool) -> Self {
        self.config.need_collider = enabled;
        self
    }

    pub fn noise_seed(mut self, seed: u32) -> Self {
        self.config.noise_seed = seed;
        self
    }

    pub fn colors(mut self, colors: ColorRamp) -> Self {
        self.config.colors = colors;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<LevelConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for LevelConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised while building or loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Relief must be a positive, finite divisor
    InvalidRelief(f32),
    /// Max height must be positive and finite
    InvalidMaxHeight(f32),
    /// Map size must be positive and finite
    InvalidMapSize(f32),
    /// Noise offsets must be finite
    InvalidSeed { seed_x: f32, seed_z: f32 },
    /// Config file could not be read or written
    Io(io::Error),
    /// Config file is not valid JSON for a `LevelConfig`
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidRelief(v) => {
                write!(f, "invalid configuration: relief must be greater than 0 (got {})", v)
            }
            ConfigError::InvalidMaxHeight(v) => {
                write!(f, "invalid configuration: max height must be greater than 0 (got {})", v)
            }
            ConfigError::InvalidMapSize(v) => {
                write!(f, "invalid configuration: map size must be greater than 0 (got {})", v)
            }
            ConfigError::InvalidSeed { seed_x, seed_z } => {
                write!(f, "invalid configuration: seed offsets must be finite (got {}, {})", seed_x, seed_z)
            }
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}
