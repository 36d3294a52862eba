use std::fs;
use std::path::Path;

use serde::{ Serialize, Deserialize };

use crate::consts::{ MAX_RECURSION_DEPTH, DEFAULT_TILE_SIZE, DEFAULT_FOCAL_SAMPLES };
use crate::error::{ RenderError, Result };

/// Quality and scheduling parameters for one render job.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```
/// # use tiled_ray_tracer::config::RenderConfig;
/// let config = RenderConfig::from_json_str(r#"{ "max_depth": 2 }"#).unwrap();
///
/// assert_eq!(config.max_depth, 2);
/// assert_eq!(config.tile_size, 32);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum recursion depth of reflected and refracted rays.
    pub max_depth: usize,

    /// When false, every area light is replaced by a point light at its
    /// center.
    pub area_lights: bool,

    /// When nonzero, overrides the sampling grid of every area light with an
    /// `n` by `n` grid.
    pub area_light_resolution: usize,

    /// Early-exit tolerance for area light sampling. Zero takes every sample.
    pub adaptive_sensitivity: f64,

    /// Disables depth of field regardless of the camera's aperture.
    pub force_zero_aperture: bool,

    /// Rays traced per pixel when depth of field is on. The camera caps this
    /// at its own `max_focal_samples`.
    pub focal_samples: usize,

    pub threads: usize,
    pub tile_size: usize,

    /// How many times a failed tile is dispatched again before the render
    /// gives up.
    pub tile_retries: usize,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        RenderConfig {
            max_depth: MAX_RECURSION_DEPTH,
            area_lights: true,
            area_light_resolution: 0,
            adaptive_sensitivity: 0.0,
            force_zero_aperture: false,
            focal_samples: DEFAULT_FOCAL_SAMPLES,
            threads,
            tile_size: DEFAULT_TILE_SIZE,
            tile_retries: 1,
        }
    }
}

impl RenderConfig {
    /// Parses and validates a configuration from JSON text.
    pub fn from_json_str(s: &str) -> Result<RenderConfig> {
        let config: RenderConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<RenderConfig> {
        let text = fs::read_to_string(path)?;
        RenderConfig::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(RenderError::InvalidConfig(
                "at least one worker thread is required".to_string()));
        }

        if self.tile_size == 0 {
            return Err(RenderError::InvalidConfig(
                "tile size must be nonzero".to_string()));
        }

        if self.focal_samples == 0 {
            return Err(RenderError::InvalidConfig(
                "at least one focal sample is required".to_string()));
        }

        if !(self.adaptive_sensitivity >= 0.0) {
            return Err(RenderError::InvalidConfig(format!(
                "adaptive sensitivity must be a non-negative number, got {}",
                self.adaptive_sensitivity)));
        }

        Ok(())
    }
}

#[test]
fn default_config_is_valid() {
    let config = RenderConfig::default();

    assert_eq!(config.max_depth, 5);
    assert!(config.area_lights);
    assert_eq!(config.area_light_resolution, 0);
    assert_eq!(config.adaptive_sensitivity, 0.0);
    assert!(!config.force_zero_aperture);
    assert_eq!(config.focal_samples, 8);
    assert!(config.threads >= 1);
    assert_eq!(config.tile_size, 32);
    assert_eq!(config.tile_retries, 1);
    assert!(config.validate().is_ok());
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let config = RenderConfig::from_json_str(r#"{
        "area_lights": false,
        "threads": 3,
        "adaptive_sensitivity": 0.05
    }"#).unwrap();

    assert!(!config.area_lights);
    assert_eq!(config.threads, 3);
    assert_eq!(config.adaptive_sensitivity, 0.05);
    assert_eq!(config.max_depth, RenderConfig::default().max_depth);
    assert_eq!(config.tile_size, RenderConfig::default().tile_size);
}

#[test]
fn zero_threads_rejected() {
    let res = RenderConfig::from_json_str(r#"{ "threads": 0 }"#);
    assert!(matches!(res, Err(RenderError::InvalidConfig(_))));
}

#[test]
fn zero_tile_size_rejected() {
    let config = RenderConfig { tile_size: 0, ..Default::default() };
    assert!(matches!(config.validate(), Err(RenderError::InvalidConfig(_))));
}

#[test]
fn negative_sensitivity_rejected() {
    let config = RenderConfig { adaptive_sensitivity: -0.5, ..Default::default() };
    assert!(matches!(config.validate(), Err(RenderError::InvalidConfig(_))));
}

#[test]
fn malformed_json_is_an_error() {
    let res = RenderConfig::from_json_str("{ max_depth: ");
    assert!(matches!(res, Err(RenderError::Json(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let res = RenderConfig::from_json_file(Path::new("/nonexistent/render.json"));
    assert!(matches!(res, Err(RenderError::Io(_))));
}

#[test]
fn config_round_trips_through_json() {
    let config = RenderConfig { max_depth: 3, tile_size: 16, ..Default::default() };
    let text = serde_json::to_string(&config).unwrap();

    assert_eq!(RenderConfig::from_json_str(&text).unwrap(), config);
}
