//! JSON run configuration shared by the mapping stage and the assembly stage.
//!
//! ```json
//! {
//!   "bonding_file": "bonding.txt",
//!   "output_file": "bonding_disp.txt",
//!   "shrinkage": { "center": [0.0, 0.0], "fraction": 0.3 },
//!   "strategy": { "type": "cylinder", "radius": 2.0, "orientation_deg": 90.0 }
//! }
//! ```
//!
//! Every key is optional. Relative paths are resolved against the directory
//! holding the configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, PipelineError};
use crate::field::DeformationField;
use crate::mapping::MappingStrategy;
use crate::shrink::Shrinkage;

/// Default cylinder and sphere radius.
const DEFAULT_RADIUS: f64 = 2.0;
/// Default angle between the cylinder axis and the x axis, in degrees.
const DEFAULT_ORIENTATION_DEG: f64 = 90.0;

/// Settings for one mapping run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Bonding descriptor file.
    pub bonding_file: PathBuf,
    /// Displacement file to write.
    pub output_file: PathBuf,
    /// Pre-shrink applied before mapping.
    pub shrinkage: Shrinkage,
    /// Pre-shrink recorded for the assembly stage, if it keeps its own copy.
    pub assembly_shrinkage: Option<Shrinkage>,
    /// Treat a mismatch between `shrinkage` and `assembly_shrinkage` as fatal.
    pub strict_consistency: bool,
    /// Target surface.
    pub strategy: StrategyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bonding_file: PathBuf::from("bonding.txt"),
            output_file: PathBuf::from("bonding_disp.txt"),
            shrinkage: Shrinkage::default(),
            assembly_shrinkage: None,
            strict_consistency: false,
            strategy: StrategyConfig::default(),
        }
    }
}

/// Serialized form of a [`MappingStrategy`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum StrategyConfig {
    /// Cylinder touching the plane along a line through the origin.
    Cylinder {
        /// Cylinder radius.
        #[serde(default = "default_radius")]
        radius: f64,
        /// Axis angle from the x axis in degrees.
        #[serde(default = "default_orientation")]
        orientation_deg: f64,
    },
    /// Sphere touching the plane at the origin.
    Sphere {
        /// Sphere radius.
        #[serde(default = "default_radius")]
        radius: f64,
    },
    /// Interpolated deformation field read from `field_file`.
    DiscreteField {
        /// File of `u v x y z` rows.
        field_file: PathBuf,
    },
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::Cylinder {
            radius: DEFAULT_RADIUS,
            orientation_deg: DEFAULT_ORIENTATION_DEG,
        }
    }
}

/// Serde default for radii.
fn default_radius() -> f64 {
    DEFAULT_RADIUS
}

/// Serde default for the cylinder orientation.
fn default_orientation() -> f64 {
    DEFAULT_ORIENTATION_DEG
}

impl Config {
    /// Parse a configuration from JSON text. Paths are kept as written.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON or unknown keys.
    ///
    /// # Examples
    /// ```
    /// use bondmap::{Config, StrategyConfig};
    ///
    /// let config = Config::from_json_str(r#"{ "strategy": { "type": "sphere" } }"#).unwrap();
    /// assert_eq!(config.strategy, StrategyConfig::Sphere { radius: 2.0 });
    /// assert_eq!(config.shrinkage.fraction, 0.3);
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a configuration file and resolve its relative paths against the
    /// file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Json`] when it cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        debug!("resolving configuration paths against `{}`", base.display());
        Ok(config.with_base_dir(base))
    }

    /// Resolve every relative path against `base`.
    #[must_use]
    pub fn with_base_dir(mut self, base: &Path) -> Self {
        self.bonding_file = resolve(base, &self.bonding_file);
        self.output_file = resolve(base, &self.output_file);
        if let StrategyConfig::DiscreteField { field_file } = &mut self.strategy {
            *field_file = resolve(base, field_file);
        }
        self
    }

    /// Check that the numeric parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] of the first invalid parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for shrinkage in std::iter::once(&self.shrinkage).chain(&self.assembly_shrinkage) {
            if !shrinkage.is_valid() {
                return Err(ConfigError::InvalidShrinkage(*shrinkage));
            }
        }
        match self.strategy {
            StrategyConfig::Cylinder {
                radius,
                orientation_deg,
            } => {
                check_radius(radius)?;
                if !orientation_deg.is_finite() {
                    return Err(ConfigError::InvalidOrientation(orientation_deg));
                }
            }
            StrategyConfig::Sphere { radius } => check_radius(radius)?,
            StrategyConfig::DiscreteField { .. } => {}
        }
        Ok(())
    }
}

impl StrategyConfig {
    /// Build the mapping strategy, loading the field file when needed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Input`] when the field file cannot be loaded
    /// and [`PipelineError::Domain`] when its samples do not span a triangle.
    pub fn build(&self) -> Result<MappingStrategy, PipelineError> {
        let strategy = match self {
            Self::Cylinder {
                radius,
                orientation_deg,
            } => MappingStrategy::cylinder(*radius, *orientation_deg),
            Self::Sphere { radius } => MappingStrategy::sphere(*radius),
            Self::DiscreteField { field_file } => {
                let field = DeformationField::load(field_file)?;
                debug!(
                    "loaded {} field samples from `{}`",
                    field.len(),
                    field_file.display()
                );
                MappingStrategy::discrete_field(&field)?
            }
        };
        Ok(strategy)
    }
}

/// Accept finite, positive radii.
fn check_radius(radius: f64) -> Result<(), ConfigError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRadius(radius))
    }
}

/// Join `path` onto `base` unless it is absolute.
fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
