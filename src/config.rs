use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dither::TraversalOrder;
use crate::errors::{RegionGrowError, Result};
use crate::growth::{GrowthParams, TerminationPolicy};

pub use crate::image_utils::MAX_SUPPORTED_EXPONENT;

/// Configuration for the region grower
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub input_path: String,
    pub output_base_dir: String,

    /// Largest merge cost that may be accepted
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Fixed block exponent; when unset the largest block that fits is used
    #[serde(default)]
    pub block_exponent: Option<u32>,

    #[serde(default = "default_max_block_exponent")]
    pub max_block_exponent: u32,

    /// Resize the whole image into the block instead of cropping its top-left corner
    #[serde(default)]
    pub resize_to_block: bool,

    #[serde(default)]
    pub traversal_order: TraversalOrder,

    #[serde(default)]
    pub termination: TerminationPolicy,

    #[serde(default = "default_max_sweeps")]
    pub max_sweeps: usize,

    // Output switches
    #[serde(default = "default_true")]
    pub write_mean_colour_image: bool,

    #[serde(default = "default_true")]
    pub write_label_image: bool,

    #[serde(default = "default_true")]
    pub write_segment_csv: bool,

    #[serde(default = "default_true")]
    pub write_summary_json: bool,
}

fn default_threshold() -> f64 {
    20.0
}

fn default_max_block_exponent() -> u32 {
    6 // 64 x 64 pixels
}

fn default_max_sweeps() -> usize {
    64
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: "./input".to_string(),
            output_base_dir: "./output".to_string(),
            threshold: default_threshold(),
            block_exponent: None,
            max_block_exponent: default_max_block_exponent(),
            resize_to_block: false,
            traversal_order: TraversalOrder::default(),
            termination: TerminationPolicy::default(),
            max_sweeps: default_max_sweeps(),
            write_mean_colour_image: true,
            write_label_image: true,
            write_segment_csv: true,
            write_summary_json: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RegionGrowError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        Self::from_toml_str(&content).map_err(|source| RegionGrowError::ConfigLoad {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Check parameter ranges without touching the filesystem
    pub fn validate_parameters(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(RegionGrowError::Config(
                "threshold must be a finite value >= 0.0".to_string(),
            ));
        }

        if self.max_block_exponent > MAX_SUPPORTED_EXPONENT {
            return Err(RegionGrowError::Config(format!(
                "max_block_exponent must be <= {}",
                MAX_SUPPORTED_EXPONENT
            )));
        }

        if let Some(exponent) = self.block_exponent {
            if exponent > self.max_block_exponent {
                return Err(RegionGrowError::Config(
                    "block_exponent must be <= max_block_exponent".to_string(),
                ));
            }
        }

        if self.max_sweeps == 0 {
            return Err(RegionGrowError::Config(
                "max_sweeps must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate configuration and prepare the output directory
    pub fn validate(&self) -> Result<()> {
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(RegionGrowError::InvalidPath(input_path));
        }

        self.validate_parameters()?;

        fs::create_dir_all(&self.output_base_dir)?;

        Ok(())
    }

    /// Growth parameters derived from this configuration
    pub fn growth_params(&self) -> GrowthParams {
        GrowthParams {
            threshold: self.threshold,
            order: self.traversal_order,
            termination: self.termination,
            max_sweeps: self.max_sweeps,
        }
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            RegionGrowError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }
}
