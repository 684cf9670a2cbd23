// src/errors.rs - Error type shared by the library and the CLI

use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Custom error types for the region grower
#[derive(Error, Debug)]
pub enum RegionGrowError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("Image of {width}x{height} pixels holds no segmentation block")]
    ImageTooSmall { width: u32, height: u32 },

    #[error("Block of 2^{exponent} pixels does not fit in a {width}x{height} image")]
    BlockTooLarge { exponent: u32, width: u32, height: u32 },
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, RegionGrowError>;
