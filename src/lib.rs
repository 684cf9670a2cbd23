// src/lib.rs - Library interface for the region grower

pub mod config;
pub mod dither;
pub mod errors;
pub mod growth;
pub mod image_io;
pub mod image_utils;
pub mod neighbours;
pub mod output;
pub mod pipeline;
pub mod segment;
pub mod segmentation;
pub mod state;
pub mod summary;

// Re-export commonly used types and functions
pub use errors::{RegionGrowError, Result};
pub use config::Config;
pub use pipeline::{prepare_block, process_image};
pub use image_io::{InputImage, load_image, save_image, colour_bands};

// Segment model and cost arithmetic
pub use segment::{
    band_std_dev,
    colour_samples,
    merge_cost,
    standard_deviation,
    BandStats,
    Colour,
    Coord,
    Segment,
    Shape,
    BANDS,
};

// Growth engine
pub use state::SegmentationState;
pub use neighbours::{neighbours, PixelGrid};
pub use growth::{GrowthParams, GrowthReport, RegionGrower, TerminationPolicy};
pub use dither::{coordinates, TraversalOrder};
pub use segmentation::{segment, segment_grid, Segmentation};

// Summaries
pub use summary::{
    count_connected_regions,
    label_image,
    summarize,
    summarize_run,
    SegmentSummary,
    SegmentationSummary,
};
