// src/pipeline.rs - Load, segment and write results for one image

use std::path::PathBuf;

use image::RgbImage;
use log::{debug, info, warn};

use crate::config::Config;
use crate::errors::{RegionGrowError, Result};
use crate::image_io::{largest_block_exponent, save_image, InputImage};
use crate::image_utils::{block_side, checked_block_side, crop_block, resize_image};
use crate::neighbours::PixelGrid;
use crate::output::{render_label_image, render_mean_colour_image, write_segment_csv, write_summary_json};
use crate::segmentation::{segment_grid, Segmentation};
use crate::summary::{summarize, summarize_run, SegmentationSummary};

/// Pick the block exponent and cut (or resize) the image down to that block
pub fn prepare_block(image: &RgbImage, config: &Config) -> Result<(RgbImage, u32)> {
    let (width, height) = image.dimensions();
    let fitting = largest_block_exponent(width, height)
        .ok_or(RegionGrowError::ImageTooSmall { width, height })?;

    if config.resize_to_block {
        let exponent = config.block_exponent.unwrap_or(config.max_block_exponent);
        let side = checked_block_side(exponent)
            .ok_or(RegionGrowError::BlockTooLarge { exponent, width, height })?;
        debug!("Resizing {}x{} image into a {}x{} block", width, height, side, side);
        return Ok((resize_image(image, side), exponent));
    }

    let exponent = match config.block_exponent {
        Some(exponent) if exponent > fitting => {
            return Err(RegionGrowError::BlockTooLarge { exponent, width, height });
        }
        Some(exponent) => exponent,
        None => fitting.min(config.max_block_exponent),
    };

    let side = block_side(exponent);
    if side != width || side != height {
        debug!("Cropping {}x{} image to its top-left {}x{} block", width, height, side, side);
    }

    Ok((crop_block(image, side), exponent))
}

/// Segment one image and write the outputs enabled in the configuration
pub fn process_image(input_image: InputImage, config: &Config) -> Result<SegmentationSummary> {
    let InputImage { image, path, filename } = input_image;

    let (block, exponent) = prepare_block(&image, config)?;
    info!(
        "Segmenting {} ({}x{} block, threshold {:.3})",
        path.display(),
        block.width(),
        block.height(),
        config.threshold
    );

    let grid = PixelGrid::from_image(&block, exponent);
    let segmentation = segment_grid(grid, &config.growth_params());

    let summary = summarize_run(&filename, &segmentation);
    if summary.connected_regions as usize != summary.segment_count {
        warn!(
            "{}: {} segments cover {} connected regions",
            filename, summary.segment_count, summary.connected_regions
        );
    }

    write_outputs(&segmentation, &summary, config, &filename)?;

    info!(
        "{}: {} segments after {} sweeps",
        filename, summary.segment_count, summary.sweeps
    );

    Ok(summary)
}

fn write_outputs(
    segmentation: &Segmentation,
    summary: &SegmentationSummary,
    config: &Config,
    filename: &str,
) -> Result<()> {
    let output_dir = PathBuf::from(&config.output_base_dir);
    std::fs::create_dir_all(&output_dir)?;

    if config.write_mean_colour_image {
        let path = output_dir.join(format!("{}_mean.png", filename));
        save_image(&render_mean_colour_image(segmentation), &path)?;
        debug!("Wrote {}", path.display());
    }

    if config.write_label_image {
        let path = output_dir.join(format!("{}_labels.png", filename));
        save_image(&render_label_image(segmentation), &path)?;
        debug!("Wrote {}", path.display());
    }

    if config.write_segment_csv {
        let path = output_dir.join(format!("{}_segments.csv", filename));
        write_segment_csv(&summarize(segmentation), &path)?;
        debug!("Wrote {}", path.display());
    }

    if config.write_summary_json {
        let path = output_dir.join(format!("{}_summary.json", filename));
        write_summary_json(summary, &path)?;
        debug!("Wrote {}", path.display());
    }

    Ok(())
}
