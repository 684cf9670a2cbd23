use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::BufWriter;
use std::path::Path;
use csv::Writer;
use image::{Rgb, RgbImage};

use crate::errors::Result;
use crate::segmentation::Segmentation;
use crate::summary::{SegmentSummary, SegmentationSummary};

/// Write one row per segment to CSV
pub fn write_segment_csv<P: AsRef<Path>>(
    summaries: &[SegmentSummary],
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();

    // Create directory if it doesn't exist
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_path(output_path)?;

    writer.write_record([
        "Segment_Id",
        "Pixel_Count",
        "Anchor_X",
        "Anchor_Y",
        "Min_X",
        "Min_Y",
        "Max_X",
        "Max_Y",
        "Mean_R",
        "Mean_G",
        "Mean_B",
        "StdDev_R",
        "StdDev_G",
        "StdDev_B",
    ])?;

    for summary in summaries {
        writer.write_record(&[
            summary.id.to_string(),
            summary.pixel_count.to_string(),
            summary.anchor_x.to_string(),
            summary.anchor_y.to_string(),
            summary.min_x.to_string(),
            summary.min_y.to_string(),
            summary.max_x.to_string(),
            summary.max_y.to_string(),
            format!("{:.6}", summary.mean_colour[0]),
            format!("{:.6}", summary.mean_colour[1]),
            format!("{:.6}", summary.mean_colour[2]),
            format!("{:.6}", summary.std_dev[0]),
            format!("{:.6}", summary.std_dev[1]),
            format!("{:.6}", summary.std_dev[2]),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

/// Write the run overview as pretty-printed JSON
pub fn write_summary_json<P: AsRef<Path>>(
    summary: &SegmentationSummary,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(writer, summary)?;

    Ok(())
}

/// Paint every pixel with the mean colour of its segment
pub fn render_mean_colour_image(segmentation: &Segmentation) -> RgbImage {
    let side = segmentation.side();
    let palette: Vec<Rgb<u8>> = segmentation
        .roots()
        .iter()
        .map(|root| {
            let mean = root.mean_colour();
            Rgb([to_channel(mean[0]), to_channel(mean[1]), to_channel(mean[2])])
        })
        .collect();

    paint_labels(side, &segmentation.labels(), &palette)
}

/// Paint every segment with a distinct pseudo-random colour
pub fn render_label_image(segmentation: &Segmentation) -> RgbImage {
    let side = segmentation.side();
    let palette: Vec<Rgb<u8>> = segmentation
        .roots()
        .iter()
        .map(|root| {
            let mut hasher = DefaultHasher::new();
            root.anchor().hash(&mut hasher);
            let [r, g, b, ..] = hasher.finish().to_le_bytes();
            Rgb([r, g, b])
        })
        .collect();

    paint_labels(side, &segmentation.labels(), &palette)
}

fn paint_labels(side: u32, labels: &[usize], palette: &[Rgb<u8>]) -> RgbImage {
    RgbImage::from_fn(side, side, |x, y| palette[labels[(y * side + x) as usize]])
}

#[inline]
fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
