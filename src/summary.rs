// src/summary.rs - Per-segment statistics and label maps

use image::{ImageBuffer, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use serde::Serialize;

use crate::segment::{band_std_dev, Colour};
use crate::segmentation::Segmentation;

/// Label map of a segmentation: one `u32` label per pixel, starting at 1
pub type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Statistics of one root segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    /// Position of the segment in root order
    pub id: usize,
    pub pixel_count: usize,
    pub anchor_x: u32,
    pub anchor_y: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub mean_colour: Colour,
    pub std_dev: Colour,
}

/// Description of a whole segmentation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentationSummary {
    pub source: String,
    pub block_side: u32,
    pub threshold: f64,
    pub sweeps: usize,
    pub merges: usize,
    pub converged: bool,
    pub segment_count: usize,
    /// 4-connected regions in the label map
    pub connected_regions: u32,
}

/// Statistics for every root segment, ordered by id
pub fn summarize(segmentation: &Segmentation) -> Vec<SegmentSummary> {
    segmentation
        .roots()
        .iter()
        .enumerate()
        .map(|(id, root)| {
            let anchor = root.anchor();
            let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
            let (mut max_x, mut max_y) = (0, 0);
            for coord in root.coords() {
                min_x = min_x.min(coord.x);
                min_y = min_y.min(coord.y);
                max_x = max_x.max(coord.x);
                max_y = max_y.max(coord.y);
            }

            SegmentSummary {
                id,
                pixel_count: root.pixel_count(),
                anchor_x: anchor.x,
                anchor_y: anchor.y,
                min_x,
                min_y,
                max_x,
                max_y,
                mean_colour: root.mean_colour(),
                std_dev: band_std_dev(root),
            }
        })
        .collect()
}

/// Label map with segment `id + 1` at every pixel
pub fn label_image(segmentation: &Segmentation) -> LabelImage {
    let side = segmentation.side();
    let labels: Vec<u32> = segmentation
        .labels()
        .into_iter()
        .map(|label| label as u32 + 1)
        .collect();

    // The label vector holds exactly side * side entries
    ImageBuffer::from_fn(side, side, |x, y| Luma([labels[(y * side + x) as usize]]))
}

/// Number of 4-connected regions of equal label
pub fn count_connected_regions(labels: &LabelImage) -> u32 {
    let components = connected_components(labels, Connectivity::Four, Luma([0u32]));
    components.pixels().map(|p| p[0]).max().unwrap_or(0)
}

/// Overview of a run, including a contiguity count from the label map
pub fn summarize_run(source: &str, segmentation: &Segmentation) -> SegmentationSummary {
    let report = segmentation.report();
    let segment_count = segmentation.roots().len();
    let connected_regions = count_connected_regions(&label_image(segmentation));

    SegmentationSummary {
        source: source.to_string(),
        block_side: segmentation.side(),
        threshold: segmentation.params().threshold,
        sweeps: report.sweeps,
        merges: report.merges,
        converged: report.converged,
        segment_count,
        connected_regions,
    }
}
