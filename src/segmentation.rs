// src/segmentation.rs - Top-level segmentation run and coordinate queries

use std::collections::{BTreeMap, BTreeSet};

use image::RgbImage;
use log::info;

use crate::dither::coordinates;
use crate::errors::{RegionGrowError, Result};
use crate::growth::{GrowthParams, GrowthReport, RegionGrower};
use crate::image_utils::checked_block_side;
use crate::neighbours::PixelGrid;
use crate::segment::{Coord, Segment};
use crate::state::SegmentationState;

/// Final segmentation of a block: answers which root segment owns a coordinate
#[derive(Debug, Clone)]
pub struct Segmentation {
    grid: PixelGrid,
    state: SegmentationState,
    params: GrowthParams,
    report: GrowthReport,
}

impl Segmentation {
    /// Root segment that the pixel at `coord` belongs to
    pub fn root_at(&self, coord: Coord) -> Segment {
        self.state.find_root(self.grid.pixel_at(coord))
    }

    /// Distinct root segments, in segment order
    pub fn roots(&self) -> Vec<Segment> {
        let roots: BTreeSet<Segment> = self
            .grid
            .pixels()
            .iter()
            .map(|pixel| self.state.find_root(pixel))
            .collect();
        roots.into_iter().collect()
    }

    /// Index into `roots()` for every pixel, in row-major order
    pub fn labels(&self) -> Vec<usize> {
        let index: BTreeMap<Segment, usize> = self
            .roots()
            .into_iter()
            .enumerate()
            .map(|(i, root)| (root, i))
            .collect();

        self.grid
            .pixels()
            .iter()
            .map(|pixel| index[&self.state.find_root(pixel)])
            .collect()
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    pub fn state(&self) -> &SegmentationState {
        &self.state
    }

    pub fn params(&self) -> &GrowthParams {
        &self.params
    }

    pub fn report(&self) -> &GrowthReport {
        &self.report
    }

    /// Side length of the segmented block
    pub fn side(&self) -> u32 {
        self.grid.side()
    }
}

/// Segment the top-left `2^exponent` block of `image` with default growth
/// parameters and the given merge threshold
pub fn segment(image: &RgbImage, exponent: u32, threshold: f64) -> Result<Segmentation> {
    let (width, height) = image.dimensions();
    let fits = checked_block_side(exponent)
        .map(|side| side <= width && side <= height)
        .unwrap_or(false);
    if !fits {
        return Err(RegionGrowError::BlockTooLarge { exponent, width, height });
    }

    let grid = PixelGrid::from_image(image, exponent);
    Ok(segment_grid(grid, &GrowthParams::with_threshold(threshold)))
}

/// Run region growing over a prepared pixel grid, starting from an empty state
pub fn segment_grid(grid: PixelGrid, params: &GrowthParams) -> Segmentation {
    let order = coordinates(params.order, grid.exponent());
    let mut state = SegmentationState::new();

    let report = RegionGrower::new(&grid, *params).run(&mut state, &order);
    info!(
        "Grew {}x{} block: {} merges over {} sweeps (converged: {})",
        grid.side(),
        grid.side(),
        report.merges,
        report.sweeps,
        report.converged
    );

    Segmentation {
        grid,
        state,
        params: *params,
        report,
    }
}
