// src/neighbours.rs - Initial pixel lookup and adjacency between root segments

use std::collections::BTreeSet;

use image::RgbImage;

use crate::image_io::colour_bands;
use crate::image_utils::{block_side, four_neighbours};
use crate::segment::{Colour, Coord, Segment};
use crate::state::SegmentationState;

/// The initial `Pixel` segment of every coordinate in a `2^N` square block
#[derive(Debug, Clone)]
pub struct PixelGrid {
    exponent: u32,
    side: u32,
    pixels: Vec<Segment>,
}

impl PixelGrid {
    /// Build the grid from a colour-band extractor called once per coordinate
    pub fn from_fn<F>(exponent: u32, mut colour_at: F) -> Self
    where
        F: FnMut(Coord) -> Colour,
    {
        let side = block_side(exponent);
        let mut pixels = Vec::with_capacity((side as usize) * (side as usize));
        for y in 0..side {
            for x in 0..side {
                let coord = Coord::new(x, y);
                pixels.push(Segment::pixel(coord, colour_at(coord)));
            }
        }

        Self { exponent, side, pixels }
    }

    /// Build the grid from the top-left block of an RGB image.
    ///
    /// The image must be at least `2^exponent` pixels in each direction.
    pub fn from_image(image: &RgbImage, exponent: u32) -> Self {
        Self::from_fn(exponent, |coord| colour_bands(image, coord))
    }

    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    /// Number of pixels in the block
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn index_of(&self, coord: Coord) -> usize {
        coord.y as usize * self.side as usize + coord.x as usize
    }

    /// Initial pixel segment at `coord`
    #[inline]
    pub fn pixel_at(&self, coord: Coord) -> &Segment {
        &self.pixels[self.index_of(coord)]
    }

    /// All pixel segments in row-major order
    pub fn pixels(&self) -> &[Segment] {
        &self.pixels
    }
}

/// Root segments currently adjacent to `segment`.
///
/// Every leaf pixel contributes its 4-connected neighbours inside the block;
/// those are resolved to their roots and deduplicated. The queried segment is
/// never part of the result.
pub fn neighbours(
    grid: &PixelGrid,
    state: &SegmentationState,
    segment: &Segment,
) -> BTreeSet<Segment> {
    let mut found = BTreeSet::new();

    for coord in segment.coords() {
        for adjacent in four_neighbours(coord, grid.side()) {
            found.insert(state.find_root(grid.pixel_at(adjacent)));
        }
    }

    found.remove(segment);
    found
}
