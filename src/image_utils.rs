use image::{imageops, RgbImage};

use crate::segment::Coord;

/// Largest block exponent accepted (a 4096 x 4096 block)
pub const MAX_SUPPORTED_EXPONENT: u32 = 12;

/// Side length of a block with the given power-of-two exponent.
///
/// `exponent` must not exceed `MAX_SUPPORTED_EXPONENT`; use
/// `checked_block_side` for unvalidated input.
#[inline]
pub fn block_side(exponent: u32) -> u32 {
    1u32 << exponent
}

/// Side length of the block, or `None` when the exponent is out of range
#[inline]
pub fn checked_block_side(exponent: u32) -> Option<u32> {
    if exponent > MAX_SUPPORTED_EXPONENT {
        None
    } else {
        Some(1u32 << exponent)
    }
}

/// Resize an image to a square of the given side
pub fn resize_image(image: &RgbImage, side: u32) -> RgbImage {
    imageops::resize(image, side, side, imageops::FilterType::Triangle)
}

/// Copy the top-left `side` x `side` block out of an image
pub fn crop_block(image: &RgbImage, side: u32) -> RgbImage {
    imageops::crop_imm(image, 0, 0, side, side).to_image()
}

/// Check if a point is inside a square block
#[inline]
pub fn in_bounds(x: i64, y: i64, side: u32) -> bool {
    x >= 0 && y >= 0 && x < side as i64 && y < side as i64
}

/// The 4-connected neighbours of a coordinate that lie inside the block
pub fn four_neighbours(coord: Coord, side: u32) -> impl Iterator<Item = Coord> {
    const OFFSETS: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

    let (x, y) = (coord.x as i64, coord.y as i64);
    OFFSETS.into_iter().filter_map(move |(dx, dy)| {
        let (nx, ny) = (x + dx, y + dy);
        if in_bounds(nx, ny, side) {
            Some(Coord::new(nx as u32, ny as u32))
        } else {
            None
        }
    })
}
