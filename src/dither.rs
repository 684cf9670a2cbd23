// src/dither.rs - Deterministic coordinate traversal orders for growth sweeps

use serde::{Deserialize, Serialize};

use crate::image_utils::block_side;
use crate::segment::Coord;

/// Order in which a sweep visits the coordinates of the block
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    /// Ordered-dither (Bayer matrix) order: consecutive coordinates are spread
    /// evenly over the block
    #[default]
    Dither,
    /// Plain row-by-row scan
    RowMajor,
}

/// Position of a coordinate in the Bayer matrix of side `2^exponent`.
///
/// Bits of `x ^ y` and `y` are interleaved from least to most significant, so
/// the matrix for exponent 1 is `[[0, 2], [3, 1]]`.
pub fn bayer_index(coord: Coord, exponent: u32) -> usize {
    let diagonal = coord.x ^ coord.y;
    let mut index = 0usize;
    for bit in 0..exponent {
        let high = ((diagonal >> bit) & 1) as usize;
        let low = ((coord.y >> bit) & 1) as usize;
        index = (index << 2) | (high << 1) | low;
    }
    index
}

/// Every coordinate of the `2^exponent` block, exactly once, in the given order
pub fn coordinates(order: TraversalOrder, exponent: u32) -> Vec<Coord> {
    let side = block_side(exponent);
    let row_major = (0..side).flat_map(move |y| (0..side).map(move |x| Coord::new(x, y)));

    match order {
        TraversalOrder::RowMajor => row_major.collect(),
        TraversalOrder::Dither => {
            // The Bayer index is a bijection onto 0..side^2
            let mut ordered = vec![Coord::new(0, 0); (side as usize) * (side as usize)];
            for coord in row_major {
                ordered[bayer_index(coord, exponent)] = coord;
            }
            ordered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_two_by_two_dither_order() {
        let order = coordinates(TraversalOrder::Dither, 1);
        assert_eq!(
            order,
            vec![Coord::new(0, 0), Coord::new(1, 1), Coord::new(1, 0), Coord::new(0, 1)]
        );
    }

    #[test]
    fn test_orders_cover_block_exactly_once() {
        for exponent in 0..5 {
            let side = block_side(exponent) as usize;
            for order in [TraversalOrder::Dither, TraversalOrder::RowMajor] {
                let coords = coordinates(order, exponent);
                assert_eq!(coords.len(), side * side);
                let unique: HashSet<Coord> = coords.iter().copied().collect();
                assert_eq!(unique.len(), side * side);
            }
        }
    }

    #[test]
    fn test_dither_order_is_reproducible() {
        assert_eq!(
            coordinates(TraversalOrder::Dither, 4),
            coordinates(TraversalOrder::Dither, 4)
        );
    }

    #[test]
    fn test_row_major_order() {
        let order = coordinates(TraversalOrder::RowMajor, 1);
        assert_eq!(
            order,
            vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(0, 1), Coord::new(1, 1)]
        );
    }
}
