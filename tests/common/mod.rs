#![allow(dead_code)]

use image::{Rgb, RgbImage};

/// Square image built from a row-major list of RGB values
pub fn image_from_rows(side: u32, colours: &[[u8; 3]]) -> RgbImage {
    RgbImage::from_fn(side, side, |x, y| Rgb(colours[(y * side + x) as usize]))
}

/// Square image split into four flat quadrants
pub fn quadrants(side: u32) -> RgbImage {
    let half = side / 2;
    RgbImage::from_fn(side, side, |x, y| match (x < half, y < half) {
        (true, true) => Rgb([220, 30, 30]),
        (false, true) => Rgb([30, 200, 40]),
        (true, false) => Rgb([20, 40, 210]),
        (false, false) => Rgb([240, 240, 240]),
    })
}

/// Deterministic noisy image from a linear congruential generator
pub fn noise(side: u32, seed: u32) -> RgbImage {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 24) as u8
    };
    RgbImage::from_fn(side, side, |_, _| Rgb([next(), next(), next()]))
}
