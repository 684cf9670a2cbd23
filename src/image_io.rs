use std::path::{Path, PathBuf};
use std::fs;
use image::{ImageFormat, RgbImage};

use crate::errors::{RegionGrowError, Result};
use crate::segment::{Colour, Coord};

/// File extensions picked up when scanning a directory
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Represents an input image with its metadata
pub struct InputImage {
    pub image: RgbImage,
    pub path: PathBuf,
    pub filename: String,
}

/// Get all supported image files from a directory (recursively), sorted by path
pub fn get_image_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(RegionGrowError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(RegionGrowError::Config(format!(
            "{} is not a directory", dir_path.display()
        )));
    }

    let mut image_files = Vec::new();
    find_image_files_recursive(dir_path, &mut image_files)?;
    image_files.sort();

    Ok(image_files)
}

/// Helper function to recursively search for image files
fn find_image_files_recursive(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            find_image_files_recursive(&path, result)?;
        } else if path.is_file() && has_image_extension(&path) {
            result.push(path);
        }
    }

    Ok(())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Load an image, converting it to 8-bit RGB
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();

    // Get filename without extension
    let filename = path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| RegionGrowError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let image = image::open(path)?.to_rgb8();

    Ok(InputImage {
        image,
        path: path.to_path_buf(),
        filename,
    })
}

/// Save an RGB image as PNG
pub fn save_image<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Colour bands of the pixel at `coord`: red, green and blue as `f64`.
///
/// `coord` must lie inside the image.
#[inline]
pub fn colour_bands(image: &RgbImage, coord: Coord) -> Colour {
    let pixel = image.get_pixel(coord.x, coord.y);
    [pixel[0] as f64, pixel[1] as f64, pixel[2] as f64]
}

/// Largest `N` such that a `2^N` square fits inside the image
pub fn largest_block_exponent(width: u32, height: u32) -> Option<u32> {
    let shortest = width.min(height);
    if shortest == 0 {
        None
    } else {
        Some(shortest.ilog2())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_block_exponent() {
        assert_eq!(largest_block_exponent(0, 10), None);
        assert_eq!(largest_block_exponent(1, 1), Some(0));
        assert_eq!(largest_block_exponent(640, 480), Some(8));
        assert_eq!(largest_block_exponent(64, 64), Some(6));
        assert_eq!(largest_block_exponent(63, 200), Some(5));
    }

    #[test]
    fn test_colour_bands_reads_rgb() {
        let mut image = RgbImage::new(2, 2);
        image.put_pixel(1, 0, image::Rgb([255, 10, 0]));
        assert_eq!(colour_bands(&image, Coord::new(1, 0)), [255.0, 10.0, 0.0]);
        assert_eq!(colour_bands(&image, Coord::new(0, 1)), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_extension_filter() {
        assert!(has_image_extension(Path::new("a/b/tile.PNG")));
        assert!(has_image_extension(Path::new("photo.jpeg")));
        assert!(!has_image_extension(Path::new("notes.txt")));
        assert!(!has_image_extension(Path::new("no_extension")));
    }
}
