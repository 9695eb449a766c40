//! Cutting the source image into square piece bitmaps
//!
//! The session builder only depends on the `ImageSlicer` trait. `TileSlicer` is the
//! default implementation over decoded RGBA images.

use std::path::Path;

use image::RgbaImage;

use crate::error::{PuzzleError, Result};

/// Decoded source image
pub type SourceImage = RgbaImage;

/// Bitmap for a single piece (square, `tile_size` pixels per side)
pub type PieceBitmap = RgbaImage;

/// Produces one bitmap per grid cell, row-major
pub trait ImageSlicer: Send + Sync {
    fn slice(&self, image: &SourceImage, rows: u32, cols: u32) -> Result<Vec<PieceBitmap>>;
}

/// Side length of a square tile for a `rows x cols` cut
pub fn tile_size(width: u32, height: u32, rows: u32, cols: u32) -> u32 {
    if rows == 0 || cols == 0 {
        return 0;
    }
    (width / cols).min(height / rows)
}

/// Crops square tiles from the top-left of the image.
///
/// When the image aspect ratio does not match the grid, the excess on the longer
/// axis is left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileSlicer;

impl ImageSlicer for TileSlicer {
    fn slice(&self, image: &SourceImage, rows: u32, cols: u32) -> Result<Vec<PieceBitmap>> {
        let size = tile_size(image.width(), image.height(), rows, cols);
        if size == 0 {
            return Err(PuzzleError::AssetLoadFailure(format!(
                "{}x{} image is too small for a {}x{} puzzle",
                image.width(),
                image.height(),
                rows,
                cols
            )));
        }

        let mut tiles = Vec::with_capacity(rows as usize * cols as usize);
        for r in 0..rows {
            for c in 0..cols {
                let tile = image::imageops::crop_imm(image, c * size, r * size, size, size);
                tiles.push(tile.to_image());
            }
        }
        log::debug!("Sliced {}x{} tiles of {}px", rows, cols, size);
        Ok(tiles)
    }
}

/// Decode an image file from disk
pub fn load_image(path: impl AsRef<Path>) -> Result<SourceImage> {
    let path = path.as_ref();
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|err| PuzzleError::AssetLoadFailure(format!("{}: {}", path.display(), err)))
}

/// Decode an image from encoded bytes (PNG or JPEG)
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|err| PuzzleError::AssetLoadFailure(err.to_string()))
}

/// A diagonal gradient, used when no image is supplied
pub fn gradient_image(width: u32, height: u32) -> SourceImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        image::Rgba([r, g, 255 - r / 2 - g / 2, 255])
    })
}
