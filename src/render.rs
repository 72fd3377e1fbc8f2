//! Raster rendering of a trained prototype grid.
//!
//! The grid is drawn as a `(width, height, 3)` array of rows by columns:
//! grid x selects the image row and grid y the image column. Components are
//! read as RGB channels in `[0, 1]`.

use crate::error::{Result, SomError};
use crate::som::PrototypeGrid;
use crate::RGB_DIM;
use image::{ImageBuffer, Rgb, RgbImage};
use log::info;
use std::path::Path;

/// Maps a channel value to a byte, clipping to `[0, 1]`. NaN maps to 0.
#[inline]
pub fn channel_to_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Pixel length of `cells` grid cells at `scale`, rejecting sizes beyond `u32`.
fn scaled_side(cells: usize, scale: u32) -> Result<u32> {
    u32::try_from(cells)
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .ok_or_else(|| {
            SomError::InvalidParameter(format!(
                "{} cells at scale {} exceed the maximum image size",
                cells, scale
            ))
        })
}

/// Renders the grid as an RGB image with `scale × scale` pixels per cell.
pub fn grid_to_image(grid: &PrototypeGrid, scale: u32) -> Result<RgbImage> {
    if grid.dim() != RGB_DIM {
        return Err(SomError::DimensionMismatch {
            expected: RGB_DIM,
            found: grid.dim(),
        });
    }
    if scale == 0 {
        return Err(SomError::InvalidParameter("scale must be positive".to_string()));
    }

    let image_width = scaled_side(grid.height(), scale)?;
    let image_height = scaled_side(grid.width(), scale)?;
    (image_width as usize)
        .checked_mul(image_height as usize)
        .and_then(|pixels| pixels.checked_mul(RGB_DIM))
        .ok_or_else(|| {
            SomError::InvalidParameter(format!(
                "{}x{} image exceeds the addressable buffer size",
                image_width, image_height
            ))
        })?;

    Ok(ImageBuffer::from_fn(image_width, image_height, |px, py| {
        let x = (py / scale) as usize;
        let y = (px / scale) as usize;
        match grid.get(x, y) {
            Some(cell) => Rgb([
                channel_to_u8(cell[0]),
                channel_to_u8(cell[1]),
                channel_to_u8(cell[2]),
            ]),
            None => Rgb([0, 0, 0]),
        }
    }))
}

/// Renders the grid and writes it to `path`. The format follows the extension.
pub fn save_grid_image(grid: &PrototypeGrid, path: impl AsRef<Path>, scale: u32) -> Result<()> {
    let path = path.as_ref();
    let img = grid_to_image(grid, scale)?;
    img.save(path)?;
    info!(
        "Wrote {}x{} image to {}",
        img.width(),
        img.height(),
        path.display()
    );
    Ok(())
}
