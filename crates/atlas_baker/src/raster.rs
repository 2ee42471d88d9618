//! Debug swatch rasterization.
//!
//! Atlas rectangles are y-up with row 0 at the bottom; image rows run top to
//! bottom, so atlas row `y` lands on image row `size - 1 - y`.

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use std::path::Path;

use uv_atlas::Swatch;

/// Paint every swatch as a solid rectangle on a transparent atlas image.
pub fn paint_swatches(swatches: &[Swatch], size: u32) -> RgbaImage {
	let mut image = RgbaImage::new(size, size);
	let last = size as i32 - 1;

	for swatch in swatches {
		let rect = swatch.rect;
		if rect.is_empty() {
			continue;
		}
		let [r, g, b] = swatch.color;
		let pixel = Rgba([r, g, b, 255]);

		for y in rect.bottom.max(0)..=rect.top.min(last) {
			for x in rect.left.max(0)..=rect.right.min(last) {
				image.put_pixel(x as u32, (last - y) as u32, pixel);
			}
		}
	}
	image
}

/// Write the atlas image as PNG.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
	image
		.save_with_format(path, image::ImageFormat::Png)
		.with_context(|| format!("Failed to write: {}", path.display()))
}
