use image::error::{LimitError, LimitErrorKind};
use image::{ImageBuffer, ImageError, Rgb, RgbImage};

use crate::grid::HeightField;

/// Pixel size of a field rendered at `scale`, or a limits error when it
/// does not fit in `u32`.
fn image_dimensions(field: &HeightField, scale: u32) -> Result<(u32, u32), ImageError> {
    let side = |cells: usize| {
        u32::try_from(cells)
            .ok()
            .and_then(|cells| cells.checked_mul(scale))
            .ok_or_else(|| ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError)))
    };
    Ok((side(field.width())?, side(field.depth())?))
}

/// Render the cell colors top-down, one `scale` x `scale` block per cell.
/// Image x follows grid x, image y follows grid z.
pub fn render_color_map(field: &HeightField, scale: u32) -> Result<RgbImage, ImageError> {
    let scale = scale.max(1);
    let (width, height) = image_dimensions(field, scale)?;
    let mut img: RgbImage = ImageBuffer::new(width, height);

    for cell in field.iter() {
        fill_block(&mut img, cell.x as u32, cell.z as u32, scale, Rgb(cell.color.to_rgb8()));
    }
    Ok(img)
}

/// Render heights as grayscale, black at 0 and white at max height.
pub fn render_height_map(field: &HeightField, scale: u32) -> Result<RgbImage, ImageError> {
    let scale = scale.max(1);
    let (width, height) = image_dimensions(field, scale)?;
    let mut img: RgbImage = ImageBuffer::new(width, height);
    let max_height = field.config.max_height;

    for cell in field.iter() {
        let ratio = if max_height > 0.0 {
            (cell.height / max_height).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let v = (ratio * 255.0).round() as u8;
        fill_block(&mut img, cell.x as u32, cell.z as u32, scale, Rgb([v, v, v]));
    }
    Ok(img)
}

fn fill_block(img: &mut RgbImage, x: u32, z: u32, scale: u32, color: Rgb<u8>) {
    for dy in 0..scale {
        for dx in 0..scale {
            img.put_pixel(x * scale + dx, z * scale + dy, color);
        }
    }
}

/// Export the color map as a PNG.
pub fn export_color_map(field: &HeightField, path: &str, scale: u32) -> Result<(), ImageError> {
    render_color_map(field, scale)?.save(path)
}

/// Export the grayscale height map as a PNG.
pub fn export_height_map(field: &HeightField, path: &str, scale: u32) -> Result<(), ImageError> {
    render_height_map(field, scale)?.save(path)
}

/// Place images side by side with a gap, for comparing variants.
pub fn combine_horizontal(images: &[RgbImage], gap: u32) -> RgbImage {
    let width: u32 = images.iter().map(|img| img.width()).sum::<u32>()
        + gap * images.len().saturating_sub(1) as u32;
    let height = images.iter().map(|img| img.height()).max().unwrap_or(0);
    let mut combined: RgbImage = ImageBuffer::from_pixel(width, height, Rgb([20, 20, 20]));

    let mut offset_x = 0;
    for img in images {
        for (x, y, pixel) in img.enumerate_pixels() {
            combined.put_pixel(offset_x + x, y, *pixel);
        }
        offset_x += img.width() + gap;
    }
    combined
}
