use crate::{Result, VisualTestError};
use image::{Rgba, RgbaImage};
use image_compare::Algorithm;

/// Channel differences at or below this are drawn dimmed in diff images.
const DIFF_TOLERANCE: u8 = 10;

/// How closely a rendered frame matches its reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareResult {
    /// SSIM score over the RGB channels, 0.0 to 1.0
    pub similarity: f64,
    /// Largest difference of any single channel (alpha included)
    pub max_channel_difference: u8,
    /// Pixels with a channel difference above the diff tolerance
    pub differing_pixels: usize,
}

/// Compare a frame against its reference rendering.
pub fn compare_images(reference: &RgbaImage, rendered: &RgbaImage) -> Result<CompareResult> {
    if reference.dimensions() != rendered.dimensions() {
        return Err(VisualTestError::Compare(format!(
            "Frame is {:?} but the reference is {:?}",
            rendered.dimensions(),
            reference.dimensions()
        )));
    }

    let to_rgb = |img: &RgbaImage| image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
    let ssim = image_compare::rgb_similarity_structure(
        &Algorithm::MSSIMSimple,
        &to_rgb(reference),
        &to_rgb(rendered),
    )
    .map_err(|e| VisualTestError::Compare(format!("SSIM comparison failed: {}", e)))?;

    let differences: Vec<u8> = reference
        .pixels()
        .zip(rendered.pixels())
        .map(|(a, b)| channel_difference(a, b))
        .collect();

    Ok(CompareResult {
        similarity: ssim.score,
        max_channel_difference: differences.iter().copied().max().unwrap_or(0),
        differing_pixels: differences.iter().filter(|&&d| d > DIFF_TOLERANCE).count(),
    })
}

/// Red where the frames disagree, the dimmed frame elsewhere.
pub fn generate_diff_image(reference: &RgbaImage, rendered: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(rendered.width(), rendered.height(), |x, y| {
        let frame = rendered.get_pixel(x, y);
        let diff = reference
            .get_pixel_checked(x, y)
            .map_or(u8::MAX, |expected| channel_difference(expected, frame));

        if diff > DIFF_TOLERANCE {
            let intensity = (diff as f32 / 255.0 * 200.0 + 55.0) as u8;
            Rgba([intensity, 0, 0, 255])
        } else {
            Rgba([frame[0] / 3, frame[1] / 3, frame[2] / 3, 255])
        }
    })
}

fn channel_difference(a: &Rgba<u8>, b: &Rgba<u8>) -> u8 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}
