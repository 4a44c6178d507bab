use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;

/// Reduce to a single luminance channel.
///
/// `to_luma8` applies the standard perceptual weighting rather than a plain
/// channel average, so downstream thresholds behave the same across color
/// casts.
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Apply Gaussian blur to suppress sensor and compression noise.
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(img, sigma)
}

/// Binary edge map via Canny hysteresis thresholding.
///
/// Gradient magnitudes above `high` are accepted outright; magnitudes between
/// the two thresholds survive only when 8-connected to an accepted edge
/// pixel. Output values are 0 or 255.
pub fn detect_edges(img: &GrayImage, low: f32, high: f32) -> GrayImage {
    canny(img, low, high)
}

/// σ matching a k×k Gaussian kernel when none is given explicitly.
pub fn sigma_for_kernel(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}
