use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::box_filter;

/// Box blur radius applied before edge detection (3x3 kernel).
pub const BLUR_RADIUS: u32 = 1;
pub const CANNY_LOW_THRESHOLD: f32 = 50.0;
pub const CANNY_HIGH_THRESHOLD: f32 = 200.0;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Smooth sensor noise with a square box filter
pub fn apply_blur(img: &GrayImage, radius: u32) -> GrayImage {
    box_filter(img, radius, radius)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Blur and edge-detect with the fixed card-detection parameters.
pub fn edge_map(gray: &GrayImage) -> GrayImage {
    let blurred = apply_blur(gray, BLUR_RADIUS);
    detect_edges(&blurred, CANNY_LOW_THRESHOLD, CANNY_HIGH_THRESHOLD)
}
