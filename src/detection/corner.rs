use image::imageops::{self, FilterType};
use image::GrayImage;
use imageproc::contrast::{ThresholdType, threshold};

use crate::models::CornerRegion;

/// Corner crop in canonical card pixels.
pub const CORNER_WIDTH: u32 = 50;
pub const CORNER_HEIGHT: u32 = 125;
pub const ZOOM_FACTOR: u32 = 4;

/// Rank glyph occupies the first 65 canonical rows of the corner.
pub const RANK_ZONE_HEIGHT: u32 = 65 * ZOOM_FACTOR;
pub const SUIT_ZONE_HEIGHT: u32 = CORNER_HEIGHT * ZOOM_FACTOR - RANK_ZONE_HEIGHT;
pub const ZONE_WIDTH: u32 = CORNER_WIDTH * ZOOM_FACTOR;

/// Row of the zoomed corner sampled for the card's background intensity.
const WHITE_SAMPLE_ROW: u32 = 5;
const THRESHOLD_OFFSET: i32 = 60;

/// Cut the index corner out of a flattened card and binarize it so glyph
/// strokes become 255 and card background 0.
pub fn extract_corner(card: &GrayImage) -> CornerRegion {
    let corner = imageops::crop_imm(card, 0, 0, CORNER_WIDTH, CORNER_HEIGHT).to_image();
    let zoomed = imageops::resize(
        &corner,
        ZONE_WIDTH,
        CORNER_HEIGHT * ZOOM_FACTOR,
        FilterType::Triangle,
    );

    let white_level = zoomed.get_pixel(ZONE_WIDTH / 2, WHITE_SAMPLE_ROW)[0] as i32;
    let level = (white_level - THRESHOLD_OFFSET).max(1) as u8;
    let full = threshold(&zoomed, level, ThresholdType::BinaryInverted);

    let rank = imageops::crop_imm(&full, 0, 0, ZONE_WIDTH, RANK_ZONE_HEIGHT).to_image();
    let suit =
        imageops::crop_imm(&full, 0, RANK_ZONE_HEIGHT, ZONE_WIDTH, SUIT_ZONE_HEIGHT).to_image();

    CornerRegion {
        full,
        rank,
        suit,
        threshold: level,
    }
}

/// Percentage of pixels that are exactly zero.
pub fn black_percentage(binarized: &GrayImage) -> f64 {
    let total = binarized.width() as u64 * binarized.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let black = binarized.pixels().filter(|p| p[0] == 0).count() as u64;
    black as f64 / total as f64 * 100.0
}

/// A corner dominated by background was most likely read from the wrong
/// edge of the card.
pub fn needs_reorientation(black_percentage: f64, max_black_percentage: f64) -> bool {
    black_percentage > max_black_percentage
}
