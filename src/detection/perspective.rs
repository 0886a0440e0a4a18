use image::{GrayImage, Luma, imageops};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};

use crate::models::{CandidateQuad, FlattenedCard, Orientation};

pub const CARD_WIDTH: u32 = 200;
pub const CARD_HEIGHT: u32 = 300;

/// Destination points paired positionally with the quad's corners.
fn destination(orientation: Orientation) -> [(f32, f32); 4] {
    let (w, h) = (CARD_WIDTH as f32, CARD_HEIGHT as f32);
    match orientation {
        Orientation::Normal => [(0.0, h), (0.0, 0.0), (w, 0.0), (w, h)],
        Orientation::Inverted => [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)],
    }
}

/// Warp a candidate onto the canonical card rectangle and mirror it
/// horizontally.
///
/// Source corners are matched to destination corners by position only, so
/// the result may be rotated or mirrored relative to the physical card.
/// Returns `None` when the corners admit no projective transform.
pub fn flatten_card(quad: &CandidateQuad, orientation: Orientation) -> Option<FlattenedCard> {
    let source = quad.corners.map(|p| (p.x as f32, p.y as f32));
    let projection = Projection::from_control_points(source, destination(orientation))?;

    let mut warped = GrayImage::new(CARD_WIDTH, CARD_HEIGHT);
    warp_into(
        quad.frame.as_ref(),
        &projection,
        Interpolation::Bilinear,
        Luma([0]),
        &mut warped,
    );

    Some(FlattenedCard {
        image: imageops::flip_horizontal(&warped),
        orientation,
    })
}
