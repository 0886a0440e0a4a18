use std::fmt;
use std::sync::Arc;

use image::GrayImage;
use imageproc::geometry::arc_length;
use imageproc::point::Point;

use crate::reference::{Rank, Suit};

/// Axis-aligned bounding box in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Closed polygon traced around a connected edge region.
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
    /// Enclosed area (shoelace), in square pixels.
    pub area: f64,
}

impl Contour {
    pub fn perimeter(&self) -> f64 {
        arc_length(&self.points, true)
    }

    /// Inclusive pixel extent of every traced point.
    pub fn bounding_box(&self) -> BoundingBox {
        let Some(first) = self.points.first() else {
            return BoundingBox {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            };
        };

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        BoundingBox {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        }
    }

    /// Bottom-right-most coordinates, used to anchor area labels.
    pub fn anchor(&self) -> (i32, i32) {
        let bbox = self.bounding_box();
        (
            bbox.x + bbox.width as i32 - 1,
            bbox.y + bbox.height as i32 - 1,
        )
    }
}

/// A contour accepted as a possible card.
#[derive(Debug, Clone)]
pub struct CandidateQuad {
    /// Intensity version of the frame the contour was found in.
    pub frame: Arc<GrayImage>,
    pub contour: Contour,
    /// Approximated vertices, starting at the topmost one and running
    /// counter-clockwise on screen.
    pub corners: [Point<i32>; 4],
    pub area: f64,
    pub perimeter: f64,
}

/// Position and footprint of a card in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardGeometry {
    pub center_x: i32,
    pub center_y: i32,
    pub width: u32,
    pub height: u32,
}

/// Destination corner order used by the perspective warp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    Inverted,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Normal => write!(f, "normal"),
            Orientation::Inverted => write!(f, "inverted"),
        }
    }
}

/// Canonical-size grayscale image of one card.
#[derive(Debug, Clone)]
pub struct FlattenedCard {
    pub image: GrayImage,
    pub orientation: Orientation,
}

/// Binarized, zoomed top-left corner of a flattened card.
///
/// Glyph pixels are 255, background pixels 0.
#[derive(Debug, Clone)]
pub struct CornerRegion {
    pub full: GrayImage,
    pub rank: GrayImage,
    pub suit: GrayImage,
    pub threshold: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub rank: Rank,
    pub suit: Suit,
    pub rank_score: f32,
    pub suit_score: f32,
}

impl Classification {
    pub fn is_joker(&self) -> bool {
        self.rank == Rank::Joker || self.suit == Suit::Joker
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_joker() {
            write!(f, "JOKER")
        } else {
            write!(f, "{} of {}", self.rank, self.suit)
        }
    }
}

/// Everything the pipeline knows about one detected card.
#[derive(Debug, Clone)]
pub struct CardRecord {
    pub geometry: CardGeometry,
    pub quad: CandidateQuad,
    pub card: FlattenedCard,
    pub corner: CornerRegion,
    /// Share of background pixels in `corner`, in percent.
    pub black_percentage: f64,
    pub classification: Classification,
}
