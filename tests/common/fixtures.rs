use cardsight::detection::corner::{ZOOM_FACTOR, extract_corner};
use cardsight::detection::perspective::{CARD_HEIGHT, CARD_WIDTH};
use cardsight::{Rank, ReferenceLibrary, Suit};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Gray level around the cards; darker than card stock, lighter than ink.
pub const TABLE_LEVEL: u8 = 60;

/// Glyph positions on the canonical 200x300 card.
const RANK_ORIGIN: (i32, i32) = (8, 8);
const RANK_SIZE: (u32, u32) = (34, 50);
const SUIT_ORIGIN: (i32, i32) = (8, 72);
const SUIT_SIZE: (u32, u32) = (34, 34);

/// Margin kept around a glyph when cutting its template, in zoomed pixels.
const TEMPLATE_MARGIN: u32 = 16;

/// Printed size of a card in the synthetic frames (area about 25000).
pub const CARD_PRINT_SIZE: (u32, u32) = (130, 195);

type Strokes = &'static [(i32, i32, u32, u32)];

fn rank_strokes(rank: Rank) -> Strokes {
    match rank {
        Rank::Seven => &[(0, 0, 34, 10), (24, 0, 10, 50)],
        Rank::Ace => &[(0, 0, 10, 50), (24, 0, 10, 50), (0, 0, 34, 10), (0, 22, 34, 10)],
        Rank::King => &[
            (0, 0, 10, 50),
            (10, 20, 8, 10),
            (18, 10, 8, 10),
            (26, 0, 8, 10),
            (18, 30, 8, 10),
            (26, 40, 8, 10),
        ],
        other => panic!("no synthetic glyph for rank {other}"),
    }
}

fn suit_strokes(suit: Suit) -> Strokes {
    match suit {
        Suit::Hearts => &[
            (0, 0, 15, 14),
            (19, 0, 15, 14),
            (0, 10, 34, 10),
            (6, 20, 22, 8),
            (12, 28, 10, 6),
        ],
        Suit::Spades => &[(12, 0, 10, 6), (6, 6, 22, 6), (0, 12, 34, 12), (12, 24, 10, 10)],
        Suit::Clubs => &[(12, 0, 10, 12), (0, 12, 34, 10), (12, 22, 10, 12)],
        other => panic!("no synthetic glyph for suit {other}"),
    }
}

fn draw_strokes(card: &mut GrayImage, origin: (i32, i32), strokes: Strokes) {
    for &(x, y, w, h) in strokes {
        draw_filled_rect_mut(card, Rect::at(origin.0 + x, origin.1 + y).of_size(w, h), Luma([0]));
    }
}

/// Canonical white card with rank and suit printed in its top-left corner.
/// `None` leaves the card blank.
pub fn upright_card(index: Option<(Rank, Suit)>) -> GrayImage {
    let mut card = GrayImage::from_pixel(CARD_WIDTH, CARD_HEIGHT, Luma([255]));
    if let Some((rank, suit)) = index {
        draw_strokes(&mut card, RANK_ORIGIN, rank_strokes(rank));
        draw_strokes(&mut card, SUIT_ORIGIN, suit_strokes(suit));
    }
    card
}

fn template_window(origin: (i32, i32), size: (u32, u32), zone_top: u32) -> (u32, u32, u32, u32) {
    let x = origin.0 as u32 * ZOOM_FACTOR - TEMPLATE_MARGIN;
    let y = origin.1 as u32 * ZOOM_FACTOR - zone_top - TEMPLATE_MARGIN;
    let w = size.0 * ZOOM_FACTOR + 2 * TEMPLATE_MARGIN;
    let h = size.1 * ZOOM_FACTOR + 2 * TEMPLATE_MARGIN;
    (x, y, w, h)
}

/// Reference library whose glyphs are cut from binarized ideal cards.
pub fn reference_library(ranks: &[Rank], suits: &[Suit]) -> ReferenceLibrary {
    let rank_glyphs = ranks
        .iter()
        .map(|&rank| {
            let corner = extract_corner(&upright_card(Some((rank, Suit::Hearts))));
            let (x, y, w, h) = template_window(RANK_ORIGIN, RANK_SIZE, 0);
            (rank, imageops::crop_imm(&corner.rank, x, y, w, h).to_image())
        })
        .collect();

    let suit_glyphs = suits
        .iter()
        .map(|&suit| {
            let corner = extract_corner(&upright_card(Some((Rank::Seven, suit))));
            let zone_top = corner.rank.height();
            let (x, y, w, h) = template_window(SUIT_ORIGIN, SUIT_SIZE, zone_top);
            (suit, imageops::crop_imm(&corner.suit, x, y, w, h).to_image())
        })
        .collect();

    ReferenceLibrary::from_glyphs(rank_glyphs, suit_glyphs).expect("synthetic library is valid")
}

pub fn standard_library() -> ReferenceLibrary {
    reference_library(
        &[Rank::Ace, Rank::Seven, Rank::King],
        &[Suit::Spades, Suit::Hearts, Suit::Clubs],
    )
}

/// Empty table of the given size.
pub fn table(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([TABLE_LEVEL]))
}

/// Lay a card face up on the table with its top-left corner at (`x`, `y`).
///
/// The card is placed upside down so the detector's half-turn brings the
/// index corner back to the top-left of the flattened image.
pub fn place_card(table: &mut GrayImage, card: &GrayImage, x: i64, y: i64) {
    let printed = imageops::resize(card, CARD_PRINT_SIZE.0, CARD_PRINT_SIZE.1, FilterType::Triangle);
    imageops::replace(table, &imageops::rotate180(&printed), x, y);
}

/// Plain white rectangle, e.g. a card-shaped object of the wrong size.
pub fn place_blank(table: &mut GrayImage, x: i32, y: i32, width: u32, height: u32) {
    draw_filled_rect_mut(table, Rect::at(x, y).of_size(width, height), Luma([255]));
}

/// Dark square drawn over whatever is already on the table, e.g. a stain on
/// a card face.
pub fn place_mark(table: &mut GrayImage, x: i32, y: i32, size: u32) {
    draw_filled_rect_mut(table, Rect::at(x, y).of_size(size, size), Luma([0]));
}

pub fn to_frame(table: GrayImage) -> DynamicImage {
    DynamicImage::ImageLuma8(table)
}
