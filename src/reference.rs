use std::path::Path;

use image::{GrayImage, ImageReader};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tracing::{debug, info};

use crate::detection::corner::{RANK_ZONE_HEIGHT, SUIT_ZONE_HEIGHT, ZONE_WIDTH};
use crate::error::LibraryError;

/// Card rank. Enumeration order is the matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Rank {
    #[strum(serialize = "2")]
    Two,
    #[strum(serialize = "3")]
    Three,
    #[strum(serialize = "4")]
    Four,
    #[strum(serialize = "5")]
    Five,
    #[strum(serialize = "6")]
    Six,
    #[strum(serialize = "7")]
    Seven,
    #[strum(serialize = "8")]
    Eight,
    #[strum(serialize = "9")]
    Nine,
    #[strum(serialize = "10")]
    Ten,
    #[strum(serialize = "J")]
    Jack,
    #[strum(serialize = "Q")]
    Queen,
    #[strum(serialize = "K")]
    King,
    #[strum(serialize = "A")]
    Ace,
    #[strum(serialize = "Joker")]
    Joker,
}

impl Rank {
    /// File stem of the reference glyph, e.g. `N7` for `ranks/N7.jpg`.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Rank::Two => "N2",
            Rank::Three => "N3",
            Rank::Four => "N4",
            Rank::Five => "N5",
            Rank::Six => "N6",
            Rank::Seven => "N7",
            Rank::Eight => "N8",
            Rank::Nine => "N9",
            Rank::Ten => "N10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::Joker => "JOKER",
        }
    }
}

/// Card suit. Enumeration order is the matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
    Joker,
}

impl Suit {
    pub fn file_stem(&self) -> &'static str {
        match self {
            Suit::Hearts => "HEARTS",
            Suit::Diamonds => "DIAMONDS",
            Suit::Clubs => "CLUBS",
            Suit::Spades => "SPADES",
            Suit::Joker => "JOKER",
        }
    }
}

/// One grayscale glyph per rank and per suit, read-only once built.
///
/// Glyphs are kept in insertion order, which is also the order used to
/// break score ties during classification.
#[derive(Debug, Clone)]
pub struct ReferenceLibrary {
    ranks: Vec<(Rank, GrayImage)>,
    suits: Vec<(Suit, GrayImage)>,
}

impl ReferenceLibrary {
    /// Load every rank glyph from `<dir>/ranks/<STEM>.jpg` and every suit
    /// glyph from `<dir>/suits/<STEM>.jpg`.
    ///
    /// Any missing or undecodable file aborts loading.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let dir = dir.as_ref();
        info!(dir = %dir.display(), "Loading reference glyphs");

        let ranks = Rank::iter()
            .map(|rank| Ok((rank, load_glyph(&dir.join("ranks"), rank.file_stem())?)))
            .collect::<Result<Vec<_>, LibraryError>>()?;
        let suits = Suit::iter()
            .map(|suit| Ok((suit, load_glyph(&dir.join("suits"), suit.file_stem())?)))
            .collect::<Result<Vec<_>, LibraryError>>()?;

        Self::from_glyphs(ranks, suits)
    }

    /// Build a library from glyphs already in memory.
    ///
    /// Subsets are allowed, but each axis needs at least one glyph and every
    /// glyph must fit inside the zone it is matched against.
    pub fn from_glyphs(
        ranks: Vec<(Rank, GrayImage)>,
        suits: Vec<(Suit, GrayImage)>,
    ) -> Result<Self, LibraryError> {
        if ranks.is_empty() {
            return Err(LibraryError::EmptySet { kind: "rank" });
        }
        if suits.is_empty() {
            return Err(LibraryError::EmptySet { kind: "suit" });
        }
        for (rank, glyph) in &ranks {
            check_fits(&format!("rank {rank}"), glyph, ZONE_WIDTH, RANK_ZONE_HEIGHT)?;
        }
        for (suit, glyph) in &suits {
            check_fits(&format!("suit {suit}"), glyph, ZONE_WIDTH, SUIT_ZONE_HEIGHT)?;
        }

        debug!(ranks = ranks.len(), suits = suits.len(), "Reference library ready");
        Ok(Self { ranks, suits })
    }

    pub fn ranks(&self) -> impl Iterator<Item = (Rank, &GrayImage)> {
        self.ranks.iter().map(|(rank, glyph)| (*rank, glyph))
    }

    pub fn suits(&self) -> impl Iterator<Item = (Suit, &GrayImage)> {
        self.suits.iter().map(|(suit, glyph)| (*suit, glyph))
    }

    pub fn rank_glyph(&self, rank: Rank) -> Option<&GrayImage> {
        self.ranks.iter().find(|(r, _)| *r == rank).map(|(_, g)| g)
    }

    pub fn suit_glyph(&self, suit: Suit) -> Option<&GrayImage> {
        self.suits.iter().find(|(s, _)| *s == suit).map(|(_, g)| g)
    }
}

fn load_glyph(dir: &Path, stem: &str) -> Result<GrayImage, LibraryError> {
    let path = dir.join(format!("{stem}.jpg"));
    if !path.is_file() {
        return Err(LibraryError::MissingGlyph { path });
    }

    // Format comes from the file contents, not the .jpg name
    let decoded = ImageReader::open(&path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| LibraryError::Decode {
            path: path.clone(),
            source: image::ImageError::IoError(e),
        })?
        .decode()
        .map_err(|source| LibraryError::Decode {
            path: path.clone(),
            source,
        })?;

    Ok(decoded.to_luma8())
}

fn check_fits(
    symbol: &str,
    glyph: &GrayImage,
    zone_width: u32,
    zone_height: u32,
) -> Result<(), LibraryError> {
    let (width, height) = glyph.dimensions();
    if width == 0 || height == 0 {
        return Err(LibraryError::EmptyGlyph {
            symbol: symbol.to_string(),
        });
    }
    if width > zone_width || height > zone_height {
        return Err(LibraryError::GlyphTooLarge {
            symbol: symbol.to_string(),
            width,
            height,
            zone_width,
            zone_height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn glyph(w: u32, h: u32) -> GrayImage {
        GrayImage::from_pixel(w, h, Luma([255]))
    }

    #[test]
    fn labels_follow_card_notation() {
        assert_eq!(Rank::Ten.to_string(), "10");
        assert_eq!(Rank::Ace.to_string(), "A");
        assert_eq!(Rank::Joker.to_string(), "Joker");
        assert_eq!(Suit::Hearts.to_string(), "Hearts");
        assert_eq!(Rank::Ten.file_stem(), "N10");
        assert_eq!(Suit::Spades.file_stem(), "SPADES");
    }

    #[test]
    fn enumeration_covers_every_symbol() {
        assert_eq!(Rank::iter().count(), 14);
        assert_eq!(Suit::iter().count(), 5);
        assert_eq!(Rank::iter().next(), Some(Rank::Two));
    }

    #[test]
    fn rejects_empty_sets() {
        let err = ReferenceLibrary::from_glyphs(vec![], vec![(Suit::Clubs, glyph(10, 10))])
            .unwrap_err();
        assert!(matches!(err, LibraryError::EmptySet { kind: "rank" }));
    }

    #[test]
    fn rejects_glyph_larger_than_zone() {
        let err = ReferenceLibrary::from_glyphs(
            vec![(Rank::Ace, glyph(10, 10))],
            vec![(Suit::Clubs, glyph(ZONE_WIDTH, SUIT_ZONE_HEIGHT + 1))],
        )
        .unwrap_err();
        assert!(matches!(err, LibraryError::GlyphTooLarge { .. }));
    }

    #[test]
    fn lookup_by_symbol() {
        let library = ReferenceLibrary::from_glyphs(
            vec![(Rank::Ace, glyph(10, 12)), (Rank::King, glyph(11, 12))],
            vec![(Suit::Clubs, glyph(9, 9))],
        )
        .unwrap();

        assert_eq!(library.rank_glyph(Rank::King).map(|g| g.width()), Some(11));
        assert!(library.rank_glyph(Rank::Two).is_none());
        assert_eq!(library.suits().count(), 1);
    }
}
