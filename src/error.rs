use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a [`crate::ReferenceLibrary`].
///
/// All of these are fatal at startup: cards cannot be classified without a
/// complete, well-formed glyph set.
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("reference glyph not found: {path}")]
    MissingGlyph { path: PathBuf },

    #[error("failed to decode reference glyph {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("reference library has no {kind} glyphs")]
    EmptySet { kind: &'static str },

    #[error("{symbol} glyph is {width}x{height}, larger than its {zone_width}x{zone_height} matching zone")]
    GlyphTooLarge {
        symbol: String,
        width: u32,
        height: u32,
        zone_width: u32,
        zone_height: u32,
    },

    #[error("{symbol} glyph is empty")]
    EmptyGlyph { symbol: String },
}

/// Invalid tuning parameters.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("minimum card area ({min}) must be smaller than maximum card area ({max})")]
    InvalidAreaBounds { min: f64, max: f64 },

    #[error("card area bounds must be non-negative and finite")]
    NonFiniteArea,

    #[error("maximum black percentage must be within 0..=100, got {0}")]
    InvalidBlackPercentage(f64),
}
