pub mod config;
pub mod debug;
pub mod detection;
pub mod error;
pub mod models;
pub mod reference;

pub use config::DetectorConfig;
pub use debug::DebugDump;
pub use detection::CardDetector;
pub use error::{ConfigError, LibraryError};
pub use models::{
    BoundingBox, CandidateQuad, CardGeometry, CardRecord, Classification, Contour, CornerRegion,
    FlattenedCard, Orientation,
};
pub use reference::{Rank, ReferenceLibrary, Suit};
