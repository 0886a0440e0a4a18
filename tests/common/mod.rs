#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from cardsight for tests
pub use cardsight::{
    CardDetector, CardRecord, Classification, DetectorConfig, Orientation, Rank, ReferenceLibrary,
    Suit,
};
