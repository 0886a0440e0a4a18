pub mod preprocessing;
pub mod contours;
pub mod quads;
pub mod perspective;
pub mod corner;
pub mod matching;

use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, info};

use crate::config::DetectorConfig;
use crate::error::ConfigError;
use crate::models::{CandidateQuad, CardRecord, Contour, Orientation};
use crate::reference::ReferenceLibrary;

/// Main card detection orchestrator
///
/// Holds only tuning parameters; every call works on a frame it is handed
/// and keeps no state between frames.
#[derive(Debug, Clone, Default)]
pub struct CardDetector {
    config: DetectorConfig,
}

impl CardDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            min_card_area = config.min_card_area,
            max_card_area = config.max_card_area,
            max_black_percentage = config.max_black_percentage,
            "Card detector ready"
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect and classify every card in a frame, largest first.
    pub fn process_frame(&self, frame: &DynamicImage, library: &ReferenceLibrary) -> Vec<CardRecord> {
        let candidates = self.get_candidates(frame);
        let records: Vec<CardRecord> = candidates
            .iter()
            .filter_map(|quad| self.process_candidate(quad, library))
            .collect();

        debug!(
            candidates = candidates.len(),
            cards = records.len(),
            "Frame processed"
        );
        records
    }

    /// Flatten, read and classify one candidate.
    ///
    /// The corner is re-read once with the inverted corner order when it is
    /// almost entirely background. Returns `None` for degenerate quads.
    pub fn process_candidate(
        &self,
        quad: &CandidateQuad,
        library: &ReferenceLibrary,
    ) -> Option<CardRecord> {
        let geometry = quads::card_geometry(quad);

        let Some(mut card) = perspective::flatten_card(quad, Orientation::Normal) else {
            debug!(?geometry, "Skipping degenerate quad");
            return None;
        };
        let mut corner = corner::extract_corner(&card.image);
        let mut black = corner::black_percentage(&corner.full);

        if corner::needs_reorientation(black, self.config.max_black_percentage) {
            debug!(
                black_percentage = black,
                center_x = geometry.center_x,
                center_y = geometry.center_y,
                "Corner mostly background, retrying inverted"
            );
            card = perspective::flatten_card(quad, Orientation::Inverted)?;
            corner = corner::extract_corner(&card.image);
            black = corner::black_percentage(&corner.full);
        }

        let classification = matching::classify(&corner, library);
        debug!(
            card = %classification,
            rank_score = classification.rank_score,
            suit_score = classification.suit_score,
            orientation = %card.orientation,
            "Card classified"
        );

        Some(CardRecord {
            geometry,
            quad: quad.clone(),
            card,
            corner,
            black_percentage: black,
            classification,
        })
    }

    /// Contours shaped and sized like a card, largest first.
    pub fn get_candidates(&self, frame: &DynamicImage) -> Vec<CandidateQuad> {
        let gray = Arc::new(preprocessing::to_grayscale(frame));
        let contours = external_contours(&gray);
        let candidates = quads::filter_card_quads(
            &contours,
            &gray,
            self.config.min_card_area,
            self.config.max_card_area,
        );

        debug!(
            contours = contours.len(),
            candidates = candidates.len(),
            "Filtered card candidates"
        );
        candidates
    }

    /// Get all external contours from an image (for area tuning)
    pub fn get_contours(&self, frame: &DynamicImage) -> Vec<Contour> {
        let gray = preprocessing::to_grayscale(frame);
        external_contours(&gray)
    }
}

fn external_contours(gray: &image::GrayImage) -> Vec<Contour> {
    let edges = preprocessing::edge_map(gray);
    contours::find_external_contours(&edges)
}
