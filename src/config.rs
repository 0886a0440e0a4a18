use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

pub const DEFAULT_MIN_CARD_AREA: f64 = 20000.0;
pub const DEFAULT_MAX_CARD_AREA: f64 = 30000.0;
pub const DEFAULT_MAX_BLACK_PERCENTAGE: f64 = 90.0;

/// Deployment-tuned detection parameters.
///
/// The area bounds depend on camera distance and resolution; the black
/// percentage decides when a corner is considered to be read from the wrong
/// edge of the card.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Contours must enclose strictly more than this many pixels.
    pub min_card_area: f64,
    /// Contours must enclose strictly less than this many pixels.
    pub max_card_area: f64,
    /// Above this share of background pixels the card is re-read inverted.
    pub max_black_percentage: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_card_area: DEFAULT_MIN_CARD_AREA,
            max_card_area: DEFAULT_MAX_CARD_AREA,
            max_black_percentage: DEFAULT_MAX_BLACK_PERCENTAGE,
        }
    }
}

impl DetectorConfig {
    pub fn new(min_card_area: f64, max_card_area: f64, max_black_percentage: f64) -> Self {
        Self {
            min_card_area,
            max_card_area,
            max_black_percentage,
        }
    }

    pub fn with_area_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_card_area = min;
        self.max_card_area = max;
        self
    }

    pub fn with_max_black_percentage(mut self, percentage: f64) -> Self {
        self.max_black_percentage = percentage;
        self
    }

    /// Load from `MIN_CARD_AREA`, `MAX_CARD_AREA` and `MAX_BLACK_PER_CENT`,
    /// reading a `.env` file first when one exists.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing or unparsable values keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            min_card_area: parse_or(&lookup, "MIN_CARD_AREA", defaults.min_card_area),
            max_card_area: parse_or(&lookup, "MAX_CARD_AREA", defaults.max_card_area),
            max_black_percentage: parse_or(
                &lookup,
                "MAX_BLACK_PER_CENT",
                defaults.max_black_percentage,
            ),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let areas = [self.min_card_area, self.max_card_area];
        if areas.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return Err(ConfigError::NonFiniteArea);
        }
        if self.min_card_area >= self.max_card_area {
            return Err(ConfigError::InvalidAreaBounds {
                min: self.min_card_area,
                max: self.max_card_area,
            });
        }
        if !(0.0..=100.0).contains(&self.max_black_percentage) {
            return Err(ConfigError::InvalidBlackPercentage(self.max_black_percentage));
        }
        Ok(())
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: f64) -> f64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, default, "Ignoring unparsable setting");
                default
            }
        },
        None => default,
    }
}
