use std::path::{Path, PathBuf};

use anyhow::Result;
use image::DynamicImage;
use tracing::debug;

use crate::models::CardRecord;

/// Writes intermediate images of a processed frame to disk.
///
/// Layout:
/// `00_input/01.png`, `01_flattened/<card>.png`, `02_corner/<card>.png`,
/// with cards numbered from 01 in detection order.
#[derive(Clone, Debug)]
pub struct DebugDump {
    output_dir: PathBuf,
}

impl DebugDump {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn save(&self, frame: &DynamicImage, records: &[CardRecord]) -> Result<()> {
        let input_dir = self.step_dir("00_input")?;
        frame
            .save(input_dir.join("01.png"))
            .map_err(|e| anyhow::anyhow!("Failed to save debug input: {}", e))?;

        let flat_dir = self.step_dir("01_flattened")?;
        let corner_dir = self.step_dir("02_corner")?;
        for (idx, record) in records.iter().enumerate() {
            let filename = format!("{:02}.png", idx + 1);
            record
                .card
                .image
                .save(flat_dir.join(&filename))
                .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
            record
                .corner
                .full
                .save(corner_dir.join(&filename))
                .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
        }

        debug!(
            dir = %self.output_dir.display(),
            cards = records.len(),
            "Saved debug images"
        );
        Ok(())
    }

    fn step_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.output_dir.join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
