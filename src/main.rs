use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use image::{DynamicImage, ImageReader};
use tracing::info;

use cardsight::detection::{corner, perspective};
use cardsight::{CardDetector, DebugDump, DetectorConfig, Orientation, ReferenceLibrary};

#[derive(Parser)]
#[command(name = "cardsight")]
#[command(about = "Detect playing cards in an image and read their rank and suit")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    tuning: Tuning,
}

/// Overrides for the values read from the environment / `.env`
#[derive(Args)]
struct Tuning {
    /// Minimum contour area accepted as a card
    #[arg(long, global = true, value_name = "PIXELS")]
    min_card_area: Option<f64>,

    /// Maximum contour area accepted as a card
    #[arg(long, global = true, value_name = "PIXELS")]
    max_card_area: Option<f64>,

    /// Background percentage above which a corner is re-read inverted
    #[arg(long, global = true, value_name = "PERCENT")]
    max_black_percentage: Option<f64>,
}

#[derive(Subcommand)]
enum Command {
    /// Detect and classify every card in an image
    Detect {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Directory holding ranks/ and suits/ reference glyphs
        #[arg(long, value_name = "DIR", default_value = "assets")]
        assets: PathBuf,

        /// Save debug outputs to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },

    /// List external contours with their areas, for tuning the area bounds
    Contours {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Hide contours smaller than this
        #[arg(long, default_value_t = 100.0)]
        min_area: f64,
    },

    /// Save the binarized corner of the largest card candidate
    Corner {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Output image path
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let detector = CardDetector::new(build_config(&args.tuning))?;

    match args.command {
        Command::Detect {
            image_path,
            assets,
            debug_out,
        } => run_detect(&detector, &image_path, &assets, debug_out),
        Command::Contours {
            image_path,
            min_area,
        } => run_contours(&detector, &image_path, min_area),
        Command::Corner { image_path, out } => run_corner(&detector, &image_path, &out),
    }
}

fn build_config(tuning: &Tuning) -> DetectorConfig {
    let mut config = DetectorConfig::from_env();
    if let Some(min) = tuning.min_card_area {
        config.min_card_area = min;
    }
    if let Some(max) = tuning.max_card_area {
        config.max_card_area = max;
    }
    if let Some(black) = tuning.max_black_percentage {
        config.max_black_percentage = black;
    }
    config
}

fn load_frame(path: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    info!(width = img.width(), height = img.height(), "Image loaded");
    Ok(img)
}

fn run_detect(
    detector: &CardDetector,
    image_path: &Path,
    assets: &Path,
    debug_out: Option<PathBuf>,
) -> anyhow::Result<()> {
    // Fail before touching the image if the glyph set is incomplete
    let library = ReferenceLibrary::load(assets)?;
    let dump = debug_out.map(DebugDump::new).transpose()?;

    let frame = load_frame(image_path)?;
    let records = detector.process_frame(&frame, &library);

    if let Some(dump) = &dump {
        dump.save(&frame, &records)?;
    }

    println!("\n=== Card Detection Results ===");
    println!("Total cards detected: {}", records.len());

    if records.is_empty() {
        println!("No cards detected.");
        return Ok(());
    }

    println!("\nDetected cards:");
    for (i, record) in records.iter().enumerate() {
        let g = &record.geometry;
        let c = &record.classification;
        let note = match record.card.orientation {
            Orientation::Normal => "",
            Orientation::Inverted => " [inverted]",
        };
        println!(
            "  {}. {} at ({}, {}) {}x{} - rank score: {:.2}, suit score: {:.2}{}",
            i + 1,
            c,
            g.center_x,
            g.center_y,
            g.width,
            g.height,
            c.rank_score,
            c.suit_score,
            note
        );
    }

    Ok(())
}

fn run_contours(detector: &CardDetector, image_path: &Path, min_area: f64) -> anyhow::Result<()> {
    let frame = load_frame(image_path)?;
    let contours: Vec<_> = detector
        .get_contours(&frame)
        .into_iter()
        .filter(|c| c.area > min_area)
        .collect();

    println!("External contours above {min_area:.0} px: {}", contours.len());
    let config = detector.config();
    for contour in &contours {
        let (x, y) = contour.anchor();
        let in_bounds = contour.area > config.min_card_area && contour.area < config.max_card_area;
        println!(
            "  area {:>10.1} at ({}, {}){}",
            contour.area,
            x,
            y,
            if in_bounds { "  <- card-sized" } else { "" }
        );
    }

    Ok(())
}

fn run_corner(detector: &CardDetector, image_path: &Path, out: &Path) -> anyhow::Result<()> {
    let frame = load_frame(image_path)?;
    let candidates = detector.get_candidates(&frame);
    let quad = candidates
        .first()
        .ok_or_else(|| anyhow::anyhow!("No card candidate found"))?;

    let card = perspective::flatten_card(quad, Orientation::Normal)
        .ok_or_else(|| anyhow::anyhow!("Card corners do not form a valid quad"))?;
    let region = corner::extract_corner(&card.image);

    region
        .full
        .save(out)
        .map_err(|e| anyhow::anyhow!("Failed to save corner: {}", e))?;
    println!(
        "Saved corner to {} (threshold {}, {:.1}% background)",
        out.display(),
        region.threshold,
        corner::black_percentage(&region.full)
    );

    Ok(())
}
