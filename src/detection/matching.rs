use image::{GrayImage, ImageBuffer, Luma};
use imageproc::integral_image::{integral_image, integral_squared_image};
use imageproc::template_matching::{MatchTemplateMethod, match_template_parallel};
use rayon::prelude::*;

use crate::models::{Classification, CornerRegion};
use crate::reference::ReferenceLibrary;

/// Windows whose intensity variance falls below this are treated as flat.
const FLAT_VARIANCE: f64 = 1e-6;

type SumTable = ImageBuffer<Luma<u64>, Vec<u64>>;

/// Integral tables of a zone, shared by every glyph matched against it.
struct ZoneStats<'a> {
    image: &'a GrayImage,
    sums: SumTable,
    squares: SumTable,
}

impl<'a> ZoneStats<'a> {
    fn new(image: &'a GrayImage) -> Self {
        Self {
            image,
            sums: integral_image::<_, u64>(image),
            squares: integral_squared_image::<_, u64>(image),
        }
    }

    fn score(&self, template: &GrayImage) -> Option<f32> {
        let (iw, ih) = self.image.dimensions();
        let (tw, th) = template.dimensions();
        if tw == 0 || th == 0 || tw > iw || th > ih {
            return None;
        }

        let n = (tw * th) as f64;
        let (t_sum, t_sq_sum) = template.pixels().fold((0.0, 0.0), |(s, sq), p| {
            let v = p[0] as f64;
            (s + v, sq + v * v)
        });
        let t_var = t_sq_sum - t_sum * t_sum / n;

        let cross =
            match_template_parallel(self.image, template, MatchTemplateMethod::CrossCorrelation);

        let mut best = f32::NEG_INFINITY;
        for (x, y, products) in cross.enumerate_pixels() {
            let i_sum = window_sum(&self.sums, x, y, tw, th);
            let i_var = window_sum(&self.squares, x, y, tw, th) - i_sum * i_sum / n;

            let denom = (t_var * i_var).sqrt();
            let score = if t_var <= FLAT_VARIANCE || i_var <= FLAT_VARIANCE || denom <= 0.0 {
                0.0
            } else {
                let numerator = products[0] as f64 - t_sum * i_sum / n;
                (numerator / denom).clamp(-1.0, 1.0)
            };

            best = best.max(score as f32);
        }

        Some(best)
    }
}

/// Best zero-mean normalized cross-correlation of `template` over every
/// placement inside `image`.
///
/// Scores lie in `[-1, 1]`; flat windows or a flat template score 0.
/// Returns `None` when the template does not fit.
pub fn match_template_score(image: &GrayImage, template: &GrayImage) -> Option<f32> {
    ZoneStats::new(image).score(template)
}

/// Sum over the `w`x`h` window at (`x`, `y`) from a zero-padded integral image.
fn window_sum(table: &SumTable, x: u32, y: u32, w: u32, h: u32) -> f64 {
    let at = |px: u32, py: u32| table.get_pixel(px, py)[0] as i128;
    let total = at(x + w, y + h) - at(x, y + h) - at(x + w, y) + at(x, y);
    total as f64
}

/// Pick the best rank glyph for the rank zone and the best suit glyph for
/// the suit zone, independently.
///
/// Glyphs are scored in parallel. Ties keep the glyph that came first in
/// the library.
pub fn classify(corner: &CornerRegion, library: &ReferenceLibrary) -> Classification {
    let (rank, rank_score) = best_match(&corner.rank, library.ranks());
    let (suit, suit_score) = best_match(&corner.suit, library.suits());

    Classification {
        rank,
        suit,
        rank_score,
        suit_score,
    }
}

fn best_match<'a, S, I>(zone: &GrayImage, glyphs: I) -> (S, f32)
where
    S: Copy + Send + Sync,
    I: IntoIterator<Item = (S, &'a GrayImage)>,
{
    let stats = ZoneStats::new(zone);
    let glyphs: Vec<(S, &GrayImage)> = glyphs.into_iter().collect();
    let scored: Vec<(S, f32)> = glyphs
        .par_iter()
        .map(|&(symbol, glyph)| (symbol, stats.score(glyph).unwrap_or(-1.0)))
        .collect();

    let mut best: Option<(S, f32)> = None;
    for (symbol, score) in scored {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((symbol, score)),
        }
    }
    // Library construction guarantees at least one glyph per axis
    best.expect("reference library has no glyphs for this axis")
}
