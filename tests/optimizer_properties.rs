// this_file: tests/optimizer_properties.rs
//! Randomized checks of the font-size search against a linear scan

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use wallnote::{
    FixedAdvanceMeasurer, FontLoader, FontMeasurer, FontSizeOptimizer, FontWeight, LayoutConfig,
    Note, Typeface,
};

const GLYPHS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789.,;:!?'()-";

fn dejavu() -> Arc<Vec<u8>> {
    FontLoader::new()
        .load_font_data(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/testdata/fonts/DejaVuSans.ttf"
        ))
        .unwrap()
}

/// Notes of mixed-width characters; roughly one word in six is long enough
/// to be split across lines
fn random_mixed_notes(rng: &mut StdRng) -> Vec<Note> {
    let count = rng.random_range(0..8);
    (0..count)
        .map(|i| {
            let words = rng.random_range(1..7);
            let text = (0..words)
                .map(|_| {
                    let len = if rng.random_range(0..6) == 0 {
                        rng.random_range(16..32)
                    } else {
                        rng.random_range(1..9)
                    };
                    (0..len)
                        .map(|_| GLYPHS[rng.random_range(0..GLYPHS.len())] as char)
                        .collect::<String>()
                })
                .collect::<Vec<_>>()
                .join(" ");
            Note::new(i.to_string(), text)
        })
        .collect()
}

fn random_notes(rng: &mut StdRng) -> Vec<Note> {
    let count = rng.random_range(0..12);
    (0..count)
        .map(|i| {
            let words = rng.random_range(1..8);
            let text = (0..words)
                .map(|_| "w".repeat(rng.random_range(1..12)))
                .collect::<Vec<_>>()
                .join(" ");
            Note::new(i.to_string(), text)
        })
        .collect()
}

fn random_config(rng: &mut StdRng) -> LayoutConfig {
    let min = rng.random_range(4..40);
    let max = rng.random_range(min..min + 60);
    LayoutConfig {
        min_font_size: min,
        max_font_size: max,
        line_spacing_ratio: rng.random_range(0.0..0.3),
        note_separator_ratio: rng.random_range(0.0..0.6),
        ..LayoutConfig::default()
    }
}

#[test]
fn test_fit_predicate_is_monotonic() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0001);
    for _ in 0..200 {
        let notes = random_notes(&mut rng);
        let refs: Vec<&Note> = notes.iter().collect();
        let config = random_config(&mut rng);
        let height = rng.random_range(0.0..2000.0);
        let width = rng.random_range(50.0..1200.0);
        let opt = FontSizeOptimizer::new(FixedAdvanceMeasurer::default(), height, width, &config);

        let mut failed_at = None;
        for size in 1..=120 {
            let fits = opt.fits(&refs, size);
            if let Some(first) = failed_at {
                assert!(!fits, "fits at {} after failing at {}", size, first);
            } else if !fits {
                failed_at = Some(size);
            }
        }
    }
}

#[test]
fn test_binary_search_matches_linear_scan() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0002);
    for _ in 0..300 {
        let notes = random_notes(&mut rng);
        let refs: Vec<&Note> = notes.iter().collect();
        let config = random_config(&mut rng);
        let height = rng.random_range(0.0..1500.0);
        let width = rng.random_range(50.0..900.0);
        let opt = FontSizeOptimizer::new(FixedAdvanceMeasurer::default(), height, width, &config);

        let expected = (config.min_font_size..=config.max_font_size)
            .rev()
            .find(|&size| opt.fits(&refs, size))
            .unwrap_or(config.min_font_size);
        let found = opt.optimal_font_size(&refs);

        assert_eq!(found, expected, "min={} max={} height={}", config.min_font_size, config.max_font_size, height);
        assert!(found >= config.min_font_size && found <= config.max_font_size);
    }
}

#[test]
fn test_visible_notes_form_a_fitting_prefix() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0003);
    for _ in 0..200 {
        let notes = random_notes(&mut rng);
        let refs: Vec<&Note> = notes.iter().collect();
        let config = random_config(&mut rng);
        let height = rng.random_range(0.0..800.0);
        let width = rng.random_range(50.0..600.0);
        let opt = FontSizeOptimizer::new(FixedAdvanceMeasurer::default(), height, width, &config);

        let fit = opt.fit(&refs);
        assert!(fit.visible <= refs.len());
        assert!(opt.fits(&refs[..fit.visible], fit.font_size));
        if fit.visible < refs.len() {
            assert!(!opt.fits(&refs[..fit.visible + 1], fit.font_size));
        }
        if opt.fits(&refs, fit.font_size) {
            assert_eq!(fit.visible, refs.len());
        }
    }
}

#[test]
fn test_font_measurer_fit_is_monotonic() {
    let data = dejavu();
    let face = Typeface::new(&data, FontWeight::Regular).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5eed_0004);
    for _ in 0..40 {
        let notes = random_mixed_notes(&mut rng);
        let refs: Vec<&Note> = notes.iter().collect();
        let config = random_config(&mut rng);
        let height = rng.random_range(0.0..1500.0);
        let width = rng.random_range(40.0..900.0);
        let opt = FontSizeOptimizer::new(FontMeasurer::new(&face), height, width, &config);

        let mut failed_at = None;
        for size in 4..=120 {
            let fits = opt.fits(&refs, size);
            if let Some(first) = failed_at {
                assert!(!fits, "fits at {} after failing at {}: {:?}", size, first, notes);
            } else if !fits {
                failed_at = Some(size);
            }
        }
    }
}

#[test]
fn test_font_measurer_search_matches_linear_scan() {
    let data = dejavu();
    let face = Typeface::new(&data, FontWeight::Regular).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5eed_0005);
    for _ in 0..60 {
        let notes = random_mixed_notes(&mut rng);
        let refs: Vec<&Note> = notes.iter().collect();
        let config = random_config(&mut rng);
        let height = rng.random_range(0.0..1200.0);
        let width = rng.random_range(40.0..700.0);
        let opt = FontSizeOptimizer::new(FontMeasurer::new(&face), height, width, &config);

        let expected = (config.min_font_size..=config.max_font_size)
            .rev()
            .find(|&size| opt.fits(&refs, size))
            .unwrap_or(config.min_font_size);
        let fit = opt.fit(&refs);

        assert_eq!(fit.font_size, expected, "notes {:?} height {} width {}", notes, height, width);
        assert!(opt.fits(&refs[..fit.visible], fit.font_size));
        if fit.visible < refs.len() {
            assert!(!opt.fits(&refs[..fit.visible + 1], fit.font_size));
        }
    }
}
