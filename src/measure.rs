// this_file: src/measure.rs
//! Text block measurement

use crate::font_loader::Typeface;
use crate::shaping::{block_height, wrap_text, TextShaper};

/// Measures the wrapped height of a single note.
///
/// Implementations must be deterministic and non-decreasing in `font_size`
/// for fixed text and width; the font-size search relies on it.
pub trait TextMeasurer {
    /// Height of `text` wrapped to `max_width` at `font_size`
    fn measure(&self, text: &str, font_size: f32, max_width: f32, line_spacing: f32) -> f32;
}

/// Measurement backed by real font metrics
pub struct FontMeasurer<'t, 'a> {
    shaper: TextShaper<'t, 'a>,
}

impl<'t, 'a> FontMeasurer<'t, 'a> {
    /// Create a measurer for the given typeface
    pub fn new(face: &'t Typeface<'a>) -> Self {
        Self {
            shaper: TextShaper::new(face),
        }
    }
}

impl TextMeasurer for FontMeasurer<'_, '_> {
    fn measure(&self, text: &str, font_size: f32, max_width: f32, line_spacing: f32) -> f32 {
        self.shaper
            .shape(text, font_size, max_width, line_spacing)
            .height()
    }
}

/// Approximate measurement with a uniform advance per character.
///
/// Useful when no font is available, and as a predictable backend in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvanceMeasurer {
    /// Advance of every character as a fraction of font size
    pub advance_ratio: f32,
    /// Line height as a fraction of font size
    pub line_height_ratio: f32,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self {
            advance_ratio: 0.6,
            line_height_ratio: 1.2,
        }
    }
}

impl FixedAdvanceMeasurer {
    /// Number of wrapped lines for `text`
    pub fn line_count(&self, text: &str, font_size: f32, max_width: f32) -> usize {
        let advance = font_size * self.advance_ratio;
        wrap_text(text, max_width, |_| advance).len()
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure(&self, text: &str, font_size: f32, max_width: f32, line_spacing: f32) -> f32 {
        let lines = self.line_count(text, font_size, max_width);
        block_height(lines, font_size * self.line_height_ratio, line_spacing)
    }
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    fn measure(&self, text: &str, font_size: f32, max_width: f32, line_spacing: f32) -> f32 {
        (**self).measure(text, font_size, max_width, line_spacing)
    }
}
