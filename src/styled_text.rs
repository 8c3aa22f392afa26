// this_file: src/styled_text.rs
//! Styled text runs: the plain-data description of what gets drawn
//!
//! Each visible note becomes one paragraph. Layout code fills these records
//! in and the rasterizer consumes them; neither side touches the other's
//! internals.

use crate::color::{Color, TextTone};
use crate::config::{FontWeight, LayoutConfig};
use crate::note::Note;

/// Drop shadow attached to a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSpec {
    /// Shadow color including opacity
    pub color: Color,
    /// Horizontal offset in pixels
    pub offset_x: f32,
    /// Vertical offset in pixels (positive is down)
    pub offset_y: f32,
    /// Blur radius in pixels
    pub blur_radius: f32,
}

/// One paragraph of uniformly styled text
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    pub text: String,
    pub font_size: f32,
    pub weight: FontWeight,
    pub color: Color,
    pub strikethrough: bool,
    /// Bar color; the text color when `None`
    pub strikethrough_color: Option<Color>,
    pub shadow: Option<ShadowSpec>,
    /// Vertical gap above this paragraph
    pub paragraph_spacing_before: f32,
    /// Extra gap between wrapped lines
    pub line_spacing: f32,
}

/// Turns visible notes into styled runs
pub struct StyledTextBuilder<'c> {
    config: &'c LayoutConfig,
}

impl<'c> StyledTextBuilder<'c> {
    /// Create a builder using the ratios and opacities of `config`
    pub fn new(config: &'c LayoutConfig) -> Self {
        Self { config }
    }

    /// Shadow for text of `tone` at `font_size`
    pub fn shadow(&self, tone: TextTone, font_size: f32) -> ShadowSpec {
        let (offset_x, offset_y) = self.config.shadow_offset;
        ShadowSpec {
            color: tone.shadow_color(self.config.shadow_opacity),
            offset_x,
            offset_y,
            blur_radius: font_size * self.config.shadow_blur_ratio,
        }
    }

    /// One run per note, in order.
    ///
    /// Completed notes are dimmed and struck through. Shadows are only
    /// attached over photos.
    pub fn build(
        &self,
        notes: &[&Note],
        font_size: u32,
        tone: TextTone,
        has_photo: bool,
    ) -> Vec<StyledRun> {
        let size = font_size as f32;
        let line_spacing = self.config.line_spacing(size);
        let separator = self.config.note_separator(size);
        let shadow = has_photo.then(|| self.shadow(tone, size));

        notes
            .iter()
            .enumerate()
            .map(|(index, note)| {
                let (color, strikethrough_color) = if note.is_completed {
                    let dimmed = tone.color().with_opacity(self.config.completed_opacity);
                    (dimmed, Some(dimmed))
                } else {
                    (tone.color(), None)
                };
                StyledRun {
                    text: note.text.clone(),
                    font_size: size,
                    weight: self.config.font_weight,
                    color,
                    strikethrough: note.is_completed,
                    strikethrough_color,
                    shadow,
                    paragraph_spacing_before: if index > 0 { separator } else { 0.0 },
                    line_spacing,
                }
            })
            .collect()
    }
}
