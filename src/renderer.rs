// this_file: src/renderer.rs
//! Wallpaper rendering pipeline
//!
//! Geometry, font-size search, background compositing, tone selection, and
//! text drawing, run in that order. The query operations share the layout
//! step with rendering, so the note count they report is the count drawn.

use crate::background::{Background, BackgroundCompositor};
use crate::color::{ColorSelector, TextTone};
use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::font_loader::Typeface;
use crate::geometry::{self, SafeArea};
use crate::logging::Timer;
use crate::measure::FontMeasurer;
use crate::note::{eligible_notes, Note};
use crate::optimizer::FontSizeOptimizer;
use crate::rasterize::TextRasterizer;
use crate::styled_text::StyledTextBuilder;
use image::{ImageFormat, RgbaImage};
use log::info;
use std::io::Cursor;

/// Layout decided for one note sequence, before any pixels are drawn
#[derive(Debug, Clone, PartialEq)]
pub struct WallpaperLayout<'n> {
    /// Safe area the notes are placed in
    pub safe_area: SafeArea,
    /// Font size chosen for every note
    pub font_size: u32,
    /// Notes that passed the completed-note policy
    pub eligible: usize,
    /// Visible prefix of the eligible notes
    pub visible: Vec<&'n Note>,
}

/// A rendered wallpaper
#[derive(Debug, Clone)]
pub struct Wallpaper {
    /// Canvas-sized RGBA bitmap
    pub image: RgbaImage,
    /// Font size of the drawn notes; `None` when no text was drawn
    pub font_size: Option<u32>,
    /// Number of notes drawn
    pub notes_shown: usize,
    /// Tone of the drawn text; `None` when no text was drawn
    pub tone: Option<TextTone>,
}

impl Wallpaper {
    /// Encode the bitmap as PNG in memory
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

/// Renders note wallpapers for one canvas and typeface.
///
/// The renderer holds no mutable state; every call is a pure function of its
/// arguments and the configuration.
pub struct WallpaperRenderer<'t, 'a> {
    config: LayoutConfig,
    face: &'t Typeface<'a>,
    device_height_hint: Option<f64>,
}

impl<'t, 'a> WallpaperRenderer<'t, 'a> {
    /// Create a renderer after validating `config`.
    ///
    /// `face` must be instanced at `config.font_weight`, since every size
    /// decision is measured with it.
    pub fn new(config: LayoutConfig, face: &'t Typeface<'a>) -> Result<Self> {
        config.validate()?;
        if face.weight() != config.font_weight {
            return Err(Error::InvalidParameter(format!(
                "typeface weight {:?} does not match font_weight {:?}",
                face.weight(),
                config.font_weight
            )));
        }
        Ok(Self {
            config,
            face,
            device_height_hint: None,
        })
    }

    /// Physical screen height in points, used to pick the device bucket
    pub fn with_device_height_hint(mut self, hint: Option<f64>) -> Self {
        self.device_height_hint = hint;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Safe area for the configured canvas
    pub fn safe_area(&self, has_overlay_widgets: bool) -> SafeArea {
        geometry::resolve(
            self.config.canvas,
            has_overlay_widgets,
            self.device_height_hint,
            &self.config,
        )
    }

    /// Decide font size and visible notes without drawing
    pub fn layout<'n>(&self, notes: &'n [Note], has_overlay_widgets: bool) -> WallpaperLayout<'n> {
        let safe_area = self.safe_area(has_overlay_widgets);
        let eligible = eligible_notes(notes, self.config.completed_note_policy);

        let optimizer = FontSizeOptimizer::new(
            FontMeasurer::new(self.face),
            safe_area.available_height,
            safe_area.text_max_width,
            &self.config,
        );
        let fit = optimizer.fit(&eligible);

        let count = eligible.len();
        let mut visible = eligible;
        visible.truncate(fit.visible);

        WallpaperLayout {
            safe_area,
            font_size: fit.font_size,
            eligible: count,
            visible,
        }
    }

    /// Number of notes a render of `notes` would draw
    pub fn get_wallpaper_note_count(&self, notes: &[Note], has_overlay_widgets: bool) -> usize {
        self.layout(notes, has_overlay_widgets).visible.len()
    }

    /// Font size a render of `notes` would use
    pub fn get_font_size_for_notes(&self, notes: &[Note], has_overlay_widgets: bool) -> u32 {
        self.layout(notes, has_overlay_widgets).font_size
    }

    /// Background only, no text stage
    pub fn generate_blank_wallpaper(&self, background: &Background) -> Wallpaper {
        let _timer = Timer::new("generate_blank_wallpaper");
        Wallpaper {
            image: self.compositor().composite(background),
            font_size: None,
            notes_shown: 0,
            tone: None,
        }
    }

    /// Full pipeline: background, then as many notes as fit.
    ///
    /// An empty note list, or one where nothing fits, yields the background
    /// alone.
    pub fn generate_wallpaper(
        &self,
        notes: &[Note],
        background: &Background,
        has_overlay_widgets: bool,
    ) -> Wallpaper {
        let _timer = Timer::new("generate_wallpaper");
        let layout = self.layout(notes, has_overlay_widgets);
        let mut image = self.compositor().composite(background);

        if layout.visible.is_empty() {
            info!(
                "No notes to draw ({} eligible of {}), rendering background only",
                layout.eligible,
                notes.len()
            );
            return Wallpaper {
                image,
                font_size: None,
                notes_shown: 0,
                tone: None,
            };
        }

        let safe_area = layout.safe_area;
        let tone = ColorSelector::new(&self.config).pick_tone(
            background,
            self.config.canvas,
            &safe_area,
        );
        let runs = StyledTextBuilder::new(&self.config).build(
            &layout.visible,
            layout.font_size,
            tone,
            background.has_photo(),
        );
        let drawn = TextRasterizer::new(self.face).draw(
            &mut image,
            &runs,
            safe_area.horizontal_padding,
            safe_area.top_padding,
            safe_area.text_max_width,
        );

        info!(
            "Rendered {} of {} notes at {}px ({:?} text, block {:.1} of {:.1}px)",
            layout.visible.len(),
            layout.eligible,
            layout.font_size,
            tone,
            drawn,
            safe_area.available_height
        );

        Wallpaper {
            image,
            font_size: Some(layout.font_size),
            notes_shown: layout.visible.len(),
            tone: Some(tone),
        }
    }

    fn compositor(&self) -> BackgroundCompositor {
        BackgroundCompositor::new(self.config.canvas, self.config.overlay_opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::config::{CanvasSize, FontWeight};
    use crate::font_loader::FontLoader;
    use image::Rgba;

    fn dejavu() -> std::sync::Arc<Vec<u8>> {
        FontLoader::new()
            .load_font_data(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/testdata/fonts/DejaVuSans.ttf"
            ))
            .unwrap()
    }

    fn small_config() -> LayoutConfig {
        LayoutConfig {
            canvas: CanvasSize::new(258, 560),
            max_font_size: 40,
            min_font_size: 10,
            font_weight: FontWeight::Regular,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let data = dejavu();
        let face = Typeface::new(&data, FontWeight::Regular).unwrap();
        let config = LayoutConfig {
            min_font_size: 50,
            max_font_size: 40,
            ..LayoutConfig::default()
        };
        assert!(WallpaperRenderer::new(config, &face).is_err());
    }

    #[test]
    fn test_new_rejects_face_of_another_weight() {
        let data = dejavu();
        let face = Typeface::new(&data, FontWeight::Regular).unwrap();
        let heavy = LayoutConfig {
            font_weight: FontWeight::Heavy,
            ..small_config()
        };

        let err = WallpaperRenderer::new(heavy, &face).err().unwrap();
        assert!(matches!(err, Error::InvalidParameter(_)));
        assert!(err.to_string().contains("Heavy"));
        assert!(WallpaperRenderer::new(small_config(), &face).is_ok());
    }

    #[test]
    fn test_layout_matches_queries() {
        let data = dejavu();
        let face = Typeface::new(&data, FontWeight::Regular).unwrap();
        let renderer = WallpaperRenderer::new(small_config(), &face).unwrap();
        let notes: Vec<Note> = (0..12)
            .map(|i| Note::new(i.to_string(), format!("Reminder number {} for today", i)))
            .collect();

        let layout = renderer.layout(&notes, true);
        assert_eq!(layout.eligible, 12);
        assert_eq!(renderer.get_wallpaper_note_count(&notes, true), layout.visible.len());
        assert_eq!(renderer.get_font_size_for_notes(&notes, true), layout.font_size);
        assert!(layout.font_size >= 10 && layout.font_size <= 40);
    }

    #[test]
    fn test_blank_wallpaper_is_background_only() {
        let data = dejavu();
        let face = Typeface::new(&data, FontWeight::Regular).unwrap();
        let renderer = WallpaperRenderer::new(small_config(), &face).unwrap();
        let wallpaper = renderer.generate_blank_wallpaper(&Background::Solid(Color::rgb(40, 80, 120)));

        assert_eq!(wallpaper.image.dimensions(), (258, 560));
        assert_eq!(wallpaper.notes_shown, 0);
        assert!(wallpaper.font_size.is_none());
        assert!(wallpaper
            .image
            .pixels()
            .all(|px| *px == Rgba([40, 80, 120, 255])));
    }

    #[test]
    fn test_png_encoding() {
        let data = dejavu();
        let face = Typeface::new(&data, FontWeight::Regular).unwrap();
        let renderer = WallpaperRenderer::new(small_config(), &face).unwrap();
        let notes = vec![Note::new("1", "Buy milk")];
        let wallpaper = renderer.generate_wallpaper(&notes, &Background::Solid(Color::BLACK), false);

        let png = wallpaper.to_png_bytes().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded, wallpaper.image);
    }
}
