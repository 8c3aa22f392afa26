// this_file: src/rasterize.rs
//! CPU text rasterization using skrifa and zeno
//!
//! Every styled run is shaped, its glyph outlines are collected into one
//! path, and the path is filled into an alpha mask covering the paragraph.
//! The mask is then blended onto the canvas: first blurred and offset for the
//! shadow, then as the text itself.

use crate::color::{blend_over, Color};
use crate::font_loader::Typeface;
use crate::shaping::{ShapedParagraph, TextShaper};
use crate::styled_text::StyledRun;
use image::{imageops, GrayImage, RgbaImage};
use log::{trace, warn};
use skrifa::instance::Size;
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::MetadataProvider;
use zeno::{Command, Mask};

/// Coverage mask for one paragraph, positioned in canvas pixels
struct CoverageMask {
    left: i64,
    top: i64,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CoverageMask {
    fn new(left: i64, top: i64, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    /// Merge a zeno render into this mask, keeping the stronger coverage
    fn merge(&mut self, data: &[u8], placement: zeno::Placement) {
        for my in 0..placement.height {
            let y = placement.top + my as i32;
            if y < 0 || y as u32 >= self.height {
                continue;
            }
            for mx in 0..placement.width {
                let x = placement.left + mx as i32;
                if x < 0 || x as u32 >= self.width {
                    continue;
                }
                let src = data[(my * placement.width + mx) as usize];
                let dst = &mut self.data[(y as u32 * self.width + x as u32) as usize];
                *dst = (*dst).max(src);
            }
        }
    }

    /// Fill an axis-aligned rectangle given in mask-local pixels
    fn fill_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        let col0 = x0.floor().max(0.0) as u32;
        let col1 = (x1.ceil().max(0.0) as u32).min(self.width);
        let row0 = y0.floor().max(0.0) as u32;
        let row1 = (y1.ceil().max(0.0) as u32).min(self.height);
        for row in row0..row1 {
            // Partial rows at the bar edges
            let cover_y = (y1.min(row as f32 + 1.0) - y0.max(row as f32)).clamp(0.0, 1.0);
            for col in col0..col1 {
                let cover_x = (x1.min(col as f32 + 1.0) - x0.max(col as f32)).clamp(0.0, 1.0);
                let value = (cover_x * cover_y * 255.0).round() as u8;
                let dst = &mut self.data[(row * self.width + col) as usize];
                *dst = (*dst).max(value);
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.data.iter().all(|&a| a == 0)
    }

    /// Blend the mask onto `canvas` in `color`, shifted by (dx, dy)
    fn paint(&self, canvas: &mut RgbaImage, color: Color, dx: i64, dy: i64) {
        let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
        for my in 0..self.height {
            let y = self.top + dy + my as i64;
            if y < 0 || y >= ch {
                continue;
            }
            for mx in 0..self.width {
                let x = self.left + dx + mx as i64;
                if x < 0 || x >= cw {
                    continue;
                }
                let coverage = self.data[(my * self.width + mx) as usize];
                if coverage == 0 {
                    continue;
                }
                blend_over(
                    canvas.get_pixel_mut(x as u32, y as u32),
                    color,
                    coverage as f32 / 255.0,
                );
            }
        }
    }

    /// Gaussian-blurred copy, grown by `pad` pixels on every side
    fn blurred(&self, sigma: f32, pad: u32) -> CoverageMask {
        let width = self.width + 2 * pad;
        let height = self.height + 2 * pad;
        let mut padded = GrayImage::new(width, height);
        for my in 0..self.height {
            for mx in 0..self.width {
                let a = self.data[(my * self.width + mx) as usize];
                padded.put_pixel(mx + pad, my + pad, image::Luma([a]));
            }
        }
        let blurred = if sigma > 0.0 {
            imageops::blur(&padded, sigma)
        } else {
            padded
        };
        CoverageMask {
            left: self.left - pad as i64,
            top: self.top - pad as i64,
            width,
            height,
            data: blurred.into_raw(),
        }
    }
}

/// Draws styled runs onto a canvas with one typeface
pub struct TextRasterizer<'t, 'a> {
    face: &'t Typeface<'a>,
}

impl<'t, 'a> TextRasterizer<'t, 'a> {
    /// Create a rasterizer for `face`
    pub fn new(face: &'t Typeface<'a>) -> Self {
        Self { face }
    }

    /// Draw `runs` top-down starting at (`origin_x`, `origin_y`), wrapping
    /// each paragraph to `max_width`.
    ///
    /// Returns the height of the drawn block.
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        runs: &[StyledRun],
        origin_x: f32,
        origin_y: f32,
        max_width: f32,
    ) -> f32 {
        let shaper = TextShaper::new(self.face);
        let mut y = origin_y;

        for run in runs {
            if run.weight != self.face.weight() {
                warn!(
                    "Run wants weight {:?}, drawing with the {:?} face",
                    run.weight,
                    self.face.weight()
                );
            }
            y += run.paragraph_spacing_before;
            let paragraph = shaper.shape(&run.text, run.font_size, max_width, run.line_spacing);
            let mask = self.paragraph_mask(&paragraph, run, origin_x, y, max_width);

            if !mask.is_empty() {
                if let Some(shadow) = run.shadow {
                    let sigma = shadow.blur_radius / 2.0;
                    let pad = (sigma * 3.0).ceil() as u32;
                    mask.blurred(sigma, pad).paint(
                        canvas,
                        shadow.color,
                        shadow.offset_x.round() as i64,
                        shadow.offset_y.round() as i64,
                    );
                }
                mask.paint(canvas, run.color, 0, 0);
            }

            if run.strikethrough {
                let color = run.strikethrough_color.unwrap_or(run.color);
                let bars = self.strike_mask(&paragraph, origin_x, y, max_width);
                if color != run.color || mask.is_empty() {
                    bars.paint(canvas, color, 0, 0);
                } else {
                    // Same color: only add coverage the glyphs lack
                    let mut extra = bars;
                    for (bar, text) in extra.data.iter_mut().zip(&mask.data) {
                        *bar = bar.saturating_sub(*text);
                    }
                    extra.paint(canvas, color, 0, 0);
                }
            }

            if cfg!(debug_assertions) {
                trace!(
                    "Drew paragraph of {} lines at y={:.1} (height {:.1})",
                    paragraph.lines.len(),
                    y,
                    paragraph.height()
                );
            }
            y += paragraph.height();
        }

        y - origin_y
    }

    /// Bounding box of a paragraph in canvas pixels, with room for glyph
    /// overhang on either side
    fn paragraph_box(
        &self,
        paragraph: &ShapedParagraph,
        origin_x: f32,
        top: f32,
        max_width: f32,
    ) -> CoverageMask {
        let overhang = (paragraph.metrics.ascent * 0.5).ceil().max(1.0);
        let widest = paragraph
            .lines
            .iter()
            .map(|l| l.width)
            .fold(max_width, f32::max);
        let left = (origin_x - overhang).floor() as i64;
        let box_top = (top - overhang).floor() as i64;
        let width = (widest + 2.0 * overhang).ceil() as u32 + 1;
        let height = (paragraph.height() + 2.0 * overhang).ceil() as u32 + 1;
        CoverageMask::new(left, box_top, width, height)
    }

    fn paragraph_mask(
        &self,
        paragraph: &ShapedParagraph,
        run: &StyledRun,
        origin_x: f32,
        top: f32,
        max_width: f32,
    ) -> CoverageMask {
        let mut mask = self.paragraph_box(paragraph, origin_x, top, max_width);
        let font = self.face.font();
        let outlines = font.outline_glyphs();
        let settings = || DrawSettings::unhinted(Size::new(run.font_size), self.face.location());

        let mut commands = Vec::new();
        let line_step = paragraph.metrics.line_height() + paragraph.line_spacing;
        let origin_x = origin_x - mask.left as f32;
        let top = top - mask.top as f32;

        for (index, line) in paragraph.lines.iter().enumerate() {
            let baseline = top + index as f32 * line_step + paragraph.metrics.ascent;
            for glyph in &line.glyphs {
                let Some(outline) = outlines.get(glyph.glyph_id) else {
                    warn!("Glyph ID {} not found in font", glyph.glyph_id);
                    continue;
                };
                let mut pen = ZenoPen::new(&mut commands, origin_x + glyph.x, baseline - glyph.y);
                if let Err(e) = outline.draw(settings(), &mut pen) {
                    warn!("Failed to draw glyph {}: {}", glyph.glyph_id, e);
                }
            }
        }

        if commands.is_empty() {
            return mask;
        }
        let mut zeno_mask = Mask::new(&commands);
        zeno_mask.size(mask.width, mask.height);
        let (data, placement) = zeno_mask.render();
        mask.merge(&data, placement);
        mask
    }

    fn strike_mask(
        &self,
        paragraph: &ShapedParagraph,
        origin_x: f32,
        top: f32,
        max_width: f32,
    ) -> CoverageMask {
        let mut mask = self.paragraph_box(paragraph, origin_x, top, max_width);
        let metrics = paragraph.metrics;
        let line_step = metrics.line_height() + paragraph.line_spacing;
        let x0 = origin_x - mask.left as f32;
        let top = top - mask.top as f32;

        for (index, line) in paragraph.lines.iter().enumerate() {
            if line.glyphs.is_empty() {
                continue;
            }
            let baseline = top + index as f32 * line_step + metrics.ascent;
            let bar_top = baseline - metrics.strikeout_offset;
            mask.fill_rect(x0, bar_top, x0 + line.width, bar_top + metrics.strikeout_thickness);
        }
        mask
    }
}

/// Outline pen that appends zeno commands, flipping Y and moving the glyph
/// origin to (`dx`, `baseline`)
struct ZenoPen<'p> {
    commands: &'p mut Vec<Command>,
    dx: f32,
    baseline: f32,
}

impl<'p> ZenoPen<'p> {
    fn new(commands: &'p mut Vec<Command>, dx: f32, baseline: f32) -> Self {
        Self {
            commands,
            dx,
            baseline,
        }
    }

    fn point(&self, x: f32, y: f32) -> zeno::Vector {
        [x + self.dx, self.baseline - y].into()
    }
}

impl OutlinePen for ZenoPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.commands.push(Command::MoveTo(p));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.commands.push(Command::LineTo(p));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let c = self.point(cx0, cy0);
        let p = self.point(x, y);
        self.commands.push(Command::QuadTo(c, p));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let c0 = self.point(cx0, cy0);
        let c1 = self.point(cx1, cy1);
        let p = self.point(x, y);
        self.commands.push(Command::CurveTo(c0, c1, p));
    }

    fn close(&mut self) {
        self.commands.push(Command::Close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::TextTone;
    use crate::config::{FontWeight, LayoutConfig};
    use crate::font_loader::FontLoader;
    use crate::note::Note;
    use crate::styled_text::StyledTextBuilder;
    use image::Rgba;

    fn dejavu() -> std::sync::Arc<Vec<u8>> {
        FontLoader::new()
            .load_font_data(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/testdata/fonts/DejaVuSans.ttf"
            ))
            .unwrap()
    }

    fn black_canvas() -> RgbaImage {
        RgbaImage::from_pixel(400, 300, Rgba([0, 0, 0, 255]))
    }

    fn lit_pixels(canvas: &RgbaImage) -> usize {
        canvas.pixels().filter(|px| px[0] > 0).count()
    }

    #[test]
    fn test_draws_text_inside_origin_box() {
        let data = dejavu();
        let face = Typeface::new(&data, FontWeight::Regular).unwrap();
        let config = LayoutConfig::default();
        let note = Note::new("1", "Hello");
        let runs = StyledTextBuilder::new(&config).build(&[&note], 40, TextTone::Light, false);

        let mut canvas = black_canvas();
        let height = TextRasterizer::new(&face).draw(&mut canvas, &runs, 20.0, 30.0, 360.0);

        // One DejaVu line at 40px
        assert!((height - 40.0 * 2384.0 / 2048.0).abs() < 0.01);
        assert!(lit_pixels(&canvas) > 100);
        for (x, y, px) in canvas.enumerate_pixels() {
            if px[0] > 0 {
                assert!(x >= 18 && x < 380, "ink at x={}", x);
                assert!(y >= 28 && (y as f32) < 30.0 + height + 2.0, "ink at y={}", y);
            }
        }
    }

    #[test]
    fn test_block_height_matches_measurement() {
        let data = dejavu();
        let face = Typeface::new(&data, FontWeight::Regular).unwrap();
        let config = LayoutConfig::default();
        let a = Note::new("1", "Water the plants before the trip");
        let b = Note::new("2", "Call mom");
        let runs = StyledTextBuilder::new(&config).build(&[&a, &b], 30, TextTone::Light, false);

        let mut canvas = black_canvas();
        let drawn = TextRasterizer::new(&face).draw(&mut canvas, &runs, 10.0, 10.0, 200.0);

        let shaper = TextShaper::new(&face);
        let expected = shaper.shape(&a.text, 30.0, 200.0, runs[0].line_spacing).height()
            + runs[1].paragraph_spacing_before
            + shaper.shape(&b.text, 30.0, 200.0, runs[1].line_spacing).height();
        assert!((drawn - expected).abs() < 1e-3);
    }

    #[test]
    fn test_strikethrough_draws_bar_across_spaces() {
        let data = dejavu();
        let face = Typeface::new(&data, FontWeight::Regular).unwrap();
        let config = LayoutConfig {
            completed_opacity: 1.0,
            ..LayoutConfig::default()
        };
        let done = Note::completed("1", "a          b");
        let active = Note::new("1", "a          b");
        let builder = StyledTextBuilder::new(&config);

        let mut struck = black_canvas();
        let mut plain = black_canvas();
        let raster = TextRasterizer::new(&face);
        raster.draw(&mut struck, &builder.build(&[&done], 40, TextTone::Light, false), 10.0, 10.0, 380.0);
        raster.draw(&mut plain, &builder.build(&[&active], 40, TextTone::Light, false), 10.0, 10.0, 380.0);

        assert!(lit_pixels(&struck) > lit_pixels(&plain));
        // The run of spaces after "a" is only inked by the bar
        let gap_x = 100;
        let column_lit = (0..struck.height()).any(|y| struck.get_pixel(gap_x, y)[0] > 0);
        let plain_lit = (0..plain.height()).any(|y| plain.get_pixel(gap_x, y)[0] > 0);
        assert!(column_lit);
        assert!(!plain_lit);
    }

    #[test]
    fn test_shadow_spreads_beyond_glyphs() {
        let data = dejavu();
        let face = Typeface::new(&data, FontWeight::Regular).unwrap();
        let config = LayoutConfig {
            shadow_opacity: 1.0,
            ..LayoutConfig::default()
        };
        let note = Note::new("1", "Shadow");
        let builder = StyledTextBuilder::new(&config);
        let raster = TextRasterizer::new(&face);

        // Dark text with a white shadow on a black canvas
        let mut with_shadow = black_canvas();
        raster.draw(&mut with_shadow, &builder.build(&[&note], 40, TextTone::Dark, true), 20.0, 20.0, 360.0);
        let mut without = black_canvas();
        raster.draw(&mut without, &builder.build(&[&note], 40, TextTone::Dark, false), 20.0, 20.0, 360.0);

        assert!(lit_pixels(&with_shadow) > lit_pixels(&without));
    }

    #[test]
    fn test_no_runs_leaves_canvas_untouched() {
        let data = dejavu();
        let face = Typeface::new(&data, FontWeight::Regular).unwrap();
        let mut canvas = black_canvas();
        let height = TextRasterizer::new(&face).draw(&mut canvas, &[], 0.0, 0.0, 100.0);
        assert_eq!(height, 0.0);
        assert_eq!(lit_pixels(&canvas), 0);
    }
}
