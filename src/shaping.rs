// this_file: src/shaping.rs
//! Text shaping and line wrapping
//!
//! Each hard line is shaped with rustybuzz, so kerning, ligatures and mark
//! positioning come from the font. Glyphs sharing a cluster are kept
//! together and wrapped greedily at whitespace clusters; words wider than the
//! line are split between clusters. When rustybuzz cannot parse the face,
//! glyphs are positioned by cmap lookup and horizontal advances instead.
//! Measurement and drawing both go through [`TextShaper`], so a measured block
//! is exactly the block drawn.

use crate::font_loader::Typeface;
use log::warn;
use rustybuzz::ttf_parser::Tag as HbTag;
use rustybuzz::{Direction, Face as HbFace, UnicodeBuffer, Variation};
use skrifa::instance::Size;
use skrifa::{GlyphId, MetadataProvider};

/// A wrapped line expressed as a byte range of the source text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineBreak {
    /// Byte offset of the first character on the line
    pub start: usize,
    /// Byte offset one past the last character on the line
    pub end: usize,
    /// Advance width of the line
    pub width: f32,
}

/// Wrap `text` into lines no wider than `max_width`, giving every character
/// its own advance.
///
/// Explicit `\n` always starts a new line. Whitespace at a break is dropped.
/// A line holds at least one character, even when that character alone is
/// wider than `max_width`. Empty text produces a single empty line.
pub fn wrap_text(text: &str, max_width: f32, advance: impl Fn(char) -> f32) -> Vec<LineBreak> {
    let mut lines = Vec::new();

    for (base, line) in hard_lines(text) {
        let clusters: Vec<Cluster> = line
            .char_indices()
            .map(|(idx, ch)| Cluster {
                start: base + idx,
                end: base + idx + ch.len_utf8(),
                advance: advance(ch),
                is_space: ch.is_whitespace(),
                first_glyph: 0,
                glyph_end: 0,
            })
            .collect();

        let spans = wrap_clusters(&clusters, max_width);
        if spans.is_empty() {
            lines.push(LineBreak {
                start: base,
                end: base,
                width: 0.0,
            });
        }
        lines.extend(spans.iter().map(|span| LineBreak {
            start: clusters[span.first].start,
            end: clusters[span.end - 1].end,
            width: span.width,
        }));
    }

    lines
}

/// Lines split at `\n` with a trailing `\r` removed, paired with their byte
/// offset in `text`
fn hard_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('\n').scan(0, |offset, line| {
        let base = *offset;
        *offset += line.len() + 1;
        Some((base, line.strip_suffix('\r').unwrap_or(line)))
    })
}

/// Glyphs that must stay together on one line
#[derive(Debug, Clone, Copy)]
struct Cluster {
    /// Byte range of the source text
    start: usize,
    end: usize,
    advance: f32,
    is_space: bool,
    /// Range into the glyph list of the hard line
    first_glyph: usize,
    glyph_end: usize,
}

/// A shaped glyph with its offsets, in pixels
#[derive(Debug, Clone, Copy)]
struct ShapedGlyph {
    glyph_id: GlyphId,
    advance: f32,
    x_offset: f32,
    y_offset: f32,
}

/// Clusters `first..end` laid out on one line
#[derive(Debug, Clone, Copy)]
struct Span {
    first: usize,
    end: usize,
    width: f32,
}

/// Word with the width of the whitespace that precedes it
struct Word {
    first: usize,
    end: usize,
    width: f32,
    space_before: f32,
}

fn split_words(clusters: &[Cluster]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut space = 0.0;
    let mut current: Option<Word> = None;

    for (index, cluster) in clusters.iter().enumerate() {
        if cluster.is_space {
            if let Some(word) = current.take() {
                words.push(word);
                space = 0.0;
            }
            space += cluster.advance;
            continue;
        }
        match current.as_mut() {
            Some(word) => {
                word.end = index + 1;
                word.width += cluster.advance;
            }
            None => {
                current = Some(Word {
                    first: index,
                    end: index + 1,
                    width: cluster.advance,
                    space_before: space,
                });
            }
        }
    }
    if let Some(word) = current {
        words.push(word);
    }
    words
}

/// Greedy wrap of one hard line. Returns no spans when the line holds only
/// whitespace.
fn wrap_clusters(clusters: &[Cluster], max_width: f32) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut current: Option<Span> = None;

    for word in split_words(clusters) {
        if let Some(open) = current.as_mut() {
            if open.width + word.space_before + word.width <= max_width {
                open.end = word.end;
                open.width += word.space_before + word.width;
                continue;
            }
        }
        if let Some(done) = current.take() {
            spans.push(done);
        }

        if word.width <= max_width {
            current = Some(Span {
                first: word.first,
                end: word.end,
                width: word.width,
            });
        } else {
            current = Some(break_word(clusters, &word, max_width, &mut spans));
        }
    }

    spans.extend(current);
    spans
}

/// Split an over-long word between clusters; returns the trailing piece so
/// following words can join it.
fn break_word(clusters: &[Cluster], word: &Word, max_width: f32, spans: &mut Vec<Span>) -> Span {
    let mut piece = Span {
        first: word.first,
        end: word.first,
        width: 0.0,
    };

    for index in word.first..word.end {
        let advance = clusters[index].advance;
        if piece.end > piece.first && piece.width + advance > max_width {
            spans.push(piece);
            piece = Span {
                first: index,
                end: index,
                width: 0.0,
            };
        }
        piece.end = index + 1;
        piece.width += advance;
    }
    piece
}

/// A glyph placed on a line, x relative to the line start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedGlyph {
    /// Glyph identifier in the font
    pub glyph_id: GlyphId,
    /// Horizontal pen position, including the glyph's own offset
    pub x: f32,
    /// Vertical offset above the baseline
    pub y: f32,
}

/// One wrapped line of positioned glyphs
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedLine {
    pub glyphs: Vec<PositionedGlyph>,
    pub width: f32,
}

/// Vertical font metrics at one pixel size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Distance from line top to baseline
    pub ascent: f32,
    /// Baseline to line bottom (negative, below baseline)
    pub descent: f32,
    /// Extra gap recommended by the font
    pub leading: f32,
    /// Strikeout bar offset above the baseline
    pub strikeout_offset: f32,
    /// Strikeout bar thickness
    pub strikeout_thickness: f32,
}

impl LineMetrics {
    /// Height of a single line of text
    pub fn line_height(&self) -> f32 {
        self.ascent - self.descent + self.leading
    }
}

/// A paragraph wrapped into lines at a fixed size
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedParagraph {
    pub lines: Vec<ShapedLine>,
    pub metrics: LineMetrics,
    pub line_spacing: f32,
}

impl ShapedParagraph {
    /// Total height: every line plus the spacing between lines
    pub fn height(&self) -> f32 {
        block_height(self.lines.len(), self.metrics.line_height(), self.line_spacing)
    }
}

/// Height of `lines` stacked lines
pub fn block_height(lines: usize, line_height: f32, line_spacing: f32) -> f32 {
    if lines == 0 {
        return 0.0;
    }
    lines as f32 * line_height + (lines - 1) as f32 * line_spacing
}

/// Maps text onto positioned glyphs of a typeface
pub struct TextShaper<'t, 'a> {
    face: &'t Typeface<'a>,
    engine: Option<HbFace<'a>>,
}

impl<'t, 'a> TextShaper<'t, 'a> {
    /// Create a shaper for the given typeface
    pub fn new(face: &'t Typeface<'a>) -> Self {
        let engine = HbFace::from_slice(face.data(), 0).map(|mut engine| {
            if !face.location().coords().is_empty() {
                engine.set_variations(&[Variation {
                    tag: HbTag::from_bytes(b"wght"),
                    value: face.weight().value(),
                }]);
            }
            engine
        });
        if engine.is_none() {
            warn!("Shaping engine rejected the font, positioning glyphs by advance only");
        }
        Self { face, engine }
    }

    /// Shaper that skips rustybuzz and positions glyphs by advance
    #[cfg(test)]
    fn advances_only(face: &'t Typeface<'a>) -> Self {
        Self { face, engine: None }
    }

    /// Vertical metrics at a pixel size
    pub fn line_metrics(&self, font_size: f32) -> LineMetrics {
        let metrics = self
            .face
            .font()
            .metrics(Size::new(font_size), self.face.location());
        let (strikeout_offset, strikeout_thickness) = match metrics.strikeout {
            Some(deco) if deco.thickness > 0.0 => (deco.offset, deco.thickness),
            _ => (font_size * 0.3, font_size * 0.06),
        };
        LineMetrics {
            ascent: metrics.ascent,
            descent: metrics.descent,
            leading: metrics.leading,
            strikeout_offset,
            strikeout_thickness,
        }
    }

    /// Shape, wrap and position `text` at `font_size` within `max_width`
    pub fn shape(
        &self,
        text: &str,
        font_size: f32,
        max_width: f32,
        line_spacing: f32,
    ) -> ShapedParagraph {
        let mut lines = Vec::new();

        for (base, line) in hard_lines(text) {
            let (clusters, glyphs) = match &self.engine {
                Some(engine) => shape_with_engine(engine, line, base, font_size),
                None => self.shape_with_advances(line, base, font_size),
            };

            let spans = wrap_clusters(&clusters, max_width);
            if spans.is_empty() {
                lines.push(ShapedLine {
                    glyphs: Vec::new(),
                    width: 0.0,
                });
            }
            for span in spans {
                lines.push(place_line(&clusters[span.first..span.end], &glyphs, span.width));
            }
        }

        ShapedParagraph {
            lines,
            metrics: self.line_metrics(font_size),
            line_spacing,
        }
    }

    /// One cluster per character, positioned by cmap lookup and advance
    fn shape_with_advances(
        &self,
        line: &str,
        base: usize,
        font_size: f32,
    ) -> (Vec<Cluster>, Vec<ShapedGlyph>) {
        let font = self.face.font();
        let charmap = font.charmap();
        let glyph_metrics = font.glyph_metrics(Size::new(font_size), self.face.location());

        let mut clusters = Vec::new();
        let mut glyphs = Vec::new();
        for (idx, ch) in line.char_indices() {
            let glyph_id = charmap.map(ch).unwrap_or(GlyphId::NOTDEF);
            let advance = glyph_metrics.advance_width(glyph_id).unwrap_or(0.0);
            clusters.push(Cluster {
                start: base + idx,
                end: base + idx + ch.len_utf8(),
                advance,
                is_space: ch.is_whitespace(),
                first_glyph: glyphs.len(),
                glyph_end: glyphs.len() + 1,
            });
            glyphs.push(ShapedGlyph {
                glyph_id,
                advance,
                x_offset: 0.0,
                y_offset: 0.0,
            });
        }
        (clusters, glyphs)
    }
}

/// Shape one hard line with rustybuzz and group its glyphs by cluster
fn shape_with_engine(
    engine: &HbFace<'_>,
    line: &str,
    base: usize,
    font_size: f32,
) -> (Vec<Cluster>, Vec<ShapedGlyph>) {
    if line.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let scale = font_size / engine.units_per_em().max(1) as f32;
    let mut buffer = UnicodeBuffer::new();
    buffer.set_direction(Direction::LeftToRight);
    buffer.push_str(line);
    let output = rustybuzz::shape(engine, &[], buffer);

    let mut clusters: Vec<Cluster> = Vec::new();
    let mut glyphs = Vec::with_capacity(output.len());
    for (info, pos) in output.glyph_infos().iter().zip(output.glyph_positions()) {
        let start = base + info.cluster as usize;
        let advance = pos.x_advance as f32 * scale;
        glyphs.push(ShapedGlyph {
            glyph_id: GlyphId::new(info.glyph_id),
            advance,
            x_offset: pos.x_offset as f32 * scale,
            y_offset: pos.y_offset as f32 * scale,
        });
        match clusters.last_mut() {
            Some(last) if last.start == start => {
                last.advance += advance;
                last.glyph_end = glyphs.len();
            }
            _ => clusters.push(Cluster {
                start,
                end: start,
                advance,
                is_space: false,
                first_glyph: glyphs.len() - 1,
                glyph_end: glyphs.len(),
            }),
        }
    }

    // Left-to-right clusters ascend, so each one ends where the next begins
    let line_end = base + line.len();
    for index in 0..clusters.len() {
        let start = clusters[index].start;
        let end = clusters
            .get(index + 1)
            .map_or(line_end, |next| next.start)
            .clamp(start, line_end);
        let cluster = &mut clusters[index];
        cluster.end = end;
        cluster.is_space = line
            .get(start - base..end - base)
            .is_some_and(|text| !text.is_empty() && text.chars().all(char::is_whitespace));
    }

    (clusters, glyphs)
}

/// Lay out the glyphs of consecutive clusters from x = 0
fn place_line(clusters: &[Cluster], glyphs: &[ShapedGlyph], width: f32) -> ShapedLine {
    let mut x = 0.0;
    let mut placed = Vec::new();
    for cluster in clusters {
        for glyph in &glyphs[cluster.first_glyph..cluster.glyph_end] {
            placed.push(PositionedGlyph {
                glyph_id: glyph.glyph_id,
                x: x + glyph.x_offset,
                y: glyph.y_offset,
            });
            x += glyph.advance;
        }
    }
    ShapedLine {
        glyphs: placed,
        width,
    }
}
