// this_file: src/color.rs
//! Colors and automatic text tone selection
//!
//! The tone is a binary choice: every note in a frame uses the same
//! foreground, picked from the average luma of the background behind the
//! text area.

use crate::background::{cover_geometry, Background};
use crate::config::{CanvasSize, LayoutConfig};
use crate::error::{Error, Result};
use crate::geometry::SafeArea;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::debug;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Foreground used over dark backgrounds
    pub const TEXT_LIGHT: Color = Color::WHITE;
    /// Foreground used over light backgrounds: near-black, slightly translucent
    pub const TEXT_DARK: Color = Color::rgba(0x1C, 0x1C, 0x1E, 230);

    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.is_ascii() || (digits.len() != 6 && digits.len() != 8) {
            return Err(Error::InvalidParameter(format!(
                "Color must be #RRGGBB or #RRGGBBAA: {}",
                hex
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| Error::InvalidParameter(format!("Invalid hex color: {}", hex)))
        };
        let a = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Same color with alpha multiplied by `opacity`
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Rec. 601 luma in `[0, 1]`, ignoring alpha
    pub fn luma(self) -> f64 {
        luma_of(self.r, self.g, self.b)
    }

    /// Convert to an `image` pixel
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl From<Rgba<u8>> for Color {
    fn from(px: Rgba<u8>) -> Self {
        let [r, g, b, a] = px.0;
        Self::rgba(r, g, b, a)
    }
}

/// Rec. 601 luma of 8-bit channels, normalized to `[0, 1]`
pub fn luma_of(r: u8, g: u8, b: u8) -> f64 {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0
}

/// Source-over blend of `src` onto `dst`, with `coverage` scaling source alpha
pub fn blend_over(dst: &mut Rgba<u8>, src: Color, coverage: f32) {
    let alpha = (src.a as f32 / 255.0 * coverage).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let mix = |s: u8, d: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
    let [r, g, b, a] = dst.0;
    let out_a = (alpha * 255.0 + a as f32 * (1.0 - alpha)).round() as u8;
    *dst = Rgba([mix(src.r, r), mix(src.g, g), mix(src.b, b), out_a]);
}

/// Foreground tone used for every note in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTone {
    /// White text for dark backgrounds
    Light,
    /// Near-black text for light backgrounds
    Dark,
}

impl TextTone {
    /// Pick a tone from a background luma
    pub fn for_luma(luma: f64, threshold: f64) -> Self {
        if luma < threshold {
            TextTone::Light
        } else {
            TextTone::Dark
        }
    }

    /// Text color for this tone
    pub fn color(self) -> Color {
        match self {
            TextTone::Light => Color::TEXT_LIGHT,
            TextTone::Dark => Color::TEXT_DARK,
        }
    }

    /// Contrasting shadow color at `opacity`
    pub fn shadow_color(self, opacity: f32) -> Color {
        match self {
            TextTone::Light => Color::BLACK.with_opacity(opacity),
            TextTone::Dark => Color::WHITE.with_opacity(opacity),
        }
    }
}

/// Average luma of an image after downsampling it to a `grid`×`grid` thumbnail
pub fn average_luma(image: &RgbaImage, grid: u32) -> f64 {
    if image.width() == 0 || image.height() == 0 {
        return 0.0;
    }
    let grid = grid.max(1);
    let thumb = imageops::resize(image, grid, grid, FilterType::Triangle);
    let total: f64 = thumb.pixels().map(|px| luma_of(px[0], px[1], px[2])).sum();
    total / (grid as f64 * grid as f64)
}

/// Chooses the text tone for a background
pub struct ColorSelector<'c> {
    config: &'c LayoutConfig,
}

impl<'c> ColorSelector<'c> {
    /// Create a selector using the thresholds of `config`
    pub fn new(config: &'c LayoutConfig) -> Self {
        Self { config }
    }

    /// Luma of the background behind the text area.
    ///
    /// Photos are sampled only in the region that ends up under the notes
    /// after cover scaling; solid backgrounds use their color directly.
    pub fn background_luma(
        &self,
        background: &Background,
        canvas: CanvasSize,
        safe_area: &SafeArea,
    ) -> f64 {
        match background.photo() {
            Some(photo) => {
                let region = self.text_region(photo, canvas, safe_area);
                match region {
                    Some((x, y, w, h)) => {
                        let crop = imageops::crop_imm(photo, x, y, w, h).to_image();
                        average_luma(&crop, self.config.luma_sample_grid)
                    }
                    None => average_luma(photo, self.config.luma_sample_grid),
                }
            }
            None => background.color().luma(),
        }
    }

    /// Pick the text tone for `background`
    pub fn pick_tone(
        &self,
        background: &Background,
        canvas: CanvasSize,
        safe_area: &SafeArea,
    ) -> TextTone {
        let luma = self.background_luma(background, canvas, safe_area);
        let tone = TextTone::for_luma(luma, self.config.luma_threshold);
        debug!("Background luma {:.3} -> {:?} text", luma, tone);
        tone
    }

    /// Map the canvas text area back onto source image pixels
    fn text_region(
        &self,
        photo: &RgbaImage,
        canvas: CanvasSize,
        safe_area: &SafeArea,
    ) -> Option<(u32, u32, u32, u32)> {
        let fit = cover_geometry(canvas, photo.width(), photo.height())?;

        let canvas_left = 0.0;
        let canvas_right = canvas.width as f64 * self.config.text_region_width_ratio.min(1.0);
        let canvas_top = safe_area.top_padding as f64;
        let canvas_bottom = canvas.height as f64 - safe_area.bottom_safe_area as f64;
        if canvas_bottom <= canvas_top || canvas_right <= canvas_left {
            return None;
        }

        let to_src_x = |x: f64| ((x + fit.offset_x as f64) / fit.scale).clamp(0.0, photo.width() as f64);
        let to_src_y = |y: f64| ((y + fit.offset_y as f64) / fit.scale).clamp(0.0, photo.height() as f64);

        let x0 = to_src_x(canvas_left).floor() as u32;
        let x1 = to_src_x(canvas_right).ceil() as u32;
        let y0 = to_src_y(canvas_top).floor() as u32;
        let y1 = to_src_y(canvas_bottom).ceil() as u32;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0, y0, x1 - x0, y1 - y0))
    }
}
