// this_file: src/background.rs
//! Background compositing: solid fill, cover-scaled photo, contrast overlay

use crate::color::{blend_over, Color};
use crate::config::CanvasSize;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::debug;

/// What to draw behind the notes
#[derive(Debug, Clone)]
pub enum Background {
    /// Flat color
    Solid(Color),
    /// Decoded photo, with the color used underneath and as a fallback
    Photo { image: RgbaImage, underlay: Color },
}

impl Background {
    /// Photo background over `underlay`
    pub fn with_photo(image: RgbaImage, underlay: Color) -> Self {
        Background::Photo { image, underlay }
    }

    /// The solid color, or the photo's underlay
    pub fn color(&self) -> Color {
        match self {
            Background::Solid(color) => *color,
            Background::Photo { underlay, .. } => *underlay,
        }
    }

    /// The photo, if one is present and non-empty
    pub fn photo(&self) -> Option<&RgbaImage> {
        match self {
            Background::Photo { image, .. } if image.width() > 0 && image.height() > 0 => {
                Some(image)
            }
            _ => None,
        }
    }

    /// True when a usable photo is present
    pub fn has_photo(&self) -> bool {
        self.photo().is_some()
    }
}

/// Placement of a cover-scaled image relative to the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    /// Uniform scale applied to the image
    pub scale: f64,
    /// Image width after scaling
    pub scaled_width: u32,
    /// Image height after scaling
    pub scaled_height: u32,
    /// Pixels cropped from the left of the scaled image
    pub offset_x: u32,
    /// Pixels cropped from the top of the scaled image
    pub offset_y: u32,
}

impl CoverFit {
    /// Region of the source image that ends up on the canvas, as (x, y, w, h)
    pub fn source_rect(&self, canvas: CanvasSize, image_w: u32, image_h: u32) -> (u32, u32, u32, u32) {
        let x = ((self.offset_x as f64 / self.scale).floor() as u32).min(image_w.saturating_sub(1));
        let y = ((self.offset_y as f64 / self.scale).floor() as u32).min(image_h.saturating_sub(1));
        let w = ((canvas.width as f64 / self.scale).round() as u32).clamp(1, image_w - x);
        let h = ((canvas.height as f64 / self.scale).round() as u32).clamp(1, image_h - y);
        (x, y, w, h)
    }
}

/// Scale that fills the canvas while keeping aspect ratio, centered.
///
/// Returns `None` for empty images or canvases.
pub fn cover_geometry(canvas: CanvasSize, image_w: u32, image_h: u32) -> Option<CoverFit> {
    if image_w == 0 || image_h == 0 || canvas.width == 0 || canvas.height == 0 {
        return None;
    }
    let scale = (canvas.width as f64 / image_w as f64).max(canvas.height as f64 / image_h as f64);
    let scaled_width = ((image_w as f64 * scale).round() as u32).max(canvas.width);
    let scaled_height = ((image_h as f64 * scale).round() as u32).max(canvas.height);
    Some(CoverFit {
        scale,
        scaled_width,
        scaled_height,
        offset_x: (scaled_width - canvas.width) / 2,
        offset_y: (scaled_height - canvas.height) / 2,
    })
}

/// Paints backgrounds onto a fresh canvas
pub struct BackgroundCompositor {
    canvas: CanvasSize,
    overlay_opacity: f32,
}

impl BackgroundCompositor {
    /// Create a compositor for one canvas size
    pub fn new(canvas: CanvasSize, overlay_opacity: f32) -> Self {
        Self {
            canvas,
            overlay_opacity,
        }
    }

    /// Fill with the background color, then draw the photo (if any) with a
    /// black contrast overlay.
    pub fn composite(&self, background: &Background) -> RgbaImage {
        let base = background.color();
        let mut canvas = RgbaImage::from_pixel(
            self.canvas.width,
            self.canvas.height,
            Rgba([base.r, base.g, base.b, 255]),
        );

        let Some(photo) = background.photo() else {
            return canvas;
        };
        let Some(fit) = cover_geometry(self.canvas, photo.width(), photo.height()) else {
            return canvas;
        };

        let (x, y, w, h) = fit.source_rect(self.canvas, photo.width(), photo.height());
        debug!(
            "Cover-fitting {}x{} photo: scale {:.3}, source rect ({}, {}, {}x{})",
            photo.width(),
            photo.height(),
            fit.scale,
            x,
            y,
            w,
            h
        );
        let cropped = imageops::crop_imm(photo, x, y, w, h).to_image();
        let scaled = imageops::resize(
            &cropped,
            self.canvas.width,
            self.canvas.height,
            FilterType::Triangle,
        );
        imageops::overlay(&mut canvas, &scaled, 0, 0);

        let overlay = Color::BLACK.with_opacity(self.overlay_opacity);
        for px in canvas.pixels_mut() {
            blend_over(px, overlay, 1.0);
        }
        canvas
    }
}
